//! Docker runtime backed by `testcontainers`.

use crate::error::{ContainerError, Result};
use crate::request::{StartRequest, WaitCondition};
use crate::runtime::{ContainerRuntime, ExecOutput, RunningContainer};
use async_trait::async_trait;
use std::borrow::Cow;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use testcontainers::core::{CmdWaitFor, ContainerPort, ExecCommand, ExecResult, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ContainerRequest, Image, ImageExt};

/// How often an exited command is asked for its exit code.
const EXIT_POLL_ATTEMPTS: u32 = 50;
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Image definition derived from a [`StartRequest`].
#[derive(Debug, Clone)]
pub struct OxiaImage {
    name: String,
    tag: String,
    cmd: Vec<String>,
    ports: Vec<ContainerPort>,
    wait_for: WaitCondition,
}

impl OxiaImage {
    fn from_request(request: &StartRequest) -> Self {
        let (name, tag) = request.image_name_and_tag();
        Self {
            name: name.to_string(),
            tag: tag.to_string(),
            cmd: request.cmd.clone(),
            ports: request
                .exposed_ports
                .iter()
                .map(|port| ContainerPort::Tcp(*port))
                .collect(),
            wait_for: request.wait_for.clone(),
        }
    }
}

impl Image for OxiaImage {
    fn name(&self) -> &str {
        &self.name
    }

    fn tag(&self) -> &str {
        &self.tag
    }

    fn ready_conditions(&self) -> Vec<WaitFor> {
        match &self.wait_for {
            WaitCondition::LogMessage(message) => {
                vec![WaitFor::message_on_stdout(message.as_str())]
            }
            WaitCondition::Nothing => Vec::new(),
        }
    }

    fn cmd(&self) -> impl IntoIterator<Item = impl Into<Cow<'_, str>>> {
        self.cmd.iter().map(String::as_str)
    }

    fn expose_ports(&self) -> &[ContainerPort] {
        &self.ports
    }
}

/// Starts containers on the local Docker daemon.
#[derive(Debug, Clone, Copy, Default)]
pub struct DockerRuntime;

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    type Container = DockerContainer;

    async fn start(&self, request: StartRequest) -> Result<DockerContainer> {
        let mut container: ContainerRequest<OxiaImage> = OxiaImage::from_request(&request).into();

        if let Some(network) = request.network {
            container = container.with_network(network);
        }
        if let Some(name) = request.container_name {
            container = container.with_container_name(name);
        }
        if let Some(timeout) = request.startup_timeout {
            container = container.with_startup_timeout(timeout);
        }
        if let Some(logger) = request.logger {
            container = container.with_log_consumer(logger);
        }

        let inner = container.start().await.map_err(|e| {
            tracing::error!(error = %e, "Docker container failed to start");
            ContainerError::Start(e.to_string())
        })?;

        Ok(DockerContainer { inner })
    }
}

/// A running Docker container. Removed from the daemon when dropped.
pub struct DockerContainer {
    inner: ContainerAsync<OxiaImage>,
}

impl DockerContainer {
    /// The underlying testcontainers handle.
    pub fn inner(&self) -> &ContainerAsync<OxiaImage> {
        &self.inner
    }
}

#[async_trait]
impl RunningContainer for DockerContainer {
    fn id(&self) -> &str {
        self.inner.id()
    }

    async fn host(&self) -> Result<String> {
        self.inner
            .get_host()
            .await
            .map(|host| host.to_string())
            .map_err(|e| ContainerError::Resolve(format!("host: {e}")))
    }

    async fn mapped_port(&self, container_port: u16) -> Result<u16> {
        self.inner
            .get_host_port_ipv4(ContainerPort::Tcp(container_port))
            .await
            .map_err(|e| ContainerError::Resolve(format!("port {container_port}/tcp: {e}")))
    }

    async fn exec(&self, cmd: Vec<String>) -> Result<ExecOutput> {
        let command = ExecCommand::new(cmd).with_cmd_ready_condition(CmdWaitFor::Nothing);

        let mut result = self
            .inner
            .exec(command)
            .await
            .map_err(|e| ContainerError::Exec(e.to_string()))?;

        let mut output = result
            .stdout_to_vec()
            .await
            .map_err(|e| ContainerError::Exec(format!("reading stdout: {e}")))?;
        let stderr = result
            .stderr_to_vec()
            .await
            .map_err(|e| ContainerError::Exec(format!("reading stderr: {e}")))?;
        output.extend(stderr);

        let exit_code = exit_code_of(result).await?;

        Ok(ExecOutput { exit_code, output })
    }

    async fn stop(&self) -> Result<()> {
        tracing::info!(container_id = %self.inner.id(), "Stopping container");
        self.inner
            .stop()
            .await
            .map_err(|e| ContainerError::Stop(e.to_string()))
    }
}

/// Exit code of a command whose output has been drained.
///
/// `ExecResult::exit_code` borrows a value that is not `Sync`, so its future
/// is not `Send`. It is driven on a blocking thread instead.
async fn exit_code_of(result: ExecResult) -> Result<i64> {
    let handle = tokio::runtime::Handle::current();
    tokio::task::spawn_blocking(move || {
        handle.block_on(wait_for_exit_code(
            || result.exit_code(),
            EXIT_POLL_ATTEMPTS,
            EXIT_POLL_INTERVAL,
        ))
    })
    .await
    .map_err(|e| ContainerError::Exec(format!("exit code task failed: {e}")))?
}

/// Query until the daemon reports an exit code, at most `attempts` times.
async fn wait_for_exit_code<F, Fut, E>(mut query: F, attempts: u32, interval: Duration) -> Result<i64>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<Option<i64>, E>>,
    E: Display,
{
    for attempt in 1..=attempts {
        match query().await {
            Ok(Some(code)) => return Ok(code),
            Ok(None) => {
                tracing::trace!(attempt, "Command still running, polling exit code");
                tokio::time::sleep(interval).await;
            }
            Err(e) => return Err(ContainerError::Exec(format!("reading exit code: {e}"))),
        }
    }
    Err(ContainerError::Exec(format!(
        "command reported no exit code after {attempts} attempts"
    )))
}
