//! Launching and querying a standalone Oxia container.

use crate::config::{StandaloneConfig, CLIENT_PORT, INTERNAL_PORT, METRICS_PORT};
use crate::docker::{DockerContainer, DockerRuntime};
use crate::error::{ContainerError, Result};
use crate::options::{self, StandaloneOption};
use crate::request::StartRequest;
use crate::runtime::{ContainerRuntime, ExecOutput, RunningContainer};

/// Start a standalone Oxia container on the local Docker daemon.
///
/// Returns once the server has logged `Started Grpc server`. Dropping the
/// returned future abandons the launch; dropping the returned container
/// removes it.
///
/// # Errors
/// Returns an error if an option is rejected, a request customizer fails,
/// or Docker cannot start the container.
pub async fn run(
    options: impl IntoIterator<Item = StandaloneOption>,
) -> Result<StandaloneContainer<DockerContainer>> {
    run_with(&DockerRuntime, options).await
}

/// Start a standalone Oxia container on the given runtime.
///
/// # Errors
/// See [`run`].
pub async fn run_with<R: ContainerRuntime>(
    runtime: &R,
    options: impl IntoIterator<Item = StandaloneOption>,
) -> Result<StandaloneContainer<R::Container>> {
    let (config, request) = prepare(options)?;

    let start = std::time::Instant::now();
    tracing::info!(
        image = %request.image,
        log_level = %config.log_level,
        ports = ?request.exposed_ports,
        "Starting Oxia standalone container"
    );

    let image = request.image.clone();
    let container = runtime.start(request).await.map_err(|e| {
        tracing::error!(image = %image, error = %e, "Oxia standalone container failed to start");
        ContainerError::Launch {
            image: image.clone(),
            source: Box::new(e),
        }
    })?;

    tracing::info!(
        container_id = %container.id(),
        image = %image,
        elapsed = ?start.elapsed(),
        "Oxia standalone container ready"
    );

    Ok(StandaloneContainer { config, container })
}

/// Resolve options into the final config and start request.
pub(crate) fn prepare(
    options: impl IntoIterator<Item = StandaloneOption>,
) -> Result<(StandaloneConfig, StartRequest)> {
    let (config, customizers) = options::resolve(options)?;

    let mut request = StartRequest::new(&config);
    for (index, customizer) in customizers.into_iter().enumerate() {
        tracing::debug!(index, "Applying request customizer");
        customizer(&mut request).map_err(|e| ContainerError::Customize {
            index,
            source: Box::new(e),
        })?;
    }

    Ok((config, request))
}

/// A started standalone Oxia instance.
///
/// Addresses are looked up from the runtime on every call.
pub struct StandaloneContainer<C: RunningContainer = DockerContainer> {
    config: StandaloneConfig,
    container: C,
}

impl<C: RunningContainer> StandaloneContainer<C> {
    /// Runtime identifier of the container.
    pub fn id(&self) -> &str {
        self.container.id()
    }

    /// Configuration the container was launched with.
    ///
    /// Reflects the resolved options, not edits made by request customizers.
    pub fn config(&self) -> &StandaloneConfig {
        &self.config
    }

    /// The runtime's container handle.
    pub fn inner(&self) -> &C {
        &self.container
    }

    /// `host:port` at which clients reach the Oxia service.
    pub async fn public_address(&self) -> Result<String> {
        self.address_of(CLIENT_PORT).await
    }

    /// `host:port` of the internal port.
    pub async fn internal_address(&self) -> Result<String> {
        self.address_of(INTERNAL_PORT).await
    }

    /// URL of the Prometheus metrics endpoint.
    ///
    /// # Errors
    /// Returns [`ContainerError::PortNotExposed`] unless the container was
    /// launched with [`with_metrics`](crate::with_metrics).
    pub async fn metrics_url(&self) -> Result<String> {
        if !self.config.expose_metrics {
            return Err(ContainerError::PortNotExposed(METRICS_PORT));
        }
        let address = self.address_of(METRICS_PORT).await?;
        Ok(format!("http://{address}/metrics"))
    }

    async fn address_of(&self, container_port: u16) -> Result<String> {
        let host = self.container.host().await?;
        let port = self.container.mapped_port(container_port).await?;
        Ok(format!("{host}:{port}"))
    }

    /// Run a command inside the container.
    pub async fn exec<I, S>(&self, cmd: I) -> Result<ExecOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cmd: Vec<String> = cmd.into_iter().map(Into::into).collect();
        tracing::debug!(container_id = %self.id(), ?cmd, "Executing command");
        self.container.exec(cmd).await
    }

    /// Run `bin/oxia client <args>` inside the container.
    pub async fn client<I, S>(&self, args: I) -> Result<ExecOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cmd = ["bin/oxia".to_string(), "client".to_string()]
            .into_iter()
            .chain(args.into_iter().map(Into::into));
        self.exec(cmd).await
    }

    /// Stop the container.
    pub async fn stop(&self) -> Result<()> {
        self.container.stop().await
    }
}
