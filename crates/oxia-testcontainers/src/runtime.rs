//! Abstraction over the container runtime.

use crate::error::Result;
use crate::request::StartRequest;
use async_trait::async_trait;

/// Result of a command executed inside a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    /// Process exit code
    pub exit_code: i64,
    /// Standard output followed by standard error
    pub output: Vec<u8>,
}

impl ExecOutput {
    /// Whether the command exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Output decoded as UTF-8, replacing invalid sequences.
    pub fn output_lossy(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

/// Creates and starts containers.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Handle type for a started container.
    type Container: RunningContainer;

    /// Create and start a container, returning once `request.wait_for` holds.
    async fn start(&self, request: StartRequest) -> Result<Self::Container>;
}

/// A started container.
#[async_trait]
pub trait RunningContainer: Send + Sync {
    /// Runtime identifier of the container.
    fn id(&self) -> &str;

    /// Host name or IP the container's published ports are reachable on.
    async fn host(&self) -> Result<String>;

    /// Host port currently mapped to the given TCP container port.
    async fn mapped_port(&self, container_port: u16) -> Result<u16>;

    /// Run a command inside the container and wait for it to exit.
    async fn exec(&self, cmd: Vec<String>) -> Result<ExecOutput>;

    /// Stop the container.
    async fn stop(&self) -> Result<()>;
}
