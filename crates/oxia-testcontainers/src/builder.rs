//! Builder pattern for launching a standalone container.

use crate::config::StandaloneConfig;
use crate::docker::DockerContainer;
use crate::error::Result;
use crate::options::{self, StandaloneOption};
use crate::request::StartRequest;
use crate::runtime::ContainerRuntime;
use crate::standalone::{self, StandaloneContainer};
use std::time::Duration;

/// Fluent front-end over a list of [`StandaloneOption`]s.
///
/// # Example
///
/// ```no_run
/// use oxia_testcontainers::StandaloneBuilder;
///
/// # async fn example() -> oxia_testcontainers::Result<()> {
/// let oxia = StandaloneBuilder::new()
///     .image("oxia/oxia:latest")
///     .log_level("debug")
///     .start()
///     .await?;
///
/// let address = oxia.public_address().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct StandaloneBuilder {
    options: Vec<StandaloneOption>,
}

impl StandaloneBuilder {
    /// Create a builder with no options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an arbitrary option.
    pub fn option(mut self, option: StandaloneOption) -> Self {
        self.options.push(option);
        self
    }

    /// Set the image reference.
    pub fn image(self, image: impl Into<String>) -> Self {
        self.option(options::with_image(image))
    }

    /// Set the log level.
    pub fn log_level(self, level: impl Into<String>) -> Self {
        self.option(options::with_log_level(level))
    }

    /// Set the number of shards.
    pub fn shards(self, shards: u32) -> Self {
        self.option(options::with_shards(shards))
    }

    /// Expose the metrics port.
    pub fn metrics(self) -> Self {
        self.option(options::with_metrics())
    }

    /// Attach to a Docker network.
    pub fn network(self, network: impl Into<String>) -> Self {
        self.option(options::with_network(network))
    }

    /// Use a fixed container name.
    pub fn container_name(self, name: impl Into<String>) -> Self {
        self.option(options::with_container_name(name))
    }

    /// Bound the wait for readiness.
    pub fn startup_timeout(self, timeout: Duration) -> Self {
        self.option(options::with_startup_timeout(timeout))
    }

    /// Edit the start request directly.
    pub fn customize<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut StartRequest) -> Result<()> + Send + 'static,
    {
        self.option(options::customize(f))
    }

    /// Resolve the options without starting anything.
    ///
    /// Useful for testing or inspecting the request.
    pub fn build_request(self) -> Result<(StandaloneConfig, StartRequest)> {
        standalone::prepare(self.options)
    }

    /// Start the container on the local Docker daemon.
    ///
    /// # Errors
    /// Returns an error if option resolution or container startup fails.
    pub async fn start(self) -> Result<StandaloneContainer<DockerContainer>> {
        standalone::run(self.options).await
    }

    /// Start the container on the given runtime.
    ///
    /// # Errors
    /// Returns an error if option resolution or container startup fails.
    pub async fn start_with<R: ContainerRuntime>(
        self,
        runtime: &R,
    ) -> Result<StandaloneContainer<R::Container>> {
        standalone::run_with(runtime, self.options).await
    }
}
