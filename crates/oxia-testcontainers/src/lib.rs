//! # oxia-testcontainers
//!
//! Runs a single-node "standalone" Oxia instance in Docker for integration
//! tests, on top of `testcontainers`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use oxia_testcontainers::{run, with_log_level};
//!
//! # async fn example() -> oxia_testcontainers::Result<()> {
//! // Blocks until the server logs "Started Grpc server"
//! let oxia = run([with_log_level("debug")]).await?;
//!
//! // Address for an Oxia client
//! let address = oxia.public_address().await?;
//!
//! // Or drive the bundled CLI inside the container
//! let put = oxia.client(["put", "key", "value-data"]).await?;
//! assert!(put.success());
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Options**: image, log level, shards, metrics port, network, container name
//! - **Request Customizers**: edit the start request before it reaches Docker
//! - **Readiness**: startup returns only after the gRPC server is up
//! - **Log Forwarding**: container output is emitted as `tracing` events
//! - **Pluggable Runtime**: [`run_with`] accepts any [`ContainerRuntime`]

mod builder;
mod config;
mod docker;
mod error;
mod logging;
mod options;
mod request;
mod runtime;
mod standalone;

pub use builder::StandaloneBuilder;
pub use config::{
    StandaloneConfig, CLIENT_PORT, DEFAULT_IMAGE, DEFAULT_LOG_LEVEL, INTERNAL_PORT, METRICS_PORT,
};
pub use docker::{DockerContainer, DockerRuntime, OxiaImage};
pub use error::{ContainerError, Result};
pub use logging::{LogForwarder, LOG_TARGET};
pub use options::{
    customize, with_container_name, with_image, with_log_level, with_metrics, with_network,
    with_shards, with_startup_timeout, RequestCustomizer, StandaloneOption,
};
pub use request::{LogSource, StartRequest, WaitCondition, DEFAULT_LOG_LABEL, READY_MESSAGE};
pub use runtime::{ContainerRuntime, ExecOutput, RunningContainer};
pub use standalone::{run, run_with, StandaloneContainer};
