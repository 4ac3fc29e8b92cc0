//! Error types for oxia-testcontainers.

use thiserror::Error;

/// Result type alias for oxia-testcontainers operations.
pub type Result<T> = std::result::Result<T, ContainerError>;

/// Errors that can occur while launching or querying a standalone container.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// A configuration option was rejected
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// A config option failed to apply
    #[error("option #{index} rejected: {source}")]
    Option {
        /// Position of the option in the option list
        index: usize,
        /// Reason the option was rejected
        #[source]
        source: Box<ContainerError>,
    },

    /// A request customizer failed
    #[error("request customizer #{index} failed: {source}")]
    Customize {
        /// Position of the customizer among all customizers
        index: usize,
        /// Error reported by the customizer
        #[source]
        source: Box<ContainerError>,
    },

    /// The launch failed after the request was handed to the runtime
    #[error("failed to start standalone container from {image}: {source}")]
    Launch {
        /// Image reference the launch was attempted with
        image: String,
        /// Underlying runtime error
        #[source]
        source: Box<ContainerError>,
    },

    /// The runtime could not create or start the container
    #[error("failed to start container: {0}")]
    Start(String),

    /// Host or mapped port could not be resolved
    #[error("failed to resolve container address: {0}")]
    Resolve(String),

    /// The requested container port is not part of the request
    #[error("container port {0}/tcp is not exposed")]
    PortNotExposed(u16),

    /// Command execution inside the container failed
    #[error("exec failed: {0}")]
    Exec(String),

    /// Failed to stop the container
    #[error("failed to stop container: {0}")]
    Stop(String),
}
