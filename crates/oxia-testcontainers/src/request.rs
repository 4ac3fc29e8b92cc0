//! Container start request handed to a [`ContainerRuntime`](crate::ContainerRuntime).

use crate::config::StandaloneConfig;
use crate::logging::LogForwarder;
use std::fmt;
use std::time::Duration;

/// Log line that marks a standalone instance as ready.
pub const READY_MESSAGE: &str = "Started Grpc server";

/// Label used for forwarded logs when the container has no fixed name.
pub const DEFAULT_LOG_LABEL: &str = "oxia-standalone";

/// Output stream of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSource {
    /// Standard output
    Stdout,
    /// Standard error
    Stderr,
}

impl fmt::Display for LogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogSource::Stdout => write!(f, "stdout"),
            LogSource::Stderr => write!(f, "stderr"),
        }
    }
}

/// Condition the runtime waits on before reporting the container as started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitCondition {
    /// Wait until `message` appears on either output stream
    LogMessage(String),
    /// Report the container as started immediately
    Nothing,
}

impl WaitCondition {
    /// Whether `line` satisfies this condition.
    pub fn is_met_by(&self, line: &str) -> bool {
        match self {
            WaitCondition::LogMessage(message) => line.contains(message.as_str()),
            WaitCondition::Nothing => true,
        }
    }
}

/// Everything a runtime needs to create and start the container.
///
/// Built from a fully resolved [`StandaloneConfig`]; request customizers may
/// edit any field before the runtime sees it.
#[derive(Debug, Clone)]
pub struct StartRequest {
    /// Full image reference
    pub image: String,
    /// TCP container ports to publish on the host
    pub exposed_ports: Vec<u16>,
    /// Command line run inside the container
    pub cmd: Vec<String>,
    /// Readiness condition
    pub wait_for: WaitCondition,
    /// Sink for container output, `None` to discard it
    pub logger: Option<LogForwarder>,
    /// Docker network to attach to
    pub network: Option<String>,
    /// Fixed container name
    pub container_name: Option<String>,
    /// Upper bound on the wait for readiness
    pub startup_timeout: Option<Duration>,
}

impl StartRequest {
    /// Build the request for a resolved configuration.
    pub fn new(config: &StandaloneConfig) -> Self {
        let label = config
            .container_name
            .clone()
            .unwrap_or_else(|| DEFAULT_LOG_LABEL.to_string());

        Self {
            image: config.image.clone(),
            exposed_ports: config.exposed_ports(),
            cmd: config.command(),
            wait_for: WaitCondition::LogMessage(READY_MESSAGE.to_string()),
            logger: Some(LogForwarder::new(label)),
            network: config.network.clone(),
            container_name: config.container_name.clone(),
            startup_timeout: config.startup_timeout,
        }
    }

    /// Split [`image`](Self::image) into repository and tag.
    ///
    /// A missing tag means `latest`. A colon inside the registry host
    /// (`localhost:5000/oxia`) is not taken as a tag separator.
    pub fn image_name_and_tag(&self) -> (&str, &str) {
        let name_start = self.image.rfind('/').map_or(0, |i| i + 1);
        match self.image[name_start..].rfind(':') {
            Some(i) => {
                let split = name_start + i;
                (&self.image[..split], &self.image[split + 1..])
            }
            None => (self.image.as_str(), "latest"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_for(image: &str) -> StartRequest {
        StartRequest::new(&StandaloneConfig {
            image: image.into(),
            ..Default::default()
        })
    }

    #[test]
    fn test_default_request() {
        let request = StartRequest::new(&StandaloneConfig::default());
        assert_eq!(request.image, "oxia/oxia:latest");
        assert_eq!(request.exposed_ports, vec![6648, 6649]);
        assert_eq!(
            request.cmd,
            vec!["bin/oxia", "standalone", "--log-level", "info"]
        );
        assert_eq!(
            request.wait_for,
            WaitCondition::LogMessage("Started Grpc server".into())
        );
        assert_eq!(
            request.logger.as_ref().map(LogForwarder::label),
            Some("oxia-standalone")
        );
        assert!(request.network.is_none());
    }

    #[test]
    fn test_logger_label_follows_container_name() {
        let request = StartRequest::new(&StandaloneConfig {
            container_name: Some("oxia-1".into()),
            ..Default::default()
        });
        assert_eq!(request.logger.as_ref().map(LogForwarder::label), Some("oxia-1"));
        assert_eq!(request.container_name.as_deref(), Some("oxia-1"));
    }

    #[test]
    fn test_image_name_and_tag() {
        assert_eq!(
            request_for("oxia/oxia:latest").image_name_and_tag(),
            ("oxia/oxia", "latest")
        );
        assert_eq!(
            request_for("oxia/oxia:0.11.2").image_name_and_tag(),
            ("oxia/oxia", "0.11.2")
        );
        assert_eq!(
            request_for("oxia/oxia").image_name_and_tag(),
            ("oxia/oxia", "latest")
        );
        assert_eq!(
            request_for("localhost:5000/oxia").image_name_and_tag(),
            ("localhost:5000/oxia", "latest")
        );
        assert_eq!(
            request_for("localhost:5000/oxia:dev").image_name_and_tag(),
            ("localhost:5000/oxia", "dev")
        );
    }

    #[test]
    fn test_wait_condition() {
        let ready = WaitCondition::LogMessage(READY_MESSAGE.into());
        assert!(ready.is_met_by(
            "{\"level\":\"info\",\"message\":\"Started Grpc server\",\"bindAddress\":\"[::]:6648\"}"
        ));
        assert!(!ready.is_met_by("Starting Oxia standalone"));
        assert!(WaitCondition::Nothing.is_met_by(""));
    }
}
