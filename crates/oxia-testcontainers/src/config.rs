//! Configuration for a standalone Oxia container.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Image reference used when none is configured.
pub const DEFAULT_IMAGE: &str = "oxia/oxia:latest";

/// Log level passed to `oxia standalone` when none is configured.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Port serving the Oxia client protocol.
pub const CLIENT_PORT: u16 = 6648;

/// Port used for inter-node traffic.
pub const INTERNAL_PORT: u16 = 6649;

/// Port serving Prometheus metrics.
pub const METRICS_PORT: u16 = 8080;

/// Configuration for launching a standalone Oxia container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandaloneConfig {
    /// Full image reference, e.g. `oxia/oxia:latest`
    pub image: String,
    /// Value of `--log-level`
    pub log_level: String,
    /// Value of `--shards`, omitted from the command line when `None`
    pub shards: Option<u32>,
    /// Also expose the metrics port
    pub expose_metrics: bool,
    /// Docker network to attach the container to
    pub network: Option<String>,
    /// Fixed container name
    pub container_name: Option<String>,
    /// Upper bound on the wait for readiness
    pub startup_timeout: Option<Duration>,
}

impl Default for StandaloneConfig {
    fn default() -> Self {
        Self {
            image: DEFAULT_IMAGE.into(),
            log_level: DEFAULT_LOG_LEVEL.into(),
            shards: None,
            expose_metrics: false,
            network: None,
            container_name: None,
            startup_timeout: None,
        }
    }
}

impl StandaloneConfig {
    /// Ports the container exposes for this configuration.
    pub fn exposed_ports(&self) -> Vec<u16> {
        let mut ports = vec![CLIENT_PORT, INTERNAL_PORT];
        if self.expose_metrics {
            ports.push(METRICS_PORT);
        }
        ports
    }

    /// Command line run inside the container.
    pub fn command(&self) -> Vec<String> {
        let mut cmd = vec![
            "bin/oxia".to_string(),
            "standalone".to_string(),
            "--log-level".to_string(),
            self.log_level.clone(),
        ];
        if let Some(shards) = self.shards {
            cmd.push(format!("--shards={shards}"));
        }
        cmd
    }
}
