//! Launch options for a standalone container.
//!
//! Options come in two kinds. Config patches rewrite a field of
//! [`StandaloneConfig`]; customizers edit the finished [`StartRequest`].
//! All patches are applied before the request exists, then all customizers
//! run against it, each group in the order given.

use crate::config::StandaloneConfig;
use crate::error::{ContainerError, Result};
use crate::request::StartRequest;
use std::fmt;
use std::time::Duration;

/// Closure that edits a [`StartRequest`] before it is handed to the runtime.
pub type RequestCustomizer = Box<dyn FnOnce(&mut StartRequest) -> Result<()> + Send>;

/// A single launch option.
pub enum StandaloneOption {
    /// Replace the image reference
    Image(String),
    /// Replace the `--log-level` value
    LogLevel(String),
    /// Set the `--shards` value (must be > 0)
    Shards(u32),
    /// Also expose the metrics port
    Metrics,
    /// Attach to a Docker network
    Network(String),
    /// Use a fixed container name
    ContainerName(String),
    /// Bound the wait for readiness
    StartupTimeout(Duration),
    /// Edit the start request directly
    Customize(RequestCustomizer),
}

impl fmt::Debug for StandaloneOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image(image) => f.debug_tuple("Image").field(image).finish(),
            Self::LogLevel(level) => f.debug_tuple("LogLevel").field(level).finish(),
            Self::Shards(shards) => f.debug_tuple("Shards").field(shards).finish(),
            Self::Metrics => write!(f, "Metrics"),
            Self::Network(network) => f.debug_tuple("Network").field(network).finish(),
            Self::ContainerName(name) => f.debug_tuple("ContainerName").field(name).finish(),
            Self::StartupTimeout(timeout) => {
                f.debug_tuple("StartupTimeout").field(timeout).finish()
            }
            Self::Customize(_) => write!(f, "Customize(..)"),
        }
    }
}

impl StandaloneOption {
    /// Options derived from `OXIA_IMAGE`, `OXIA_LOG_LEVEL` and `OXIA_SHARDS`.
    ///
    /// Only variables that are set produce an option, so the result can be
    /// prepended to an explicit option list without masking its defaults.
    pub fn from_env() -> Vec<Self> {
        let mut options = Vec::new();
        if let Ok(image) = std::env::var("OXIA_IMAGE") {
            options.push(Self::Image(image));
        }
        if let Ok(level) = std::env::var("OXIA_LOG_LEVEL") {
            options.push(Self::LogLevel(level));
        }
        if let Some(shards) = std::env::var("OXIA_SHARDS")
            .ok()
            .and_then(|value| parse_shards(&value))
        {
            options.push(Self::Shards(shards));
        }
        options
    }

    /// Apply a config patch. Customizers are handed back untouched.
    fn apply(self, config: &mut StandaloneConfig) -> Result<Option<RequestCustomizer>> {
        match self {
            Self::Image(image) => config.image = image,
            Self::LogLevel(level) => config.log_level = level,
            Self::Shards(0) => {
                return Err(ContainerError::InvalidOption(
                    "shards must be greater than zero".into(),
                ));
            }
            Self::Shards(shards) => config.shards = Some(shards),
            Self::Metrics => config.expose_metrics = true,
            Self::Network(network) => config.network = Some(network),
            Self::ContainerName(name) => config.container_name = Some(name),
            Self::StartupTimeout(timeout) => config.startup_timeout = Some(timeout),
            Self::Customize(customizer) => return Ok(Some(customizer)),
        }
        Ok(None)
    }
}

fn parse_shards(value: &str) -> Option<u32> {
    match value.trim().parse() {
        Ok(shards) => Some(shards),
        Err(e) => {
            tracing::warn!(value, error = %e, "Ignoring unparsable OXIA_SHARDS");
            None
        }
    }
}

/// Set the image reference.
pub fn with_image(image: impl Into<String>) -> StandaloneOption {
    StandaloneOption::Image(image.into())
}

/// Set the log level passed to `oxia standalone`.
pub fn with_log_level(level: impl Into<String>) -> StandaloneOption {
    StandaloneOption::LogLevel(level.into())
}

/// Set the number of shards.
pub fn with_shards(shards: u32) -> StandaloneOption {
    StandaloneOption::Shards(shards)
}

/// Expose the metrics port.
pub fn with_metrics() -> StandaloneOption {
    StandaloneOption::Metrics
}

/// Attach the container to a Docker network.
pub fn with_network(network: impl Into<String>) -> StandaloneOption {
    StandaloneOption::Network(network.into())
}

/// Give the container a fixed name.
pub fn with_container_name(name: impl Into<String>) -> StandaloneOption {
    StandaloneOption::ContainerName(name.into())
}

/// Bound how long the runtime waits for readiness.
pub fn with_startup_timeout(timeout: Duration) -> StandaloneOption {
    StandaloneOption::StartupTimeout(timeout)
}

/// Edit the start request directly.
pub fn customize<F>(f: F) -> StandaloneOption
where
    F: FnOnce(&mut StartRequest) -> Result<()> + Send + 'static,
{
    StandaloneOption::Customize(Box::new(f))
}

/// Fold config patches over the defaults, collecting customizers in order.
///
/// Stops at the first rejected patch, reporting its position in `options`.
pub(crate) fn resolve(
    options: impl IntoIterator<Item = StandaloneOption>,
) -> Result<(StandaloneConfig, Vec<RequestCustomizer>)> {
    let mut config = StandaloneConfig::default();
    let mut customizers = Vec::new();

    for (index, option) in options.into_iter().enumerate() {
        tracing::debug!(index, ?option, "Applying option");
        let applied = option.apply(&mut config).map_err(|e| {
            tracing::error!(index, error = %e, "Option rejected");
            ContainerError::Option {
                index,
                source: Box::new(e),
            }
        })?;
        if let Some(customizer) = applied {
            customizers.push(customizer);
        }
    }

    Ok((config, customizers))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_no_options() {
        let (config, customizers) = resolve(Vec::new()).unwrap();
        assert_eq!(config, StandaloneConfig::default());
        assert!(customizers.is_empty());
    }

    #[test]
    fn test_last_write_wins() {
        let (config, _) = resolve(vec![
            with_image("oxia/oxia:0.10"),
            with_log_level("debug"),
            with_image("oxia/oxia:main"),
            with_log_level("warn"),
        ])
        .unwrap();

        assert_eq!(config.image, "oxia/oxia:main");
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_log_level_not_validated() {
        let (config, _) = resolve(vec![with_log_level("loud")]).unwrap();
        assert_eq!(config.log_level, "loud");
    }

    #[test]
    fn test_zero_shards_rejected() {
        let err = resolve(vec![with_log_level("debug"), with_shards(0)])
            .err()
            .expect("zero shards should be rejected");
        match &err {
            ContainerError::Option { index, source } => {
                assert_eq!(*index, 1);
                assert!(matches!(**source, ContainerError::InvalidOption(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("option #1 rejected"));
        assert!(err.to_string().contains("shards must be greater than zero"));
    }

    #[test]
    fn test_parse_shards() {
        assert_eq!(parse_shards("2"), Some(2));
        assert_eq!(parse_shards(" 4\n"), Some(4));
        assert_eq!(parse_shards("three"), None);
        assert_eq!(parse_shards("-1"), None);
        assert_eq!(parse_shards(""), None);
    }

    #[test]
    fn test_customizers_collected_in_order() {
        let (_, customizers) = resolve(vec![
            customize(|req| {
                req.cmd.push("first".into());
                Ok(())
            }),
            with_metrics(),
            customize(|req| {
                req.cmd.push("second".into());
                Ok(())
            }),
        ])
        .unwrap();
        assert_eq!(customizers.len(), 2);

        let mut request = StartRequest::new(&StandaloneConfig::default());
        for customizer in customizers {
            customizer(&mut request).unwrap();
        }
        assert!(request.cmd.ends_with(&["first".to_string(), "second".to_string()]));
    }

    #[test]
    fn test_optional_fields() {
        let (config, _) = resolve(vec![
            with_shards(2),
            with_metrics(),
            with_network("oxia-net"),
            with_container_name("oxia"),
            with_startup_timeout(Duration::from_secs(30)),
        ])
        .unwrap();

        assert_eq!(config.shards, Some(2));
        assert!(config.expose_metrics);
        assert_eq!(config.network.as_deref(), Some("oxia-net"));
        assert_eq!(config.container_name.as_deref(), Some("oxia"));
        assert_eq!(config.startup_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_option_debug_hides_closure() {
        let option = customize(|_| Ok(()));
        assert_eq!(format!("{option:?}"), "Customize(..)");
        assert_eq!(format!("{:?}", with_image("x")), "Image(\"x\")");
    }
}
