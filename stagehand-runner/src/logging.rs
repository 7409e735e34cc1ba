//! Logging initialization for the `stagehand` runner.
//!
//! Configures `tracing-subscriber` based on the `[general]` section
//! of `HarnessConfig`. Supports JSON structured logging and
//! human-readable pretty format.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use stagehand_core::config::{GeneralConfig, agent_tracing_level};

/// Build the filter directives used when `RUST_LOG` is not set.
///
/// The harness level comes first. `AGENT_LOG_LEVEL` then applies to
/// `AGENT_LOG_MODULE` when one is named, otherwise it replaces the
/// base level for every module. Agent level names such as `WARNING` and
/// `CRITICAL` are translated to `warn` and `error`.
pub fn filter_directives(config: &GeneralConfig) -> String {
    let agent_level = config
        .agent_log_level
        .as_deref()
        .and_then(agent_tracing_level);
    match (agent_level, config.agent_log_module.as_deref()) {
        (Some(level), Some(module)) if !module.is_empty() => {
            format!("{},{module}={level}", config.log_level)
        }
        (Some(level), _) => level.to_owned(),
        (None, _) => config.log_level.clone(),
    }
}

/// Initialize the global tracing subscriber.
///
/// Must be called exactly once, before any step registrar binds.
///
/// # Formats
///
/// * `"json"` - Machine-parseable JSON lines (for CI)
/// * `"pretty"` - Human-readable colored output (default)
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(filter_directives(config))
            .map_err(|e| anyhow::anyhow!("invalid log filter: {}", e))?,
    };

    match config.log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()
                .map_err(|e| {
                    anyhow::anyhow!("failed to initialize JSON tracing subscriber: {}", e)
                })?;
        }
        "pretty" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()
                .map_err(|e| {
                    anyhow::anyhow!("failed to initialize pretty tracing subscriber: {}", e)
                })?;
        }
        _ => {
            return Err(anyhow::anyhow!(
                "unknown log format '{}', expected 'json' or 'pretty'",
                config.log_format
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn general(agent_level: Option<&str>, agent_module: Option<&str>) -> GeneralConfig {
        GeneralConfig {
            agent_log_level: agent_level.map(str::to_owned),
            agent_log_module: agent_module.map(str::to_owned),
            ..GeneralConfig::default()
        }
    }

    #[test]
    fn base_level_without_agent_settings() {
        assert_eq!(filter_directives(&general(None, None)), "info");
    }

    #[test]
    fn agent_level_applies_to_named_module() {
        assert_eq!(
            filter_directives(&general(Some("debug"), Some("stagehand_compose"))),
            "info,stagehand_compose=debug"
        );
    }

    #[test]
    fn agent_level_without_module_applies_everywhere() {
        assert_eq!(filter_directives(&general(Some("warn"), None)), "warn");
        assert_eq!(filter_directives(&general(Some("warn"), Some(""))), "warn");
    }

    #[test]
    fn agent_level_names_are_translated() {
        assert_eq!(
            filter_directives(&general(Some("WARNING"), Some("agent"))),
            "info,agent=warn"
        );
        assert_eq!(filter_directives(&general(Some("CRITICAL"), None)), "error");
        assert_eq!(filter_directives(&general(Some("DEBUG"), None)), "debug");
    }

    #[test]
    fn unknown_format_is_rejected() {
        let config = GeneralConfig {
            log_format: "xml".to_owned(),
            ..GeneralConfig::default()
        };
        let err = init_tracing(&config).unwrap_err();
        assert!(err.to_string().contains("unknown log format 'xml'"));
    }
}
