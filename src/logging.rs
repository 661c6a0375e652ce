use crate::strings;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_FILTER: &str = "warn";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter `{0}`: {1}")]
    InvalidFilter(String, #[source] tracing_subscriber::filter::ParseError),
    #[error("failed to initialize tracing: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// The filter directive to log with. The environment wins over the config
/// file, which wins over the default.
pub fn filter_directive(env: Option<String>, config: Option<&str>) -> String {
    env.filter(|directive| !directive.trim().is_empty())
        .or_else(|| config.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Installs the global subscriber. Logs go to stderr so they never mix with
/// reports on stdout. Must be called at most once.
pub fn init_logging(config_filter: Option<&str>) -> Result<(), LoggingError> {
    let env = std::env::var(strings::LOG_ENV.as_str()).ok();
    let directive = filter_directive(env, config_filter);
    let filter = EnvFilter::try_new(&directive)
        .map_err(|e| LoggingError::InvalidFilter(directive.clone(), e))?;

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()?;

    tracing::debug!(filter = %directive, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_wins() {
        assert_eq!(
            filter_directive(Some("wff=trace".into()), Some("info")),
            "wff=trace"
        );
    }

    #[test]
    fn config_then_default() {
        assert_eq!(filter_directive(None, Some("info")), "info");
        assert_eq!(filter_directive(Some("  ".into()), None), "warn");
    }

    #[test]
    fn invalid_directives_are_rejected() {
        assert!(EnvFilter::try_new("wff=loud").is_err());
    }
}
