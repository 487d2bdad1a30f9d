//! Process-wide `tracing` subscriber.
//!
//! Everything goes to stderr so that stdout stays free for the JSON report
//! printed by the CLI.

use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Coloured single-line events for terminals.
    #[default]
    Pretty,
    /// One JSON object per event, for Actions log collectors.
    Json,
}

impl LogFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }

    fn label(self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// `RUST_LOG` wins over `fallback` (e.g. "info" or "cs_sync=debug,warn").
/// An unparsable fallback degrades to `info`.
pub fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Later calls are no-ops, so tests may call
/// this freely.
pub fn init(service: &str, level: &str, format: LogFormat) {
    let builder = fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    match format {
        LogFormat::Pretty => builder.with_thread_ids(false).try_init().ok(),
        LogFormat::Json => builder.json().try_init().ok(),
    };

    tracing::info!(service, format = format.label(), "logging ready");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_selects_format() {
        assert_eq!(LogFormat::from_json_flag(true), LogFormat::Json);
        assert_eq!(LogFormat::from_json_flag(false), LogFormat::default());
    }

    #[test]
    fn bad_fallback_still_builds_a_filter() {
        let filter = env_filter("not a [valid directive");
        assert!(!filter.to_string().is_empty());
    }
}
