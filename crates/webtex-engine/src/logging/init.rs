use std::sync::Once;

/// Filter used when neither the config nor `RUST_LOG` names one. wgpu's
/// internals log per-call at `info`.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn";

/// Settings for [`init_logging`].
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `env_logger` directives, e.g. `"webtex_engine=trace"`. Wins over `RUST_LOG`.
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Picks the directives to hand to `env_logger`: the explicit filter, then the
/// environment's, then [`DEFAULT_FILTER`]. Blank strings count as absent.
fn resolve_filter(explicit: Option<&str>, from_env: Option<&str>) -> String {
    explicit
        .or(from_env)
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .unwrap_or(DEFAULT_FILTER)
        .to_owned()
}

/// Sets up `env_logger` behind the `log` facade. Only the first call in a
/// process does anything. A logger the host installed earlier stays in charge.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let from_env = std::env::var("RUST_LOG").ok();
        let filter = resolve_filter(config.env_filter.as_deref(), from_env.as_deref());

        let installed = env_logger::Builder::new()
            .parse_filters(&filter)
            .write_style(config.write_style)
            .try_init()
            .is_ok();

        if installed {
            log::debug!("logging: env_logger active with filter {filter:?}");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_beats_environment() {
        assert_eq!(resolve_filter(Some("debug"), Some("warn")), "debug");
    }

    #[test]
    fn environment_used_without_explicit_filter() {
        assert_eq!(resolve_filter(None, Some("webtex_engine=trace")), "webtex_engine=trace");
    }

    #[test]
    fn blank_filter_falls_back_to_default() {
        assert_eq!(resolve_filter(Some("  "), None), DEFAULT_FILTER);
        assert_eq!(resolve_filter(None, None), DEFAULT_FILTER);
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig {
            env_filter: Some("trace".into()),
            ..LoggingConfig::default()
        });
        assert!(INIT.is_completed());
    }
}
