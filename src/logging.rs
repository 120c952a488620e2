use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Set to any value to get debug output without writing a full `RUST_LOG` filter.
pub const DEBUG_ENV: &str = "PITCHPAGE_DEBUG";

fn default_directives() -> &'static str {
    if std::env::var_os(DEBUG_ENV).is_some() {
        "pitchpage=debug,warn"
    } else {
        "warn"
    }
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `PITCHPAGE_DEBUG`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives()));
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_env_raises_default_level() {
        std::env::remove_var(DEBUG_ENV);
        assert_eq!(default_directives(), "warn");

        std::env::set_var(DEBUG_ENV, "1");
        assert_eq!(default_directives(), "pitchpage=debug,warn");
        assert!(EnvFilter::try_new(default_directives()).is_ok());

        std::env::remove_var(DEBUG_ENV);
    }
}
