//! Logging setup for rollcall.
//!
//! Workflow operations log through `tracing`; the binary installs a
//! `tracing-subscriber` formatter on stderr so that stdout stays free for
//! command output such as `--json`.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much the binary reports, as chosen by `-q` and `-v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Check-ins, registrations, and warnings.
    #[default]
    Normal,
    /// Adds slot writes and roster loads.
    Verbose,
    /// Everything.
    Trace,
}

impl Verbosity {
    /// The most detailed level shown at this verbosity.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }
}

/// Filter directive used when `RUST_LOG` is unset.
#[must_use]
pub fn default_filter(verbosity: Verbosity) -> String {
    format!("rollcall={}", verbosity.to_level_filter())
}

/// Install the global subscriber.
///
/// `RUST_LOG`, when set, replaces the verbosity-derived filter. Calling this
/// more than once is harmless; later calls leave the first subscriber in
/// place.
///
/// ```no_run
/// use rollcall::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_map_to_levels() {
        let levels: Vec<Level> = [
            Verbosity::Quiet,
            Verbosity::Normal,
            Verbosity::Verbose,
            Verbosity::Trace,
        ]
        .iter()
        .map(Verbosity::to_level_filter)
        .collect();
        assert_eq!(
            levels,
            vec![Level::ERROR, Level::INFO, Level::DEBUG, Level::TRACE]
        );
        assert_eq!(Verbosity::default(), Verbosity::Normal);
    }

    #[test]
    fn test_default_filter_targets_crate() {
        assert_eq!(default_filter(Verbosity::Normal), "rollcall=INFO");
        assert_eq!(default_filter(Verbosity::Quiet), "rollcall=ERROR");
        assert_eq!(default_filter(Verbosity::Trace), "rollcall=TRACE");
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(default_filter(Verbosity::Verbose)).is_ok());
    }

    #[test]
    fn test_repeated_init_is_harmless() {
        init_logging(Verbosity::Quiet);
        init_logging(Verbosity::Trace);
        tracing::info!("still logging");
    }
}
