//! Logging setup.
//!
//! The library only emits `tracing` events: one per translation, one per
//! registration and a warning when the URL variable is missing. Applications
//! without their own subscriber can call [`init`], which reads:
//!
//! - `DBURL_DEBUG=true|1|yes` - log at debug level
//! - `DBURL_LOG_LEVEL=trace|debug|info|warn|error` - log at that level
//!
//! Nothing is installed when neither is set, or when the crate is built
//! without the `tracing-subscriber` feature.

use crate::env::{EnvSource, StdEnvSource};
use std::sync::Once;
use tracing::Level;

/// Enables debug logging when truthy.
pub const DEBUG_ENV: &str = "DBURL_DEBUG";

/// Explicit log level.
pub const LEVEL_ENV: &str = "DBURL_LOG_LEVEL";

static INIT: Once = Once::new();

/// Logging wanted by the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    /// Maximum level for `dburl` and `dburl_core` events.
    pub level: Level,
}

impl LogSettings {
    /// Read the settings from `source`, or `None` when logging was not asked for.
    ///
    /// An unparsable `DBURL_LOG_LEVEL` falls back to debug when `DBURL_DEBUG`
    /// is on and to warn otherwise.
    pub fn from_source<S: EnvSource + ?Sized>(source: &S) -> Option<Self> {
        let debug = source
            .get(DEBUG_ENV)
            .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes"));
        let explicit = source.get(LEVEL_ENV);
        if !debug && explicit.is_none() {
            return None;
        }

        let fallback = if debug { Level::DEBUG } else { Level::WARN };
        let level = explicit
            .and_then(|level| level.trim().parse::<Level>().ok())
            .unwrap_or(fallback);
        Some(Self { level })
    }

    /// `EnvFilter` directive scoping events to this crate family.
    pub fn directive(&self) -> String {
        let level = self.level.as_str().to_ascii_lowercase();
        format!("dburl={level},dburl_core={level}")
    }
}

/// Install a compact global subscriber once, if the environment asks for one.
///
/// Does nothing when another subscriber is already installed.
pub fn init() {
    INIT.call_once(|| {
        let Some(settings) = LogSettings::from_source(&StdEnvSource) else {
            return;
        };

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let installed = tracing_subscriber::registry()
                .with(EnvFilter::new(settings.directive()))
                .with(fmt::layer().compact())
                .try_init();
            if installed.is_ok() {
                tracing::debug!(level = %settings.level, "dburl logging initialized");
            }
        }

        #[cfg(not(feature = "tracing-subscriber"))]
        let _ = settings;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnvSource;

    #[test]
    fn test_nothing_requested() {
        assert_eq!(LogSettings::from_source(&MapEnvSource::new()), None);
        let source = MapEnvSource::new().set(DEBUG_ENV, "no");
        assert_eq!(LogSettings::from_source(&source), None);
    }

    #[test]
    fn test_debug_flag() {
        for value in ["true", "1", "YES"] {
            let source = MapEnvSource::new().set(DEBUG_ENV, value);
            let settings = LogSettings::from_source(&source).unwrap();
            assert_eq!(settings.level, Level::DEBUG);
        }
    }

    #[test]
    fn test_explicit_level() {
        let source = MapEnvSource::new().set(LEVEL_ENV, "trace");
        assert_eq!(LogSettings::from_source(&source).unwrap().level, Level::TRACE);

        let source = MapEnvSource::new().set(LEVEL_ENV, "loud");
        assert_eq!(LogSettings::from_source(&source).unwrap().level, Level::WARN);

        let source = MapEnvSource::new()
            .set(DEBUG_ENV, "1")
            .set(LEVEL_ENV, "loud");
        assert_eq!(LogSettings::from_source(&source).unwrap().level, Level::DEBUG);
    }

    #[test]
    fn test_directive() {
        let settings = LogSettings { level: Level::INFO };
        assert_eq!(settings.directive(), "dburl=info,dburl_core=info");
    }
}
