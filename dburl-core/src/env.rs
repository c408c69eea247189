//! Reading the connection URL from the environment.

use crate::config::ConnectionConfig;
use crate::error::UrlResult;
use crate::overrides::Overrides;
use crate::translate::Translator;
use std::collections::HashMap;
use tracing::{info, warn};

/// Environment variable holding the connection URL by default.
pub const DEFAULT_ENV: &str = "DATABASE_URL";

/// Source for environment variables.
pub trait EnvSource: Send + Sync {
    /// Get an environment variable value.
    fn get(&self, name: &str) -> Option<String>;

    /// Check if a variable exists.
    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// Process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Environment source backed by a HashMap.
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource {
    vars: HashMap<String, String>,
}

impl MapEnvSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvSource for MapEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Where to find the URL.
#[derive(Debug, Clone)]
pub struct EnvConfig<'a> {
    /// Variable name.
    pub var: &'a str,
    /// URL used when the variable is unset.
    pub default: Option<&'a str>,
}

impl Default for EnvConfig<'_> {
    fn default() -> Self {
        Self {
            var: DEFAULT_ENV,
            default: None,
        }
    }
}

impl<'a> EnvConfig<'a> {
    /// Read `var` instead of `DATABASE_URL`.
    pub fn var(var: &'a str) -> Self {
        Self { var, default: None }
    }

    /// Fall back to `url` when the variable is unset.
    pub fn with_default(mut self, url: &'a str) -> Self {
        self.default = Some(url);
        self
    }
}

/// Translate the URL found in the environment.
///
/// Returns `Ok(None)` when neither the variable nor a default is set, or
/// when the value is empty.
///
/// ```rust
/// use dburl_core::env::{EnvConfig, MapEnvSource, config_from_env};
/// use dburl_core::{Overrides, Translator};
///
/// let source = MapEnvSource::new().set("DATABASE_URL", "mysql://u:p@db/app");
/// let config = config_from_env(&source, &EnvConfig::default(), &Translator::shared(), &Overrides::new())
///     .unwrap()
///     .unwrap();
/// assert_eq!(config.name, "app");
/// ```
pub fn config_from_env<S: EnvSource + ?Sized>(
    source: &S,
    env: &EnvConfig<'_>,
    translator: &Translator<'_>,
    overrides: &Overrides,
) -> UrlResult<Option<ConnectionConfig>> {
    let url = match source.get(env.var) {
        Some(url) => url,
        None => match env.default {
            Some(default) => default.to_string(),
            None => {
                warn!(
                    "No {} environment variable set, and so no databases setup",
                    env.var
                );
                return Ok(None);
            }
        },
    };

    if url.is_empty() {
        return Ok(None);
    }

    info!(var = env.var, "Loading database configuration from environment");
    translator.translate(&url, overrides).map(Some)
}
