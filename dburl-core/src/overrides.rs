//! Caller-supplied overrides.

use crate::config::{ConnMaxAge, OptionMap};
use serde::Deserialize;
use serde_json::Value;

/// Option key set by [`Overrides::require_ssl`].
pub const SSL_MODE_OPTION: &str = "sslmode";

/// Value set by [`Overrides::require_ssl`].
pub const SSL_MODE_REQUIRE: &str = "require";

/// Values that take precedence over what the URL says.
///
/// Deserializable, so an override block can live in a settings file next to
/// the URL:
///
/// ```rust
/// use dburl_core::{ConnMaxAge, Overrides};
///
/// let overrides: Overrides = serde_json::from_str(
///     r#"{"conn_max_age": 600, "ssl_require": true, "options": {"connect_timeout": 5}}"#,
/// )
/// .unwrap();
/// assert_eq!(overrides.conn_max_age, Some(ConnMaxAge::Seconds(600)));
/// assert!(overrides.ssl_require);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Overrides {
    /// Backend identifier replacing the one registered for the scheme.
    pub backend: Option<String>,
    /// Persistent connection lifetime.
    pub conn_max_age: Option<ConnMaxAge>,
    /// Health-check persistent connections.
    pub conn_health_checks: Option<bool>,
    /// Inject `sslmode=require` into the options.
    pub ssl_require: bool,
    /// Disable server-side cursors.
    pub disable_server_side_cursors: Option<bool>,
    /// Settings for the test database.
    #[serde(alias = "test")]
    pub test_options: OptionMap,
    /// Explicit driver options. Must not share keys with the URL's options.
    pub options: OptionMap,
}

impl Overrides {
    /// No overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the backend identifier.
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    /// Set the persistent connection lifetime.
    pub fn with_conn_max_age(mut self, age: impl Into<ConnMaxAge>) -> Self {
        self.conn_max_age = Some(age.into());
        self
    }

    /// Enable or disable connection health checks.
    pub fn with_health_checks(mut self, enabled: bool) -> Self {
        self.conn_health_checks = Some(enabled);
        self
    }

    /// Require TLS.
    pub fn require_ssl(mut self) -> Self {
        self.ssl_require = true;
        self
    }

    /// Enable or disable server-side cursors.
    pub fn with_server_side_cursors_disabled(mut self, disabled: bool) -> Self {
        self.disable_server_side_cursors = Some(disabled);
        self
    }

    /// Add a test database setting.
    pub fn with_test_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.test_options.insert(key.into(), value.into());
        self
    }

    /// Add an explicit driver option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Whether nothing is overridden.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
