//! The configuration record produced by a translation.

use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Name used for ephemeral, non-persistent SQLite databases.
pub const MEMORY_DATABASE: &str = ":memory:";

/// Free-form driver options, kept in insertion order.
pub type OptionMap = IndexMap<String, Value>;

/// Port of a connection record.
///
/// Serializes as the bare number, the string, or `""` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Port {
    /// No port in the URL.
    #[default]
    Absent,
    /// Numeric port, as produced by URL decomposition.
    Number(u16),
    /// Port carried as a string, for backends that require it.
    Text(String),
}

impl Port {
    /// Whether no port was given.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// The numeric value, if any.
    pub fn as_number(&self) -> Option<u16> {
        match self {
            Self::Number(port) => Some(*port),
            Self::Text(text) => text.parse().ok(),
            Self::Absent => None,
        }
    }

    /// Convert a numeric port into its string form. Other variants are kept.
    pub fn stringified(self) -> Self {
        match self {
            Self::Number(port) => Self::Text(port.to_string()),
            other => other,
        }
    }
}

impl From<Option<u16>> for Port {
    fn from(port: Option<u16>) -> Self {
        port.map_or(Self::Absent, Self::Number)
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => Ok(()),
            Self::Number(port) => write!(f, "{}", port),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl Serialize for Port {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Absent => serializer.serialize_str(""),
            Self::Number(port) => serializer.serialize_u16(*port),
            Self::Text(text) => serializer.serialize_str(text),
        }
    }
}

/// Lifetime of a persistent connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnMaxAge {
    /// Close the connection after this many seconds. `0` closes it after each request.
    Seconds(u64),
    /// Keep connections open indefinitely. Serialized as `null`.
    Unlimited,
}

impl From<u64> for ConnMaxAge {
    fn from(seconds: u64) -> Self {
        Self::Seconds(seconds)
    }
}

impl Serialize for ConnMaxAge {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Seconds(seconds) => serializer.serialize_u64(*seconds),
            Self::Unlimited => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for ConnMaxAge {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Seconds(u64),
            Keyword(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Seconds(seconds) => Ok(Self::Seconds(seconds)),
            Repr::Keyword(word) if word.eq_ignore_ascii_case("unlimited") => Ok(Self::Unlimited),
            Repr::Keyword(word) => Err(de::Error::invalid_value(
                de::Unexpected::Str(&word),
                &"a number of seconds or \"unlimited\"",
            )),
        }
    }
}

/// A database connection record.
///
/// Built fresh by every translation. Keys that must not appear in the
/// serialized record are `None` (or empty, for the maps).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionConfig {
    /// Resolved backend identifier.
    pub backend: String,
    /// Database name or file path.
    pub name: String,
    /// User name, `""` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Password, `""` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Host or socket directory, `""` meaning the backend default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<Port>,
    /// Driver options; omitted when empty.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub options: OptionMap,
    /// Persistent connection lifetime.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conn_max_age: Option<ConnMaxAge>,
    /// Whether to health-check persistent connections before reuse.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conn_health_checks: Option<bool>,
    /// Whether server-side cursors are disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_server_side_cursors: Option<bool>,
    /// Settings for the test database; omitted when empty.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub test: OptionMap,
}

impl ConnectionConfig {
    /// A record with every URL-derived field present but empty.
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            name: String::new(),
            user: Some(String::new()),
            password: Some(String::new()),
            host: Some(String::new()),
            port: Some(Port::Absent),
            options: OptionMap::new(),
            conn_max_age: None,
            conn_health_checks: None,
            disable_server_side_cursors: None,
            test: OptionMap::new(),
        }
    }

    /// The minimal record for an in-memory SQLite database: backend and name only.
    pub fn in_memory(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            name: MEMORY_DATABASE.to_string(),
            user: None,
            password: None,
            host: None,
            port: None,
            options: OptionMap::new(),
            conn_max_age: None,
            conn_health_checks: None,
            disable_server_side_cursors: None,
            test: OptionMap::new(),
        }
    }

    /// Whether this record points at an in-memory database.
    pub fn is_memory(&self) -> bool {
        self.name == MEMORY_DATABASE
    }

    /// User name, or `""`.
    pub fn user(&self) -> &str {
        self.user.as_deref().unwrap_or_default()
    }

    /// Password, or `""`.
    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or_default()
    }

    /// Host, or `""`.
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or_default()
    }

    /// Port, or [`Port::Absent`].
    pub fn port(&self) -> Port {
        self.port.clone().unwrap_or_default()
    }

    /// Get a driver option.
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }
}
