//! Postprocessing hooks for backend families.
//!
//! A hook adjusts a freshly decomposed [`ConnectionConfig`] for the quirks of
//! one backend family. Hooks are plain functions so that several scheme
//! tokens can share one, and each must be idempotent: running it twice
//! yields the same record as running it once.

use crate::config::{ConnectionConfig, MEMORY_DATABASE};
use crate::options::display_value;
use serde_json::json;

/// A postprocessing hook.
pub type Postprocess = fn(&mut ConnectionConfig);

/// Query option folded into a search-path directive by Postgres-family backends.
pub const CURRENT_SCHEMA_OPTION: &str = "currentSchema";

/// Query option folded into a nested TLS block by MySQL-family backends.
pub const SSL_CA_OPTION: &str = "ssl-ca";

/// The nested TLS block `ssl-ca` is folded into.
pub const SSL_OPTION: &str = "ssl";

/// Closed set of baseline backend families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendFamily {
    /// PostgreSQL and derived backends (PostGIS, Redshift, TimescaleDB).
    Postgres,
    /// MySQL and derived backends.
    MySql,
    /// SQLite.
    Sqlite,
    /// Oracle.
    Oracle,
    /// Microsoft SQL Server.
    SqlServer,
    /// Backends without special casing.
    Generic,
}

impl BackendFamily {
    /// The hook attached to every token of this family.
    pub fn postprocess(self) -> Option<Postprocess> {
        match self {
            Self::Postgres => Some(fold_current_schema),
            Self::MySql => Some(fold_ssl_ca),
            Self::Sqlite => Some(default_to_memory),
            Self::Oracle | Self::SqlServer => Some(stringify_port),
            Self::Generic => None,
        }
    }

    /// Short family name, used in logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
            Self::Oracle => "oracle",
            Self::SqlServer => "sqlserver",
            Self::Generic => "generic",
        }
    }
}

impl std::fmt::Display for BackendFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// No path means an ephemeral in-memory database.
pub fn default_to_memory(config: &mut ConnectionConfig) {
    if config.name.is_empty() {
        config.name = MEMORY_DATABASE.to_string();
    }
}

/// Carry a numeric port as a string.
pub fn stringify_port(config: &mut ConnectionConfig) {
    if let Some(port) = config.port.take() {
        config.port = Some(port.stringified());
    }
}

/// Re-nest `ssl-ca=<path>` as `ssl: {ca: <path>}`.
///
/// An existing `ssl` option is replaced where it stands; otherwise `ssl`
/// takes the position `ssl-ca` had.
pub fn fold_ssl_ca(config: &mut ConnectionConfig) {
    let Some((index, _, ca)) = config.options.shift_remove_full(SSL_CA_OPTION) else {
        return;
    };
    let ssl = json!({ "ca": ca });
    match config.options.get_mut(SSL_OPTION) {
        Some(existing) => *existing = ssl,
        None => {
            config.options.shift_insert(index, SSL_OPTION.to_string(), ssl);
        }
    }
}

/// Replace `currentSchema=<schema>` by the `-c search_path=<schema>` directive.
pub fn fold_current_schema(config: &mut ConnectionConfig) {
    if let Some(schema) = config.options.shift_remove(CURRENT_SCHEMA_OPTION) {
        config.options.insert(
            "options".to_string(),
            json!(search_path_directive(&display_value(&schema))),
        );
    }
}

/// The option value that makes a Postgres connection use `schema` first.
pub fn search_path_directive(schema: &str) -> String {
    format!("-c search_path={}", schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Port;
    use crate::options::parse_query;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn twice(hook: Postprocess, mut config: ConnectionConfig) -> (ConnectionConfig, ConnectionConfig) {
        hook(&mut config);
        let once = config.clone();
        hook(&mut config);
        (once, config)
    }

    #[test]
    fn test_default_to_memory() {
        let (once, again) = twice(default_to_memory, ConnectionConfig::new("sqlite"));
        assert_eq!(once.name, ":memory:");
        assert_eq!(once, again);

        let mut config = ConnectionConfig::new("sqlite");
        config.name = "db.sqlite3".to_string();
        default_to_memory(&mut config);
        assert_eq!(config.name, "db.sqlite3");
    }

    #[test]
    fn test_stringify_port() {
        let mut config = ConnectionConfig::new("oracle");
        config.port = Some(Port::Number(1521));
        let (once, again) = twice(stringify_port, config);
        assert_eq!(once.port, Some(Port::Text("1521".to_string())));
        assert_eq!(once, again);

        let (absent, _) = twice(stringify_port, ConnectionConfig::new("oracle"));
        assert_eq!(absent.port, Some(Port::Absent));

        let (memory, _) = twice(stringify_port, ConnectionConfig::in_memory("oracle"));
        assert_eq!(memory.port, None);
    }

    #[test]
    fn test_fold_ssl_ca() {
        let mut config = ConnectionConfig::new("mysql");
        config.options = parse_query("charset=utf8&ssl-ca=rds.pem&reconnect=true");
        let (once, again) = twice(fold_ssl_ca, config);
        let keys: Vec<_> = once.options.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["charset", "ssl", "reconnect"]);
        assert_eq!(once.options["ssl"], json!({"ca": "rds.pem"}));
        assert_eq!(once, again);
    }

    #[test]
    fn test_fold_ssl_ca_replaces_existing_ssl() {
        for query in ["ssl=1&ssl-ca=/etc/ca.pem", "ssl-ca=/etc/ca.pem&ssl=1"] {
            let mut config = ConnectionConfig::new("mysql");
            config.options = parse_query(query);
            let (once, again) = twice(fold_ssl_ca, config);
            assert_eq!(
                serde_json::to_value(&once.options).unwrap(),
                json!({"ssl": {"ca": "/etc/ca.pem"}}),
                "{query}"
            );
            assert_eq!(once, again);
        }

        let mut config = ConnectionConfig::new("mysql");
        config.options = parse_query("charset=utf8&ssl=1&reconnect=true&ssl-ca=ca.pem");
        fold_ssl_ca(&mut config);
        let keys: Vec<_> = config.options.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["charset", "ssl", "reconnect"]);
        assert_eq!(config.options["ssl"], json!({"ca": "ca.pem"}));
    }

    #[test]
    fn test_fold_current_schema_replaces_existing_options() {
        for query in [
            "options=-c%20statement_timeout%3D5000&currentSchema=app",
            "currentSchema=app&options=-c%20statement_timeout%3D5000",
        ] {
            let mut config = ConnectionConfig::new("postgres");
            config.options = parse_query(query);
            let (once, again) = twice(fold_current_schema, config);
            assert_eq!(
                serde_json::to_value(&once.options).unwrap(),
                json!({"options": "-c search_path=app"}),
                "{query}"
            );
            assert_eq!(once, again);
        }
    }

    #[test]
    fn test_fold_current_schema() {
        let mut config = ConnectionConfig::new("postgres");
        config.options = parse_query("currentSchema=otherschema&sslmode=require");
        let (once, again) = twice(fold_current_schema, config);
        assert_eq!(once.options.get("currentSchema"), None);
        assert_eq!(once.options["options"], json!("-c search_path=otherschema"));
        assert_eq!(once.options["sslmode"], json!("require"));
        assert_eq!(once, again);
    }

    #[test]
    fn test_fold_current_schema_numeric_name() {
        let mut config = ConnectionConfig::new("postgres");
        config.options = parse_query("currentSchema=2024");
        fold_current_schema(&mut config);
        assert_eq!(config.options["options"], json!("-c search_path=2024"));
    }

    #[test]
    fn test_family_hooks() {
        assert!(BackendFamily::Generic.postprocess().is_none());
        for family in [
            BackendFamily::Postgres,
            BackendFamily::MySql,
            BackendFamily::Sqlite,
            BackendFamily::Oracle,
            BackendFamily::SqlServer,
        ] {
            assert!(family.postprocess().is_some(), "{} has no hook", family);
        }
    }
}
