//! Scheme registry.
//!
//! Maps URL scheme tokens to a backend identifier and an optional
//! postprocessing hook. The registry is a single insertion-ordered map behind
//! one lock, so re-registering a token replaces its entry in place and the
//! token list never holds duplicates, even under concurrent registration.

use crate::config::ConnectionConfig;
use crate::error::{UrlError, UrlResult};
use crate::hooks::{BackendFamily, Postprocess};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::OnceLock;
use tracing::debug;

/// Baseline schemes: token, backend identifier, family.
const BASELINE: &[(&str, &str, BackendFamily)] = &[
    ("postgres", "django.db.backends.postgresql", BackendFamily::Postgres),
    ("postgresql", "django.db.backends.postgresql", BackendFamily::Postgres),
    ("pgsql", "django.db.backends.postgresql", BackendFamily::Postgres),
    ("postgis", "django.contrib.gis.db.backends.postgis", BackendFamily::Postgres),
    ("redshift", "django_redshift_backend", BackendFamily::Postgres),
    ("timescale", "timescale.db.backends.postgresql", BackendFamily::Postgres),
    ("timescalegis", "timescale.db.backends.postgis", BackendFamily::Postgres),
    ("cockroach", "django_cockroachdb", BackendFamily::Generic),
    ("mysql", "django.db.backends.mysql", BackendFamily::MySql),
    ("mysql2", "django.db.backends.mysql", BackendFamily::MySql),
    ("mysqlgis", "django.contrib.gis.db.backends.mysql", BackendFamily::MySql),
    ("mysql-connector", "mysql.connector.django", BackendFamily::MySql),
    ("mssql", "sql_server.pyodbc", BackendFamily::SqlServer),
    ("mssqlms", "mssql", BackendFamily::SqlServer),
    ("oracle", "django.db.backends.oracle", BackendFamily::Oracle),
    ("oraclegis", "django.contrib.gis.db.backends.oracle", BackendFamily::Generic),
    ("sqlite", "django.db.backends.sqlite3", BackendFamily::Sqlite),
    ("spatialite", "django.contrib.gis.db.backends.spatialite", BackendFamily::Generic),
];

/// A registered scheme.
#[derive(Clone)]
pub struct SchemeEntry {
    /// Scheme token, e.g. `postgres`.
    pub token: String,
    /// Opaque backend identifier passed through to the record.
    pub backend: String,
    /// Hook applied after generic decomposition. `None` is the identity.
    pub postprocess: Option<Postprocess>,
}

impl SchemeEntry {
    /// Run this entry's hook, if any.
    pub fn apply(&self, config: &mut ConnectionConfig) {
        if let Some(hook) = self.postprocess {
            hook(config);
        }
    }
}

impl fmt::Debug for SchemeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemeEntry")
            .field("token", &self.token)
            .field("backend", &self.backend)
            .field("postprocess", &self.postprocess.is_some())
            .finish()
    }
}

/// Registry of URL schemes.
///
/// ```rust
/// use dburl_core::SchemeRegistry;
///
/// let registry = SchemeRegistry::with_baseline();
/// assert_eq!(
///     registry.lookup("postgres").unwrap().backend,
///     "django.db.backends.postgresql"
/// );
///
/// registry.register("bag-end", "django.contrib.db.backends.bag_end", None);
/// assert!(registry.contains("bag-end"));
/// assert!(registry.lookup("foo").is_err());
/// ```
#[derive(Debug, Default)]
pub struct SchemeRegistry {
    entries: RwLock<IndexMap<String, SchemeEntry>>,
}

impl SchemeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the baseline backend families.
    pub fn with_baseline() -> Self {
        let registry = Self::new();
        for (token, backend, family) in BASELINE {
            registry.register(*token, *backend, family.postprocess());
        }
        registry
    }

    /// Process-wide baseline registry, built on first use.
    pub fn shared() -> &'static SchemeRegistry {
        static SHARED: OnceLock<SchemeRegistry> = OnceLock::new();
        SHARED.get_or_init(Self::with_baseline)
    }

    /// Add or replace the entry for `token`.
    pub fn register(
        &self,
        token: impl Into<String>,
        backend: impl Into<String>,
        postprocess: Option<Postprocess>,
    ) {
        let token = token.into();
        let backend = backend.into();
        debug!(token = %token, backend = %backend, hook = postprocess.is_some(), "Scheme registered");

        let entry = SchemeEntry {
            token: token.clone(),
            backend,
            postprocess,
        };
        self.entries.write().insert(token, entry);
    }

    /// Register several tokens sharing one backend and hook.
    pub fn register_many<I, T>(&self, tokens: I, backend: &str, postprocess: Option<Postprocess>)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        for token in tokens {
            self.register(token, backend, postprocess);
        }
    }

    /// Register a token with the hook of a baseline family.
    pub fn register_family(
        &self,
        token: impl Into<String>,
        backend: impl Into<String>,
        family: BackendFamily,
    ) {
        self.register(token, backend, family.postprocess());
    }

    /// Look up a token. Unknown tokens fail; there is no default backend.
    pub fn lookup(&self, token: &str) -> UrlResult<SchemeEntry> {
        let entries = self.entries.read();
        entries.get(token).cloned().ok_or_else(|| UrlError::UnknownScheme {
            scheme: token.to_string(),
            known: sorted_keys(&entries),
        })
    }

    /// The hook that applies to a record whose backend ended up as `backend`.
    ///
    /// That is the scheme's own hook unless the backend was overridden, in
    /// which case it is the hook of the first token (sorted) registered for
    /// the overriding backend, if any.
    pub fn postprocess_for(&self, entry: &SchemeEntry, backend: &str) -> Option<Postprocess> {
        if entry.backend == backend {
            return entry.postprocess;
        }
        let entries = self.entries.read();
        let mut owners: Vec<&SchemeEntry> =
            entries.values().filter(|e| e.backend == backend).collect();
        owners.sort_by(|a, b| a.token.cmp(&b.token));
        owners.first().and_then(|e| e.postprocess)
    }

    /// Whether `token` is registered.
    pub fn contains(&self, token: &str) -> bool {
        self.entries.read().contains_key(token)
    }

    /// Registered tokens, in registration order.
    pub fn tokens(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// Registered tokens, sorted.
    pub fn sorted_tokens(&self) -> Vec<String> {
        sorted_keys(&self.entries.read())
    }

    /// Number of registered tokens.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

fn sorted_keys(entries: &IndexMap<String, SchemeEntry>) -> Vec<String> {
    let mut keys: Vec<String> = entries.keys().cloned().collect();
    keys.sort();
    keys
}
