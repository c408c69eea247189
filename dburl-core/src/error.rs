//! Error types for URL translation.

use thiserror::Error;

/// Result type for translation and registry operations.
pub type UrlResult<T> = Result<T, UrlError>;

/// Errors raised while turning a database URL into a configuration record.
///
/// Every variant is a local, synchronous failure. None of them is transient,
/// so callers should surface them instead of retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    /// The scheme token has no registry entry.
    #[error(
        "Scheme '{scheme}://' is unknown. Did you forget to register custom backend? \
         Following schemes have registered backends: {}",
        .known.join(", ")
    )]
    UnknownScheme {
        /// The offending scheme token.
        scheme: String,
        /// Every registered token, sorted.
        known: Vec<String>,
    },

    /// The input could not be decomposed into scheme, authority, path and query.
    #[error(
        "This string is not a valid url, possibly because some of its parts \
         is not properly percent-encoded ({reason})"
    )]
    MalformedUrl {
        /// What the decomposer tripped over.
        reason: String,
    },

    /// Query string options and explicitly passed options share keys.
    #[error(
        "Query string options and options cannot overlap. \
         Query string options: {}. Options: {}",
        .url_options.join(", "),
        .options.join(", ")
    )]
    ConflictingOptions {
        /// Keys derived from the URL.
        url_options: Vec<String>,
        /// Keys passed by the caller.
        options: Vec<String>,
    },
}

impl UrlError {
    /// Create a malformed URL error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedUrl {
            reason: reason.into(),
        }
    }

    /// Whether this error was caused by an unregistered scheme.
    pub fn is_unknown_scheme(&self) -> bool {
        matches!(self, Self::UnknownScheme { .. })
    }
}
