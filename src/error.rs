//! Error types for volby
//!
//! All modules use `VolbyResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for volby operations
pub type VolbyResult<T> = Result<T, VolbyError>;

/// Failure reported by the HTTP transport (DNS, refused connection, timeout, ...)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

/// All errors that can occur in volby
#[derive(Error, Debug)]
pub enum VolbyError {
    // Upstream errors
    #[error(
        "Election results for {year} are not available yet or resource is unreachable: {}",
        unavailable_detail(.resource, .status, .reason)
    )]
    DataUnavailable {
        year: i32,
        resource: String,
        status: Option<u16>,
        reason: Option<String>,
    },

    #[error("Transport error while fetching {resource}: {source}")]
    Transport {
        resource: String,
        #[source]
        source: TransportError,
    },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

fn unavailable_detail(resource: &str, status: &Option<u16>, reason: &Option<String>) -> String {
    let mut detail = resource.to_string();
    if let Some(status) = status {
        detail.push_str(&format!(" (status {})", status));
    }
    if let Some(reason) = reason {
        detail.push_str(&format!(": {}", reason));
    }
    detail
}

impl VolbyError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Results for `year` are missing at `resource`, no further detail
    pub fn data_unavailable(year: i32, resource: impl Into<String>) -> Self {
        Self::DataUnavailable {
            year,
            resource: resource.into(),
            status: None,
            reason: None,
        }
    }

    /// Results for `year` are missing, with the reason that gave it away
    pub fn not_published(year: i32, resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            year,
            resource: resource.into(),
            status: None,
            reason: Some(reason.into()),
        }
    }

    /// Upstream answered with an unexpected HTTP status
    pub fn bad_status(year: i32, resource: impl Into<String>, status: u16) -> Self {
        Self::DataUnavailable {
            year,
            resource: resource.into(),
            status: Some(status),
            reason: None,
        }
    }

    /// Whether this error means "switch year" rather than "something is broken"
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, Self::DataUnavailable { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::DataUnavailable { .. } => {
                Some("Results may not be published yet. Retry later or pass --fallback-year")
            }
            Self::Transport { .. } => {
                Some("Check network connectivity or raise source.timeout_secs")
            }
            Self::ConfigInvalid { .. } => Some("Run: volby config init --force"),
            _ => None,
        }
    }
}
