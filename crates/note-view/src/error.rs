//! Engine error types.

use thiserror::Error;

/// Errors a [`DocumentLoader`](crate::loader::DocumentLoader) can return.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The document source is temporarily unavailable.
    #[error("Document source unavailable: {0}")]
    Unavailable(String),

    /// The source did not answer in time.
    #[error("Timed out loading documents")]
    Timeout,

    /// IO error while reading documents.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The source answered with data that cannot be turned into documents.
    #[error("Malformed document data: {0}")]
    Malformed(String),

    /// The source refused access.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

impl LoadError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unavailable(_) | Self::Timeout => true,
            Self::Io(e) => e.kind() != std::io::ErrorKind::PermissionDenied,
            Self::Malformed(_) | Self::PermissionDenied(_) => false,
        }
    }
}

/// Terminal outcome of a reload that did not produce documents.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// Every allowed attempt failed with a transient error.
    #[error("Failed to load notes after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: LoadError,
    },

    /// The loader failed in a way retrying cannot fix.
    #[error("Failed to load notes: {source}")]
    Permanent {
        attempts: u32,
        #[source]
        source: LoadError,
    },
}

impl RefreshError {
    /// Number of loader calls made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } | Self::Permanent { attempts, .. } => *attempts,
        }
    }

    /// The last loader error.
    pub fn cause(&self) -> &LoadError {
        match self {
            Self::Exhausted { source, .. } | Self::Permanent { source, .. } => source,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error.
    #[error("TOML error: {0}")]
    Parse(String),

    /// TOML serialize error.
    #[error("TOML serialize error: {0}")]
    Serialize(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(e: toml::ser::Error) -> Self {
        Self::Serialize(e.to_string())
    }
}

/// Errors from snapshot IO.
#[derive(Debug, Error)]
pub enum EngineError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
