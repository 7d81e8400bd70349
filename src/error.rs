//! Error types shared by the loader, the edition config and the pipeline driver.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to produce a parsed document from a source.
///
/// Both variants are recoverable for per-province and per-county documents;
/// only the nationwide root document treats them as fatal.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read document {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse document {key}: {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    pub fn missing(key: impl Into<String>) -> Self {
        let key = key.into();
        LoadError::Io {
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such document"),
            key,
        }
    }

    /// True when the document simply does not exist, as opposed to being unreadable.
    pub fn is_missing(&self) -> bool {
        matches!(self, LoadError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// A code too short (or not sliceable) for the requested prefix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeError {
    #[error("malformed administrative code {code:?}: expected at least {expected} characters")]
    Malformed { code: String, expected: usize },
}

#[derive(Debug, Error)]
pub enum EditionError {
    #[error("failed to read edition file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse edition file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid edition: {0}")]
    Invalid(String),
}

/// Fatal pipeline failures. Anything else is reported as validation data.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("root document unavailable: {0}")]
    RootUnavailable(#[source] LoadError),

    #[error("failed to write {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("persisted document failed to reload: {0}")]
    Reload(#[source] LoadError),
}
