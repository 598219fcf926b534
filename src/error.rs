//! Errors raised while loading collaborators and validating configuration.
//!
//! The turn path itself never returns these: an unconfident match is routed to QA, a missing
//! task handler is recovered inside the router, and diagnostic sink failures are only logged.

use std::path::PathBuf;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("domain '{parent}' lists unknown child '{child}'")]
    UnknownChild { parent: String, child: String },

    #[error("domain '{0}' is declared more than once")]
    DuplicateDomain(String),

    #[error("domain '{child}' has more than one parent ('{first}' and '{second}')")]
    MultipleParents { child: String, first: String, second: String },

    #[error("domain '{0}' is part of a parent/child cycle")]
    Cycle(String),

    #[error("threshold {0} is outside [0, 1]")]
    InvalidThreshold(f64),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Error::Json { path: path.into(), source }
    }
}
