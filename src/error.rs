use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the entry store, the view pool and the command router.
#[derive(Error, Debug)]
pub enum LaunchbarError {
    /// Add or rename would give two items the same url.
    #[error("an item with url {0} already exists")]
    DuplicateUrl(String),

    /// The url is not in the list (or has no surface in the pool).
    #[error("nothing is registered under {0}")]
    NotFound(String),

    /// The in-memory change stands but could not be written out.
    #[error("failed to write {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stored list could not be parsed.
    #[error("stored entries are unreadable: {0}")]
    MalformedState(String),

    /// The embedded surface host refused an operation.
    #[error("surface for {url} failed: {source}")]
    Surface {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    /// A command failed validation before reaching the store or the pool.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// The coordinator task is gone; nothing can be processed any more.
    #[error("coordinator has shut down")]
    CoordinatorClosed,
}

impl LaunchbarError {
    /// Stable identifier carried in protocol replies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateUrl(_) => "duplicate_url",
            Self::NotFound(_) => "not_found",
            Self::Persistence { .. } => "persistence",
            Self::MalformedState(_) => "malformed_state",
            Self::Surface { .. } => "surface",
            Self::InvalidCommand(_) => "invalid_command",
            Self::CoordinatorClosed => "unavailable",
        }
    }
}

pub type Result<T> = std::result::Result<T, LaunchbarError>;
