//! Network persistence errors.

use std::path::PathBuf;

/// Errors from loading or saving a persisted network.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// Filesystem operation failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not a valid network
    #[error("invalid network document {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
