//! Feed ingestion error types.

use std::path::PathBuf;

/// Errors that abort a feed ingestion run.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// A required table is missing or unreadable
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required column header is absent from a table
    #[error("{file} is missing required column `{column}`")]
    MissingColumn {
        file: &'static str,
        column: &'static str,
    },

    /// A row could not be decoded
    #[error("malformed row in {file}: {source}")]
    Csv {
        file: &'static str,
        #[source]
        source: csv::Error,
    },
}
