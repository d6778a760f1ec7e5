//! Error types for the tree grid.
//!
//! Only configuration mistakes and contract violations are errors. Stale or
//! out-of-range paths and row indices are expected during interactive use and
//! resolve to "nothing happened" instead.

use std::path::PathBuf;

/// Result type alias for tree grid operations.
pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors that can occur in the tree grid.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// A row or selection operation was requested before an expander column
    /// defined how the tree expands.
    #[error("no expander column has been added to the grid")]
    NoExpanderColumn,

    /// A second expander column was added.
    #[error("the grid already has an expander column")]
    DuplicateExpanderColumn,

    /// A column index did not name a column.
    #[error("column {index} out of range (grid has {count} columns)")]
    ColumnOutOfRange { index: usize, count: usize },

    /// `end_batch` was called without a matching `begin_batch`.
    #[error("end_batch called without a matching begin_batch")]
    UnbalancedBatch,

    /// A source collection reported a change that does not fit its current
    /// content.
    #[error("unsupported collection change: {reason}")]
    UnsupportedChange { reason: String },

    /// Options could not be decoded.
    #[error("invalid grid options: {0}")]
    Config(#[from] toml::de::Error),

    /// Options could not be encoded.
    #[error("failed to encode grid options: {0}")]
    ConfigEncode(#[from] toml::ser::Error),

    /// File I/O error.
    #[error("failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TreeError {
    /// Create an unsupported-change error.
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedChange {
            reason: reason.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
