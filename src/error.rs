use std::io;
use thiserror::Error;

/// Errors surfaced by the task store and the queries built on top of it.
///
/// All of these are recoverable at the presentation layer: the store is
/// never left half-written, so callers report the error and return to the
/// previous menu or prompt.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store file could not be opened, created or written.
    #[error("task store unavailable: {0}")]
    StorageUnavailable(#[from] io::Error),

    /// The store's byte length is not a whole number of records.
    #[error("task store corrupt: {len} bytes is not a multiple of the record size")]
    CorruptStore { len: u64 },

    /// A logical index at or beyond the current record count was requested.
    #[error("task index {index} out of range (store holds {count})")]
    IndexOutOfRange { index: usize, count: usize },
}

pub type Result<T> = std::result::Result<T, StoreError>;
