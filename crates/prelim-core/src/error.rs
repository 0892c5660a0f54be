use thiserror::Error;

/// Failure modes of a single preliminary-search invocation.
///
/// Only `InvalidConfig` and `Record` ever reach the caller as `Err`.
/// `EngineUnavailable` and `StreamRead` are recovered inside the bridge and
/// reported through `SearchStatus` next to a response that still carries the
/// sentinel record.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Search engine returned no hit stream for database '{database}'")]
    EngineUnavailable { database: String },

    #[error("Hit stream read failed after {batches_read} batch(es): {reason}")]
    StreamRead { batches_read: usize, reason: String },

    #[error("Result record encoding failed: {0}")]
    Record(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
