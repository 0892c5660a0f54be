use std::path::Path;
use std::sync::Arc;

use crate::types::HitBatch;

/// Arguments of one `run_preliminary_search` call.
///
/// `db_root` is `None` only when the adapter delivers the root through a
/// process-wide channel instead (see `RootChannel::ProcessEnv`).
#[derive(Debug, Clone, Copy)]
pub struct EngineCall<'a> {
    pub query: &'a str,
    pub database_path: &'a str,
    pub parameters: &'a str,
    pub db_root: Option<&'a Path>,
}

/// Result of one `read_next_batch` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchRead {
    /// A batch was read; it may hold zero hits.
    Batch(HitBatch),
    /// No further batches. The handle is still valid and must be released.
    Exhausted,
    /// Stream-level failure. No further reads are allowed.
    Error(String),
}

/// The black-box search engine.
pub trait SearchEngine: Send + Sync {
    /// Runs the preliminary search to completion. `None` is the engine's null
    /// handle: database open failure, malformed parameters, and so on.
    fn run_preliminary_search(&self, call: &EngineCall<'_>) -> Option<Box<dyn HitStream>>;
}

impl<E: SearchEngine + ?Sized> SearchEngine for Arc<E> {
    fn run_preliminary_search(&self, call: &EngineCall<'_>) -> Option<Box<dyn HitStream>> {
        (**self).run_preliminary_search(call)
    }
}

/// An open, stateful iterator over result batches owned by the engine.
pub trait HitStream: Send {
    fn read_next_batch(&mut self) -> BatchRead;

    /// Frees the engine-side resources. Called exactly once by the bridge.
    fn release(&mut self);
}
