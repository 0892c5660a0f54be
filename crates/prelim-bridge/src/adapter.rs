//! Engine adapter: opens a hit stream for one request and owns everything
//! that must be undone when the stream goes away.

use parking_lot::{const_mutex, Mutex, MutexGuard};
use std::ffi::OsString;

use prelim_core::config::RootChannel;
use prelim_core::error::{Error, Result};
use prelim_core::traits::{BatchRead, EngineCall, HitStream, SearchEngine};
use prelim_core::types::SearchRequest;

/// Serializes every search that delivers its root through the process
/// environment, from setting the variable until the stream is released.
static ENV_CHANNEL_LOCK: Mutex<()> = const_mutex(());

/// Owns a hit stream and releases it exactly once, on drop.
pub struct StreamGuard {
    stream: Option<Box<dyn HitStream>>,
}

impl StreamGuard {
    pub fn new(stream: Box<dyn HitStream>) -> Self {
        Self { stream: Some(stream) }
    }

    pub fn read_next_batch(&mut self) -> BatchRead {
        match self.stream.as_mut() {
            Some(s) => s.read_next_batch(),
            None => BatchRead::Error("hit stream already released".to_string()),
        }
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        if let Some(mut s) = self.stream.take() {
            s.release();
        }
    }
}

/// Holds the env-channel lock and puts the variable back as it was.
struct EnvScope {
    var: String,
    previous: Option<OsString>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvScope {
    fn enter(var: &str, value: &std::path::Path) -> Self {
        let lock = ENV_CHANNEL_LOCK.lock();
        let previous = std::env::var_os(var);
        tracing::debug!(var, was = ?previous, "database root channel before call");
        std::env::set_var(var, value);
        tracing::debug!(var, now = %value.display(), "database root channel set");
        Self { var: var.to_string(), previous, _lock: lock }
    }
}

impl Drop for EnvScope {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(v) => std::env::set_var(&self.var, v),
            None => std::env::remove_var(&self.var),
        }
    }
}

/// A live stream plus, for env-channel engines, the lock it runs under.
/// `stream` is declared first so the handle is released before the
/// environment is restored and the lock dropped.
///
/// The env-channel lock is not reentrant: starting another `ProcessEnv`
/// search on the same thread while this value is alive deadlocks. Drop it
/// (or let `HitStreamConsumer::consume` do so) first.
pub struct OpenStream {
    stream: StreamGuard,
    _env: Option<EnvScope>,
}

impl OpenStream {
    pub fn new(stream: Box<dyn HitStream>) -> Self {
        Self { stream: StreamGuard::new(stream), _env: None }
    }

    pub fn read_next_batch(&mut self) -> BatchRead {
        self.stream.read_next_batch()
    }
}

pub struct EngineAdapter {
    engine: Box<dyn SearchEngine>,
    channel: RootChannel,
}

impl EngineAdapter {
    pub fn new(engine: Box<dyn SearchEngine>, channel: RootChannel) -> Self {
        Self { engine, channel }
    }

    /// Runs the preliminary search. A null engine handle becomes
    /// `Error::EngineUnavailable`.
    pub fn open(&self, request: &SearchRequest) -> Result<OpenStream> {
        let (env, db_root) = match &self.channel {
            RootChannel::Parameter => (None, Some(request.db_root.as_path())),
            RootChannel::ProcessEnv(var) => (Some(EnvScope::enter(var, &request.db_root)), None),
        };
        let call = EngineCall {
            query: &request.query,
            database_path: &request.database_path,
            parameters: &request.parameters,
            db_root,
        };
        match self.engine.run_preliminary_search(&call) {
            Some(stream) => Ok(OpenStream { stream: StreamGuard::new(stream), _env: env }),
            None => Err(Error::EngineUnavailable { database: request.database_path.clone() }),
        }
    }
}
