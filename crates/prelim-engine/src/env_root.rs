//! Engine that can only learn its database root from an environment
//! variable, the way legacy engines read `BLASTDB`.
//!
//! It re-reads the variable during the search and on every batch read and
//! counts any change as a race: someone else rewrote the root while this
//! search was still using it.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use prelim_core::traits::{BatchRead, EngineCall, HitStream, SearchEngine};

use crate::scripted::{ScriptedEngine, ScriptedStream};

pub struct EnvRootEngine {
    inner: ScriptedEngine,
    var: String,
    races: Arc<AtomicUsize>,
}

impl EnvRootEngine {
    pub fn new(inner: ScriptedEngine, var: &str) -> Self {
        Self { inner, var: var.to_string(), races: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn inner(&self) -> &ScriptedEngine {
        &self.inner
    }

    pub fn races(&self) -> usize {
        self.races.load(Ordering::SeqCst)
    }
}

impl SearchEngine for EnvRootEngine {
    fn run_preliminary_search(&self, call: &EngineCall<'_>) -> Option<Box<dyn HitStream>> {
        let root = std::env::var_os(&self.var).map(PathBuf::from);
        tracing::trace!(var = %self.var, root = ?root, "engine read database root");
        let stream = self.inner.open_with_root(call, root.clone());
        if std::env::var_os(&self.var).map(PathBuf::from) != root {
            self.races.fetch_add(1, Ordering::SeqCst);
        }
        stream.map(|inner| {
            Box::new(EnvCheckedStream {
                inner,
                var: self.var.clone(),
                root,
                races: Arc::clone(&self.races),
            }) as Box<dyn HitStream>
        })
    }
}

struct EnvCheckedStream {
    inner: ScriptedStream,
    var: String,
    root: Option<PathBuf>,
    races: Arc<AtomicUsize>,
}

impl HitStream for EnvCheckedStream {
    fn read_next_batch(&mut self) -> BatchRead {
        if std::env::var_os(&self.var).map(PathBuf::from) != self.root {
            self.races.fetch_add(1, Ordering::SeqCst);
        }
        self.inner.read_next_batch()
    }

    fn release(&mut self) {
        self.inner.release();
    }
}
