//! In-memory engine that replays a fixed script of stream reads.
//!
//! Counts every open, read and release so callers can check handle
//! discipline, and remembers the database root each call saw.

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use prelim_core::traits::{BatchRead, EngineCall, HitStream, SearchEngine};
use prelim_core::types::{Hit, HitBatch};

/// What the engine does for one database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Script {
    /// Null handle.
    Unavailable,
    /// Reads handed out in order; `Exhausted` once they run out.
    Reads(Vec<BatchRead>),
}

impl Script {
    pub fn batches(batches: Vec<HitBatch>) -> Self {
        Self::Reads(batches.into_iter().map(BatchRead::Batch).collect())
    }

    pub fn no_hits() -> Self {
        Self::Reads(Vec::new())
    }
}

#[derive(Debug, Default)]
pub struct EngineCounters {
    pub opened: AtomicUsize,
    pub reads: AtomicUsize,
    pub released: AtomicUsize,
    /// Reads after a terminal status, reads after release, double releases.
    pub violations: AtomicUsize,
}

impl EngineCounters {
    pub fn opened(&self) -> usize { self.opened.load(Ordering::SeqCst) }
    pub fn reads(&self) -> usize { self.reads.load(Ordering::SeqCst) }
    pub fn released(&self) -> usize { self.released.load(Ordering::SeqCst) }
    pub fn violations(&self) -> usize { self.violations.load(Ordering::SeqCst) }
}

/// One observed engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedCall {
    pub database_path: String,
    pub db_root: Option<PathBuf>,
    pub parameters: String,
}

pub struct ScriptedEngine {
    scripts: HashMap<String, Script>,
    fallback: Script,
    delay: Option<Duration>,
    counters: Arc<EngineCounters>,
    calls: Mutex<Vec<ObservedCall>>,
}

impl ScriptedEngine {
    /// Every database answers with `fallback` unless scripted via `on`.
    pub fn new(fallback: Script) -> Self {
        Self {
            scripts: HashMap::new(),
            fallback,
            delay: None,
            counters: Arc::new(EngineCounters::default()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on(mut self, database_path: &str, script: Script) -> Self {
        self.scripts.insert(database_path.to_string(), script);
        self
    }

    /// Sleep inside the search call, to widen race windows in tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn counters(&self) -> Arc<EngineCounters> {
        Arc::clone(&self.counters)
    }

    pub fn calls(&self) -> Vec<ObservedCall> {
        self.calls.lock().clone()
    }

    pub(crate) fn open_with_root(&self, call: &EngineCall<'_>, db_root: Option<PathBuf>) -> Option<ScriptedStream> {
        self.calls.lock().push(ObservedCall {
            database_path: call.database_path.to_string(),
            db_root,
            parameters: call.parameters.to_string(),
        });
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        let script = self.scripts.get(call.database_path).unwrap_or(&self.fallback);
        match script {
            Script::Unavailable => None,
            Script::Reads(reads) => {
                self.counters.opened.fetch_add(1, Ordering::SeqCst);
                Some(ScriptedStream::new(reads.clone(), Arc::clone(&self.counters)))
            }
        }
    }
}

impl SearchEngine for ScriptedEngine {
    fn run_preliminary_search(&self, call: &EngineCall<'_>) -> Option<Box<dyn HitStream>> {
        let root = call.db_root.map(PathBuf::from);
        self.open_with_root(call, root).map(|s| Box::new(s) as Box<dyn HitStream>)
    }
}

pub struct ScriptedStream {
    pending: VecDeque<BatchRead>,
    counters: Arc<EngineCounters>,
    finished: bool,
    released: bool,
}

impl ScriptedStream {
    fn new(reads: Vec<BatchRead>, counters: Arc<EngineCounters>) -> Self {
        Self { pending: reads.into(), counters, finished: false, released: false }
    }
}

impl HitStream for ScriptedStream {
    fn read_next_batch(&mut self) -> BatchRead {
        self.counters.reads.fetch_add(1, Ordering::SeqCst);
        if self.finished || self.released {
            self.counters.violations.fetch_add(1, Ordering::SeqCst);
            return BatchRead::Error("read past end of stream".to_string());
        }
        let next = self.pending.pop_front().unwrap_or(BatchRead::Exhausted);
        if !matches!(next, BatchRead::Batch(_)) {
            self.finished = true;
        }
        next
    }

    fn release(&mut self) {
        if self.released {
            self.counters.violations.fetch_add(1, Ordering::SeqCst);
            return;
        }
        self.released = true;
        self.pending.clear();
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Shorthand for building hits in scripts.
pub fn hit(object_id: i32, score: i32, query: (i32, i32), subject: (i32, i32)) -> Hit {
    Hit {
        object_id,
        score,
        query_start: query.0,
        query_end: query.1,
        subject_start: subject.0,
        subject_end: subject.1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call<'a>(db: &'a str) -> EngineCall<'a> {
        EngineCall { query: "ACGT", database_path: db, parameters: "", db_root: None }
    }

    #[test]
    fn replays_script_then_exhausts() {
        let engine = ScriptedEngine::new(Script::batches(vec![vec![hit(1, 10, (0, 5), (7, 12))]]));
        let mut stream = engine.run_preliminary_search(&call("db")).expect("stream");
        assert!(matches!(stream.read_next_batch(), BatchRead::Batch(b) if b.len() == 1));
        assert_eq!(stream.read_next_batch(), BatchRead::Exhausted);
        stream.release();
        let c = engine.counters();
        assert_eq!((c.opened(), c.reads(), c.released(), c.violations()), (1, 2, 1, 0));
    }

    #[test]
    fn flags_reads_after_terminal_status_and_double_release() {
        let engine = ScriptedEngine::new(Script::no_hits());
        let mut stream = engine.run_preliminary_search(&call("db")).expect("stream");
        assert_eq!(stream.read_next_batch(), BatchRead::Exhausted);
        let _ = stream.read_next_batch();
        stream.release();
        stream.release();
        assert_eq!(engine.counters().violations(), 2);
        assert_eq!(engine.counters().released(), 1);
    }

    #[test]
    fn per_database_scripts_override_fallback() {
        let engine = ScriptedEngine::new(Script::no_hits()).on("broken", Script::Unavailable);
        assert!(engine.run_preliminary_search(&call("broken")).is_none());
        assert!(engine.run_preliminary_search(&call("fine")).is_some());
        assert_eq!(engine.calls().len(), 2);
    }
}
