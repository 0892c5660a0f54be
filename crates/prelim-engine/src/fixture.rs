//! File-backed engine that replays precomputed hits.
//!
//! The database path is resolved against the call's root and
//! `<resolved>.hits.jsonl` is read in full when the search runs. Each
//! non-empty line is one batch: a JSON array of hits, or the string
//! `"error"` (optionally `"error: reason"`) to simulate a failing read.
//! A missing or unreadable file yields a null handle, and so does a call
//! with no root at all.

use serde::Deserialize;
use std::collections::VecDeque;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use prelim_core::config::resolve_with_base;
use prelim_core::traits::{BatchRead, EngineCall, HitStream, SearchEngine};
use prelim_core::types::HitBatch;

pub const FIXTURE_SUFFIX: &str = "hits.jsonl";

#[derive(Debug, Default)]
pub struct FixtureEngine {
    root_var: Option<String>,
}

impl FixtureEngine {
    pub fn new() -> Self { Self::default() }

    /// Also accept the root from `var` when a call carries none, as engines
    /// fed through the process-environment channel expect.
    pub fn with_root_var(var: impl Into<String>) -> Self {
        Self { root_var: Some(var.into()) }
    }

    /// Call-scoped root first, then the configured variable.
    fn root_for(&self, call: &EngineCall<'_>) -> Option<PathBuf> {
        if let Some(root) = call.db_root {
            return Some(root.to_path_buf());
        }
        let var = self.root_var.as_deref()?;
        env::var_os(var).filter(|v| !v.is_empty()).map(PathBuf::from)
    }

    pub fn fixture_path(db_root: &Path, database_path: &str) -> PathBuf {
        let mut p = resolve_with_base(db_root, database_path).into_os_string();
        p.push(".");
        p.push(FIXTURE_SUFFIX);
        PathBuf::from(p)
    }

    fn load(path: &Path) -> anyhow::Result<Vec<BatchRead>> {
        let content = fs::read_to_string(path)?;
        let mut reads = Vec::new();
        for (n, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() { continue; }
            let read = match serde_json::from_str::<FixtureLine>(line)
                .map_err(|e| anyhow::anyhow!("{}:{}: {}", path.display(), n + 1, e))?
            {
                FixtureLine::Batch(batch) => BatchRead::Batch(batch),
                FixtureLine::Marker(m) if m == "error" => BatchRead::Error("fixture stream error".to_string()),
                FixtureLine::Marker(m) => match m.strip_prefix("error:") {
                    Some(reason) => BatchRead::Error(reason.trim().to_string()),
                    None => anyhow::bail!("{}:{}: unknown marker '{}'", path.display(), n + 1, m),
                },
            };
            reads.push(read);
        }
        Ok(reads)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FixtureLine {
    Batch(HitBatch),
    Marker(String),
}

impl SearchEngine for FixtureEngine {
    fn run_preliminary_search(&self, call: &EngineCall<'_>) -> Option<Box<dyn HitStream>> {
        let Some(root) = self.root_for(call) else {
            tracing::debug!(database = call.database_path, root_var = ?self.root_var, "no database root for fixture");
            return None;
        };
        let path = Self::fixture_path(&root, call.database_path);
        match Self::load(&path) {
            Ok(reads) => {
                tracing::debug!(path = %path.display(), batches = reads.len(), "fixture loaded");
                Some(Box::new(FixtureStream { pending: reads.into() }))
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "fixture unavailable");
                None
            }
        }
    }
}

struct FixtureStream {
    pending: VecDeque<BatchRead>,
}

impl HitStream for FixtureStream {
    fn read_next_batch(&mut self) -> BatchRead {
        self.pending.pop_front().unwrap_or(BatchRead::Exhausted)
    }

    fn release(&mut self) {
        self.pending.clear();
    }
}
