//! Domain types shared by the bridge and the engines.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub type ChunkId = String;

/// Raw caller-supplied values for one invocation, exactly as the
/// orchestration layer hands them over.
///
/// Field names double as the keys of a job-file line, so a partition can be
/// described as `{"job":"j1","query":"ACGT","db":"nt_50M.01","params":"..."}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallArgs {
    #[serde(rename = "job")]
    pub job_id: String,
    pub query: String,
    #[serde(rename = "db")]
    pub database_path: String,
    #[serde(rename = "params", default)]
    pub parameters: String,
    #[serde(rename = "chunk", default)]
    pub chunk_id: Option<ChunkId>,
    #[serde(default)]
    pub db_root: Option<String>,
}

impl CallArgs {
    pub fn new(job_id: &str, query: &str, database_path: &str, parameters: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            query: query.to_string(),
            database_path: database_path.to_string(),
            parameters: parameters.to_string(),
            chunk_id: None,
            db_root: None,
        }
    }

    pub fn with_chunk(mut self, chunk_id: &str) -> Self {
        self.chunk_id = Some(chunk_id.to_string());
        self
    }

    pub fn with_db_root(mut self, db_root: &str) -> Self {
        self.db_root = Some(db_root.to_string());
        self
    }
}

/// One fully-resolved search invocation.
///
/// - `job_id`/`chunk_id`: copied onto every result record
/// - `query`: raw sequence data, forwarded untouched
/// - `database_path`: database name or path as the caller gave it
/// - `parameters`: engine-specific option string
/// - `db_root`: database root directory scoped to this call only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub job_id: String,
    pub query: String,
    pub database_path: String,
    pub parameters: String,
    pub chunk_id: ChunkId,
    pub db_root: PathBuf,
}

/// A single alignment reported by the engine. Offsets are the engine's own
/// coordinates; nothing here is normalized.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Hit {
    pub object_id: i32,
    pub score: i32,
    pub query_start: i32,
    pub query_end: i32,
    pub subject_start: i32,
    pub subject_end: i32,
}

/// Hits produced by one stream read, in engine order.
pub type HitBatch = Vec<Hit>;

/// Out-of-band outcome of an invocation. The response lines alone cannot
/// tell a clean zero-hit search from a failed one; this can.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum SearchStatus {
    Hits { count: usize },
    NoHits,
    EngineUnavailable,
    /// `partial` records were read before the engine reported `reason`.
    StreamError { partial: usize, reason: String },
}

impl SearchStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::EngineUnavailable | Self::StreamError { .. })
    }
}

/// Response lines plus the structured status that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub response: Vec<String>,
    pub status: SearchStatus,
    pub batches_read: usize,
}
