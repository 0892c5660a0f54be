use prelim_core::chunk_id::ChunkIdGenerator;
use prelim_core::config::{expand_path, ConfigProfile};
use prelim_core::error::{Error, Result};
use prelim_core::types::{CallArgs, SearchRequest};

/// Turns caller arguments into a request. Strings are copied verbatim; the
/// engine is the authority on whether they make sense. The only check is
/// that a database root exists for the active profile.
pub fn build_request(profile: &ConfigProfile, args: CallArgs, chunk_ids: &ChunkIdGenerator) -> Result<SearchRequest> {
    let db_root = match profile {
        ConfigProfile::FixedRoot { db_root } => {
            if let Some(requested) = args.db_root.as_deref().filter(|r| !r.is_empty()) {
                tracing::debug!(requested, fixed = %db_root, "per-call database root ignored by fixed_root profile");
            }
            expand_path(db_root)
        }
        ConfigProfile::CallerRoot => match args.db_root.as_deref().filter(|r| !r.is_empty()) {
            Some(root) => expand_path(root),
            None => {
                return Err(Error::InvalidConfig(format!(
                    "caller_root profile needs a database root (job '{}')",
                    args.job_id
                )))
            }
        },
    };
    let chunk_id = match args.chunk_id.filter(|c| !c.is_empty()) {
        Some(c) => c,
        None => chunk_ids.next_id(),
    };
    Ok(SearchRequest {
        job_id: args.job_id,
        query: args.query,
        database_path: args.database_path,
        parameters: args.parameters,
        chunk_id,
        db_root,
    })
}
