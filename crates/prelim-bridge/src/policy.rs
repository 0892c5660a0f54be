use prelim_core::record::ResultRecord;
use prelim_core::types::SearchRequest;

/// Guarantees a non-empty response: when nothing was accumulated, for
/// whatever reason, exactly one sentinel record is appended.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyResultPolicy;

impl EmptyResultPolicy {
    /// Returns `true` when the sentinel was added.
    pub fn apply(&self, records: &mut Vec<ResultRecord>, request: &SearchRequest) -> bool {
        if !records.is_empty() {
            return false;
        }
        tracing::debug!("no hits, emitting sentinel");
        records.push(ResultRecord::sentinel(&request.chunk_id, &request.job_id));
        true
    }
}
