//! Job-file runner used by the `prelim-cli` binary. Plays the orchestration
//! layer: one bridge invocation per job line, several partitions at once.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use prelim_bridge::Bridge;
use prelim_core::types::{CallArgs, SearchOutcome};

/// Result of one job line. A job rejected by the bridge does not discard
/// the outcomes of the others.
pub type JobResult = prelim_core::Result<SearchOutcome>;

/// Reads one `CallArgs` JSON object per non-empty line. Lines starting with
/// `#` are skipped.
pub fn read_jobs(path: &Path) -> Result<Vec<CallArgs>> {
    let content = fs::read_to_string(path).with_context(|| format!("reading job file {}", path.display()))?;
    content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
        .map(|(n, l)| serde_json::from_str(l).with_context(|| format!("{}:{}", path.display(), n + 1)))
        .collect()
}

/// Builds the call for `one <job> <query> <db> <params> [db_root] [chunk]`.
pub fn one_call(args: &[String]) -> Result<CallArgs> {
    let [job, query, db, params, rest @ ..] = args else {
        anyhow::bail!("expected <job> <query> <db> <params> [db_root] [chunk], got {} argument(s)", args.len());
    };
    if rest.len() > 2 {
        anyhow::bail!("unexpected trailing arguments: {:?}", &rest[2..]);
    }
    let mut call = CallArgs::new(job, query, db, params);
    if let Some(root) = rest.first() { call = call.with_db_root(root); }
    if let Some(chunk) = rest.get(1) { call = call.with_chunk(chunk); }
    Ok(call)
}

/// Runs every job on up to `parallel` worker threads. Results come back in
/// job-file order regardless of completion order; the outer error is only
/// for a worker that panicked.
pub fn run_jobs(bridge: &Bridge, jobs: Vec<CallArgs>, parallel: usize) -> Result<Vec<JobResult>> {
    let workers = parallel.clamp(1, jobs.len().max(1));
    let next = AtomicUsize::new(0);
    let jobs = &jobs;
    let next = &next;

    let mut done: Vec<(usize, JobResult)> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(move || {
                    let mut mine = Vec::new();
                    loop {
                        let i = next.fetch_add(1, Ordering::SeqCst);
                        let Some(job) = jobs.get(i) else { break };
                        let result = bridge.search(job.clone());
                        if let Err(e) = &result {
                            tracing::warn!(line = i, job = %job.job_id, error = %e, "job rejected");
                        }
                        mine.push((i, result));
                    }
                    mine
                })
            })
            .collect();
        let mut all = Vec::new();
        for h in handles {
            let part = h.join().map_err(|_| anyhow::anyhow!("worker thread panicked"))?;
            all.extend(part);
        }
        Ok::<_, anyhow::Error>(all)
    })?;

    done.sort_by_key(|(i, _)| *i);
    Ok(done.into_iter().map(|(_, o)| o).collect())
}
