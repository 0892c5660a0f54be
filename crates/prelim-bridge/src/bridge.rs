use prelim_core::chunk_id::ChunkIdGenerator;
use prelim_core::config::{BridgeConfig, ConfigProfile};
use prelim_core::error::{Error, Result};
use prelim_core::record::ResultRecord;
use prelim_core::traits::SearchEngine;
use prelim_core::types::{CallArgs, SearchOutcome, SearchStatus};

use crate::adapter::EngineAdapter;
use crate::call_config::build_request;
use crate::consumer::{Consumed, HitStreamConsumer};
use crate::policy::EmptyResultPolicy;

/// The call surface the orchestration layer sees. One `Bridge` serves every
/// partition a worker runs and may be shared between threads.
pub struct Bridge {
    profile: ConfigProfile,
    adapter: EngineAdapter,
    consumer: HitStreamConsumer,
    policy: EmptyResultPolicy,
    chunk_ids: Option<ChunkIdGenerator>,
}

impl Bridge {
    pub fn new(engine: Box<dyn SearchEngine>, config: &BridgeConfig) -> Self {
        Self {
            profile: config.profile.clone(),
            adapter: EngineAdapter::new(engine, config.engine.root_channel.clone()),
            consumer: HitStreamConsumer::new(config.max_batches()),
            policy: EmptyResultPolicy,
            chunk_ids: None,
        }
    }

    /// Use a dedicated chunk-id generator instead of the process-wide one.
    pub fn with_chunk_ids(mut self, chunk_ids: ChunkIdGenerator) -> Self {
        self.chunk_ids = Some(chunk_ids);
        self
    }

    fn chunk_ids(&self) -> &ChunkIdGenerator {
        self.chunk_ids.as_ref().unwrap_or_else(|| ChunkIdGenerator::process_wide())
    }

    /// Compatibility surface: only the response lines.
    pub fn prelim_search(&self, args: CallArgs) -> Result<Vec<String>> {
        Ok(self.search(args)?.response)
    }

    /// Runs one preliminary search. Engine and stream failures are folded
    /// into `SearchStatus` and the sentinel; only configuration and record
    /// encoding problems come back as `Err`.
    pub fn search(&self, args: CallArgs) -> Result<SearchOutcome> {
        let request = build_request(&self.profile, args, self.chunk_ids())?;
        let span = tracing::info_span!("prelim_search", job = %request.job_id, chunk = %request.chunk_id);
        let _enter = span.enter();
        tracing::debug!(
            database = %request.database_path,
            root = %request.db_root.display(),
            query_len = request.query.len(),
            "starting preliminary search"
        );

        let (mut records, batches_read, status) = match self.adapter.open(&request) {
            Ok(stream) => {
                let Consumed { records, batches_read, failure, .. } = self.consumer.consume(stream, &request);
                let n = records.len();
                let status = match failure {
                    Some(Error::StreamRead { reason, .. }) => SearchStatus::StreamError { partial: n, reason },
                    Some(other) => SearchStatus::StreamError { partial: n, reason: other.to_string() },
                    None if n == 0 => SearchStatus::NoHits,
                    None => SearchStatus::Hits { count: n },
                };
                (records, batches_read, status)
            }
            Err(e @ Error::EngineUnavailable { .. }) => {
                tracing::warn!(error = %e, "treating as zero hits");
                (Vec::new(), 0, SearchStatus::EngineUnavailable)
            }
            Err(e) => return Err(e),
        };

        self.policy.apply(&mut records, &request);
        let response = records.iter().map(ResultRecord::to_line).collect::<Result<Vec<_>>>()?;
        tracing::info!(lines = response.len(), batches_read, status = ?status, "preliminary search done");
        Ok(SearchOutcome { response, status, batches_read })
    }
}
