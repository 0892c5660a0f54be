use prelim_core::error::Error;
use prelim_core::record::ResultRecord;
use prelim_core::traits::BatchRead;
use prelim_core::types::SearchRequest;

use crate::adapter::OpenStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    Reading,
    Exhausted,
    Failed,
}

#[derive(Debug)]
pub struct Consumed {
    pub records: Vec<ResultRecord>,
    pub batches_read: usize,
    pub state: ReaderState,
    /// Set when the stream failed; records read before the failure are kept.
    pub failure: Option<Error>,
}

/// Drains a hit stream into result records, in the order the engine yields
/// them. Hits are never re-sorted.
#[derive(Debug, Clone, Copy, Default)]
pub struct HitStreamConsumer {
    max_batches: Option<usize>,
}

impl HitStreamConsumer {
    pub fn new(max_batches: Option<usize>) -> Self {
        Self { max_batches }
    }

    /// Takes the stream by value: it is released before this returns,
    /// whichever terminal state was reached.
    pub fn consume(&self, mut stream: OpenStream, request: &SearchRequest) -> Consumed {
        let mut records = Vec::new();
        let mut batches_read = 0usize;
        let mut failure = None;
        let mut state = ReaderState::Reading;

        while state == ReaderState::Reading {
            if self.max_batches.is_some_and(|max| batches_read >= max) {
                tracing::warn!(batches_read, "batch cap reached, treating stream as exhausted");
                state = ReaderState::Exhausted;
                break;
            }
            state = match stream.read_next_batch() {
                BatchRead::Batch(batch) => {
                    batches_read += 1;
                    tracing::debug!(batch = batches_read, hits = batch.len(), "hit list");
                    records.extend(
                        batch.iter().map(|hit| ResultRecord::from_hit(hit, &request.chunk_id, &request.job_id)),
                    );
                    ReaderState::Reading
                }
                BatchRead::Exhausted => ReaderState::Exhausted,
                BatchRead::Error(reason) => {
                    tracing::warn!(batches_read, kept = records.len(), %reason, "hit stream read failed");
                    failure = Some(Error::StreamRead { batches_read, reason });
                    ReaderState::Failed
                }
            };
        }
        drop(stream);

        Consumed { records, batches_read, state, failure }
    }
}
