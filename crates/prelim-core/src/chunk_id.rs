//! Pseudo-random chunk identifiers for callers that don't name their
//! partition. Ids are only locally distinct; collisions across workers are
//! possible and harmless.

use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::OnceLock;

use crate::types::ChunkId;

const ID_SPACE: u32 = 1_000_000;

pub struct ChunkIdGenerator {
    rng: Mutex<SmallRng>,
}

impl ChunkIdGenerator {
    pub fn from_entropy() -> Self {
        Self { rng: Mutex::new(SmallRng::from_entropy()) }
    }

    /// Deterministic sequence, for tests and reproducible runs.
    pub fn from_seed(seed: u64) -> Self {
        Self { rng: Mutex::new(SmallRng::seed_from_u64(seed)) }
    }

    /// Generator shared by the whole process, seeded on first use.
    pub fn process_wide() -> &'static ChunkIdGenerator {
        static GENERATOR: OnceLock<ChunkIdGenerator> = OnceLock::new();
        GENERATOR.get_or_init(Self::from_entropy)
    }

    pub fn next_id(&self) -> ChunkId {
        let n: u32 = self.rng.lock().gen_range(0..ID_SPACE);
        format!("chunk_{n:06}")
    }
}
