//! Injected identifier generation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::schedule::period::PeriodId;

/// Generates period identifiers from a seeded RNG, so identical seeds give
/// identical ids.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    rng: StdRng,
}

impl IdGenerator {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next_period_id(&mut self) -> PeriodId {
        PeriodId(self.rng.random())
    }
}
