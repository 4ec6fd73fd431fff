//! Bounded random id generation.
//!
//! Ids are drawn uniformly from `[0, max)` minus an exclusion set. A single
//! draw picks the rank of the id among the free ones, so generation always
//! terminates, even when the space is nearly full.

use crate::error::GraphError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;

/// Draw an id from `[0, max)` that is not in `excluded`.
///
/// Returns `None` when every id is excluded.
pub fn random_id_excluding<R, I>(rng: &mut R, max: u64, excluded: I) -> Option<u64>
where
    R: Rng + ?Sized,
    I: IntoIterator<Item = u64>,
{
    let taken: BTreeSet<u64> = excluded.into_iter().filter(|&id| id < max).collect();
    let free = max - taken.len() as u64;
    if free == 0 {
        return None;
    }

    // Map the rank among free ids onto the id itself.
    let mut candidate = rng.gen_range(0..free);
    for &id in &taken {
        if id <= candidate {
            candidate += 1;
        } else {
            break;
        }
    }
    Some(candidate)
}

/// Random id source over a bounded id space.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    max: u64,
    rng: StdRng,
}

impl IdGenerator {
    /// Generator over `[0, max)` seeded from the OS.
    pub fn new(max: u64) -> Self {
        Self {
            max,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator.
    pub fn seeded(max: u64, seed: u64) -> Self {
        Self {
            max,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    /// Next id not contained in `excluded`.
    pub fn next_excluding<I>(&mut self, excluded: I) -> Result<u64, GraphError>
    where
        I: IntoIterator<Item = u64>,
    {
        random_id_excluding(&mut self.rng, self.max, excluded)
            .ok_or(GraphError::IdSpaceExhausted { max: self.max })
    }
}
