//! Worker name generation.
//!
//! Names come from a themed pool, shuffled per call so repeated spawns do
//! not favor the same name. When the pool is exhausted, numeric-suffix
//! probing on the first post-shuffle entry guarantees termination. The RNG
//! is injected so tests can seed it and assert exact output.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use std::collections::HashSet;

/// Mad Max: Fury Road themed names for auto-generated workers.
const DEFAULT_POOL: &[&str] = &[
    "Nux", "Toast", "Capable", "Cheedo", "Dag", "Rictus", "Slit", "Morsov",
    "Ace", "Coma", "Valkyrie", "Keeper", "Vuvalini", "Organic", "Immortan",
    "Corpus", "Doof", "Scabrous", "Splendid", "Fragile",
];

/// Generates worker names that do not collide with existing ones.
pub struct NameGenerator {
    pool: Vec<String>,
    rng: Box<dyn RngCore + Send>,
}

impl std::fmt::Debug for NameGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameGenerator")
            .field("pool_len", &self.pool.len())
            .finish()
    }
}

impl Default for NameGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl NameGenerator {
    /// Create a generator with the default pool and OS-seeded randomness.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Create a generator with the default pool and an injected RNG.
    pub fn with_rng(rng: impl RngCore + Send + 'static) -> Self {
        Self::with_pool(rng, DEFAULT_POOL.iter().map(|s| s.to_string()).collect())
    }

    /// Create a generator with a custom pool and an injected RNG.
    ///
    /// The pool must be non-empty; the suffix fallback probes off its first
    /// post-shuffle entry.
    pub fn with_pool(rng: impl RngCore + Send + 'static, pool: Vec<String>) -> Self {
        assert!(!pool.is_empty(), "name pool must not be empty");
        Self {
            pool,
            rng: Box::new(rng),
        }
    }

    /// Produce a name absent from `existing`.
    ///
    /// Shuffles the pool, returns the first free candidate. If every pool
    /// name is taken, probes `<first><n>` for n = 2, 3, ... until a free
    /// name is found.
    pub fn generate(&mut self, existing: &HashSet<String>) -> String {
        let mut shuffled = self.pool.clone();
        shuffled.shuffle(&mut self.rng);

        for name in &shuffled {
            if !existing.contains(name) {
                return name.clone();
            }
        }

        let base = &shuffled[0];
        let mut suffix = 2u64;
        loop {
            let candidate = format!("{base}{suffix}");
            if !existing.contains(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }
}
