//! Randomized test inputs drawn from a single seeded stream.
//!
//! One generator is seeded per run and shared by every trial, so the inputs of
//! trial N depend on how many values trials 1..N-1 consumed. A run is
//! reproducible from its seed and trial count, but a trial is not reproducible
//! on its own.

use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::types::{NumericMatrix, ParameterWindow};

/// Inclusive range every generated matrix entry is drawn from.
pub const DEFAULT_VALUES: RangeInclusive<i64> = 1..=10;

/// Draws matrices and parameter windows from an explicit random source.
#[derive(Debug, Clone)]
pub struct InputGenerator<R> {
    rng: R,
    values: RangeInclusive<i64>,
}

impl InputGenerator<StdRng> {
    /// Generator over a `StdRng` seeded with `seed`.
    pub fn seeded(seed: u64, values: RangeInclusive<i64>) -> Self {
        Self::new(StdRng::seed_from_u64(seed), values)
    }
}

impl<R: Rng> InputGenerator<R> {
    /// `values` must be non-empty.
    pub fn new(rng: R, values: RangeInclusive<i64>) -> Self {
        Self { rng, values }
    }

    /// `max_length` rows of `entry_length` values each.
    pub fn generate(&mut self, max_length: usize, entry_length: usize) -> NumericMatrix {
        let values = self.values.clone();
        let rng = &mut self.rng;
        (0..max_length)
            .map(|_| {
                (0..entry_length)
                    .map(|_| rng.gen_range(values.clone()))
                    .collect()
            })
            .collect()
    }

    /// Uniform window inside a matrix of `max_length` rows: `index_start` from
    /// `[1, max_length - 1]`, then `length` from `[1, max_length - index_start]`.
    ///
    /// Returns `None` when `max_length < 2`, where no such window exists.
    pub fn choose_window(&mut self, max_length: usize) -> Option<ParameterWindow> {
        if max_length < 2 {
            return None;
        }
        let index_start = self.rng.gen_range(1..=max_length - 1);
        let length = self.rng.gen_range(1..=max_length - index_start);
        Some(ParameterWindow {
            index_start,
            length,
        })
    }
}
