//! Bounded uniform sampling of choice sets.
//!
//! Two samplers cover the two ways a design can reach this step:
//!
//! - [`Sampler`] draws from a design or table already in memory, using
//!   `rand::seq::index::sample` and keeping the drawn order.
//! - [`ReservoirSampler`] is a [`ChoiceSetSink`] that keeps a uniform sample
//!   of a stream whose length is unknown up front (Algorithm R), so the
//!   sample can be taken during the same pass that writes the full candidate
//!   file.
//!
//! Both renumber their output 1..M and are reproducible given a seed.

use log::info;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::design::{ChoiceSet, Design};
use crate::error::{Error, Result};
use crate::format::Table;
use crate::sink::ChoiceSetSink;

/// Build the sampling generator: seeded when `seed` is given, otherwise from
/// OS entropy.
#[must_use]
pub fn rng_from_seed(seed: Option<u64>) -> ChaCha8Rng {
    seed.map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64)
}

/// Uniform sampling without replacement from an in-memory design.
///
/// # Example
///
/// ```
/// use choiceset::design::Design;
/// use choiceset::sample::Sampler;
/// use choiceset::space::Profile;
///
/// let mut design = Design::new();
/// for cost in [100, 250, 1250, 3500] {
///     let a = Profile::new([30, 30, 0, 0, 0, 0, 0, 0, cost]);
///     design.push(a, a.with(choiceset::space::Attribute::WaterAvailability, 80));
/// }
///
/// let sample = Sampler::new(2).with_seed(7).sample(design);
/// assert_eq!(sample.len(), 2);
/// assert!(sample.is_contiguous());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampler {
    max_choices: usize,
    seed: Option<u64>,
}

impl Sampler {
    /// Create a sampler keeping at most `max_choices` choice sets.
    #[must_use]
    pub fn new(max_choices: usize) -> Self {
        Self {
            max_choices,
            seed: None,
        }
    }

    /// Fix the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set or clear the random seed.
    #[must_use]
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Upper bound on the sample size.
    #[must_use]
    pub fn max_choices(&self) -> usize {
        self.max_choices
    }

    fn pick(&self, len: usize) -> Option<Vec<usize>> {
        if len <= self.max_choices {
            return None;
        }
        let mut rng = rng_from_seed(self.seed);
        Some(index::sample(&mut rng, len, self.max_choices).into_vec())
    }

    /// Sample a design.
    ///
    /// Designs no larger than the bound are returned unchanged. Otherwise
    /// exactly `max_choices` distinct choice sets are drawn, kept in the
    /// order drawn and renumbered 1..M.
    #[must_use]
    pub fn sample(&self, design: Design) -> Design {
        let Some(picked) = self.pick(design.len()) else {
            return design;
        };
        let sets = design.choice_sets();
        let chosen = picked.iter().map(|&i| sets[i]).collect();
        info!(
            "sampled {} of {} choice sets",
            self.max_choices,
            design.len()
        );
        Design::from_choice_sets(chosen)
    }

    /// Sample the rows of a table whose first column is the identifier.
    ///
    /// The identifier column is rewritten to 1..M after sampling.
    ///
    /// # Errors
    ///
    /// Returns an error if the table has no columns.
    pub fn sample_table(&self, table: &Table) -> Result<Table> {
        if table.ncols() == 0 {
            return Err(Error::invalid_params("cannot sample a table with no columns"));
        }
        let Some(picked) = self.pick(table.nrows()) else {
            return Ok(table.clone());
        };

        let mut sampled = table.select_rows(&picked);
        for (pos, id) in sampled.data_mut().column_mut(0).iter_mut().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            {
                *id = (pos + 1) as f64;
            }
        }
        info!(
            "sampled {} of {} rows",
            sampled.nrows(),
            table.nrows()
        );
        Ok(sampled)
    }
}

/// Streaming uniform sample of fixed capacity.
///
/// After `n` choice sets have been offered, each of them is in the reservoir
/// with probability `min(1, capacity / n)`. With fewer inputs than the
/// capacity every input is kept.
#[derive(Debug, Clone)]
pub struct ReservoirSampler {
    capacity: usize,
    seen: u64,
    reservoir: Vec<ChoiceSet>,
    rng: ChaCha8Rng,
}

impl ReservoirSampler {
    /// Create a reservoir holding at most `capacity` choice sets.
    #[must_use]
    pub fn new(capacity: usize, seed: Option<u64>) -> Self {
        Self {
            capacity,
            seen: 0,
            reservoir: Vec::with_capacity(capacity.min(1 << 16)),
            rng: rng_from_seed(seed),
        }
    }

    /// Number of choice sets offered so far.
    #[must_use]
    pub fn seen(&self) -> u64 {
        self.seen
    }

    /// Number of choice sets currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reservoir.len()
    }

    /// Whether the reservoir is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reservoir.is_empty()
    }

    /// Finish sampling.
    ///
    /// Held choice sets are put back into their original stream order, then
    /// renumbered 1..M.
    #[must_use]
    pub fn into_design(mut self) -> Design {
        self.reservoir.sort_unstable_by_key(|cs| cs.situation);
        if self.seen > self.reservoir.len() as u64 {
            info!(
                "reservoir kept {} of {} choice sets",
                self.reservoir.len(),
                self.seen
            );
        }
        Design::from_choice_sets(self.reservoir)
    }
}

impl ChoiceSetSink for ReservoirSampler {
    fn accept(&mut self, choice_set: ChoiceSet) -> Result<()> {
        self.seen += 1;
        if self.reservoir.len() < self.capacity {
            self.reservoir.push(choice_set);
        } else if self.capacity > 0 {
            let slot = self.rng.gen_range(0..self.seen);
            if let Ok(slot) = usize::try_from(slot) {
                if slot < self.capacity {
                    self.reservoir[slot] = choice_set;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::{Attribute, Profile};
    use proptest::prelude::*;

    fn design(n: usize) -> Design {
        let mut design = Design::new();
        for k in 0..n {
            let a = Profile::new([30, 30, 0, 0, 0, 0, 0, 0, k as i32]);
            design.push(a, a.with(Attribute::WaterAvailability, 80));
        }
        design
    }

    #[test]
    fn test_small_design_unchanged() {
        let d = design(5);
        assert_eq!(Sampler::new(5).sample(d.clone()), d);
        assert_eq!(Sampler::new(500).sample(d.clone()), d);
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let a = Sampler::new(10).with_seed(42).sample(design(100));
        let b = Sampler::new(10).with_seed(42).sample(design(100));
        assert_eq!(a, b);
        assert_eq!(a.len(), 10);
        assert!(a.is_contiguous());
    }

    #[test]
    fn test_sample_table_renumbers() {
        let table = design(50).to_wide_table(crate::design::IdColumn::ChoiceSituation);
        let sampled = Sampler::new(7).with_seed(1).sample_table(&table).unwrap();
        assert_eq!(sampled.nrows(), 7);
        assert_eq!(
            sampled.column("choice situation").unwrap().to_vec(),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]
        );

        let small = Sampler::new(100).sample_table(&table).unwrap();
        assert_eq!(small, table);
    }

    #[test]
    fn test_reservoir_keeps_everything_below_capacity() {
        let mut reservoir = ReservoirSampler::new(10, Some(3));
        for &cs in &design(4) {
            reservoir.accept(cs).unwrap();
        }
        assert_eq!(reservoir.seen(), 4);
        assert_eq!(reservoir.into_design(), design(4));
    }

    #[test]
    fn test_reservoir_zero_capacity() {
        let mut reservoir = ReservoirSampler::new(0, Some(3));
        for &cs in &design(4) {
            reservoir.accept(cs).unwrap();
        }
        assert!(reservoir.is_empty());
        assert!(reservoir.into_design().is_empty());
    }

    proptest! {
        #[test]
        fn prop_sample_size_bounded(n in 0usize..200, m in 0usize..50, seed in any::<u64>()) {
            let source = design(n);
            let sample = Sampler::new(m).with_seed(seed).sample(source.clone());
            prop_assert_eq!(sample.len(), n.min(m));
            prop_assert!(sample.is_contiguous());

            let mut costs: Vec<_> = sample.iter().map(|cs| cs.alt1[Attribute::Cost]).collect();
            costs.sort_unstable();
            costs.dedup();
            prop_assert_eq!(costs.len(), sample.len());
        }

        #[test]
        fn prop_reservoir_size_bounded(n in 0usize..200, m in 0usize..50, seed in any::<u64>()) {
            let mut reservoir = ReservoirSampler::new(m, Some(seed));
            for &cs in &design(n) {
                reservoir.accept(cs).unwrap();
            }
            let sample = reservoir.into_design();
            prop_assert_eq!(sample.len(), n.min(m));
            prop_assert!(sample.is_contiguous());

            let costs: Vec<_> = sample.iter().map(|cs| cs.alt1[Attribute::Cost]).collect();
            prop_assert!(costs.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
