//! Block-wise parallel scan over profile pairs.

use log::{debug, info};

use crate::design::{ChoiceSet, Design};
use crate::error::{Error, Result};
use crate::filter::ChoiceSetFilter;
use crate::parallel::WorkerPool;
use crate::sink::ChoiceSetSink;
use crate::space::Profile;
use crate::utils::pair_count;

use super::ValidProfiles;

/// Default number of `i` rows scanned per block.
pub const DEFAULT_BLOCK_ROWS: usize = 512;

/// Counters reported by [`PairEnumerator::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairStats {
    /// Valid profiles offered to the scan.
    pub profiles: usize,
    /// Profiles skipped because they fail the extremity guard on their own.
    pub skipped: usize,
    /// Pairs evaluated by the choice set filter.
    pub pairs_examined: u64,
    /// Pairs accepted and emitted.
    pub accepted: u64,
}

/// Scans all pairs `(i, j)`, `i < j`, of valid profiles.
///
/// Rows are processed in blocks of `block_rows` consecutive `i` values. The
/// rows of one block are scanned in parallel, then their accepted partners
/// are emitted to the sink in `(i, j)` order with consecutive 1-based
/// identifiers. Output is therefore identical for any block size or thread
/// count, and memory is bounded by one block of partner lists.
///
/// # Example
///
/// ```
/// use choiceset::catalogue::get_by_name;
/// use choiceset::design::Design;
/// use choiceset::enumerate::{enumerate_profiles, PairEnumerator};
/// use choiceset::space::AttributeSpace;
///
/// let mut config = get_by_name("copy").unwrap();
/// config.space = AttributeSpace::new([
///     vec![30, 80], vec![30, 80], vec![0, 50], vec![0, 2], vec![0, 2],
///     vec![0, 50], vec![0, 2], vec![0, 2], vec![100, 3500],
/// ]).unwrap();
///
/// let profiles = enumerate_profiles(&config.space, &config.profile_filter().unwrap());
/// let filter = config.choice_filter();
///
/// let mut design = Design::new();
/// let stats = PairEnumerator::new(&profiles, &filter).run(&mut design).unwrap();
/// assert_eq!(stats.accepted, design.len() as u64);
/// assert!(design.is_contiguous());
/// ```
#[derive(Debug, Clone)]
pub struct PairEnumerator<'a> {
    profiles: &'a [Profile],
    filter: &'a ChoiceSetFilter,
    block_rows: usize,
    threads: Option<usize>,
}

impl<'a> PairEnumerator<'a> {
    /// Create an enumerator over `profiles`.
    #[must_use]
    pub fn new(profiles: &'a ValidProfiles, filter: &'a ChoiceSetFilter) -> Self {
        Self {
            profiles: profiles.as_slice(),
            filter,
            block_rows: DEFAULT_BLOCK_ROWS,
            threads: None,
        }
    }

    /// Set the number of `i` rows per block.
    #[must_use]
    pub fn block_rows(mut self, rows: usize) -> Self {
        self.block_rows = rows;
        self
    }

    /// Use a dedicated pool of this many threads instead of the global pool.
    #[must_use]
    pub fn threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    /// Accepted partners `j > i` of profile `i`, in ascending order.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds.
    #[must_use]
    pub fn partners(&self, i: usize) -> Vec<usize> {
        let alt1 = &self.profiles[i];
        (i + 1..self.profiles.len())
            .filter(|&j| self.filter.accepts(alt1, &self.profiles[j]))
            .collect()
    }

    fn scan_row(&self, active: &[usize], pos: usize) -> Vec<usize> {
        let alt1 = &self.profiles[active[pos]];
        active[pos + 1..]
            .iter()
            .copied()
            .filter(|&j| self.filter.accepts(alt1, &self.profiles[j]))
            .collect()
    }

    /// Scan every pair and stream accepted choice sets into `sink`.
    ///
    /// # Errors
    ///
    /// Returns an error if `block_rows` is zero, the thread pool cannot be
    /// built, or the sink fails. A sink error stops the scan immediately.
    pub fn run<S: ChoiceSetSink + ?Sized>(&self, sink: &mut S) -> Result<PairStats> {
        if self.block_rows == 0 {
            return Err(Error::invalid_params("block_rows must be at least 1"));
        }
        let pool = WorkerPool::new(self.threads)?;

        let active: Vec<usize> = (0..self.profiles.len())
            .filter(|&i| self.filter.admits_alternative(&self.profiles[i]))
            .collect();
        let mut stats = PairStats {
            profiles: self.profiles.len(),
            skipped: self.profiles.len() - active.len(),
            pairs_examined: pair_count(active.len()),
            accepted: 0,
        };
        if stats.skipped > 0 {
            debug!("{} profiles can never appear in a valid choice set", stats.skipped);
        }

        info!(
            "scanning {} pairs over {} profiles ({} threads)",
            stats.pairs_examined,
            active.len(),
            pool.threads()
        );

        let mut start = 0;
        while start < active.len() {
            let end = (start + self.block_rows).min(active.len());
            let block = pool.map_rows(start..end, |pos| self.scan_row(&active, pos));

            for (pos, partners) in (start..end).zip(block) {
                let alt1 = self.profiles[active[pos]];
                for j in partners {
                    stats.accepted += 1;
                    sink.accept(ChoiceSet::new(stats.accepted, alt1, self.profiles[j]))?;
                }
            }

            debug!(
                "rows {start}..{end} of {}: {} accepted so far",
                active.len(),
                stats.accepted
            );
            start = end;
        }

        info!("accepted choice sets: {}", stats.accepted);
        Ok(stats)
    }

    /// Scan every pair and collect the accepted choice sets in memory.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`run`](Self::run).
    pub fn collect(&self) -> Result<Design> {
        let mut design = Design::new();
        self.run(&mut design)?;
        Ok(design)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enumerate::enumerate_profiles;
    use crate::enumerate::tests::{small_baselines, small_space};
    use crate::filter::{ChoiceRules, OverlapPolicy, ProfileFilter};

    fn profiles() -> ValidProfiles {
        let space = small_space();
        let filter = ProfileFilter::new(&space, &small_baselines()).unwrap();
        enumerate_profiles(&space, &filter)
    }

    fn filter(rules: ChoiceRules) -> ChoiceSetFilter {
        ChoiceSetFilter::new(&small_space(), rules)
    }

    #[test]
    fn test_accepted_counts() {
        let profiles = profiles();
        let cases = [
            (ChoiceRules::default(), 120),
            (
                ChoiceRules {
                    overlap: OverlapPolicy::AnyOverlap,
                    ..ChoiceRules::default()
                },
                256,
            ),
            (
                ChoiceRules {
                    dominance: false,
                    ..ChoiceRules::default()
                },
                192,
            ),
        ];

        for (rules, expected) in cases {
            let filter = filter(rules);
            let design = PairEnumerator::new(&profiles, &filter).collect().unwrap();
            assert_eq!(design.len(), expected);
        }
    }

    #[test]
    fn test_first_pairs_in_index_order() {
        let profiles = profiles();
        let filter = filter(ChoiceRules::default());
        let enumerator = PairEnumerator::new(&profiles, &filter);

        assert_eq!(&enumerator.partners(0)[..3], &[7, 11, 13]);

        let design = enumerator.collect().unwrap();
        let first = design.choice_sets()[0];
        assert_eq!(first.situation, 1);
        assert_eq!(first.alt1, profiles[0]);
        assert_eq!(first.alt2, profiles[7]);
    }

    #[test]
    fn test_matches_brute_force() {
        let profiles = profiles();
        let filter = filter(ChoiceRules::default());

        let mut expected = Design::new();
        for i in 0..profiles.len() {
            for j in i + 1..profiles.len() {
                if filter.accepts(&profiles[i], &profiles[j]) {
                    expected.push(profiles[i], profiles[j]);
                }
            }
        }

        let mut streamed: Vec<ChoiceSet> = Vec::new();
        let stats = PairEnumerator::new(&profiles, &filter)
            .run(&mut streamed)
            .unwrap();
        assert_eq!(stats.pairs_examined, 496);
        assert_eq!(stats.accepted, expected.len() as u64);
        assert_eq!(streamed, expected.into_choice_sets());
    }

    #[test]
    fn test_deterministic_across_blocks_and_threads() {
        let profiles = profiles();
        let filter = filter(ChoiceRules::default());

        let reference = PairEnumerator::new(&profiles, &filter).collect().unwrap();
        for (rows, threads) in [(1, None), (3, Some(1)), (7, Some(2)), (1000, Some(4))] {
            let design = PairEnumerator::new(&profiles, &filter)
                .block_rows(rows)
                .threads(threads)
                .collect()
                .unwrap();
            assert_eq!(design, reference);
            assert!(design.is_contiguous());
        }
    }

    #[test]
    fn test_extremity_guard_skips_profiles() {
        let profiles = profiles();
        let filter = filter(ChoiceRules {
            extremity_guard: true,
            ..ChoiceRules::default()
        });

        let mut design = Design::new();
        let stats = PairEnumerator::new(&profiles, &filter)
            .run(&mut design)
            .unwrap();
        assert_eq!(stats.profiles, 32);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.pairs_examined, 465);
        assert_eq!(stats.accepted, 120);
        assert!(design.iter().all(|cs| filter.accepts(&cs.alt1, &cs.alt2)));
    }

    #[test]
    fn test_zero_block_rows_rejected() {
        let profiles = profiles();
        let filter = filter(ChoiceRules::default());
        let result = PairEnumerator::new(&profiles, &filter).block_rows(0).collect();
        assert!(matches!(result, Err(Error::InvalidParams { .. })));
    }

    struct FailAfter(usize);

    impl ChoiceSetSink for FailAfter {
        fn accept(&mut self, _choice_set: ChoiceSet) -> Result<()> {
            if self.0 == 0 {
                return Err(Error::invalid_params("sink full"));
            }
            self.0 -= 1;
            Ok(())
        }
    }

    #[test]
    fn test_sink_error_aborts() {
        let profiles = profiles();
        let filter = filter(ChoiceRules::default());
        let mut sink = FailAfter(3);
        assert!(PairEnumerator::new(&profiles, &filter)
            .run(&mut sink)
            .is_err());
    }

    #[test]
    fn test_empty_profiles() {
        let profiles = ValidProfiles::new(Vec::new(), 0);
        let filter = filter(ChoiceRules::default());
        let mut design = Design::new();
        let stats = PairEnumerator::new(&profiles, &filter)
            .run(&mut design)
            .unwrap();
        assert_eq!(stats, PairStats::default());
        assert!(design.is_empty());
    }
}
