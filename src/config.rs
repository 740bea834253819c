//! Run configuration.
//!
//! A [`DesignConfig`] carries everything one generation run needs: the
//! attribute space, the profile baselines, the choice set rules and the
//! output options. With the `serde` feature it round-trips through JSON,
//! keyed by attribute column codes:
//!
//! ```json
//! {
//!   "space": { "W_A": [30, 50, 80], "C_A": [30, 50, 80], "...": [] },
//!   "baselines": { "SM_A": 0, "SM_F": 0, "SM_C": 0 },
//!   "rules": { "overlap": "exactly_two_groups", "extremity_guard": true },
//!   "max_choices": 500000,
//!   "seed": 42
//! }
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::design::IdColumn;
use crate::enumerate::DEFAULT_BLOCK_ROWS;
use crate::error::{Error, Result};
use crate::filter::{BaselineTable, ChoiceRules, ChoiceSetFilter, ProfileFilter};
use crate::sample::Sampler;
use crate::space::AttributeSpace;

/// Configuration of one design generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DesignConfig {
    /// Attribute levels.
    pub space: AttributeSpace,
    /// Baseline levels of the effect-coded groups.
    #[cfg_attr(feature = "serde", serde(default))]
    pub baselines: BaselineTable,
    /// Choice set validity rules.
    #[cfg_attr(feature = "serde", serde(default))]
    pub rules: ChoiceRules,
    /// Upper bound on the number of choice sets kept; `None` keeps all.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_choices: Option<usize>,
    /// Sampling seed; `None` seeds from entropy.
    #[cfg_attr(feature = "serde", serde(default))]
    pub seed: Option<u64>,
    /// Header of the identifier column in wide output.
    #[cfg_attr(feature = "serde", serde(default))]
    pub id_column: IdColumn,
    /// Rows per enumeration block.
    #[cfg_attr(feature = "serde", serde(default = "default_block_rows"))]
    pub block_rows: usize,
    /// Dedicated worker threads; `None` uses the global pool.
    #[cfg_attr(feature = "serde", serde(default))]
    pub threads: Option<usize>,
}

#[cfg(feature = "serde")]
fn default_block_rows() -> usize {
    DEFAULT_BLOCK_ROWS
}

impl DesignConfig {
    /// Configuration over `space` with no baselines and default rules.
    #[must_use]
    pub fn new(space: AttributeSpace) -> Self {
        Self {
            space,
            baselines: BaselineTable::new(),
            rules: ChoiceRules::default(),
            max_choices: None,
            seed: None,
            id_column: IdColumn::default(),
            block_rows: DEFAULT_BLOCK_ROWS,
            threads: None,
        }
    }

    /// Check the configuration before any enumeration work starts.
    ///
    /// # Errors
    ///
    /// Returns an error if the baselines do not fit the space, or a count
    /// parameter is zero.
    pub fn validate(&self) -> Result<()> {
        self.profile_filter()?;
        if self.block_rows == 0 {
            return Err(Error::invalid_params("block_rows must be at least 1"));
        }
        if self.max_choices == Some(0) {
            return Err(Error::invalid_params("max_choices must be at least 1"));
        }
        if self.threads == Some(0) {
            return Err(Error::invalid_params("threads must be at least 1"));
        }
        Ok(())
    }

    /// The profile filter implied by the baselines.
    ///
    /// # Errors
    ///
    /// Returns an error if a baseline is not a declared level or a group is
    /// only partially configured.
    pub fn profile_filter(&self) -> Result<ProfileFilter> {
        ProfileFilter::new(&self.space, &self.baselines)
    }

    /// The choice set filter implied by the rules.
    #[must_use]
    pub fn choice_filter(&self) -> ChoiceSetFilter {
        ChoiceSetFilter::new(&self.space, self.rules.clone())
    }

    /// The sampler, if sampling is configured.
    #[must_use]
    pub fn sampler(&self) -> Option<Sampler> {
        self.max_choices
            .map(|max| Sampler::new(max).seed(self.seed))
    }
}
