//! Builder pattern for generating choice designs.
//!
//! The builder assembles a [`DesignConfig`] from a preset, a full
//! configuration or a bare attribute space, applies any overrides, validates
//! the result and runs the enumeration pipeline.
//!
//! # Example
//!
//! ```
//! use choiceset::space::AttributeSpace;
//! use choiceset::DesignBuilder;
//!
//! let space = AttributeSpace::new([
//!     vec![30, 80], vec![30, 80], vec![0, 50], vec![0, 2], vec![0, 2],
//!     vec![0, 50], vec![0, 2], vec![0, 2], vec![100, 3500],
//! ])
//! .unwrap();
//!
//! let design = DesignBuilder::new()
//!     .space(space)
//!     .max_choices(10)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(design.len(), 10);
//! assert!(design.is_contiguous());
//! ```
//!
//! # Pipeline
//!
//! 1. Enumerate the full factorial, keeping profiles that pass the baseline
//!    group rule.
//! 2. Scan all profile pairs with the choice set rules.
//! 3. When `max_choices` is set, keep a uniform sample of that size.

use log::info;

use crate::config::DesignConfig;
use crate::design::{Design, IdColumn};
use crate::enumerate::{enumerate_profiles, PairEnumerator, PairStats};
use crate::error::{Error, Result};
use crate::filter::{BaselineTable, ChoiceRules, OverlapPolicy};
use crate::sample::ReservoirSampler;
use crate::sink::ChoiceSetSink;
use crate::space::AttributeSpace;

#[derive(Debug, Clone)]
enum Source {
    Preset(String),
    Config(Box<DesignConfig>),
    Space(AttributeSpace),
}

/// Builder for generating choice designs.
///
/// Exactly one source must be given: [`preset`](Self::preset),
/// [`config`](Self::config) or [`space`](Self::space). Every other setter
/// overrides the corresponding field of that source.
///
/// # Example
///
/// ```
/// use choiceset::filter::OverlapPolicy;
/// use choiceset::DesignBuilder;
///
/// let config = DesignBuilder::new()
///     .preset("constraints")
///     .overlap(OverlapPolicy::AnyOverlap)
///     .threads(2)
///     .into_config()
///     .unwrap();
///
/// assert_eq!(config.rules.overlap, OverlapPolicy::AnyOverlap);
/// assert_eq!(config.threads, Some(2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DesignBuilder {
    source: Option<Source>,
    baselines: Option<BaselineTable>,
    rules: Option<ChoiceRules>,
    overlap: Option<OverlapPolicy>,
    dominance: Option<bool>,
    extremity_guard: Option<bool>,
    max_choices: Option<usize>,
    seed: Option<u64>,
    id_column: Option<IdColumn>,
    block_rows: Option<usize>,
    threads: Option<usize>,
}

impl DesignBuilder {
    /// Create a new builder with no source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a named preset (see [`catalogue`](crate::catalogue)).
    #[must_use]
    pub fn preset(mut self, name: impl Into<String>) -> Self {
        self.source = Some(Source::Preset(name.into()));
        self
    }

    /// Start from a complete configuration.
    #[must_use]
    pub fn config(mut self, config: DesignConfig) -> Self {
        self.source = Some(Source::Config(Box::new(config)));
        self
    }

    /// Start from an attribute space with default settings.
    #[must_use]
    pub fn space(mut self, space: AttributeSpace) -> Self {
        self.source = Some(Source::Space(space));
        self
    }

    /// Set the baseline levels.
    #[must_use]
    pub fn baselines(mut self, baselines: BaselineTable) -> Self {
        self.baselines = Some(baselines);
        self
    }

    /// Replace all choice set rules.
    #[must_use]
    pub fn rules(mut self, rules: ChoiceRules) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Set the overlap policy.
    #[must_use]
    pub fn overlap(mut self, policy: OverlapPolicy) -> Self {
        self.overlap = Some(policy);
        self
    }

    /// Enable or disable the dominance rule.
    #[must_use]
    pub fn dominance(mut self, enabled: bool) -> Self {
        self.dominance = Some(enabled);
        self
    }

    /// Enable or disable the extremity guard.
    #[must_use]
    pub fn extremity_guard(mut self, enabled: bool) -> Self {
        self.extremity_guard = Some(enabled);
        self
    }

    /// Keep at most this many choice sets.
    #[must_use]
    pub fn max_choices(mut self, max: usize) -> Self {
        self.max_choices = Some(max);
        self
    }

    /// Fix the sampling seed.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the identifier column header.
    #[must_use]
    pub fn id_column(mut self, id: IdColumn) -> Self {
        self.id_column = Some(id);
        self
    }

    /// Set the rows per enumeration block.
    #[must_use]
    pub fn block_rows(mut self, rows: usize) -> Self {
        self.block_rows = Some(rows);
        self
    }

    /// Use a dedicated pool of this many threads.
    #[must_use]
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Resolve the source, apply overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if no source was given, the preset is unknown, or the
    /// resulting configuration is invalid.
    pub fn into_config(self) -> Result<DesignConfig> {
        let mut config = match self.source {
            Some(Source::Preset(name)) => crate::catalogue::get_by_name(&name)?,
            Some(Source::Config(config)) => *config,
            Some(Source::Space(space)) => DesignConfig::new(space),
            None => {
                return Err(Error::invalid_params(
                    "a preset, configuration or attribute space must be specified",
                ))
            }
        };

        if let Some(baselines) = self.baselines {
            config.baselines = baselines;
        }
        if let Some(rules) = self.rules {
            config.rules = rules;
        }
        if let Some(overlap) = self.overlap {
            config.rules.overlap = overlap;
        }
        if let Some(dominance) = self.dominance {
            config.rules.dominance = dominance;
        }
        if let Some(guard) = self.extremity_guard {
            config.rules.extremity_guard = guard;
        }
        if self.max_choices.is_some() {
            config.max_choices = self.max_choices;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(id) = self.id_column {
            config.id_column = id;
        }
        if let Some(rows) = self.block_rows {
            config.block_rows = rows;
        }
        if self.threads.is_some() {
            config.threads = self.threads;
        }

        config.validate()?;
        Ok(config)
    }

    /// Generate the design in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<Design> {
        build_design(&self.into_config()?)
    }

    /// Stream every accepted choice set into `sink`, without sampling.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the sink fails.
    pub fn run_into<S: ChoiceSetSink + ?Sized>(self, sink: &mut S) -> Result<PairStats> {
        run_design(&self.into_config()?, sink)
    }
}

/// Stream every accepted choice set of `config` into `sink`.
///
/// Sampling settings are ignored; pair the sink with a
/// [`ReservoirSampler`] to sample in the same pass.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the sink fails.
pub fn run_design<S: ChoiceSetSink + ?Sized>(
    config: &DesignConfig,
    sink: &mut S,
) -> Result<PairStats> {
    config.validate()?;
    let profile_filter = config.profile_filter()?;
    let profiles = enumerate_profiles(&config.space, &profile_filter);
    let choice_filter = config.choice_filter();

    PairEnumerator::new(&profiles, &choice_filter)
        .block_rows(config.block_rows)
        .threads(config.threads)
        .run(sink)
}

/// Generate the design described by `config` in memory.
///
/// With `max_choices` set, accepted choice sets pass through a reservoir so
/// at most that many are ever held, and the result is renumbered 1..M.
///
/// # Errors
///
/// Returns an error if the configuration is invalid.
///
/// # Example
///
/// ```
/// use choiceset::catalogue::get_by_name;
/// use choiceset::space::AttributeSpace;
/// use choiceset::build_design;
///
/// let mut config = get_by_name("copy").unwrap();
/// config.space = AttributeSpace::new([
///     vec![30, 80], vec![30, 80], vec![0, 50], vec![0, 2], vec![0, 2],
///     vec![0, 50], vec![0, 2], vec![0, 2], vec![100, 3500],
/// ])
/// .unwrap();
///
/// let design = build_design(&config).unwrap();
/// assert_eq!(design.len(), 120);
/// ```
pub fn build_design(config: &DesignConfig) -> Result<Design> {
    match config.max_choices {
        Some(max) => {
            let mut reservoir = ReservoirSampler::new(max, config.seed);
            run_design(config, &mut reservoir)?;
            Ok(reservoir.into_design())
        }
        None => {
            let mut design = Design::new();
            run_design(config, &mut design)?;
            info!("design holds {} choice sets", design.len());
            Ok(design)
        }
    }
}
