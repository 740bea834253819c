//! # Choiceset
//!
//! Candidate choice-set generation and design reformatting for
//! discrete-choice experiments.
//!
//! ## Overview
//!
//! A discrete-choice experiment asks respondents to pick between two
//! alternatives (or neither). Each alternative is a **profile**: one level
//! for each of nine attributes describing a farm-information offer.
//!
//! This library provides:
//! - Constrained full-factorial enumeration of profiles
//! - Parallel, streaming enumeration of valid two-alternative choice sets
//!   under overlap, dominance and extremity rules
//! - Bounded uniform sampling of the candidate set, reproducible by seed
//! - Conversion between the wide candidate layout, the long idefix layout and
//!   the wide ngene layout, with atomic CSV output
//!
//! ## Quick Start
//!
//! The easiest way to generate a design is with the builder:
//!
//! ```rust
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
//!     .max_choices(20)
//!     .seed(1)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(design.len(), 20);
//! ```
//!
//! Or drive the stages directly and stream into a sink:
//!
//! ```rust
//! use choiceset::catalogue::get_by_name;
//! use choiceset::enumerate::{enumerate_profiles, PairEnumerator};
//!
//! let config = get_by_name("copy").unwrap();
//! let profiles = enumerate_profiles(&config.space, &config.profile_filter().unwrap());
//! let filter = config.choice_filter();
//!
//! // Accepted partners of the first profile
//! let partners = PairEnumerator::new(&profiles, &filter).partners(0);
//! assert!(partners.iter().all(|&j| filter.accepts(&profiles[0], &profiles[j])));
//! ```
//!
//! ## Notation
//!
//! | Code | Attribute | Group |
//! |------|-----------|-------|
//! | `W_A` | water availability | water |
//! | `C_A` | climate availability | climate |
//! | `SM_A`, `SM_F`, `SM_C` | soil moisture availability, frequency, cost | soil moisture |
//! | `SN_A`, `SN_F`, `SN_C` | soil nutrition availability, frequency, cost | soil nutrition |
//! | `C` | price of the offer | none |
//!
//! ## Features
//!
//! - `parallel` (default): scan profile pairs with rayon
//! - `serde`: serialization of configuration types
//! - `cli` (default): the `choiceset` binary

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod builder;
pub mod catalogue;
pub mod config;
pub mod design;
pub mod enumerate;
pub mod error;
pub mod filter;
pub mod format;
pub mod parallel;
pub mod sample;
pub mod sink;
pub mod space;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::builder::{build_design, run_design, DesignBuilder};
    pub use crate::catalogue::{available_presets, get_by_name};
    pub use crate::config::DesignConfig;
    pub use crate::design::{ChoiceSet, Design, IdColumn};
    pub use crate::enumerate::{enumerate_profiles, PairEnumerator, PairStats, ValidProfiles};
    pub use crate::error::{Error, Result};
    pub use crate::filter::{
        BaselineTable, ChoiceRules, ChoiceSetFilter, GroupOverlap, OverlapPolicy, ProfileFilter,
        Rejection,
    };
    pub use crate::format::{
        long_to_wide, modfed_to_ngene, read_table, wide_to_long, write_table, NgeneSchema, Table,
    };
    pub use crate::sample::{ReservoirSampler, Sampler};
    pub use crate::sink::{ChoiceSetSink, LongCsvSink, WideCsvSink};
    pub use crate::space::{Attribute, AttributeGroup, AttributeSpace, Level, Profile};
}

// Re-export commonly used items at crate root
pub use builder::{build_design, run_design, DesignBuilder};
pub use catalogue::get_by_name as get_preset;
pub use config::DesignConfig;
pub use error::{Error, Result};
