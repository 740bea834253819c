//! Validity predicates for profiles and choice sets.
//!
//! Two filters prune the design space:
//!
//! | Filter | Input | Rules |
//! |--------|-------|-------|
//! | [`ProfileFilter`] | one profile | baseline group consistency for the soil groups |
//! | [`ChoiceSetFilter`] | a pair of profiles | overlap policy, dominance, extremity guard |
//!
//! Both are pure functions of their inputs and hold only configuration, so
//! they can be shared freely between worker threads.
//!
//! ```
//! use choiceset::catalogue::get_by_name;
//! use choiceset::filter::{ChoiceSetFilter, ProfileFilter};
//! use choiceset::space::Profile;
//!
//! let config = get_by_name("copy").unwrap();
//! let profiles = ProfileFilter::new(&config.space, &config.baselines).unwrap();
//! let choices = ChoiceSetFilter::new(&config.space, config.rules.clone());
//!
//! let a = Profile::new([30, 30, 30, 2, 2, 50, 2, 2, 250]);
//! let b = Profile::new([30, 30, 50, 1, 2, 30, 2, 1, 1250]);
//! assert!(profiles.accepts(&a) && profiles.accepts(&b));
//! assert!(choices.accepts(&a, &b));
//! ```

mod choice;
mod profile;

pub use choice::{ChoiceRules, ChoiceSetFilter, GroupOverlap, OverlapPolicy, Rejection};
pub use profile::{BaselineTable, ProfileFilter};
