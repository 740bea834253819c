//! Enumeration of valid profiles and candidate choice sets.
//!
//! ## Overview
//!
//! Enumeration runs in two stages:
//!
//! 1. [`enumerate_profiles`] walks the full factorial of an
//!    [`AttributeSpace`] in lexicographic order and keeps the profiles that
//!    pass a [`ProfileFilter`].
//! 2. [`PairEnumerator`] scans every unordered pair of those profiles,
//!    applies a [`ChoiceSetFilter`](crate::filter::ChoiceSetFilter) and streams
//!    the accepted pairs into a [`ChoiceSetSink`](crate::sink::ChoiceSetSink).
//!
//! ## Example
//!
//! ```
//! use choiceset::catalogue::get_by_name;
//! use choiceset::enumerate::enumerate_profiles;
//!
//! let config = get_by_name("copy").unwrap();
//! let filter = config.profile_filter().unwrap();
//! let profiles = enumerate_profiles(&config.space, &filter);
//!
//! assert_eq!(profiles.full_factorial_size(), 46_656);
//! assert_eq!(profiles.len(), 6_084);
//! ```

mod pairs;

pub use pairs::{PairEnumerator, PairStats, DEFAULT_BLOCK_ROWS};

use std::ops::Index;

use log::info;

use crate::filter::ProfileFilter;
use crate::space::{AttributeSpace, Profile};
use crate::utils::pair_count;

/// The profiles that passed the profile filter, in full-factorial order.
///
/// Indices are 0-based and stable; pairs are always formed as `(i, j)` with
/// `i < j` over these indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProfiles {
    profiles: Vec<Profile>,
    full_factorial: usize,
}

impl ValidProfiles {
    /// Wrap an already filtered profile list.
    #[must_use]
    pub fn new(profiles: Vec<Profile>, full_factorial: usize) -> Self {
        Self {
            profiles,
            full_factorial,
        }
    }

    /// Number of valid profiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether no profile passed the filter.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Size of the full factorial the profiles were drawn from.
    #[must_use]
    pub fn full_factorial_size(&self) -> usize {
        self.full_factorial
    }

    /// Number of unordered pairs `(i, j)` with `i < j`.
    #[must_use]
    pub fn pair_count(&self) -> u64 {
        pair_count(self.profiles.len())
    }

    /// The profiles as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Profile] {
        &self.profiles
    }

    /// Iterate over the profiles.
    pub fn iter(&self) -> std::slice::Iter<'_, Profile> {
        self.profiles.iter()
    }

    /// Consume into the underlying vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<Profile> {
        self.profiles
    }
}

impl Index<usize> for ValidProfiles {
    type Output = Profile;

    fn index(&self, idx: usize) -> &Profile {
        &self.profiles[idx]
    }
}

impl<'a> IntoIterator for &'a ValidProfiles {
    type Item = &'a Profile;
    type IntoIter = std::slice::Iter<'a, Profile>;

    fn into_iter(self) -> Self::IntoIter {
        self.profiles.iter()
    }
}

/// Enumerate the full factorial of `space`, keeping profiles accepted by
/// `filter`.
///
/// Output order is the lexicographic product order (cost varies fastest)
/// restricted to accepted profiles.
#[must_use]
pub fn enumerate_profiles(space: &AttributeSpace, filter: &ProfileFilter) -> ValidProfiles {
    let full_factorial = space.full_factorial_size();
    let profiles: Vec<Profile> = space.profiles().filter(|p| filter.accepts(p)).collect();

    info!("full factorial: {full_factorial} profiles");
    info!("valid profiles: {}", profiles.len());

    ValidProfiles::new(profiles, full_factorial)
}
