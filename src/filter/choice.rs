//! Choice-set filtering: overlap, dominance and extremity rules.
//!
//! A candidate choice set pairs two valid profiles. It is accepted when:
//!
//! 1. at least one attribute group is identical in both alternatives, and the
//!    number of identical groups satisfies the [`OverlapPolicy`];
//! 2. neither alternative weakly dominates the other on every informational
//!    attribute without also costing strictly more (when dominance is on);
//! 3. an alternative priced at the maximum cost level offers at least one
//!    attribute at its own maximum level (when the extremity guard is on).
//!
//! Group equality is computed once per pair into a [`GroupOverlap`] mask and
//! every overlap rule reads that mask.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::space::{Attribute, AttributeGroup, AttributeSpace, Level, Profile, ATTRIBUTE_COUNT};

/// How many attribute groups two alternatives must share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OverlapPolicy {
    /// At least one group identical.
    AnyOverlap,
    /// Exactly two of the four groups identical: never one, three or four.
    #[default]
    ExactlyTwoGroups,
}

impl OverlapPolicy {
    /// Check an overlap count against this policy.
    #[must_use]
    pub fn check(self, overlapping: u32) -> Option<Rejection> {
        match (self, overlapping) {
            (_, 0) => Some(Rejection::NoOverlap),
            (Self::AnyOverlap, _) | (Self::ExactlyTwoGroups, 2) => None,
            (Self::ExactlyTwoGroups, 1) => Some(Rejection::SingleGroupOverlap),
            (Self::ExactlyTwoGroups, n) => Some(Rejection::ExcessOverlap(n)),
        }
    }
}

/// Rule selection for the choice-set filter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChoiceRules {
    /// Overlap-count policy.
    pub overlap: OverlapPolicy,
    /// Reject pairs where a weakly dominant alternative is not priced higher.
    pub dominance: bool,
    /// Reject alternatives at the maximum cost with no attribute at its maximum.
    pub extremity_guard: bool,
}

impl Default for ChoiceRules {
    fn default() -> Self {
        Self {
            overlap: OverlapPolicy::ExactlyTwoGroups,
            dominance: true,
            extremity_guard: false,
        }
    }
}

/// Set of attribute groups that are identical between two profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GroupOverlap(u8);

impl GroupOverlap {
    /// Compare two profiles group by group.
    #[must_use]
    #[inline]
    pub fn between(a: &Profile, b: &Profile) -> Self {
        let mut mask = 0u8;
        for group in AttributeGroup::ALL {
            if a.group_eq(b, group) {
                mask |= group.bit();
            }
        }
        Self(mask)
    }

    /// Whether `group` is identical.
    #[must_use]
    pub fn contains(self, group: AttributeGroup) -> bool {
        self.0 & group.bit() != 0
    }

    /// Number of identical groups.
    #[must_use]
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Identical groups in declaration order.
    pub fn groups(self) -> impl Iterator<Item = AttributeGroup> {
        AttributeGroup::ALL
            .into_iter()
            .filter(move |&g| self.contains(g))
    }
}

/// Why a candidate choice set was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// No attribute group is shared.
    NoOverlap,
    /// Exactly one group is shared where two are required.
    SingleGroupOverlap,
    /// More groups are shared than the policy allows.
    ExcessOverlap(u32),
    /// One alternative weakly dominates the other without costing more.
    Dominated,
    /// An alternative at maximum cost has no attribute at its maximum.
    ExtremeCost,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOverlap => write!(f, "no attribute group overlaps"),
            Self::SingleGroupOverlap => write!(f, "only one attribute group overlaps"),
            Self::ExcessOverlap(n) => write!(f, "{n} attribute groups overlap"),
            Self::Dominated => write!(f, "dominant alternative is not priced higher"),
            Self::ExtremeCost => {
                write!(f, "maximum cost without any attribute at its maximum level")
            }
        }
    }
}

/// Predicate over a pair of profiles.
///
/// # Example
///
/// ```
/// use choiceset::filter::{ChoiceRules, ChoiceSetFilter, Rejection};
/// use choiceset::space::Profile;
/// use choiceset::catalogue::get_by_name;
///
/// let space = get_by_name("constraints").unwrap().space;
/// let filter = ChoiceSetFilter::new(&space, ChoiceRules::default());
///
/// let a = Profile::new([80, 80, 50, 2, 2, 50, 2, 2, 250]);
/// let b = Profile::new([80, 80, 30, 2, 2, 30, 2, 2, 250]);
/// // Same water and climate, `a` at least as good everywhere, same price.
/// assert_eq!(filter.evaluate(&a, &b), Some(Rejection::Dominated));
/// ```
#[derive(Debug, Clone)]
pub struct ChoiceSetFilter {
    rules: ChoiceRules,
    maxima: [Level; ATTRIBUTE_COUNT],
}

impl ChoiceSetFilter {
    /// Create a filter for choice sets drawn from `space`.
    #[must_use]
    pub fn new(space: &AttributeSpace, rules: ChoiceRules) -> Self {
        Self {
            rules,
            maxima: Attribute::ALL.map(|attr| space.max_level(attr)),
        }
    }

    /// The active rules.
    #[must_use]
    pub fn rules(&self) -> &ChoiceRules {
        &self.rules
    }

    /// Evaluate a candidate pair, returning the first rule it violates.
    #[must_use]
    #[inline]
    pub fn evaluate(&self, alt1: &Profile, alt2: &Profile) -> Option<Rejection> {
        let overlap = GroupOverlap::between(alt1, alt2);
        if let Some(rejection) = self.rules.overlap.check(overlap.count()) {
            return Some(rejection);
        }

        if self.rules.dominance && dominance_violated(alt1, alt2) {
            return Some(Rejection::Dominated);
        }

        if !(self.admits_alternative(alt1) && self.admits_alternative(alt2)) {
            return Some(Rejection::ExtremeCost);
        }

        None
    }

    /// Whether the pair is a valid choice set.
    #[must_use]
    #[inline]
    pub fn accepts(&self, alt1: &Profile, alt2: &Profile) -> bool {
        self.evaluate(alt1, alt2).is_none()
    }

    /// Whether a single alternative passes the extremity guard.
    ///
    /// Always true when the guard is disabled. An alternative failing this
    /// check can never appear in an accepted choice set.
    #[must_use]
    #[inline]
    pub fn admits_alternative(&self, alt: &Profile) -> bool {
        if !self.rules.extremity_guard {
            return true;
        }
        if alt[Attribute::Cost] != self.maxima[Attribute::Cost.index()] {
            return true;
        }
        Attribute::INFORMATIONAL
            .iter()
            .any(|&attr| alt[attr] == self.maxima[attr.index()])
    }
}

/// True when one alternative is at least as good on every informational
/// attribute but not strictly more expensive.
#[inline]
fn dominance_violated(a: &Profile, b: &Profile) -> bool {
    let mut a_covers = true;
    let mut b_covers = true;
    for attr in Attribute::INFORMATIONAL {
        let (x, y) = (a[attr], b[attr]);
        a_covers &= x >= y;
        b_covers &= x <= y;
    }

    let (cost_a, cost_b) = (a[Attribute::Cost], b[Attribute::Cost]);
    (a_covers && cost_a <= cost_b) || (b_covers && cost_b <= cost_a)
}
