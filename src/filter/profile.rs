//! Profile-level filtering by baseline group consistency.
//!
//! Within an effect-coded group (soil moisture, soil nutrition) either every
//! attribute sits at its baseline level or none does. A profile that switches
//! on availability but leaves an effect at baseline, or vice versa, describes
//! an impossible offer and is discarded before pairing.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::space::{Attribute, AttributeGroup, AttributeSpace, Level, Profile};

/// Baseline ("inactive") level per attribute.
///
/// Only members of multi-attribute groups may have a baseline, and a group is
/// either fully configured or not at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BaselineTable(BTreeMap<Attribute, Level>);

impl BaselineTable {
    /// Create an empty table (no group constrained).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the baseline of one attribute.
    #[must_use]
    pub fn with(mut self, attr: Attribute, level: Level) -> Self {
        self.set(attr, level);
        self
    }

    /// Give every member of `group` the same baseline.
    #[must_use]
    pub fn with_group(mut self, group: AttributeGroup, level: Level) -> Self {
        for &attr in group.members() {
            self.set(attr, level);
        }
        self
    }

    /// Set the baseline of one attribute in place.
    pub fn set(&mut self, attr: Attribute, level: Level) {
        self.0.insert(attr, level);
    }

    /// Baseline of one attribute, if configured.
    #[must_use]
    pub fn get(&self, attr: Attribute) -> Option<Level> {
        self.0.get(&attr).copied()
    }

    /// Whether no baseline is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over configured baselines in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (Attribute, Level)> + '_ {
        self.0.iter().map(|(&attr, &level)| (attr, level))
    }
}

/// Baselines of one fully configured group.
#[derive(Debug, Clone)]
struct GroupBaseline {
    group: AttributeGroup,
    members: Vec<(Attribute, Level)>,
}

impl GroupBaseline {
    fn consistent(&self, profile: &Profile) -> bool {
        let at_baseline = self
            .members
            .iter()
            .filter(|&&(attr, base)| profile[attr] == base)
            .count();
        at_baseline == 0 || at_baseline == self.members.len()
    }
}

/// Predicate over a single profile.
///
/// # Example
///
/// ```
/// use choiceset::filter::{BaselineTable, ProfileFilter};
/// use choiceset::space::{AttributeGroup, Profile};
/// use choiceset::catalogue::get_by_name;
///
/// let space = get_by_name("copy").unwrap().space;
/// let baselines = BaselineTable::new()
///     .with_group(AttributeGroup::SoilMoisture, 0)
///     .with_group(AttributeGroup::SoilNutrition, 0);
/// let filter = ProfileFilter::new(&space, &baselines).unwrap();
///
/// // Soil moisture off, but its frequency effect on: rejected.
/// assert!(!filter.accepts(&Profile::new([30, 30, 0, 1, 0, 0, 0, 0, 100])));
/// // Everything off in both soil groups: accepted.
/// assert!(filter.accepts(&Profile::new([30, 30, 0, 0, 0, 0, 0, 0, 100])));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProfileFilter {
    groups: Vec<GroupBaseline>,
}

impl ProfileFilter {
    /// Build a filter from a baseline table, validated against `space`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - a baseline is not one of the attribute's declared levels
    /// - a baseline is given for an attribute outside every multi-attribute group
    /// - a group has baselines for some members but not all
    pub fn new(space: &AttributeSpace, baselines: &BaselineTable) -> Result<Self> {
        for (attr, baseline) in baselines.iter() {
            let grouped = attr.group().map_or(false, |g| g.members().len() > 1);
            if !grouped {
                return Err(Error::invalid_params(format!(
                    "attribute {attr} cannot have a baseline: only soil moisture and \
                     soil nutrition attributes are baseline-coded"
                )));
            }
            if !space.contains(attr, baseline) {
                return Err(Error::UnknownBaseline {
                    attribute: attr,
                    baseline,
                });
            }
        }

        let mut groups = Vec::new();
        for group in AttributeGroup::ALL {
            let members: Vec<(Attribute, Level)> = group
                .members()
                .iter()
                .filter_map(|&attr| baselines.get(attr).map(|base| (attr, base)))
                .collect();

            if members.is_empty() {
                continue;
            }
            if members.len() != group.members().len() {
                return Err(Error::IncompleteBaselineGroup { group });
            }
            groups.push(GroupBaseline { group, members });
        }

        Ok(Self { groups })
    }

    /// A filter that accepts every profile.
    #[must_use]
    pub fn unconstrained() -> Self {
        Self::default()
    }

    /// Groups this filter constrains.
    pub fn constrained_groups(&self) -> impl Iterator<Item = AttributeGroup> + '_ {
        self.groups.iter().map(|g| g.group)
    }

    /// Whether `profile` is a valid alternative.
    #[must_use]
    pub fn accepts(&self, profile: &Profile) -> bool {
        self.groups.iter().all(|g| g.consistent(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::get_by_name;

    fn copy_filter() -> ProfileFilter {
        let config = get_by_name("copy").unwrap();
        ProfileFilter::new(&config.space, &config.baselines).unwrap()
    }

    fn constraints_filter() -> ProfileFilter {
        let config = get_by_name("constraints").unwrap();
        ProfileFilter::new(&config.space, &config.baselines).unwrap()
    }

    #[test]
    fn test_mixed_baseline_rejected() {
        let filter = copy_filter();
        // SM_A=0 (baseline), SM_F=1 (not), SM_C=0 (baseline)
        let p = Profile::new([30, 30, 0, 1, 0, 0, 0, 0, 100]);
        assert!(!filter.accepts(&p));

        // Only availability off
        let p = Profile::new([30, 30, 0, 1, 2, 50, 1, 1, 100]);
        assert!(!filter.accepts(&p));

        // Soil nutrition with a single effect at baseline
        let p = Profile::new([30, 30, 30, 1, 2, 50, 0, 1, 100]);
        assert!(!filter.accepts(&p));
    }

    #[test]
    fn test_consistent_profiles_accepted() {
        let filter = copy_filter();
        // All three at baseline in both groups
        assert!(filter.accepts(&Profile::new([30, 30, 0, 0, 0, 0, 0, 0, 100])));
        // All three non-baseline
        assert!(filter.accepts(&Profile::new([80, 50, 30, 1, 2, 80, 2, 1, 3500])));
        // One group off, the other on
        assert!(filter.accepts(&Profile::new([50, 50, 0, 0, 0, 50, 2, 2, 250])));
    }

    #[test]
    fn test_baseline_variant_one() {
        // Effects use 1 as their baseline in the constraints preset
        let filter = constraints_filter();
        assert!(filter.accepts(&Profile::new([10, 10, 0, 1, 1, 0, 1, 1, 50])));
        assert!(filter.accepts(&Profile::new([10, 10, 30, 2, 3, 0, 1, 1, 50])));
        assert!(!filter.accepts(&Profile::new([10, 10, 0, 2, 2, 0, 1, 1, 50])));
        assert!(!filter.accepts(&Profile::new([10, 10, 30, 1, 2, 0, 1, 1, 50])));
    }

    #[test]
    fn test_unconstrained_accepts_everything() {
        let filter = ProfileFilter::unconstrained();
        assert_eq!(filter.constrained_groups().count(), 0);
        assert!(filter.accepts(&Profile::new([30, 30, 0, 1, 0, 0, 2, 0, 100])));
    }

    #[test]
    fn test_unknown_baseline() {
        let space = get_by_name("copy").unwrap().space;
        let baselines = BaselineTable::new()
            .with_group(AttributeGroup::SoilMoisture, 0)
            .with(Attribute::SoilMoistureCost, 7);
        assert!(matches!(
            ProfileFilter::new(&space, &baselines),
            Err(Error::UnknownBaseline {
                attribute: Attribute::SoilMoistureCost,
                baseline: 7
            })
        ));
    }

    #[test]
    fn test_incomplete_group() {
        let space = get_by_name("copy").unwrap().space;
        let baselines = BaselineTable::new()
            .with(Attribute::SoilNutritionAvailability, 0)
            .with(Attribute::SoilNutritionCost, 0);
        assert!(matches!(
            ProfileFilter::new(&space, &baselines),
            Err(Error::IncompleteBaselineGroup {
                group: AttributeGroup::SoilNutrition
            })
        ));
    }

    #[test]
    fn test_baseline_outside_groups() {
        let space = get_by_name("copy").unwrap().space;
        let baselines = BaselineTable::new().with(Attribute::Cost, 100);
        let err = ProfileFilter::new(&space, &baselines).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_single_group_constrained() {
        let space = get_by_name("copy").unwrap().space;
        let baselines = BaselineTable::new().with_group(AttributeGroup::SoilMoisture, 0);
        let filter = ProfileFilter::new(&space, &baselines).unwrap();

        let groups: Vec<_> = filter.constrained_groups().collect();
        assert_eq!(groups, vec![AttributeGroup::SoilMoisture]);
        // Soil nutrition is free to mix
        assert!(filter.accepts(&Profile::new([30, 30, 0, 0, 0, 0, 1, 0, 100])));
    }
}
