//! A single alternative's attribute-level assignment.

use std::fmt;
use std::ops::Index;

use super::{Attribute, AttributeGroup, Level, ATTRIBUTE_COUNT};

/// One alternative: exactly one level for every attribute of the catalog.
///
/// Profiles are small `Copy` values indexed by [`Attribute`], so rule code
/// reads `profile[Attribute::Cost]` rather than looking up column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Profile {
    levels: [Level; ATTRIBUTE_COUNT],
}

impl Profile {
    /// Create a profile from levels in catalog order.
    #[must_use]
    pub const fn new(levels: [Level; ATTRIBUTE_COUNT]) -> Self {
        Self { levels }
    }

    /// Level of one attribute.
    #[must_use]
    pub const fn get(&self, attr: Attribute) -> Level {
        self.levels[attr.index()]
    }

    /// All levels in catalog order.
    #[must_use]
    pub const fn levels(&self) -> &[Level; ATTRIBUTE_COUNT] {
        &self.levels
    }

    /// Return a copy with one attribute changed.
    #[must_use]
    pub fn with(mut self, attr: Attribute, level: Level) -> Self {
        self.levels[attr.index()] = level;
        self
    }

    /// Whether every attribute of `group` has the same level in both profiles.
    #[must_use]
    pub fn group_eq(&self, other: &Self, group: AttributeGroup) -> bool {
        group
            .members()
            .iter()
            .all(|&attr| self.get(attr) == other.get(attr))
    }
}

impl Index<Attribute> for Profile {
    type Output = Level;

    fn index(&self, attr: Attribute) -> &Level {
        &self.levels[attr.index()]
    }
}

impl From<[Level; ATTRIBUTE_COUNT]> for Profile {
    fn from(levels: [Level; ATTRIBUTE_COUNT]) -> Self {
        Self::new(levels)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pos, attr) in Attribute::ALL.iter().enumerate() {
            if pos > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", attr, self.get(*attr))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_access() {
        let p = Profile::new([10, 30, 0, 1, 1, 50, 2, 3, 250]);
        assert_eq!(p[Attribute::ClimateAvailability], 30);
        assert_eq!(p.get(Attribute::SoilNutritionAvailability), 50);
        assert_eq!(p.with(Attribute::Cost, 50)[Attribute::Cost], 50);
        assert_eq!(p[Attribute::Cost], 250);
    }

    #[test]
    fn test_group_eq() {
        let a = Profile::new([10, 30, 0, 1, 1, 50, 2, 3, 250]);
        let b = a.with(Attribute::SoilNutritionCost, 2);
        assert!(a.group_eq(&b, AttributeGroup::Water));
        assert!(a.group_eq(&b, AttributeGroup::SoilMoisture));
        assert!(!a.group_eq(&b, AttributeGroup::SoilNutrition));
        // Cost is outside every group.
        let c = a.with(Attribute::Cost, 3500);
        assert!(AttributeGroup::ALL.iter().all(|&g| a.group_eq(&c, g)));
    }

    #[test]
    fn test_display() {
        let p = Profile::new([10, 30, 0, 1, 1, 50, 2, 3, 250]);
        assert_eq!(
            p.to_string(),
            "W_A=10 C_A=30 SM_A=0 SM_F=1 SM_C=1 SN_A=50 SN_F=2 SN_C=3 C=250"
        );
    }
}
