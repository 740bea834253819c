//! Attribute catalog, attribute spaces and profiles.
//!
//! ## Overview
//!
//! - [`Attribute`]: the fixed catalog of nine attributes a profile assigns
//! - [`AttributeGroup`]: the four groups the overlap rules compare as units
//! - [`AttributeSpace`]: the admissible levels of every attribute for one run
//! - [`Profile`]: a single alternative, one level per attribute
//!
//! The full factorial of an attribute space is the Cartesian product of the
//! level lists in catalog order, with the last attribute ([`Attribute::Cost`])
//! varying fastest.

mod profile;

pub use profile::Profile;

use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::cartesian_product;

/// A single attribute level.
pub type Level = i32;

/// Number of attributes in the catalog.
pub const ATTRIBUTE_COUNT: usize = 9;

/// The attribute catalog, in declaration order.
///
/// The column code of each attribute (`W_A`, `SM_F`, ...) is what appears in
/// CSV headers and configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Attribute {
    /// Water availability information (`W_A`).
    #[cfg_attr(feature = "serde", serde(rename = "W_A"))]
    WaterAvailability,
    /// Climate availability information (`C_A`).
    #[cfg_attr(feature = "serde", serde(rename = "C_A"))]
    ClimateAvailability,
    /// Soil-moisture information availability (`SM_A`).
    #[cfg_attr(feature = "serde", serde(rename = "SM_A"))]
    SoilMoistureAvailability,
    /// Soil-moisture frequency effect (`SM_F`).
    #[cfg_attr(feature = "serde", serde(rename = "SM_F"))]
    SoilMoistureFrequency,
    /// Soil-moisture cost effect (`SM_C`).
    #[cfg_attr(feature = "serde", serde(rename = "SM_C"))]
    SoilMoistureCost,
    /// Soil-nutrition information availability (`SN_A`).
    #[cfg_attr(feature = "serde", serde(rename = "SN_A"))]
    SoilNutritionAvailability,
    /// Soil-nutrition frequency effect (`SN_F`).
    #[cfg_attr(feature = "serde", serde(rename = "SN_F"))]
    SoilNutritionFrequency,
    /// Soil-nutrition cost effect (`SN_C`).
    #[cfg_attr(feature = "serde", serde(rename = "SN_C"))]
    SoilNutritionCost,
    /// Monetary cost of the offer (`C`).
    #[cfg_attr(feature = "serde", serde(rename = "C"))]
    Cost,
}

impl Attribute {
    /// All attributes in declaration order.
    pub const ALL: [Attribute; ATTRIBUTE_COUNT] = [
        Attribute::WaterAvailability,
        Attribute::ClimateAvailability,
        Attribute::SoilMoistureAvailability,
        Attribute::SoilMoistureFrequency,
        Attribute::SoilMoistureCost,
        Attribute::SoilNutritionAvailability,
        Attribute::SoilNutritionFrequency,
        Attribute::SoilNutritionCost,
        Attribute::Cost,
    ];

    /// The informational attributes, i.e. everything except cost.
    pub const INFORMATIONAL: [Attribute; ATTRIBUTE_COUNT - 1] = [
        Attribute::WaterAvailability,
        Attribute::ClimateAvailability,
        Attribute::SoilMoistureAvailability,
        Attribute::SoilMoistureFrequency,
        Attribute::SoilMoistureCost,
        Attribute::SoilNutritionAvailability,
        Attribute::SoilNutritionFrequency,
        Attribute::SoilNutritionCost,
    ];

    /// Position of the attribute in the catalog.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The column code used in tabular output.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::WaterAvailability => "W_A",
            Self::ClimateAvailability => "C_A",
            Self::SoilMoistureAvailability => "SM_A",
            Self::SoilMoistureFrequency => "SM_F",
            Self::SoilMoistureCost => "SM_C",
            Self::SoilNutritionAvailability => "SN_A",
            Self::SoilNutritionFrequency => "SN_F",
            Self::SoilNutritionCost => "SN_C",
            Self::Cost => "C",
        }
    }

    /// Look up an attribute by its column code, ignoring ASCII case.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|attr| attr.code().eq_ignore_ascii_case(code))
    }

    /// The overlap group this attribute belongs to, if any.
    ///
    /// Cost belongs to no group.
    #[must_use]
    pub const fn group(self) -> Option<AttributeGroup> {
        match self {
            Self::WaterAvailability => Some(AttributeGroup::Water),
            Self::ClimateAvailability => Some(AttributeGroup::Climate),
            Self::SoilMoistureAvailability
            | Self::SoilMoistureFrequency
            | Self::SoilMoistureCost => Some(AttributeGroup::SoilMoisture),
            Self::SoilNutritionAvailability
            | Self::SoilNutritionFrequency
            | Self::SoilNutritionCost => Some(AttributeGroup::SoilNutrition),
            Self::Cost => None,
        }
    }

    /// Whether the attribute carries information (anything but cost).
    #[must_use]
    pub const fn is_informational(self) -> bool {
        !matches!(self, Self::Cost)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The attribute groups compared as units by the overlap rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AttributeGroup {
    /// Water availability.
    Water,
    /// Climate availability.
    Climate,
    /// Soil-moisture availability, frequency and cost effects.
    SoilMoisture,
    /// Soil-nutrition availability, frequency and cost effects.
    SoilNutrition,
}

impl AttributeGroup {
    /// All groups in declaration order.
    pub const ALL: [AttributeGroup; 4] = [
        AttributeGroup::Water,
        AttributeGroup::Climate,
        AttributeGroup::SoilMoisture,
        AttributeGroup::SoilNutrition,
    ];

    /// Attributes belonging to this group.
    #[must_use]
    pub const fn members(self) -> &'static [Attribute] {
        match self {
            Self::Water => &[Attribute::WaterAvailability],
            Self::Climate => &[Attribute::ClimateAvailability],
            Self::SoilMoisture => &[
                Attribute::SoilMoistureAvailability,
                Attribute::SoilMoistureFrequency,
                Attribute::SoilMoistureCost,
            ],
            Self::SoilNutrition => &[
                Attribute::SoilNutritionAvailability,
                Attribute::SoilNutritionFrequency,
                Attribute::SoilNutritionCost,
            ],
        }
    }

    /// Bit used for this group in overlap masks.
    #[must_use]
    pub const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// Human readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::Climate => "climate",
            Self::SoilMoisture => "soil moisture",
            Self::SoilNutrition => "soil nutrition",
        }
    }
}

impl fmt::Display for AttributeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Level table keyed by attribute, the serialized form of an [`AttributeSpace`].
pub type LevelTable = BTreeMap<Attribute, Vec<Level>>;

/// The admissible levels of every attribute for one run.
///
/// Every attribute has a non-empty, duplicate-free level list. The order of
/// each list is significant: it fixes the order of the full factorial.
///
/// # Example
///
/// ```
/// use choiceset::space::{Attribute, AttributeSpace};
///
/// let space = AttributeSpace::new([
///     vec![10, 30],
///     vec![10, 30],
///     vec![0, 10],
///     vec![1, 2],
///     vec![1, 2],
///     vec![0, 10],
///     vec![1, 2],
///     vec![1, 2],
///     vec![50, 250],
/// ])
/// .unwrap();
///
/// assert_eq!(space.full_factorial_size(), 512);
/// assert_eq!(space.max_level(Attribute::Cost), 250);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "LevelTable", into = "LevelTable")
)]
pub struct AttributeSpace {
    levels: [Vec<Level>; ATTRIBUTE_COUNT],
    maxima: [Level; ATTRIBUTE_COUNT],
}

impl AttributeSpace {
    /// Create an attribute space from level lists in catalog order.
    ///
    /// # Errors
    ///
    /// Returns an error if any list is empty or repeats a level.
    pub fn new(levels: [Vec<Level>; ATTRIBUTE_COUNT]) -> Result<Self> {
        let mut maxima = [0; ATTRIBUTE_COUNT];

        for attr in Attribute::ALL {
            let list = &levels[attr.index()];
            let Some(&first) = list.first() else {
                return Err(Error::EmptyLevels { attribute: attr });
            };

            let mut max = first;
            for (pos, &level) in list.iter().enumerate() {
                if list[..pos].contains(&level) {
                    return Err(Error::DuplicateLevel {
                        attribute: attr,
                        level,
                    });
                }
                max = max.max(level);
            }
            maxima[attr.index()] = max;
        }

        Ok(Self { levels, maxima })
    }

    /// Levels of one attribute, in declaration order.
    #[must_use]
    pub fn levels(&self, attr: Attribute) -> &[Level] {
        &self.levels[attr.index()]
    }

    /// Largest declared level of one attribute.
    #[must_use]
    pub fn max_level(&self, attr: Attribute) -> Level {
        self.maxima[attr.index()]
    }

    /// Whether `level` is declared for `attr`.
    #[must_use]
    pub fn contains(&self, attr: Attribute, level: Level) -> bool {
        self.levels(attr).contains(&level)
    }

    /// Number of level combinations in the full factorial.
    ///
    /// Saturates at `usize::MAX`.
    #[must_use]
    pub fn full_factorial_size(&self) -> usize {
        self.levels
            .iter()
            .fold(1usize, |acc, list| acc.saturating_mul(list.len()))
    }

    /// Iterate over the full factorial in lexicographic order.
    ///
    /// The first attribute varies slowest and cost varies fastest.
    pub fn profiles(&self) -> impl Iterator<Item = Profile> + '_ {
        let radices: Vec<usize> = self.levels.iter().map(Vec::len).collect();
        cartesian_product(&radices).map(move |digits| {
            Profile::new(std::array::from_fn(|i| self.levels[i][digits[i]]))
        })
    }
}

impl TryFrom<LevelTable> for AttributeSpace {
    type Error = Error;

    fn try_from(mut table: LevelTable) -> Result<Self> {
        let mut levels: [Vec<Level>; ATTRIBUTE_COUNT] = Default::default();
        for attr in Attribute::ALL {
            levels[attr.index()] = table
                .remove(&attr)
                .ok_or(Error::MissingAttribute(attr))?;
        }
        Self::new(levels)
    }
}

impl From<AttributeSpace> for LevelTable {
    fn from(space: AttributeSpace) -> Self {
        Attribute::ALL.into_iter().zip(space.levels).collect()
    }
}

impl fmt::Display for AttributeSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = Attribute::ALL
            .iter()
            .map(|attr| format!("{}={:?}", attr, self.levels(*attr)))
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}
