//! Catalogue of named design configurations.
//!
//! This module provides the two attribute spaces the candidate generator has
//! been run with, by name, so a run can be reproduced without writing a
//! configuration file.

use crate::config::DesignConfig;
use crate::design::IdColumn;
use crate::error::{Error, Result};
use crate::filter::{BaselineTable, ChoiceRules, OverlapPolicy};
use crate::space::{Attribute, AttributeGroup, AttributeSpace};

/// Sample size bound of the `copy` preset.
pub const COPY_MAX_CHOICES: usize = 500_000;

/// Retrieve a preset configuration by name.
///
/// Supported presets:
/// - **constraints**: availability levels {10, 30, 50, 80}, soil availability
///   adds 0, effects {1, 2, 3}, cost {50, 250, 1250, 3500}; soil groups at
///   baseline when availability is 0 and both effects are 1; no sampling.
/// - **copy**: availability levels {30, 50, 80}, soil availability adds 0,
///   effects {0, 1, 2}, cost {100, 250, 1250, 3500}; soil groups at baseline
///   when every member is 0; extremity guard on; sampled to 500 000 choice
///   sets.
///
/// # Example
///
/// ```
/// use choiceset::catalogue::get_by_name;
/// use choiceset::space::Attribute;
///
/// let config = get_by_name("copy").unwrap();
/// assert_eq!(config.space.levels(Attribute::Cost), &[100, 250, 1250, 3500]);
/// assert_eq!(config.max_choices, Some(500_000));
/// ```
///
/// # Errors
///
/// Returns [`Error::UnknownPreset`] for any other name.
pub fn get_by_name(name: &str) -> Result<DesignConfig> {
    match name.to_lowercase().as_str() {
        "constraints" => constraints(),
        "copy" => copy(),
        _ => Err(Error::UnknownPreset {
            name: name.to_owned(),
            available: available_presets()
                .iter()
                .map(|(preset, _)| *preset)
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

/// List all available presets with a one-line description.
#[must_use]
pub fn available_presets() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "constraints",
            "levels 10-80, effects 1-3, cost 50-3500, exactly two shared groups",
        ),
        (
            "copy",
            "levels 30-80, effects 0-2, cost 100-3500, extremity guard, 500k sample",
        ),
    ]
}

/// The `constraints` preset.
///
/// # Errors
///
/// Never fails in practice; the level lists are fixed.
pub fn constraints() -> Result<DesignConfig> {
    let availability = vec![10, 30, 50, 80];
    let soil = vec![0, 10, 30, 50, 80];
    let effect = vec![1, 2, 3];

    let space = AttributeSpace::new([
        availability.clone(),
        availability,
        soil.clone(),
        effect.clone(),
        effect.clone(),
        soil,
        effect.clone(),
        effect,
        vec![50, 250, 1250, 3500],
    ])?;

    let baselines = BaselineTable::new()
        .with_group(AttributeGroup::SoilMoisture, 1)
        .with_group(AttributeGroup::SoilNutrition, 1)
        .with(Attribute::SoilMoistureAvailability, 0)
        .with(Attribute::SoilNutritionAvailability, 0);

    Ok(DesignConfig {
        baselines,
        rules: ChoiceRules {
            overlap: OverlapPolicy::ExactlyTwoGroups,
            dominance: true,
            extremity_guard: false,
        },
        id_column: IdColumn::ChoiceSetId,
        ..DesignConfig::new(space)
    })
}

/// The `copy` preset.
///
/// # Errors
///
/// Never fails in practice; the level lists are fixed.
pub fn copy() -> Result<DesignConfig> {
    let availability = vec![30, 50, 80];
    let soil = vec![0, 30, 50, 80];
    let effect = vec![0, 1, 2];

    let space = AttributeSpace::new([
        availability.clone(),
        availability,
        soil.clone(),
        effect.clone(),
        effect.clone(),
        soil,
        effect.clone(),
        effect,
        vec![100, 250, 1250, 3500],
    ])?;

    let baselines = BaselineTable::new()
        .with_group(AttributeGroup::SoilMoisture, 0)
        .with_group(AttributeGroup::SoilNutrition, 0);

    Ok(DesignConfig {
        baselines,
        rules: ChoiceRules {
            overlap: OverlapPolicy::ExactlyTwoGroups,
            dominance: true,
            extremity_guard: true,
        },
        max_choices: Some(COPY_MAX_CHOICES),
        id_column: IdColumn::ChoiceSituation,
        ..DesignConfig::new(space)
    })
}
