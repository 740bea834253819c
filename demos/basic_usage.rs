//! Basic usage example for the choiceset library.
//!
//! This example generates a small candidate design, checks it against the
//! choice set rules and converts it between the wide and long layouts.

use choiceset::design::IdColumn;
use choiceset::filter::{BaselineTable, GroupOverlap};
use choiceset::format::{long_to_wide, wide_to_long};
use choiceset::space::{AttributeGroup, AttributeSpace};
use choiceset::{DesignBuilder, DesignConfig};

fn main() {
    println!("Choiceset Library - Basic Usage Example\n");

    // Two levels per attribute keeps the example fast
    let space = AttributeSpace::new([
        vec![30, 80],
        vec![30, 80],
        vec![0, 50],
        vec![0, 2],
        vec![0, 2],
        vec![0, 50],
        vec![0, 2],
        vec![0, 2],
        vec![100, 3500],
    ])
    .expect("Failed to build attribute space");

    println!("Attribute space:");
    println!("  {space}");
    println!("  Full factorial: {} profiles", space.full_factorial_size());
    println!();

    let mut config = DesignConfig::new(space);
    config.baselines = BaselineTable::new()
        .with_group(AttributeGroup::SoilMoisture, 0)
        .with_group(AttributeGroup::SoilNutrition, 0);
    config.rules.extremity_guard = true;

    println!("Generating all valid choice sets...");
    let design = DesignBuilder::new()
        .config(config.clone())
        .build()
        .expect("Failed to generate design");
    println!("  Accepted: {} choice sets", design.len());

    let filter = config.choice_filter();
    for cs in design.iter().take(3) {
        let shared: Vec<_> = GroupOverlap::between(&cs.alt1, &cs.alt2)
            .groups()
            .map(|g| g.name())
            .collect();
        println!("  #{}: shares {}", cs.situation, shared.join(" + "));
        println!("      alt1: {}", cs.alt1);
        println!("      alt2: {}", cs.alt2);
    }

    if design.iter().all(|cs| filter.accepts(&cs.alt1, &cs.alt2)) {
        println!("✓ Every choice set passes the filter");
    }
    println!();

    println!("Sampling 20 choice sets with seed 7...");
    config.max_choices = Some(20);
    config.seed = Some(7);
    let sample = choiceset::build_design(&config).expect("Failed to sample design");
    println!("  Sampled: {} (identifiers 1..{})", sample.len(), sample.len());
    println!();

    println!("Converting to the long idefix layout...");
    let wide = sample.to_wide_table(IdColumn::ChoiceSituation);
    let long = wide_to_long(&wide).expect("Failed to convert to long");
    println!("  Wide: {} rows x {} columns", wide.nrows(), wide.ncols());
    println!("  Long: {} rows x {} columns", long.nrows(), long.ncols());

    let back = long_to_wide(&long).expect("Failed to convert back");
    if back == wide {
        println!("✓ Long layout converts back to the same wide design");
    }
}
