//! Choice sets and designs.
//!
//! ## Overview
//!
//! - [`ChoiceSet`]: two alternatives presented together, with a 1-based
//!   "choice situation" identifier
//! - [`Design`]: an ordered list of choice sets with contiguous identifiers
//! - [`IdColumn`]: the header used for the identifier column on disk
//!
//! A design flattens to the wide candidate layout: the identifier column,
//! then `alt1.<code>` for every attribute, then `alt2.<code>`.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::format::Table;
use crate::space::{Attribute, Level, Profile, ATTRIBUTE_COUNT};

/// Number of columns in a wide candidate row.
pub const WIDE_COLUMNS: usize = 1 + 2 * ATTRIBUTE_COUNT;

/// Name of the identifier column in wide output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IdColumn {
    /// `ChoiceSetID`
    ChoiceSetId,
    /// `choice situation`
    #[default]
    ChoiceSituation,
}

impl IdColumn {
    /// Header text for this column.
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::ChoiceSetId => "ChoiceSetID",
            Self::ChoiceSituation => "choice situation",
        }
    }
}

impl fmt::Display for IdColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// Column name of an attribute for one alternative, e.g. `alt2.SM_F`.
#[must_use]
pub fn alt_column(alternative: usize, attr: Attribute) -> String {
    format!("alt{alternative}.{}", attr.code())
}

/// Full wide header for the given identifier column.
#[must_use]
pub fn wide_header(id: IdColumn) -> Vec<String> {
    let mut header = Vec::with_capacity(WIDE_COLUMNS);
    header.push(id.header().to_owned());
    for alternative in 1..=2 {
        header.extend(Attribute::ALL.iter().map(|&attr| alt_column(alternative, attr)));
    }
    header
}

/// Two alternatives presented as one decision task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChoiceSet {
    /// 1-based choice situation identifier.
    pub situation: u64,
    /// First alternative.
    pub alt1: Profile,
    /// Second alternative.
    pub alt2: Profile,
}

impl ChoiceSet {
    /// Create a choice set.
    #[must_use]
    pub const fn new(situation: u64, alt1: Profile, alt2: Profile) -> Self {
        Self {
            situation,
            alt1,
            alt2,
        }
    }

    /// The wide row: identifier, alt1 levels, alt2 levels.
    #[must_use]
    pub fn wide_row(&self) -> [i64; WIDE_COLUMNS] {
        let mut row = [0i64; WIDE_COLUMNS];
        row[0] = i64::try_from(self.situation).unwrap_or(i64::MAX);
        for (pos, &level) in self.alt1.levels().iter().enumerate() {
            row[1 + pos] = i64::from(level);
        }
        for (pos, &level) in self.alt2.levels().iter().enumerate() {
            row[1 + ATTRIBUTE_COUNT + pos] = i64::from(level);
        }
        row
    }
}

/// An ordered sequence of choice sets numbered 1..N.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Design {
    choice_sets: Vec<ChoiceSet>,
}

impl Design {
    /// Create an empty design.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a design from choice sets, renumbering them 1..N in order.
    #[must_use]
    pub fn from_choice_sets(choice_sets: Vec<ChoiceSet>) -> Self {
        let mut design = Self { choice_sets };
        design.renumber();
        design
    }

    /// Append a pair as the next choice situation and return its identifier.
    pub fn push(&mut self, alt1: Profile, alt2: Profile) -> u64 {
        let situation = self.choice_sets.len() as u64 + 1;
        self.choice_sets.push(ChoiceSet::new(situation, alt1, alt2));
        situation
    }

    /// Number of choice sets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.choice_sets.len()
    }

    /// Whether the design holds no choice sets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.choice_sets.is_empty()
    }

    /// The choice sets in order.
    #[must_use]
    pub fn choice_sets(&self) -> &[ChoiceSet] {
        &self.choice_sets
    }

    /// Consume the design, returning its choice sets.
    #[must_use]
    pub fn into_choice_sets(self) -> Vec<ChoiceSet> {
        self.choice_sets
    }

    /// Iterate over the choice sets.
    pub fn iter(&self) -> std::slice::Iter<'_, ChoiceSet> {
        self.choice_sets.iter()
    }

    /// Renumber identifiers 1..N in the current order.
    pub fn renumber(&mut self) {
        for (pos, cs) in self.choice_sets.iter_mut().enumerate() {
            cs.situation = pos as u64 + 1;
        }
    }

    /// Whether identifiers are exactly 1..N in order.
    #[must_use]
    pub fn is_contiguous(&self) -> bool {
        self.choice_sets
            .iter()
            .enumerate()
            .all(|(pos, cs)| cs.situation == pos as u64 + 1)
    }

    /// Flatten to the wide candidate table.
    #[must_use]
    pub fn to_wide_table(&self, id: IdColumn) -> Table {
        let rows: Vec<[i64; WIDE_COLUMNS]> = self.iter().map(ChoiceSet::wide_row).collect();
        #[allow(clippy::cast_precision_loss)]
        let data = ndarray::Array2::from_shape_fn((rows.len(), WIDE_COLUMNS), |(r, c)| {
            rows[r][c] as f64
        });
        Table::from_parts(wide_header(id), data)
    }

    /// Rebuild a design from a wide candidate table.
    ///
    /// The first column is taken as the identifier; attribute columns are
    /// located by name, so their order does not matter. Identifiers are
    /// renumbered 1..N.
    ///
    /// # Errors
    ///
    /// Returns an error if an `alt1.`/`alt2.` column is missing or a value is
    /// not an integer level.
    pub fn from_wide_table(table: &Table) -> Result<Self> {
        let mut columns = [[0usize; ATTRIBUTE_COUNT]; 2];
        for (alt, cols) in columns.iter_mut().enumerate() {
            for attr in Attribute::ALL {
                cols[attr.index()] = table.require_column(&alt_column(alt + 1, attr))?;
            }
        }

        let mut choice_sets = Vec::with_capacity(table.nrows());
        for row in 0..table.nrows() {
            let mut alts = [Profile::new([0; ATTRIBUTE_COUNT]); 2];
            for (alt, cols) in columns.iter().enumerate() {
                let mut levels = [0 as Level; ATTRIBUTE_COUNT];
                for (slot, &col) in levels.iter_mut().zip(cols.iter()) {
                    *slot = integral_level(table, row, col)?;
                }
                alts[alt] = Profile::new(levels);
            }
            choice_sets.push(ChoiceSet::new(0, alts[0], alts[1]));
        }

        Ok(Self::from_choice_sets(choice_sets))
    }
}

fn integral_level(table: &Table, row: usize, col: usize) -> Result<Level> {
    let value = table.get(row, col);
    #[allow(clippy::cast_possible_truncation)]
    let level = value as Level;
    if value.fract() != 0.0 || f64::from(level) != value {
        return Err(Error::MalformedCell {
            row: row + 1,
            column: table.header()[col].clone(),
            value: value.to_string(),
        });
    }
    Ok(level)
}

impl<'a> IntoIterator for &'a Design {
    type Item = &'a ChoiceSet;
    type IntoIter = std::slice::Iter<'a, ChoiceSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.choice_sets.iter()
    }
}

impl IntoIterator for Design {
    type Item = ChoiceSet;
    type IntoIter = std::vec::IntoIter<ChoiceSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.choice_sets.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (Profile, Profile) {
        (
            Profile::new([30, 30, 30, 2, 2, 50, 2, 2, 250]),
            Profile::new([30, 30, 50, 1, 2, 30, 2, 1, 1250]),
        )
    }

    #[test]
    fn test_wide_header() {
        let header = wide_header(IdColumn::ChoiceSetId);
        assert_eq!(header.len(), WIDE_COLUMNS);
        assert_eq!(header[0], "ChoiceSetID");
        assert_eq!(header[1], "alt1.W_A");
        assert_eq!(header[9], "alt1.C");
        assert_eq!(header[10], "alt2.W_A");
        assert_eq!(header[18], "alt2.C");
        assert_eq!(wide_header(IdColumn::ChoiceSituation)[0], "choice situation");
    }

    #[test]
    fn test_push_and_renumber() {
        let (a, b) = pair();
        let mut design = Design::new();
        assert_eq!(design.push(a, b), 1);
        assert_eq!(design.push(b, a), 2);
        assert!(design.is_contiguous());

        let mut sets = design.into_choice_sets();
        sets.swap(0, 1);
        assert_eq!(sets[0].situation, 2);
        let design = Design::from_choice_sets(sets);
        assert!(design.is_contiguous());
        assert_eq!(design.choice_sets()[0].alt1, b);
    }

    #[test]
    fn test_wide_row() {
        let (a, b) = pair();
        let row = ChoiceSet::new(7, a, b).wide_row();
        assert_eq!(row[0], 7);
        assert_eq!(&row[1..10], &[30, 30, 30, 2, 2, 50, 2, 2, 250]);
        assert_eq!(&row[10..], &[30, 30, 50, 1, 2, 30, 2, 1, 1250]);
    }

    #[test]
    fn test_wide_table_round_trip() {
        let (a, b) = pair();
        let mut design = Design::new();
        design.push(a, b);
        design.push(b, a.with(Attribute::Cost, 3500));

        let table = design.to_wide_table(IdColumn::ChoiceSetId);
        assert_eq!(table.nrows(), 2);
        assert_eq!(table.ncols(), WIDE_COLUMNS);
        assert_eq!(table.get(1, 0), 2.0);
        assert_eq!(table.get(1, 18), 3500.0);

        let back = Design::from_wide_table(&table).unwrap();
        assert_eq!(back, design);
    }

    #[test]
    fn test_from_wide_table_rejects_fractional_levels() {
        let (a, b) = pair();
        let mut design = Design::new();
        design.push(a, b);
        let mut table = design.to_wide_table(IdColumn::ChoiceSituation);
        table.data_mut()[[0, 3]] = 0.5;
        assert!(matches!(
            Design::from_wide_table(&table),
            Err(Error::MalformedCell { row: 1, .. })
        ));
    }
}
