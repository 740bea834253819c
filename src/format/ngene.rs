//! Modfed design → ngene evaluation layout.
//!
//! A modfed design has one row per alternative, a no-choice indicator column
//! and three-level effects split into two dummy flags. Ngene expects one row
//! per choice situation with each effect collapsed back into a single coded
//! column:
//!
//! | first flag | second flag | code |
//! |------------|-------------|------|
//! | 0          | 0           | 0    |
//! | 1          | 0           | 1    |
//! | 0          | 1           | 2    |

use ndarray::Array2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::long::{ALT1_PREFIX, ALT2_PREFIX, SITUATION_COLUMN};
use super::Table;

/// Default name of the no-choice indicator column.
pub const DEFAULT_NO_CHOICE_COLUMN: &str = "no.choice.cte";

/// One effect attribute encoded as a pair of dummy flags.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EffectCoding {
    /// Output column name (before the `altN.` prefix).
    pub name: String,
    /// Flag set when the effect takes code 1.
    pub first_flag: String,
    /// Flag set when the effect takes code 2.
    pub second_flag: String,
}

impl EffectCoding {
    /// Create an effect coding.
    pub fn new(
        name: impl Into<String>,
        first_flag: impl Into<String>,
        second_flag: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            first_flag: first_flag.into(),
            second_flag: second_flag.into(),
        }
    }

    /// Decode a flag pair into a level code, or `None` if the pair is invalid.
    #[must_use]
    pub fn decode(first: f64, second: f64) -> Option<u8> {
        match (first, second) {
            (a, b) if a == 0.0 && b == 0.0 => Some(0),
            (a, b) if a == 1.0 && b == 0.0 => Some(1),
            (a, b) if a == 0.0 && b == 1.0 => Some(2),
            _ => None,
        }
    }
}

/// Column layout of a modfed design.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NgeneSchema {
    /// Name of the no-choice indicator column.
    pub no_choice_column: String,
    /// Effect attributes to collapse, in output order.
    pub effects: Vec<EffectCoding>,
}

impl Default for NgeneSchema {
    fn default() -> Self {
        Self {
            no_choice_column: DEFAULT_NO_CHOICE_COLUMN.to_owned(),
            effects: vec![
                EffectCoding::new("SM_F", "smfq", "smfd"),
                EffectCoding::new("SM_C", "smcr", "smcc"),
                EffectCoding::new("SN_F", "snfm", "snfd"),
                EffectCoding::new("SN_C", "sncl", "sncc"),
            ],
        }
    }
}

impl NgeneSchema {
    /// Use a different no-choice indicator column.
    #[must_use]
    pub fn with_no_choice_column(mut self, name: impl Into<String>) -> Self {
        self.no_choice_column = name.into();
        self
    }

    fn is_flag(&self, column: &str) -> bool {
        self.effects
            .iter()
            .any(|e| e.first_flag == column || e.second_flag == column)
    }
}

/// Convert a modfed design to the ngene layout.
///
/// Rows whose indicator is 1 are dropped. The remaining rows pair up in
/// order as (alt1, alt2) of consecutive choice situations. Columns that are
/// neither the indicator nor an effect flag pass through unchanged; decoded
/// effects follow them. All output headers are lower case.
///
/// # Errors
///
/// Returns an error if a required column is missing, an indicator is not 0
/// or 1, a flag pair does not decode, or an odd number of alternatives
/// remains.
///
/// # Example
///
/// ```
/// use choiceset::format::{modfed_to_ngene, NgeneSchema, Table};
///
/// let schema = NgeneSchema {
///     effects: vec![choiceset::format::EffectCoding::new("SM_F", "smfq", "smfd")],
///     ..NgeneSchema::default()
/// };
/// let modfed = Table::from_rows(
///     vec!["no.choice.cte".into(), "wa".into(), "smfq".into(), "smfd".into()],
///     &[
///         vec![0.0, 30.0, 1.0, 0.0],
///         vec![0.0, 50.0, 0.0, 1.0],
///         vec![1.0, 0.0, 0.0, 0.0],
///     ],
/// )
/// .unwrap();
/// let ngene = modfed_to_ngene(&modfed, &schema).unwrap();
/// assert_eq!(
///     ngene.header(),
///     &["choice situation", "alt1.wa", "alt1.sm_f", "alt2.wa", "alt2.sm_f"]
/// );
/// assert_eq!(ngene.row(0).to_vec(), vec![1.0, 30.0, 1.0, 50.0, 2.0]);
/// ```
pub fn modfed_to_ngene(modfed: &Table, schema: &NgeneSchema) -> Result<Table> {
    let indicator = modfed.require_column(&schema.no_choice_column)?;
    let flags = schema
        .effects
        .iter()
        .map(|e| {
            Ok((
                modfed.require_column(&e.first_flag)?,
                modfed.require_column(&e.second_flag)?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    let passthrough: Vec<usize> = modfed
        .header()
        .iter()
        .enumerate()
        .filter(|(col, name)| *col != indicator && !schema.is_flag(name))
        .map(|(col, _)| col)
        .collect();

    let mut alternatives = Vec::with_capacity(modfed.nrows());
    for row in 0..modfed.nrows() {
        let flag = modfed.get(row, indicator);
        if flag == 1.0 {
            continue;
        }
        if flag != 0.0 {
            return Err(Error::InvalidNoChoiceFlag {
                row: row + 1,
                column: schema.no_choice_column.clone(),
                value: flag,
            });
        }
        alternatives.push(row);
    }

    if alternatives.len() % 2 != 0 {
        return Err(Error::DimensionMismatch {
            expected: "an even number of alternative rows".to_owned(),
            actual: format!("{} rows", alternatives.len()),
        });
    }

    let per_alt = passthrough.len() + flags.len();
    let mut header = Vec::with_capacity(1 + 2 * per_alt);
    header.push(SITUATION_COLUMN.to_owned());
    for prefix in [ALT1_PREFIX, ALT2_PREFIX] {
        for &col in &passthrough {
            header.push(format!("{prefix}{}", modfed.header()[col]).to_lowercase());
        }
        for effect in &schema.effects {
            header.push(format!("{prefix}{}", effect.name).to_lowercase());
        }
    }

    let situations = alternatives.len() / 2;
    let mut data = Array2::zeros((situations, 1 + 2 * per_alt));
    for (s, pair) in alternatives.chunks_exact(2).enumerate() {
        #[allow(clippy::cast_precision_loss)]
        {
            data[[s, 0]] = (s + 1) as f64;
        }
        for (alt, &row) in pair.iter().enumerate() {
            let base = 1 + alt * per_alt;
            for (k, &col) in passthrough.iter().enumerate() {
                data[[s, base + k]] = modfed.get(row, col);
            }
            for (k, (effect, &(c1, c2))) in schema.effects.iter().zip(&flags).enumerate() {
                let (first, second) = (modfed.get(row, c1), modfed.get(row, c2));
                let code = EffectCoding::decode(first, second).ok_or_else(|| {
                    Error::InvalidEffectFlags {
                        row: row + 1,
                        first_column: effect.first_flag.clone(),
                        second_column: effect.second_flag.clone(),
                        first,
                        second,
                    }
                })?;
                data[[s, base + passthrough.len() + k]] = f64::from(code);
            }
        }
    }

    log::info!("converted {situations} choice situations to ngene layout");
    Table::new(header, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modfed_header() -> Vec<String> {
        [
            "no.choice.cte", "wa", "ca", "sma", "smfq", "smfd", "smcr", "smcc", "sna", "snfm",
            "snfd", "sncl", "sncc", "cost",
        ]
        .iter()
        .map(|s| (*s).to_owned())
        .collect()
    }

    fn modfed() -> Table {
        Table::from_rows(
            modfed_header(),
            &[
                vec![0., 30., 50., 0., 0., 0., 0., 0., 30., 1., 0., 0., 1., 250.],
                vec![0., 30., 50., 30., 1., 0., 0., 1., 30., 1., 0., 0., 1., 1250.],
                vec![1., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0.],
                vec![0., 80., 30., 80., 0., 1., 1., 0., 0., 0., 0., 0., 0., 3500.],
                vec![0., 50., 30., 0., 0., 0., 0., 0., 50., 0., 1., 1., 0., 100.],
                vec![1., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0., 0.],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_decode() {
        assert_eq!(EffectCoding::decode(0.0, 0.0), Some(0));
        assert_eq!(EffectCoding::decode(1.0, 0.0), Some(1));
        assert_eq!(EffectCoding::decode(0.0, 1.0), Some(2));
        assert_eq!(EffectCoding::decode(1.0, 1.0), None);
        assert_eq!(EffectCoding::decode(0.5, 0.0), None);
    }

    #[test]
    fn test_modfed_to_ngene() {
        let ngene = modfed_to_ngene(&modfed(), &NgeneSchema::default()).unwrap();

        assert_eq!(ngene.nrows(), 2);
        assert_eq!(ngene.ncols(), 1 + 2 * 9);
        assert_eq!(
            &ngene.header()[..10],
            &[
                "choice situation",
                "alt1.wa",
                "alt1.ca",
                "alt1.sma",
                "alt1.sna",
                "alt1.cost",
                "alt1.sm_f",
                "alt1.sm_c",
                "alt1.sn_f",
                "alt1.sn_c",
            ]
        );
        assert_eq!(ngene.header()[10], "alt2.wa");

        assert_eq!(
            ngene.row(0).to_vec(),
            vec![
                1., 30., 50., 0., 30., 250., 0., 0., 1., 2., //
                30., 50., 30., 30., 1250., 1., 2., 1., 2.,
            ]
        );
        assert_eq!(
            ngene.row(1).to_vec(),
            vec![
                2., 80., 30., 80., 0., 3500., 2., 1., 0., 0., //
                50., 30., 0., 50., 100., 0., 0., 2., 1.,
            ]
        );
    }

    #[test]
    fn test_custom_no_choice_column() {
        let mut table = modfed();
        let mut header = table.header().to_vec();
        header[0] = "nc".to_owned();
        table = Table::new(header, table.data().clone()).unwrap();

        assert!(matches!(
            modfed_to_ngene(&table, &NgeneSchema::default()),
            Err(Error::MissingColumn { column }) if column == "no.choice.cte"
        ));
        let schema = NgeneSchema::default().with_no_choice_column("nc");
        assert_eq!(modfed_to_ngene(&table, &schema).unwrap().nrows(), 2);
    }

    #[test]
    fn test_invalid_indicator() {
        let mut table = modfed();
        table.data_mut()[[3, 0]] = 2.0;
        assert!(matches!(
            modfed_to_ngene(&table, &NgeneSchema::default()),
            Err(Error::InvalidNoChoiceFlag { row: 4, .. })
        ));
    }

    #[test]
    fn test_invalid_flags() {
        let mut table = modfed();
        table.data_mut()[[1, 6]] = 1.0;
        let err = modfed_to_ngene(&table, &NgeneSchema::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidEffectFlags { row: 2, ref first_column, .. } if first_column == "smcr"
        ));
    }

    #[test]
    fn test_odd_alternatives() {
        let mut table = modfed();
        table.data_mut()[[2, 0]] = 0.0;
        assert!(matches!(
            modfed_to_ngene(&table, &NgeneSchema::default()),
            Err(Error::DimensionMismatch { .. })
        ));
    }
}
