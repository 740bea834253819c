//! Wide candidate layout ↔ long "idefix" layout.
//!
//! The long layout stacks three rows per choice situation: the first
//! alternative, the second alternative and a synthetic no-choice alternative
//! with every attribute at zero. Columns carry the bare attribute names.

use ndarray::Array2;

use crate::error::{Error, Result};

use super::Table;

/// Column prefix of the first alternative.
pub const ALT1_PREFIX: &str = "alt1.";
/// Column prefix of the second alternative.
pub const ALT2_PREFIX: &str = "alt2.";
/// Header of the identifier column produced by [`long_to_wide`].
pub const SITUATION_COLUMN: &str = "choice situation";
/// Rows per choice situation in the long layout.
pub const ROWS_PER_SITUATION: usize = 3;

/// Convert a wide design to the long idefix layout.
///
/// Every `alt1.<name>` column must have a matching `alt2.<name>` column and
/// vice versa. Other columns (such as the identifier) are dropped.
///
/// # Errors
///
/// Returns an error if the table has no `alt1.` columns or the two
/// alternatives' columns do not match.
///
/// # Example
///
/// ```
/// use choiceset::format::{wide_to_long, Table};
///
/// let wide = Table::from_rows(
///     vec!["choice situation".into(), "alt1.W_A".into(), "alt2.W_A".into()],
///     &[vec![1.0, 30.0, 50.0]],
/// )
/// .unwrap();
/// let long = wide_to_long(&wide).unwrap();
/// assert_eq!(long.header(), &["W_A"]);
/// assert_eq!(long.data().column(0).to_vec(), vec![30.0, 50.0, 0.0]);
/// ```
pub fn wide_to_long(wide: &Table) -> Result<Table> {
    let mut names = Vec::new();
    let mut alt1_cols = Vec::new();
    for (col, name) in wide.header().iter().enumerate() {
        if let Some(attr) = name.strip_prefix(ALT1_PREFIX) {
            names.push(attr.to_owned());
            alt1_cols.push(col);
        }
    }
    if names.is_empty() {
        return Err(Error::missing_column(format!("{ALT1_PREFIX}*")));
    }

    let alt2_cols = names
        .iter()
        .map(|name| wide.require_column(&format!("{ALT2_PREFIX}{name}")))
        .collect::<Result<Vec<_>>>()?;

    for name in wide.header() {
        if let Some(attr) = name.strip_prefix(ALT2_PREFIX) {
            if !names.iter().any(|n| n == attr) {
                return Err(Error::missing_column(format!("{ALT1_PREFIX}{attr}")));
            }
        }
    }

    let rows = wide.nrows();
    let mut data = Array2::zeros((rows * ROWS_PER_SITUATION, names.len()));
    for r in 0..rows {
        let base = r * ROWS_PER_SITUATION;
        for (k, (&c1, &c2)) in alt1_cols.iter().zip(&alt2_cols).enumerate() {
            data[[base, k]] = wide.get(r, c1);
            data[[base + 1, k]] = wide.get(r, c2);
        }
        // Third row stays zero: the no-choice alternative
    }

    Table::new(names, data)
}

/// Convert a long idefix design back to the wide layout.
///
/// Every third row must be an all-zero no-choice row. The output starts with
/// a `choice situation` column numbered 1..K.
///
/// # Errors
///
/// Returns an error if the row count is not a multiple of three or a
/// no-choice row holds a non-zero value.
pub fn long_to_wide(long: &Table) -> Result<Table> {
    let rows = long.nrows();
    if rows % ROWS_PER_SITUATION != 0 {
        return Err(Error::DimensionMismatch {
            expected: format!("a multiple of {ROWS_PER_SITUATION} rows"),
            actual: format!("{rows} rows"),
        });
    }

    let width = long.ncols();
    let mut header = Vec::with_capacity(1 + 2 * width);
    header.push(SITUATION_COLUMN.to_owned());
    for prefix in [ALT1_PREFIX, ALT2_PREFIX] {
        header.extend(long.header().iter().map(|name| format!("{prefix}{name}")));
    }

    let situations = rows / ROWS_PER_SITUATION;
    let mut data = Array2::zeros((situations, 1 + 2 * width));
    for s in 0..situations {
        let base = s * ROWS_PER_SITUATION;
        if long.row(base + 2).iter().any(|&v| v != 0.0) {
            return Err(Error::NonZeroNoChoiceRow { row: base + 3 });
        }

        #[allow(clippy::cast_precision_loss)]
        {
            data[[s, 0]] = (s + 1) as f64;
        }
        for k in 0..width {
            data[[s, 1 + k]] = long.get(base, k);
            data[[s, 1 + width + k]] = long.get(base + 1, k);
        }
    }

    Table::new(header, data)
}
