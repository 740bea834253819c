//! In-memory tabular data.

use ndarray::{Array2, ArrayView1, Axis};

use crate::error::{Error, Result};

/// A numeric table with named columns.
///
/// Every CSV artifact the crate reads or writes passes through this type.
/// Values are stored as `f64` so that tables produced by external design tools
/// pass through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    header: Vec<String>,
    data: Array2<f64>,
}

impl Table {
    /// Create a table, validating that the header matches the data width.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of header entries differs from the
    /// number of data columns.
    pub fn new(header: Vec<String>, data: Array2<f64>) -> Result<Self> {
        if header.len() != data.ncols() {
            return Err(Error::DimensionMismatch {
                expected: format!("{} columns", header.len()),
                actual: format!("{} columns", data.ncols()),
            });
        }
        Ok(Self { header, data })
    }

    /// Create a table from rows of equal length.
    ///
    /// # Errors
    ///
    /// Returns an error if any row's length differs from the header's.
    pub fn from_rows(header: Vec<String>, rows: &[Vec<f64>]) -> Result<Self> {
        let width = header.len();
        let mut values = Vec::with_capacity(rows.len() * width);
        for (pos, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(Error::DimensionMismatch {
                    expected: format!("{width} values in row {}", pos + 1),
                    actual: format!("{} values", row.len()),
                });
            }
            values.extend_from_slice(row);
        }
        let data = Array2::from_shape_vec((rows.len(), width), values)
            .map_err(|e| Error::invalid_params(e.to_string()))?;
        Self::new(header, data)
    }

    pub(crate) fn from_parts(header: Vec<String>, data: Array2<f64>) -> Self {
        debug_assert_eq!(header.len(), data.ncols());
        Self { header, data }
    }

    /// Column names.
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// The data matrix, shape (rows, columns).
    #[must_use]
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Mutable access to the data matrix.
    pub fn data_mut(&mut self) -> &mut Array2<f64> {
        &mut self.data
    }

    /// Number of data rows.
    #[must_use]
    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns.
    #[must_use]
    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }

    /// Value at a position.
    ///
    /// # Panics
    ///
    /// Panics if the indices are out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[[row, col]]
    }

    /// A row as a view.
    #[must_use]
    pub fn row(&self, idx: usize) -> ArrayView1<'_, f64> {
        self.data.row(idx)
    }

    /// Position of a column by exact name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Position of a column, or a `MissingColumn` error.
    ///
    /// # Errors
    ///
    /// Returns an error if no column has this name.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| Error::missing_column(name))
    }

    /// A column by name.
    ///
    /// # Errors
    ///
    /// Returns an error if no column has this name.
    pub fn column(&self, name: &str) -> Result<ArrayView1<'_, f64>> {
        Ok(self.data.column(self.require_column(name)?))
    }

    /// A new table holding the given rows, in the given order.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds.
    #[must_use]
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            header: self.header.clone(),
            data: self.data.select(Axis(0), rows),
        }
    }
}
