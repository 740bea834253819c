//! Error types for the choiceset library.
//!
//! This module provides error handling using the `thiserror` crate, with
//! specific variants for configuration problems (caught before enumeration
//! starts), malformed tabular input during reformatting, and IO.

use thiserror::Error;

use crate::space::{Attribute, AttributeGroup, Level};

/// The main error type for the choiceset library.
#[derive(Error, Debug)]
pub enum Error {
    // ============ Configuration Errors ============
    /// An attribute was declared without any levels.
    #[error("attribute {attribute} has no levels")]
    EmptyLevels {
        /// The offending attribute.
        attribute: Attribute,
    },

    /// An attribute lists the same level twice.
    #[error("attribute {attribute} declares level {level} more than once")]
    DuplicateLevel {
        /// The offending attribute.
        attribute: Attribute,
        /// The repeated level.
        level: Level,
    },

    /// An attribute of the catalog is missing from a level table.
    #[error("attribute {0} is missing from the attribute space")]
    MissingAttribute(Attribute),

    /// A baseline value is not one of the attribute's declared levels.
    #[error("baseline {baseline} for attribute {attribute} is not a declared level")]
    UnknownBaseline {
        /// The attribute whose baseline is invalid.
        attribute: Attribute,
        /// The configured baseline.
        baseline: Level,
    },

    /// Only some members of an attribute group were given a baseline.
    #[error("attribute group {group} has a baseline for some members but not all")]
    IncompleteBaselineGroup {
        /// The partially configured group.
        group: AttributeGroup,
    },

    /// No preset exists with the requested name.
    #[error("unknown preset '{name}' (available: {available})")]
    UnknownPreset {
        /// The requested name.
        name: String,
        /// Comma-separated names of the known presets.
        available: String,
    },

    /// Invalid parameters.
    #[error("invalid parameters: {message}")]
    InvalidParams {
        /// Description of what is invalid.
        message: String,
    },

    // ============ Input Format Errors ============
    /// A required column is absent from a table.
    #[error("missing column '{column}'")]
    MissingColumn {
        /// Name of the missing column.
        column: String,
    },

    /// A cell could not be parsed as a number.
    #[error("row {row}, column '{column}': cannot parse '{value}' as a number")]
    MalformedCell {
        /// 1-based data row.
        row: usize,
        /// Column name.
        column: String,
        /// Raw cell contents.
        value: String,
    },

    /// The no-choice indicator holds something other than 0 or 1.
    #[error("row {row}, column '{column}': no-choice indicator must be 0 or 1, got {value}")]
    InvalidNoChoiceFlag {
        /// 1-based data row.
        row: usize,
        /// Indicator column name.
        column: String,
        /// The unexpected value.
        value: f64,
    },

    /// A pair of effect flags does not encode a valid level.
    #[error("row {row}: effect flags ({first_column}={first}, {second_column}={second}) do not encode a level")]
    InvalidEffectFlags {
        /// 1-based data row.
        row: usize,
        /// Name of the first flag column.
        first_column: String,
        /// Name of the second flag column.
        second_column: String,
        /// Value of the first flag.
        first: f64,
        /// Value of the second flag.
        second: f64,
    },

    /// A no-choice row in a long design holds non-zero values.
    #[error("row {row}: expected an all-zero no-choice row")]
    NonZeroNoChoiceRow {
        /// 1-based data row.
        row: usize,
    },

    /// Table dimensions are inconsistent.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension description.
        expected: String,
        /// Actual dimension description.
        actual: String,
    },

    // ============ IO Errors ============
    /// Reading or writing a file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV layer reported an error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// A specialized `Result` type for choiceset operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Create a new `InvalidParams` error.
    #[must_use]
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    /// Create a new `MissingColumn` error.
    #[must_use]
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    /// Whether this error was raised while validating configuration.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyLevels { .. }
                | Self::DuplicateLevel { .. }
                | Self::MissingAttribute(_)
                | Self::UnknownBaseline { .. }
                | Self::IncompleteBaselineGroup { .. }
                | Self::UnknownPreset { .. }
                | Self::InvalidParams { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::EmptyLevels {
            attribute: Attribute::Cost,
        };
        assert!(err.to_string().contains("C"));
        assert!(err.to_string().contains("no levels"));

        let err = Error::UnknownBaseline {
            attribute: Attribute::SoilMoistureFrequency,
            baseline: 7,
        };
        assert!(err.to_string().contains("SM_F"));
        assert!(err.to_string().contains('7'));

        let err = Error::InvalidEffectFlags {
            row: 4,
            first_column: "smfq".into(),
            second_column: "smfd".into(),
            first: 1.0,
            second: 1.0,
        };
        assert!(err.to_string().contains("row 4"));
        assert!(err.to_string().contains("smfq"));
        assert!(err.to_string().contains("smfd"));
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::invalid_params("bad").is_config_error());
        assert!(Error::UnknownPreset {
            name: "nope".into(),
            available: String::new(),
        }
        .is_config_error());
        assert!(!Error::missing_column("alt1.W_A").is_config_error());
        assert!(!Error::NonZeroNoChoiceRow { row: 3 }.is_config_error());
    }
}
