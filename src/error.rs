//! Error types shared by the calculators and their I/O helpers

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by interest calculations, rate loading, config and export
#[derive(Debug, Error)]
pub enum CalcError {
    /// Invalid value passed to a calculation (non-finite number, bad date, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// End of a date range falls before its start
    #[error("Invalid range: {end} is before {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// Rate table does not cover a requested year
    #[error("No interest rate for year {0}")]
    MissingRateYear(i32),

    /// Repeated key in a YAML mapping or rate table
    #[error("Duplicate key detected: {0}")]
    DuplicateKey(String),

    /// Unknown YAML helper mode
    #[error("Invalid mode: {0:?} (expected r, a or w)")]
    InvalidMode(String),

    /// Relative path did not resolve to an existing location
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Relative path resolved to both candidate locations
    #[error("Ambiguous path: {} and {} both exist", .first.display(), .second.display())]
    AmbiguousPath { first: PathBuf, second: PathBuf },

    /// Logger could not be installed
    #[error("Logger setup failed: {0}")]
    Logger(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, CalcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CalcError::MissingRateYear(2031);
        assert_eq!(err.to_string(), "No interest rate for year 2031");

        let err = CalcError::InvalidMode("x".to_string());
        assert_eq!(err.to_string(), "Invalid mode: \"x\" (expected r, a or w)");

        let err = CalcError::InvalidRange {
            start: NaiveDate::from_ymd_opt(2021, 4, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
        };
        assert_eq!(err.to_string(), "Invalid range: 2021-01-01 is before 2021-04-01");
    }
}
