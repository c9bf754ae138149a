//! CSV-based rate table loader
//!
//! Expects a header row with a `Year` column and a rate column. The rate
//! column depends on the basis: `Monthly Interest Rate` or `Annual Rate`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::Reader;

use super::table::{RateBasis, RateTable};
use crate::error::{CalcError, Result};

/// Default path to the shipped rate table
pub const DEFAULT_RATES_PATH: &str = "data/int_rates.csv";

const YEAR_COLUMN: &str = "Year";

fn rate_column(basis: RateBasis) -> &'static str {
    match basis {
        RateBasis::AnnualPercent => "Annual Rate",
        RateBasis::MonthlyDecimal => "Monthly Interest Rate",
    }
}

/// Load a rate table from a CSV file
pub fn load_rates<P: AsRef<Path>>(path: P, basis: RateBasis) -> Result<RateTable> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        CalcError::InvalidPath(format!("cannot open rate table {}: {}", path.display(), e))
    })?;
    load_rates_from_reader(file, basis)
}

/// Load a rate table from any reader (e.g., string buffer)
pub fn load_rates_from_reader<R: Read>(reader: R, basis: RateBasis) -> Result<RateTable> {
    let mut csv_reader = Reader::from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| CalcError::InvalidInput(format!("rate table has no {:?} column", name)))
    };
    let year_idx = column(YEAR_COLUMN)?;
    let rate_idx = column(rate_column(basis))?;

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        let year: i32 = parse_cell(&record, year_idx)?;
        let rate: f64 = parse_cell(&record, rate_idx)?;
        rows.push((year, rate));
    }

    let table = RateTable::new(basis, rows)?;
    match table.span() {
        Some((first, last)) => log::info!("Loaded rates for {} to {}", first, last),
        None => log::warn!("Rate table is empty"),
    }
    Ok(table)
}

fn parse_cell<T: std::str::FromStr>(record: &csv::StringRecord, idx: usize) -> Result<T> {
    let cell = record.get(idx).unwrap_or("").trim();
    cell.parse().map_err(|_| {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        CalcError::InvalidInput(format!("bad value {:?} on line {}", cell, line))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Year,Annual Rate,Monthly Interest Rate
2020,0.98,0.0008130212763268752
2021,0.75,0.0006228618011265841
";

    #[test]
    fn test_load_monthly_column() {
        let table = load_rates_from_reader(SAMPLE.as_bytes(), RateBasis::MonthlyDecimal).unwrap();
        assert_eq!(table.span(), Some((2020, 2021)));
        assert_eq!(table.monthly_rate(2021).unwrap(), 0.0006228618011265841);
    }

    #[test]
    fn test_load_annual_column() {
        let table = load_rates_from_reader(SAMPLE.as_bytes(), RateBasis::AnnualPercent).unwrap();
        assert_eq!(table.raw_rate(2020).unwrap(), 0.98);
        assert!((table.monthly_rate(2020).unwrap() - 0.0008130212763268752).abs() < 1e-15);
    }

    #[test]
    fn test_missing_column() {
        let data = "Year,Rate\n2020,1.0\n";
        let result = load_rates_from_reader(data.as_bytes(), RateBasis::AnnualPercent);
        assert!(matches!(result, Err(CalcError::InvalidInput(_))));
    }

    #[test]
    fn test_malformed_value() {
        let data = "Year,Annual Rate\n2020,abc\n";
        assert!(load_rates_from_reader(data.as_bytes(), RateBasis::AnnualPercent).is_err());
    }

    #[test]
    fn test_repeated_year() {
        let data = "Year,Annual Rate\n2020,1.0\n2020,1.1\n";
        let result = load_rates_from_reader(data.as_bytes(), RateBasis::AnnualPercent);
        assert!(matches!(result, Err(CalcError::DuplicateKey(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = load_rates("does/not/exist.csv", RateBasis::AnnualPercent);
        assert!(matches!(result, Err(CalcError::InvalidPath(_))));
    }

    #[test]
    fn test_load_shipped_table() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_RATES_PATH);
        let table = load_rates(&path, RateBasis::MonthlyDecimal).unwrap();
        assert_eq!(table.span(), Some((2009, 2023)));

        let annual = load_rates(&path, RateBasis::AnnualPercent).unwrap();
        assert_eq!(annual, RateTable::cansim_b14045());
    }
}
