//! Split a retroactive period into months per calendar year

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::dates::{ensure_month_start, month_starts};
use crate::error::{CalcError, Result};

/// Number of months of a period falling in each calendar year
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Breakdown {
    months: BTreeMap<i32, u32>,
}

impl Breakdown {
    /// Months in `year`, zero if the period does not touch it
    pub fn months_in(&self, year: i32) -> u32 {
        self.months.get(&year).copied().unwrap_or(0)
    }

    /// Total months across all years
    pub fn total_months(&self) -> u32 {
        self.months.values().sum()
    }

    /// Number of distinct years spanned
    pub fn num_years(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn first_year(&self) -> Option<i32> {
        self.months.keys().next().copied()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.months.keys().next_back().copied()
    }

    /// (year, months) in chronological order
    pub fn iter(&self) -> impl Iterator<Item = (i32, u32)> + '_ {
        self.months.iter().map(|(y, m)| (*y, *m))
    }
}

/// Months per year in `[dor, pmt_date)`
///
/// Both dates must be month starts. Equal dates give an empty breakdown; a
/// payment date before the DOR is an error.
pub fn get_breakdown(dor: NaiveDate, pmt_date: NaiveDate) -> Result<Breakdown> {
    ensure_month_start(dor, "date of retroactivity")?;
    ensure_month_start(pmt_date, "payment date")?;
    if pmt_date < dor {
        return Err(CalcError::InvalidRange {
            start: dor,
            end: pmt_date,
        });
    }

    let mut months = BTreeMap::new();
    for month in month_starts(dor, pmt_date)? {
        *months.entry(month.year()).or_insert(0) += 1;
    }
    Ok(Breakdown { months })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::months_between;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_year() {
        let breakdown = get_breakdown(ymd(2021, 1, 1), ymd(2021, 4, 1)).unwrap();
        assert_eq!(breakdown.num_years(), 1);
        assert_eq!(breakdown.months_in(2021), 3);
    }

    #[test]
    fn test_multi_year() {
        let breakdown = get_breakdown(ymd(2019, 10, 1), ymd(2021, 3, 1)).unwrap();
        let pairs: Vec<_> = breakdown.iter().collect();
        assert_eq!(pairs, vec![(2019, 3), (2020, 12), (2021, 2)]);
        assert_eq!(breakdown.first_year(), Some(2019));
        assert_eq!(breakdown.last_year(), Some(2021));
    }

    #[test]
    fn test_total_matches_month_count() {
        let cases = [
            (ymd(2009, 1, 1), ymd(2023, 12, 1)),
            (ymd(2015, 7, 1), ymd(2016, 1, 1)),
            (ymd(2020, 12, 1), ymd(2021, 1, 1)),
        ];
        for (dor, pmt_date) in cases {
            let breakdown = get_breakdown(dor, pmt_date).unwrap();
            assert_eq!(breakdown.total_months(), months_between(dor, pmt_date));
        }
    }

    #[test]
    fn test_payment_in_dor_month_is_empty() {
        let breakdown = get_breakdown(ymd(2021, 3, 1), ymd(2021, 3, 1)).unwrap();
        assert!(breakdown.is_empty());
        assert_eq!(breakdown.total_months(), 0);
    }

    #[test]
    fn test_reversed_range_fails() {
        let result = get_breakdown(ymd(2021, 4, 1), ymd(2021, 1, 1));
        assert!(matches!(result, Err(CalcError::InvalidRange { .. })));
    }

    #[test]
    fn test_mid_month_rejected() {
        assert!(get_breakdown(ymd(2021, 1, 15), ymd(2021, 4, 1)).is_err());
        assert!(get_breakdown(ymd(2021, 1, 1), ymd(2021, 4, 30)).is_err());
    }
}
