//! Month arithmetic over first-of-month dates

use chrono::{Datelike, Months, NaiveDate};

use crate::error::{CalcError, Result};

/// Accepted input formats, tried in order
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d-%b-%Y", "%d-%B-%Y", "%Y/%m/%d"];

/// Parse a date such as `2020-05-01`, `1-may-2020` or `31-May-2023`
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .ok_or_else(|| CalcError::InvalidInput(format!("unrecognised date: {:?}", text)))
}

/// First day of the month containing `date`
pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Require `date` to be the first day of a month
pub fn ensure_month_start(date: NaiveDate, what: &str) -> Result<NaiveDate> {
    if date.day() == 1 {
        Ok(date)
    } else {
        Err(CalcError::InvalidInput(format!(
            "{} must be the first day of a month, got {}",
            what, date
        )))
    }
}

/// Shift a date by a signed number of months
pub fn add_months(date: NaiveDate, months: i32) -> Result<NaiveDate> {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months as u32))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.ok_or_else(|| CalcError::InvalidInput(format!("{} + {} months is out of range", date, months)))
}

/// Month starts in the half-open range `[start, end)`
///
/// `start` must itself be a month start. Empty when `end <= start`.
pub fn month_starts(start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>> {
    ensure_month_start(start, "start date")?;

    let mut months = Vec::new();
    let mut current = start;
    while current < end {
        months.push(current);
        current = add_months(current, 1)?;
    }
    Ok(months)
}

/// Number of month starts in `[start, end)`, zero when `end` precedes `start`
pub fn months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if end <= start {
        return 0;
    }
    let whole = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    // A partial month at the end still contains its month start
    let whole = if end.day() > start.day() { whole + 1 } else { whole };
    whole.max(0) as u32
}
