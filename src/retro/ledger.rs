//! Month-by-month retro ledger

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::breakdown::get_breakdown;
use crate::dates::month_starts;
use crate::error::Result;
use crate::rates::RateTable;
use crate::rounding::fix_round;
use crate::schedule::AmountSchedule;

/// One month of a retro ledger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetroRow {
    pub month: NaiveDate,
    /// Pension amount payable for the month
    pub monthly_amt: f64,
    /// 1 + monthly rate for the month's year
    pub monthly_rate: f64,
    /// Product of `monthly_rate` from this month through the last month
    pub accum_rate: f64,
    pub monthly_pen_w_int: f64,
}

/// Per-month working for a retro payment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetroLedger {
    pub dor: NaiveDate,
    pub pmt_date: NaiveDate,
    pub rows: Vec<RetroRow>,
}

impl RetroLedger {
    /// Payment plus interest, rounded to cents
    pub fn total(&self) -> Result<f64> {
        fix_round(self.unrounded_total(), 2)
    }

    pub fn unrounded_total(&self) -> f64 {
        self.rows.iter().map(|r| r.monthly_pen_w_int).sum()
    }

    /// Sum of amounts before interest
    pub fn nominal(&self) -> f64 {
        self.rows.iter().map(|r| r.monthly_amt).sum()
    }

    /// Interest portion of the total
    pub fn interest(&self) -> f64 {
        self.unrounded_total() - self.nominal()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Build the retro ledger for `[dor, pmt_date)`
///
/// `monthly_pmt` applies until the first change in `schedule`.
pub fn calc_retro(
    dor: NaiveDate,
    pmt_date: NaiveDate,
    monthly_pmt: f64,
    rates: &RateTable,
    schedule: &AmountSchedule,
) -> Result<RetroLedger> {
    // Validates both dates and the ordering
    get_breakdown(dor, pmt_date)?;
    let months = month_starts(dor, pmt_date)?;

    let mut factors = Vec::with_capacity(months.len());
    for month in &months {
        factors.push(1.0 + rates.monthly_rate(month.year())?);
    }

    // Suffix products: accum[i] = factors[i] * factors[i + 1] * ... * factors[n - 1]
    let mut accum = vec![1.0; months.len()];
    let mut running = 1.0;
    for i in (0..months.len()).rev() {
        running *= factors[i];
        accum[i] = running;
    }

    let rows: Vec<RetroRow> = months
        .iter()
        .zip(factors.iter().zip(accum.iter()))
        .map(|(&month, (&monthly_rate, &accum_rate))| {
            let monthly_amt = schedule.amount_for(month, monthly_pmt);
            RetroRow {
                month,
                monthly_amt,
                monthly_rate,
                accum_rate,
                monthly_pen_w_int: monthly_amt * accum_rate,
            }
        })
        .collect();

    log::debug!("retro ledger {} -> {}: {} rows", dor, pmt_date, rows.len());
    Ok(RetroLedger { dor, pmt_date, rows })
}
