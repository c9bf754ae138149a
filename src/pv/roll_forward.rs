//! Roll a PV forward month by month

use chrono::NaiveDate;
use serde::Serialize;

use super::calc::PvWorkTable;
use crate::dates::{add_months, first_day_of_month, months_between};
use crate::error::{CalcError, Result};
use crate::rounding::fix_round;

/// Months projected by default
pub const DEFAULT_ROLL_FORWARD_MONTHS: u32 = 60;

/// Reduced payout share (bridge/survivor reduction)
pub const DEFAULT_REDUCED_PCT: f64 = 0.71;

/// First month of the projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollForwardStart {
    /// First day of the month containing the calculation date
    #[default]
    CurrentMonth,
    /// Frozen start for a point-in-time recalculation
    Fixed(NaiveDate),
}

impl RollForwardStart {
    /// Resolve to a month start given today's date
    pub fn resolve(&self, today: NaiveDate) -> NaiveDate {
        match self {
            RollForwardStart::CurrentMonth => first_day_of_month(today),
            RollForwardStart::Fixed(date) => first_day_of_month(*date),
        }
    }
}

/// Roll-forward projection settings
#[derive(Debug, Clone, PartialEq)]
pub struct RollForwardConfig {
    pub start: RollForwardStart,
    /// Number of monthly rows to project
    pub months: u32,
    /// Share of the full amount reported in the reduced column
    pub reduced_pct: f64,
}

impl Default for RollForwardConfig {
    fn default() -> Self {
        Self {
            start: RollForwardStart::CurrentMonth,
            months: DEFAULT_ROLL_FORWARD_MONTHS,
            reduced_pct: DEFAULT_REDUCED_PCT,
        }
    }
}

/// PV projected to one payment date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollForwardRow {
    pub pmt_date: NaiveDate,
    /// Months from the first payment date up to (not including) `pmt_date`
    pub num_months: u32,
    pub amt_100pct: f64,
    pub amt_reduced: f64,
}

/// Projected PV for each month of the roll-forward window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollForwardTable {
    pub pv: f64,
    pub monthly_rate: f64,
    pub reduced_pct: f64,
    pub rows: Vec<RollForwardRow>,
}

/// Project the rounded PV of `work` forward per `config`
pub fn roll_forward(
    work: &PvWorkTable,
    config: &RollForwardConfig,
    today: NaiveDate,
) -> Result<RollForwardTable> {
    if !(config.reduced_pct.is_finite() && config.reduced_pct >= 0.0) {
        return Err(CalcError::InvalidInput(format!(
            "reduced percentage {} must be a non-negative number",
            config.reduced_pct
        )));
    }

    let pv = work.pv_rounded()?;
    let start = config.start.resolve(today);

    let mut rows = Vec::with_capacity(config.months as usize);
    for offset in 0..config.months {
        let pmt_date = add_months(start, offset as i32)?;
        let num_months = months_between(work.first_pmt_date, pmt_date);
        let amt_100pct = fix_round(pv * (1.0 + work.monthly_rate).powi(num_months as i32), 2)?;
        let amt_reduced = fix_round(amt_100pct * config.reduced_pct, 2)?;
        rows.push(RollForwardRow {
            pmt_date,
            num_months,
            amt_100pct,
            amt_reduced,
        });
    }

    log::debug!("rolled pv {} forward {} months from {}", pv, config.months, start);
    Ok(RollForwardTable {
        pv,
        monthly_rate: work.monthly_rate,
        reduced_pct: config.reduced_pct,
        rows,
    })
}
