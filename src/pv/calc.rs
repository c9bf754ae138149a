//! PV work table

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates::{add_months, ensure_month_start};
use crate::error::{CalcError, Result};
use crate::rates::monthly_compounded_rate;
use crate::rounding::fix_round;
use crate::schedule::AmountSchedule;

/// One payment in the PV working
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PvRow {
    pub pmt_no: u32,
    pub month: NaiveDate,
    /// Growth factor paired with this payment; the first payment carries the
    /// largest factor `(1 + rate)^N`, the last carries `(1 + rate)`
    pub compounded_int: f64,
    pub amt: f64,
    pub mult: f64,
}

/// Working for a PV calculation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PvWorkTable {
    pub first_pmt_date: NaiveDate,
    pub annual_rate_pct: f64,
    /// Monthly effective rate
    pub monthly_rate: f64,
    pub num_periods: u32,
    /// Unrounded present value
    pub pv: f64,
    pub rows: Vec<PvRow>,
}

impl PvWorkTable {
    /// PV rounded to cents
    pub fn pv_rounded(&self) -> Result<f64> {
        fix_round(self.pv, 2)
    }

    /// Value of the stream accumulated to one month after the last payment
    pub fn accumulated(&self) -> f64 {
        self.rows.iter().map(|r| r.mult).sum()
    }

    /// Sum of payments before interest
    pub fn nominal(&self) -> f64 {
        self.rows.iter().map(|r| r.amt).sum()
    }
}

/// Present value of `num_periods` monthly payments starting `first_pmt_date`
///
/// `monthly_pmt` applies until the first change in `schedule`; the rate is a
/// constant annual percent.
pub fn calc_pv(
    monthly_pmt: f64,
    annual_rate_pct: f64,
    num_periods: u32,
    first_pmt_date: NaiveDate,
    schedule: &AmountSchedule,
) -> Result<PvWorkTable> {
    if num_periods == 0 {
        return Err(CalcError::InvalidInput("number of periods must be positive".to_string()));
    }
    if !annual_rate_pct.is_finite() || !monthly_pmt.is_finite() {
        return Err(CalcError::InvalidInput(format!(
            "rate {} and payment {} must be numbers",
            annual_rate_pct, monthly_pmt
        )));
    }
    ensure_month_start(first_pmt_date, "first payment date")?;

    let rate = monthly_compounded_rate(annual_rate_pct);
    let growth: Vec<f64> = (1..=num_periods).map(|i| (1.0 + rate).powi(i as i32)).collect();

    let mut rows = Vec::with_capacity(num_periods as usize);
    for (idx, compounded_int) in growth.iter().rev().enumerate() {
        let month = add_months(first_pmt_date, idx as i32)?;
        let amt = schedule.amount_for(month, monthly_pmt);
        rows.push(PvRow {
            pmt_no: idx as u32 + 1,
            month,
            compounded_int: *compounded_int,
            amt,
            mult: compounded_int * amt,
        });
    }

    let total: f64 = rows.iter().map(|r| r.mult).sum();
    let pv = total / (1.0 + rate).powi(num_periods as i32);
    log::debug!(
        "pv of {} payments from {} at {}%: {}",
        num_periods,
        first_pmt_date,
        annual_rate_pct,
        pv
    );

    Ok(PvWorkTable {
        first_pmt_date,
        annual_rate_pct,
        monthly_rate: rate,
        num_periods,
        pv,
        rows,
    })
}
