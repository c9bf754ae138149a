//! One-call PV with roll-forward

use chrono::NaiveDate;
use serde::Serialize;

use super::calc::{calc_pv, PvWorkTable};
use super::roll_forward::{roll_forward, RollForwardConfig, RollForwardTable};
use crate::error::{CalcError, Result};
use crate::schedule::AmountSchedule;

/// Rounded PV with its working and roll-forward
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PvReport {
    pub pv: f64,
    pub work: PvWorkTable,
    pub roll_forward: RollForwardTable,
}

/// PV of a stream given only as dated amounts
///
/// The earliest entry of `amounts` supplies the first payment date and the
/// starting amount; later entries are step changes.
pub fn pv_calc(
    annual_rate_pct: f64,
    num_periods: u32,
    amounts: &AmountSchedule,
    config: &RollForwardConfig,
    today: NaiveDate,
) -> Result<PvReport> {
    let (first, changes) = amounts
        .split_first()
        .ok_or_else(|| CalcError::InvalidInput("at least one dated amount is required".to_string()))?;

    let work = calc_pv(first.amount, annual_rate_pct, num_periods, first.effective, &changes)?;
    let roll_forward = roll_forward(&work, config, today)?;
    let pv = work.pv_rounded()?;

    log::info!("pv {} for {} payments from {}", pv, num_periods, first.effective);
    Ok(PvReport {
        pv,
        work,
        roll_forward,
    })
}
