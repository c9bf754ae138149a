//! Closed-form retro accumulation by calendar year

use chrono::{Datelike, Days, NaiveDate};

use crate::annuity::{fv, PaymentTiming};
use crate::breakdown::{get_breakdown, Breakdown};
use crate::error::{CalcError, Result};
use crate::rates::RateTable;
use crate::rounding::fix_round;

/// Total retro payment plus interest at `pmt_date`, rounded to cents
///
/// Each year's payments accumulate as an annuity-due at that year's monthly
/// rate, then roll forward through every later year of the period.
pub fn cumulative_value(
    dor: NaiveDate,
    pmt_date: NaiveDate,
    pmt_amt: f64,
    rates: &RateTable,
) -> Result<f64> {
    let breakdown = get_breakdown(dor, pmt_date)?;

    let total = match breakdown.num_years() {
        0 => 0.0,
        1 => {
            let year = dor.year();
            fv(rates.monthly_rate(year)?, breakdown.total_months(), pmt_amt, 0.0, PaymentTiming::Begin)
        }
        _ => {
            let mut total = 0.0;
            for (year, months) in breakdown.iter() {
                let year_fv = fv(rates.monthly_rate(year)?, months, pmt_amt, 0.0, PaymentTiming::Begin);
                total += year_fv * growth_after(&breakdown, year, rates)?;
            }
            total
        }
    };

    log::debug!(
        "cumulative value {} -> {}: {} months over {} years, raw {}",
        dor,
        pmt_date,
        breakdown.total_months(),
        breakdown.num_years(),
        -total
    );
    fix_round(-total, 2)
}

/// Compounding factor across every year of `breakdown` strictly after `year`
fn growth_after(breakdown: &Breakdown, year: i32, rates: &RateTable) -> Result<f64> {
    let mut factor = 1.0;
    for (later, months) in breakdown.iter().filter(|(y, _)| *y > year) {
        factor *= (1.0 + rates.monthly_rate(later)?).powi(months as i32);
    }
    Ok(factor)
}

/// Compounding factor across the whole of `breakdown`
fn growth_over(breakdown: &Breakdown, rates: &RateTable) -> Result<f64> {
    let mut factor = 1.0;
    for (year, months) in breakdown.iter() {
        factor *= (1.0 + rates.monthly_rate(year)?).powi(months as i32);
    }
    Ok(factor)
}

/// Retro pension payment with interest, optionally split at a bridge end
///
/// `bridge_end` is the last day of the final month a bridge benefit was
/// paid. When it falls before `pmt_date`, payments accumulate only up to the
/// month after it and that total then earns interest through to `pmt_date`.
pub fn calc_stco_pen_retro(
    dor: NaiveDate,
    pmt_date: NaiveDate,
    pmt_amt: f64,
    bridge_end: Option<NaiveDate>,
    rates: &RateTable,
) -> Result<f64> {
    let bridge_end = match bridge_end {
        Some(end) if end < pmt_date => end,
        _ => return cumulative_value(dor, pmt_date, pmt_amt, rates),
    };

    let stop = bridge_end
        .checked_add_days(Days::new(1))
        .filter(|d| d.day() == 1)
        .ok_or_else(|| {
            CalcError::InvalidInput(format!(
                "bridge end {} must be the last day of a month",
                bridge_end
            ))
        })?;

    let accumulated = cumulative_value(dor, stop, pmt_amt, rates)?;
    let roll_fwd = get_breakdown(stop, pmt_date)?;
    let rolled = accumulated * growth_over(&roll_fwd, rates)?;

    log::debug!(
        "bridge ended {}: {} accumulated to {}, rolled {} months to {}",
        bridge_end,
        accumulated,
        stop,
        roll_fwd.total_months(),
        rolled
    );
    fix_round(rolled, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::RateBasis;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_year_annuity_due() {
        let rates = RateTable::new(RateBasis::AnnualPercent, [(2021, 0.75)]).unwrap();
        let total = cumulative_value(ymd(2021, 1, 1), ymd(2021, 4, 1), 100.0, &rates).unwrap();
        assert_eq!(total, 300.37);
    }

    #[test]
    fn test_multi_year_roll_forward() {
        let rates = RateTable::cansim_b14045();
        let total = cumulative_value(ymd(2020, 11, 1), ymd(2021, 3, 1), 100.0, &rates).unwrap();
        assert_eq!(total, 400.68);
    }

    #[test]
    fn test_single_and_multi_year_paths_agree() {
        // A period covering one full year compared against the same year split
        // into two adjacent accumulations rolled together by hand
        let rates = RateTable::cansim_b14045();
        let whole = cumulative_value(ymd(2021, 1, 1), ymd(2022, 1, 1), 100.0, &rates).unwrap();

        let r = rates.monthly_rate(2021).unwrap();
        let first_half = -fv(r, 6, 100.0, 0.0, PaymentTiming::Begin) * (1.0 + r).powi(6);
        let second_half = -fv(r, 6, 100.0, 0.0, PaymentTiming::Begin);
        assert_eq!(whole, fix_round(first_half + second_half, 2).unwrap());
    }

    #[test]
    fn test_zero_rate_is_nominal() {
        let rates = RateTable::new(RateBasis::AnnualPercent, [(2020, 0.0), (2021, 0.0)]).unwrap();
        let total = cumulative_value(ymd(2020, 6, 1), ymd(2021, 6, 1), 250.0, &rates).unwrap();
        assert_eq!(total, 3000.0);
    }

    #[test]
    fn test_empty_period() {
        let rates = RateTable::cansim_b14045();
        let total = cumulative_value(ymd(2021, 3, 1), ymd(2021, 3, 1), 100.0, &rates).unwrap();
        assert_eq!(total, 0.0);
    }

    #[test]
    fn test_missing_rate_year() {
        let rates = RateTable::cansim_b14045();
        let result = cumulative_value(ymd(2023, 6, 1), ymd(2024, 3, 1), 100.0, &rates);
        assert!(matches!(result, Err(CalcError::MissingRateYear(2024))));
    }

    #[test]
    fn test_bridge_split() {
        let rates = RateTable::cansim_b14045();
        let total = calc_stco_pen_retro(
            ymd(2020, 11, 1),
            ymd(2021, 3, 1),
            100.0,
            Some(ymd(2020, 12, 31)),
            &rates,
        )
        .unwrap();
        assert_eq!(total, 200.49);
    }

    #[test]
    fn test_bridge_split_rolls_across_years() {
        let rates = RateTable::cansim_b14045();
        let dor = ymd(2012, 3, 1);
        let pmt_date = ymd(2023, 2, 1);

        let bridged = calc_stco_pen_retro(dor, pmt_date, 1234.56, Some(ymd(2020, 6, 30)), &rates).unwrap();
        assert_eq!(bridged, 135275.16);

        let plain = calc_stco_pen_retro(dor, pmt_date, 1234.56, None, &rates).unwrap();
        assert_eq!(plain, 174539.76);
    }

    #[test]
    fn test_bridge_ending_day_before_payment_month() {
        // Nothing left to roll forward: same as accumulating to the bridge end
        let rates = RateTable::cansim_b14045();
        let bridged = calc_stco_pen_retro(
            ymd(2020, 11, 1),
            ymd(2021, 3, 1),
            100.0,
            Some(ymd(2021, 2, 28)),
            &rates,
        )
        .unwrap();
        let plain = cumulative_value(ymd(2020, 11, 1), ymd(2021, 3, 1), 100.0, &rates).unwrap();
        assert_eq!(bridged, plain);
    }

    #[test]
    fn test_bridge_after_payment_is_ignored() {
        let rates = RateTable::cansim_b14045();
        let with_bridge = calc_stco_pen_retro(
            ymd(2020, 11, 1),
            ymd(2021, 3, 1),
            100.0,
            Some(ymd(2021, 12, 31)),
            &rates,
        )
        .unwrap();
        let without = calc_stco_pen_retro(ymd(2020, 11, 1), ymd(2021, 3, 1), 100.0, None, &rates).unwrap();
        assert_eq!(with_bridge, without);
        assert_eq!(without, 400.68);
    }

    #[test]
    fn test_bridge_end_must_be_month_end() {
        let rates = RateTable::cansim_b14045();
        let result = calc_stco_pen_retro(
            ymd(2020, 11, 1),
            ymd(2021, 3, 1),
            100.0,
            Some(ymd(2020, 12, 15)),
            &rates,
        );
        assert!(matches!(result, Err(CalcError::InvalidInput(_))));
    }
}
