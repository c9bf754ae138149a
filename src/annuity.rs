//! Spreadsheet-style time value of money helpers

/// When payments fall within each period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentTiming {
    /// Start of period (annuity-due)
    Begin,
    /// End of period (ordinary annuity)
    End,
}

/// Future value with the spreadsheet `FV` sign convention
///
/// Positive payments produce a negative result, so callers accumulating
/// payments received negate it.
pub fn fv(rate: f64, nper: u32, pmt: f64, pv: f64, when: PaymentTiming) -> f64 {
    let n = nper as f64;
    if rate == 0.0 {
        return -(pv + pmt * n);
    }

    let w = match when {
        PaymentTiming::Begin => 1.0,
        PaymentTiming::End => 0.0,
    };
    let growth = (1.0 + rate).powf(n);
    -(pv * growth + pmt * (1.0 + rate * w) / rate * (growth - 1.0))
}
