//! Spreadsheet-compatible rounding
//!
//! Rust's fixed-precision formatting rounds exact ties to even, which disagrees
//! with the spreadsheet `ROUND` function on values such as 2.5 or 0.125. The
//! correction below only touches values whose scaled representation ends in
//! exactly `.5`; everything else keeps the half-even behaviour.

use crate::error::{CalcError, Result};

/// Round `num` to `position` decimal places the way a spreadsheet `ROUND` does.
///
/// The "exactly half" test runs on the shortest decimal representation of
/// `num * 10^position`, so `2.675` (scaled: `267.5`) rounds up to `2.68` while
/// `1.005` (scaled: `100.49999999999999`) rounds down to `1.0`.
/// Negative positions round to tens, hundreds, ...
pub fn fix_round(num: f64, position: i32) -> Result<f64> {
    if !num.is_finite() {
        return Err(CalcError::InvalidInput(format!(
            "cannot round non-numeric value {}",
            num
        )));
    }

    let multiplier = 10f64.powi(position);
    let scaled = num * multiplier;

    if is_exact_half(scaled) {
        let away = if scaled > 0.0 { scaled.ceil() } else { scaled.floor() };
        return Ok(round_half_even(away / multiplier, position));
    }

    Ok(round_half_even(scaled / multiplier, position))
}

/// True when the shortest representation of `value` has `5` as its only fractional digit
fn is_exact_half(value: f64) -> bool {
    let repr = value.to_string();
    matches!(repr.split_once('.'), Some((_, frac)) if frac == "5")
}

/// Round to `places` digits, ties to even on the exact binary value
fn round_half_even(value: f64, places: i32) -> f64 {
    if places >= 0 {
        let text = format!("{:.*}", places as usize, value);
        // Formatting a finite f64 always yields a parseable decimal
        text.parse().unwrap_or(value)
    } else {
        let factor = 10f64.powi(-places);
        (value / factor).round_ties_even() * factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_halves_round_away_from_zero() {
        assert_eq!(fix_round(2.5, 0).unwrap(), 3.0);
        assert_eq!(fix_round(-2.5, 0).unwrap(), -3.0);
        assert_eq!(fix_round(0.5, 0).unwrap(), 1.0);
        assert_eq!(fix_round(0.125, 2).unwrap(), 0.13);
        assert_eq!(fix_round(-0.125, 2).unwrap(), -0.13);
    }

    #[test]
    fn test_non_half_values_use_default_rounding() {
        assert_eq!(fix_round(2.4, 0).unwrap(), 2.0);
        assert_eq!(fix_round(2.6, 0).unwrap(), 3.0);
        assert_eq!(fix_round(300.37387228756967, 2).unwrap(), 300.37);
        assert_eq!(fix_round(1178.1809828628204, 2).unwrap(), 1178.18);
    }

    #[test]
    fn test_representation_dependent_halves() {
        // 2.675 * 100 prints as 267.5 -> treated as a half
        assert_eq!(fix_round(2.675, 2).unwrap(), 2.68);
        // 1.005 * 100 prints as 100.49999999999999 -> not a half
        assert_eq!(fix_round(1.005, 2).unwrap(), 1.0);
    }

    #[test]
    fn test_negative_position() {
        assert_eq!(fix_round(1234.0, -2).unwrap(), 1200.0);
        assert_eq!(fix_round(1250.0, -2).unwrap(), 1300.0);
    }

    #[test]
    fn test_idempotent() {
        for &x in &[2.5, -2.5, 0.125, 2.675, 1.005, 123.456789, -98.765, 1e-3] {
            for n in 0..4 {
                let once = fix_round(x, n).unwrap();
                let twice = fix_round(once, n).unwrap();
                assert_eq!(once, twice, "fix_round not idempotent for {} at {}", x, n);
            }
        }
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(matches!(fix_round(f64::NAN, 2), Err(CalcError::InvalidInput(_))));
        assert!(matches!(fix_round(f64::INFINITY, 0), Err(CalcError::InvalidInput(_))));
    }
}
