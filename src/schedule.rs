//! Step changes in a monthly payment amount

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::parse_date;
use crate::error::{CalcError, Result};

/// New monthly amount from `effective` onwards
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmountChange {
    pub amount: f64,
    pub effective: NaiveDate,
}

impl AmountChange {
    pub fn new(amount: f64, effective: NaiveDate) -> Self {
        Self { amount, effective }
    }

    /// Parse `AMOUNT@DATE`, e.g. `1250.50@1-jan-2022`
    pub fn parse(text: &str) -> Result<Self> {
        let (amount, date) = text.split_once('@').ok_or_else(|| {
            CalcError::InvalidInput(format!("expected AMOUNT@DATE, got {:?}", text))
        })?;
        let amount: f64 = amount
            .trim()
            .parse()
            .map_err(|_| CalcError::InvalidInput(format!("bad amount in {:?}", text)))?;
        if !amount.is_finite() {
            return Err(CalcError::InvalidInput(format!("bad amount in {:?}", text)));
        }
        Ok(Self::new(amount, parse_date(date)?))
    }
}

/// Amount changes in chronological order
///
/// Each change overrides the amount for every month on or after its effective
/// date, so a later change wins over an earlier one from its own date on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmountSchedule {
    changes: Vec<AmountChange>,
}

impl AmountSchedule {
    /// No changes: the base amount applies throughout
    pub fn constant() -> Self {
        Self::default()
    }

    /// Build from changes in any order; ties keep their given order
    pub fn new(mut changes: Vec<AmountChange>) -> Self {
        changes.sort_by_key(|c| c.effective);
        Self { changes }
    }

    /// Build from `(amount, effective date)` pairs
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (f64, NaiveDate)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(amount, effective)| AmountChange::new(amount, effective))
                .collect(),
        )
    }

    /// Amount payable for `month`, falling back to `base` before the first change
    pub fn amount_for(&self, month: NaiveDate, base: f64) -> f64 {
        self.changes
            .iter()
            .rev()
            .find(|c| c.effective <= month)
            .map(|c| c.amount)
            .unwrap_or(base)
    }

    /// Earliest change plus a schedule of the remaining ones
    pub fn split_first(&self) -> Option<(AmountChange, AmountSchedule)> {
        let (first, rest) = self.changes.split_first()?;
        Some((*first, AmountSchedule { changes: rest.to_vec() }))
    }

    pub fn changes(&self) -> &[AmountChange] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
