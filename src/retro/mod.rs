//! Retroactive pension payments with compound interest
//!
//! Two ways to arrive at the same total:
//! - **Closed form** (`calc_stco_pen_retro`): per-year annuity-due future
//!   values rolled forward year by year, with optional bridge handling
//! - **Ledger** (`calc_retro`): one row per month with its accumulation
//!   factor, supporting step changes in the monthly amount
//!
//! With a constant monthly amount both agree to the cent.

mod accumulate;
mod ledger;

pub use accumulate::{calc_stco_pen_retro, cumulative_value};
pub use ledger::{calc_retro, RetroLedger, RetroRow};
