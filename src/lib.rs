//! Interest Calcs - retroactive pension interest and PV roll-forward
//!
//! This library provides:
//! - Year-by-year month breakdowns between two dates
//! - Retro payment accumulation against an annual rate table (closed form and ledger)
//! - Present value of a monthly stream with a 60-month roll-forward
//! - Cents rounding with explicit half handling
//! - Spreadsheet export, YAML settings and a serialized trace log

pub mod error;
pub mod rounding;
pub mod dates;
pub mod rates;
pub mod breakdown;
pub mod annuity;
pub mod schedule;
pub mod retro;
pub mod pv;
pub mod export;
pub mod config;
pub mod logging;
pub mod paths;

// Re-export commonly used types
pub use error::{CalcError, Result};
pub use rounding::fix_round;
pub use rates::{RateBasis, RateTable};
pub use breakdown::{get_breakdown, Breakdown};
pub use schedule::{AmountChange, AmountSchedule};
pub use retro::{calc_retro, calc_stco_pen_retro, cumulative_value, RetroLedger};
pub use pv::{calc_pv, pv_calc, roll_forward, PvReport, PvWorkTable, RollForwardConfig, RollForwardTable};
pub use export::{ExportFormat, Exporter, WorkTable};
pub use config::CalcConfig;
pub use logging::setup_logger;
