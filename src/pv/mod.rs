//! Present value of a monthly payment stream and its roll-forward
//!
//! The PV is taken as at the first payment date, with payments at the start
//! of each month and a single annual rate converted to a monthly one. The
//! roll-forward then projects that PV to each of the following months, at
//! full value and at a reduced percentage.

mod calc;
mod roll_forward;
mod report;

pub use calc::{calc_pv, PvRow, PvWorkTable};
pub use roll_forward::{
    roll_forward, RollForwardConfig, RollForwardRow, RollForwardStart, RollForwardTable,
    DEFAULT_REDUCED_PCT, DEFAULT_ROLL_FORWARD_MONTHS,
};
pub use report::{pv_calc, PvReport};
