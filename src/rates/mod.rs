//! Historical interest rates by calendar year

mod table;
pub mod loader;

pub use table::{monthly_compounded_rate, RateBasis, RateTable};
pub use loader::{load_rates, load_rates_from_reader, DEFAULT_RATES_PATH};
