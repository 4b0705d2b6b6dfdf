pub mod config;
pub mod constants;
pub mod geo;
pub mod units;
pub mod viewport;
