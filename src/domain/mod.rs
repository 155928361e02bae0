//! Core domain types and logic.

pub mod config_validation;
pub mod error;
pub mod level;
pub mod market;
pub mod ohlcv;
pub mod price_summary;
pub mod range_resolver;
