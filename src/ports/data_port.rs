//! Market-data access port trait.

use crate::domain::error::FibextError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily bars for `code` on `market` within `[start_date, end_date]`, sorted by date.
    fn fetch_ohlcv(
        &self,
        code: &str,
        market: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, FibextError>;

    fn list_symbols(&self, market: &str) -> Result<Vec<String>, FibextError>;
}
