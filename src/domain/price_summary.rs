//! Summary figures for a resolved trading window.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::error::FibextError;
use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSummary {
    pub market: String,
    pub code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub last_trading_date: NaiveDate,
    pub close: f64,
    pub high: f64,
    pub low: f64,
}

impl PriceSummary {
    /// Aggregate date-sorted bars into a summary. Returns `None` for an empty slice.
    pub fn from_bars(
        code: &str,
        market: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        bars: &[OhlcvBar],
    ) -> Option<Self> {
        let last = bars.last()?;
        let high = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, nan_max);
        let low = bars.iter().map(|b| b.low).fold(f64::INFINITY, nan_min);
        Some(Self {
            market: market.to_string(),
            code: code.to_string(),
            start_date,
            end_date,
            last_trading_date: last.date,
            close: last.close,
            high,
            low,
        })
    }

    /// Check the figures before they are handed to the level engine.
    pub fn validate(&self) -> Result<(), FibextError> {
        for (name, value) in [("high", self.high), ("low", self.low), ("close", self.close)] {
            if !value.is_finite() {
                return Err(FibextError::InvalidInput {
                    reason: format!("{name} is not finite ({value})"),
                });
            }
        }
        if self.high < self.low {
            return Err(FibextError::InvalidInput {
                reason: format!("high {} is below low {}", self.high, self.low),
            });
        }
        Ok(())
    }
}

// Unlike `f64::max`/`f64::min`, a NaN operand poisons the result.
fn nan_max(acc: f64, v: f64) -> f64 {
    if acc.is_nan() || v.is_nan() {
        f64::NAN
    } else {
        acc.max(v)
    }
}

fn nan_min(acc: f64, v: f64) -> f64 {
    if acc.is_nan() || v.is_nan() {
        f64::NAN
    } else {
        acc.min(v)
    }
}
