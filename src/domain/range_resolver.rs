//! Trading-window resolution against a [`DataPort`].
//!
//! Turns a security id and a date (or date range) into a validated
//! [`PriceSummary`]. Single-day queries that land on a weekend are moved back
//! two days; each market suffix is tried in order until one has bars.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use tracing::{debug, info, warn};

use crate::domain::error::FibextError;
use crate::domain::price_summary::PriceSummary;
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeQuery {
    pub code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub single_day: bool,
}

impl RangeQuery {
    pub fn single_day(code: &str, date: NaiveDate) -> Self {
        Self {
            code: code.to_string(),
            start_date: date,
            end_date: date,
            single_day: true,
        }
    }

    pub fn range(code: &str, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            code: code.to_string(),
            start_date,
            end_date,
            single_day: false,
        }
    }
}

/// Saturday moves to Thursday, Sunday to Friday; weekdays are unchanged.
pub fn adjust_single_day(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat | Weekday::Sun => date.checked_sub_days(Days::new(2)).unwrap_or(date),
        _ => date,
    }
}

/// The `[start, end]` window a query covers.
pub fn resolve_window(query: &RangeQuery) -> Result<(NaiveDate, NaiveDate), FibextError> {
    if query.single_day {
        let day = adjust_single_day(query.start_date);
        return Ok((day, day));
    }
    if query.start_date > query.end_date {
        return Err(FibextError::InvalidQuery {
            reason: format!(
                "start date {} is after end date {}",
                query.start_date, query.end_date
            ),
        });
    }
    Ok((query.start_date, query.end_date))
}

pub fn resolve_range(
    data_port: &dyn DataPort,
    query: &RangeQuery,
    markets: &[String],
) -> Result<PriceSummary, FibextError> {
    if query.code.trim().is_empty() {
        return Err(FibextError::InvalidQuery {
            reason: "security id is empty".into(),
        });
    }
    let (start, end) = resolve_window(query)?;
    if start != query.start_date {
        debug!(requested = %query.start_date, resolved = %start, "weekend query moved back");
    }

    for market in markets {
        debug!(code = %query.code, %market, %start, %end, "querying market");
        let bars = match data_port.fetch_ohlcv(&query.code, market, start, end) {
            Ok(bars) => bars,
            Err(e) => {
                debug!(code = %query.code, %market, error = %e, "market variant failed");
                continue;
            }
        };

        let Some(summary) = PriceSummary::from_bars(&query.code, market, start, end, &bars) else {
            debug!(code = %query.code, %market, "no bars in window");
            continue;
        };

        summary.validate()?;
        info!(
            code = %summary.code,
            market = %summary.market,
            start = %summary.start_date,
            end = %summary.end_date,
            last = %summary.last_trading_date,
            bars = bars.len(),
            "resolved trading window"
        );
        return Ok(summary);
    }

    warn!(code = %query.code, %start, %end, "no market variant has data");
    Err(FibextError::NoData {
        code: query.code.clone(),
        markets: markets.join(","),
    })
}
