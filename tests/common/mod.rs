#![allow(dead_code)]

use chrono::NaiveDate;
use fibext::domain::error::FibextError;
pub use fibext::domain::ohlcv::OhlcvBar;
use fibext::ports::data_port::DataPort;
use fibext::ports::report_port::{LevelReport, ReportPort};
use std::cell::RefCell;
use std::collections::HashMap;

/// In-memory data port keyed by market suffix.
pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
    pub calls: RefCell<Vec<(String, NaiveDate, NaiveDate)>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, market: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(market.to_string(), bars);
        self
    }

    pub fn with_error(mut self, market: &str, reason: &str) -> Self {
        self.errors.insert(market.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        _code: &str,
        market: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, FibextError> {
        self.calls
            .borrow_mut()
            .push((market.to_string(), start_date, end_date));
        if let Some(reason) = self.errors.get(market) {
            return Err(FibextError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(market)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self, market: &str) -> Result<Vec<String>, FibextError> {
        Ok(self
            .data
            .get(market)
            .and_then(|bars| bars.first())
            .map(|b| vec![b.code.clone()])
            .unwrap_or_default())
    }
}

/// Captures what the pipeline hands to the renderer.
pub struct RecordingReport {
    pub rendered: RefCell<Vec<(String, usize)>>,
}

impl RecordingReport {
    pub fn new() -> Self {
        Self {
            rendered: RefCell::new(Vec::new()),
        }
    }
}

impl ReportPort for RecordingReport {
    fn render(&self, report: &LevelReport) -> Result<String, FibextError> {
        self.rendered
            .borrow_mut()
            .push((report.summary.market.clone(), report.levels.len()));
        Ok(String::new())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(market: &str, date: &str, high: f64, low: f64, close: f64) -> OhlcvBar {
    OhlcvBar {
        code: "2330".to_string(),
        market: market.to_string(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: low,
        high,
        low,
        close,
        volume: 1000,
    }
}

/// One trading week, 2024-06-10 (Mon) to 2024-06-14 (Fri).
pub fn sample_week(market: &str) -> Vec<OhlcvBar> {
    vec![
        make_bar(market, "2024-06-10", 104.0, 99.0, 102.0),
        make_bar(market, "2024-06-11", 106.0, 101.0, 105.0),
        make_bar(market, "2024-06-12", 108.0, 103.0, 104.0),
        make_bar(market, "2024-06-13", 110.0, 100.0, 105.0),
        make_bar(market, "2024-06-14", 109.0, 104.0, 107.0),
    ]
}

pub fn sample_csv() -> String {
    let mut csv = String::from("date,open,high,low,close,volume\n");
    for b in sample_week("TW") {
        csv.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    csv
}
