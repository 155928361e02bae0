//! CSV file market-data adapter.
//!
//! One file per listing: `<base>/<CODE>_<MARKET>.csv` with header
//! `date,open,high,low,close,volume`.

use crate::domain::error::FibextError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str, market: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", code, market))
    }
}

fn column<T>(record: &csv::StringRecord, index: usize, name: &str) -> Result<T, FibextError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    record
        .get(index)
        .ok_or_else(|| FibextError::DataSource {
            reason: format!("missing {} column", name),
        })?
        .trim()
        .parse()
        .map_err(|e| FibextError::DataSource {
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        code: &str,
        market: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, FibextError> {
        let path = self.csv_path(code, market);
        let content = fs::read_to_string(&path).map_err(|e| FibextError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| FibextError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).ok_or_else(|| FibextError::DataSource {
                reason: "missing date column".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                FibextError::DataSource {
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            bars.push(OhlcvBar {
                code: code.to_string(),
                market: market.to_string(),
                date,
                open: column(&record, 1, "open")?,
                high: column(&record, 2, "high")?,
                low: column(&record, 3, "low")?,
                close: column(&record, 4, "close")?,
                volume: column(&record, 5, "volume")?,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn list_symbols(&self, market: &str) -> Result<Vec<String>, FibextError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| FibextError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let suffix = format!("_{}.csv", market);
        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| FibextError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(code) = name_str.strip_suffix(&suffix) {
                symbols.push(code.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
