//! Configuration validation.
//!
//! Checks the optional INI sections before any data is read. Every key is
//! optional; a present key must hold a usable value.

use crate::domain::error::FibextError;
use crate::domain::market::parse_markets;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportFormat;

const BOOL_KEYS: [&str; 3] = ["apply_limit", "show_short", "show_close"];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), FibextError> {
    validate_data_dir(config)?;
    validate_markets(config)?;
    validate_level_switches(config)?;
    validate_report_format(config)?;
    Ok(())
}

fn validate_data_dir(config: &dyn ConfigPort) -> Result<(), FibextError> {
    match config.get_string("data", "dir") {
        Some(s) if s.trim().is_empty() => Err(FibextError::ConfigInvalid {
            section: "data".to_string(),
            key: "dir".to_string(),
            reason: "dir must not be empty".to_string(),
        }),
        _ => Ok(()),
    }
}

fn validate_markets(config: &dyn ConfigPort) -> Result<(), FibextError> {
    if let Some(s) = config.get_string("data", "markets") {
        parse_markets(&s).map_err(|e| FibextError::ConfigInvalid {
            section: "data".to_string(),
            key: "markets".to_string(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

fn validate_level_switches(config: &dyn ConfigPort) -> Result<(), FibextError> {
    for key in BOOL_KEYS {
        let Some(value) = config.get_string("levels", key) else {
            continue;
        };
        if config.try_get_bool("levels", key).is_none() {
            return Err(FibextError::ConfigInvalid {
                section: "levels".to_string(),
                key: key.to_string(),
                reason: format!("expected a boolean, got '{}'", value),
            });
        }
    }
    Ok(())
}

fn validate_report_format(config: &dyn ConfigPort) -> Result<(), FibextError> {
    if let Some(s) = config.get_string("report", "format") {
        s.parse::<ReportFormat>()
            .map_err(|reason| FibextError::ConfigInvalid {
                section: "report".to_string(),
                key: "format".to_string(),
                reason,
            })?;
    }
    Ok(())
}
