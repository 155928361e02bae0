//! Market suffix lists.
//!
//! A security can be listed under one of several market suffixes (for example
//! `TW` for the main board and `TWO` for the OTC board). The resolver tries
//! them in the configured order.

use std::collections::HashSet;

pub const DEFAULT_MARKETS: [&str; 2] = ["TW", "TWO"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketError {
    #[error("empty token in market list")]
    EmptyToken,

    #[error("duplicate market: {0}")]
    DuplicateMarket(String),
}

pub fn parse_markets(input: &str) -> Result<Vec<String>, MarketError> {
    let mut markets = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(MarketError::EmptyToken);
        }
        let market = trimmed.to_uppercase();
        if !seen.insert(market.clone()) {
            return Err(MarketError::DuplicateMarket(market));
        }
        markets.push(market);
    }

    Ok(markets)
}

pub fn default_markets() -> Vec<String> {
    DEFAULT_MARKETS.iter().map(|m| m.to_string()).collect()
}
