//! # Utility Functions
//!
//! Timestamp formatting and parsing helpers shared with the CLI.

use crate::env::{Timestamp, Value};
use crate::error::{MarketError, Result};
use crate::BPS_DENOMINATOR;

/// Format a Unix timestamp as a human-readable UTC string
pub fn format_timestamp(timestamp: Timestamp) -> String {
    use chrono::DateTime;
    let dt = DateTime::from_timestamp(timestamp as i64, 0).unwrap_or_default();
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Parse a Unix timestamp from a string
pub fn parse_timestamp(timestamp_str: &str) -> Result<Timestamp> {
    timestamp_str
        .parse::<Timestamp>()
        .map_err(|_| MarketError::Other(format!("Invalid timestamp: {timestamp_str}")))
}

/// Fee withheld from `total` at `fee_bps`, floor division
pub fn fee_of(total: Value, fee_bps: u16) -> Value {
    (total as u128 * fee_bps as u128 / BPS_DENOMINATOR as u128) as Value
}

/// Format basis points as a percentage string, e.g. `150` -> `"1.50%"`
pub fn format_bps(fee_bps: u16) -> String {
    format!("{}.{:02}%", fee_bps / 100, fee_bps % 100)
}
