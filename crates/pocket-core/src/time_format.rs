//! Unix timestamps rendered in Italian (Swiss) for the Europe/Rome zone.

use chrono::{DateTime, Locale};
use chrono_tz::Europe::Rome;

use crate::types::PocketError;

const LOCALE: Locale = Locale::it_CH;
const FORMAT: &str = "%A, %d %B %Y - %H:%M:%S %Z";

/// e.g. `giovedì, 01 gennaio 1970 - 01:00:00 CET`
pub fn format_timestamp(unix_secs: i64) -> Result<String, PocketError> {
    let utc = DateTime::from_timestamp(unix_secs, 0)
        .ok_or_else(|| PocketError::Data(format!("timestamp out of range: {}", unix_secs)))?;

    Ok(utc
        .with_timezone(&Rome)
        .format_localized(FORMAT, LOCALE)
        .to_string())
}
