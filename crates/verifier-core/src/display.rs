//! Hex decoding and log timestamp helpers.
//!
//! [`decode_hex`] is shared by every verification path. The timestamp helpers
//! only exist to prefix log lines in the demo page.

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike};

use crate::error::{Error, Result};

/// Decodes a hex string into raw bytes.
///
/// An optional `0x` prefix is accepted. Upper and lower case digits are both
/// accepted.
///
/// # Errors
///
/// Returns [`Error::HexDecodeFailed`] if the input is empty, has an odd
/// number of digits, or contains a non-hex character.
///
/// # Example
///
/// ```
/// use keycard_verifier_core::display::decode_hex;
///
/// assert_eq!(decode_hex("ab12").unwrap(), vec![0xab, 0x12]);
/// assert!(decode_hex("abc").is_err());
/// ```
pub fn decode_hex(hex_str: &str) -> Result<Vec<u8>> {
    let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    if hex_str.is_empty() {
        return Err(Error::HexDecodeFailed("empty hex string".to_string()));
    }
    Ok(hex::decode(hex_str)?)
}

/// Pads a number to at least two decimal digits.
#[must_use]
pub fn pad_to_2_digits(n: u32) -> String {
    format!("{n:02}")
}

/// Formats a timestamp as `DD-MM-YYYY HH:MM:SS` in the timestamp's own zone.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use keycard_verifier_core::display::format_timestamp;
///
/// let instant = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
/// assert_eq!(format_timestamp(&instant), "02-01-2024 03:04:05");
/// ```
#[must_use]
pub fn format_timestamp<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    let date = [
        pad_to_2_digits(instant.day()),
        pad_to_2_digits(instant.month()),
        instant.year().to_string(),
    ]
    .join("-");

    let time = [
        pad_to_2_digits(instant.hour()),
        pad_to_2_digits(instant.minute()),
        pad_to_2_digits(instant.second()),
    ]
    .join(":");

    format!("{date} {time}")
}

/// Formats the current local time for a log line.
#[must_use]
pub fn formatted_date() -> String {
    format_timestamp(&Local::now())
}
