//! Device signature responses and their canonical compact encoding.
//!
//! The Keycard Pro reports a signature as three loose fields: a recovery
//! indicator `v` and the two 32-byte scalars `r` and `s` as hex strings. This
//! module turns that response into the Ethereum wire format.
//!
//! # Recovery Indicator
//!
//! Depending on the command, `v` arrives either as a raw curve recovery id
//! (`0`/`1`) or in Ethereum style (`27`/`28`, or offset by a chain id).
//! [`normalize_recovery_id`] folds every value down to a single bit.
//!
//! # Wire Format
//!
//! ```text
//! r (32 bytes) || s (32 bytes) || recovery byte (1 byte)
//! ```
//!
//! # Example
//!
//! ```
//! use keycard_verifier_core::{CompactSignature, DeviceSignature};
//!
//! let response = DeviceSignature::new(28, "11".repeat(32), "22".repeat(32));
//! let compact = CompactSignature::from_device(&response).unwrap();
//!
//! assert_eq!(compact.recovery_id(), 1);
//! assert!(compact.to_hex().ends_with("01"));
//! ```

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::error::{Error, Result};

/// Folds a device-reported `v` into a `0`/`1` recovery bit.
///
/// `0` and `1` pass through. Any larger value keeps only its inverted
/// least-significant bit, so `27 -> 0` and `28 -> 1`. Total over `u64`.
///
/// # Example
///
/// ```
/// use keycard_verifier_core::signature::normalize_recovery_id;
///
/// assert_eq!(normalize_recovery_id(1), 1);
/// assert_eq!(normalize_recovery_id(27), 0);
/// assert_eq!(normalize_recovery_id(28), 1);
/// ```
#[must_use]
pub const fn normalize_recovery_id(v: u64) -> u8 {
    if v <= 1 { v as u8 } else { (!(v & 1) & 1) as u8 }
}

/// A signature response as returned by the device command layer.
///
/// `v` is accepted from JSON as a number, a decimal string, or a `0x` hex
/// string. `r` and `s` are kept as the hex strings the device sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSignature {
    /// The raw recovery indicator.
    #[serde(deserialize_with = "recovery_indicator")]
    pub v: u64,

    /// The R scalar, hex encoded.
    pub r: String,

    /// The S scalar, hex encoded.
    pub s: String,
}

impl DeviceSignature {
    /// Creates a response from its raw fields.
    #[must_use]
    pub fn new(v: u64, r: impl Into<String>, s: impl Into<String>) -> Self {
        Self {
            v,
            r: r.into(),
            s: s.into(),
        }
    }

    /// Parses a response from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonError`] if the JSON is malformed or `v` is neither
    /// a non-negative number nor a numeric string.
    ///
    /// # Example
    ///
    /// ```
    /// use keycard_verifier_core::DeviceSignature;
    ///
    /// let sig = DeviceSignature::from_json(r#"{"v":"0x1b","r":"01","s":"02"}"#).unwrap();
    /// assert_eq!(sig.v, 27);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns the normalized `0`/`1` recovery bit.
    #[must_use]
    pub const fn recovery_id(&self) -> u8 {
        normalize_recovery_id(self.v)
    }

    /// Decodes `r` into a 32-byte big-endian scalar.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidScalar`] if `r` is not hex or exceeds 32 bytes.
    pub fn r_bytes(&self) -> Result<[u8; 32]> {
        parse_scalar("r", &self.r)
    }

    /// Decodes `s` into a 32-byte big-endian scalar.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidScalar`] if `s` is not hex or exceeds 32 bytes.
    pub fn s_bytes(&self) -> Result<[u8; 32]> {
        parse_scalar("s", &self.s)
    }
}

/// Accepts `v` as a JSON number or as a decimal / `0x` hex string.
fn recovery_indicator<'de, D>(deserializer: D) -> core::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(v) => Ok(v),
        Raw::Text(text) => parse_recovery_indicator(&text).map_err(de::Error::custom),
    }
}

/// Parses a textual recovery indicator.
///
/// # Errors
///
/// Returns [`Error::InvalidRecoveryIndicator`] if the text is not a
/// non-negative decimal or `0x` hex integer.
pub fn parse_recovery_indicator(text: &str) -> Result<u64> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x") {
        Some(hex_digits) => u64::from_str_radix(hex_digits, 16),
        None => text.parse::<u64>(),
    };
    parsed.map_err(|e| Error::InvalidRecoveryIndicator(format!("{text:?}: {e}")))
}

/// Decodes a hex scalar of at most 32 bytes, left-padding shorter values.
fn parse_scalar(name: &'static str, hex_str: &str) -> Result<[u8; 32]> {
    let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    if hex_str.is_empty() {
        return Err(Error::InvalidScalar {
            name,
            reason: "empty".to_string(),
        });
    }

    let bytes = hex::decode(hex_str).map_err(|e| Error::InvalidScalar {
        name,
        reason: e.to_string(),
    })?;

    if bytes.len() > 32 {
        return Err(Error::InvalidScalar {
            name,
            reason: format!("expected at most 32 bytes, got {}", bytes.len()),
        });
    }

    let mut scalar = [0u8; 32];
    scalar[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(scalar)
}

/// An Ethereum compact signature: `r || s || recovery byte`.
///
/// The recovery byte is always `0x00` or `0x01`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactSignature {
    r: [u8; 32],
    s: [u8; 32],
    recovery_id: u8,
}

impl CompactSignature {
    /// The length of a serialized signature in bytes.
    pub const BYTE_LEN: usize = 65;

    /// Creates a compact signature from raw components.
    ///
    /// Any non-zero `recovery_id` is stored as `1`.
    #[must_use]
    pub const fn new(r: [u8; 32], s: [u8; 32], recovery_id: u8) -> Self {
        Self {
            r,
            s,
            recovery_id: if recovery_id != 0 { 1 } else { 0 },
        }
    }

    /// Builds the compact signature for a device response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidScalar`] if `r` or `s` cannot be decoded.
    pub fn from_device(response: &DeviceSignature) -> Result<Self> {
        Ok(Self::new(
            response.r_bytes()?,
            response.s_bytes()?,
            response.recovery_id(),
        ))
    }

    /// Creates a signature from a 65-byte slice.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSignature`] if the slice is not exactly 65 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::BYTE_LEN {
            return Err(Error::InvalidSignature(format!(
                "expected {} bytes, got {}",
                Self::BYTE_LEN,
                bytes.len()
            )));
        }

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[0..32]);
        s.copy_from_slice(&bytes[32..64]);

        Ok(Self::new(r, s, bytes[64]))
    }

    /// Serializes the signature to a 65-byte array.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::BYTE_LEN] {
        let mut bytes = [0u8; Self::BYTE_LEN];
        bytes[0..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = self.recovery_id;
        bytes
    }

    /// Returns `r || s` without the recovery byte.
    #[must_use]
    pub fn rs_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[0..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes
    }

    /// Returns the R component.
    #[must_use]
    pub const fn r(&self) -> &[u8; 32] {
        &self.r
    }

    /// Returns the S component.
    #[must_use]
    pub const fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// Returns the recovery bit (`0` or `1`).
    #[must_use]
    pub const fn recovery_id(&self) -> u8 {
        self.recovery_id
    }

    /// Encodes the full 65-byte signature as lowercase hex with `0x` prefix.
    ///
    /// # Example
    ///
    /// ```
    /// use keycard_verifier_core::CompactSignature;
    ///
    /// let sig = CompactSignature::new([0u8; 32], [0u8; 32], 0);
    /// assert_eq!(sig.to_hex().len(), 132); // "0x" + 130 hex chars
    /// ```
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    /// Encodes `r || s` as lowercase hex without prefix.
    #[must_use]
    pub fn rs_hex(&self) -> String {
        hex::encode(self.rs_bytes())
    }

    /// Parses a 65-byte signature from hex, optionally prefixed with `0x`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HexDecodeFailed`] if the hex string is invalid, or
    /// [`Error::InvalidSignature`] if the decoded bytes are not 65 bytes.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Display for CompactSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
