//! Error types for the Keycard Pro signature verifier.
//!
//! Only *structural* failures are errors: malformed hex, a public key that
//! does not parse, a typed-data payload that cannot be encoded, or a signature
//! from which no signer can be recovered. A well-formed signature that simply
//! does not match the expected signer is reported through
//! [`VerificationResult::signed`](crate::verify::VerificationResult) instead.
//!
//! # Example
//!
//! ```
//! use keycard_verifier_core::Error;
//!
//! let err = Error::InvalidPublicKey("expected 33 or 65 bytes".to_string());
//! assert_eq!(err.to_string(), "invalid public key: expected 33 or 65 bytes");
//! ```

use core::result::Result as CoreResult;
use hex::FromHexError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// The main error type for the verifier library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // =========================================================================
    // Encoding Errors
    // =========================================================================
    /// Failed to parse hex data.
    #[error("hex decoding failed: {0}")]
    HexDecodeFailed(String),

    /// A signature scalar (`r` or `s`) is not valid hex or is longer than 32 bytes.
    #[error("invalid signature scalar {name}: {reason}")]
    InvalidScalar {
        /// Which component failed (`"r"` or `"s"`).
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The recovery indicator (`v`) reported by the device could not be read.
    #[error("invalid recovery indicator: {0}")]
    InvalidRecoveryIndicator(String),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    JsonError(String),

    // =========================================================================
    // Cryptographic Errors
    // =========================================================================
    /// The public key is invalid or malformed.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// The compact signature is invalid or malformed.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// No public key could be recovered from the signature and hash.
    #[error("signer recovery failed: {0}")]
    RecoveryFailed(String),

    /// The address could not be parsed or derived.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    // =========================================================================
    // EIP-712 Errors
    // =========================================================================
    /// The EIP-712 typed data is invalid.
    #[error("invalid EIP-712 typed data: {0}")]
    InvalidTypedData(String),

    /// A type referenced in the typed data is not defined.
    #[error("undefined type in EIP-712 data: {0}")]
    UndefinedType(String),

    /// The requested typed-data version cannot encode this payload.
    #[error("{feature} is not supported by typed data {version}")]
    UnsupportedByVersion {
        /// The construct that was rejected.
        feature: String,
        /// The version that rejected it.
        version: &'static str,
    },
}

impl From<FromHexError> for Error {
    fn from(err: FromHexError) -> Self {
        Error::HexDecodeFailed(err.to_string())
    }
}

impl From<SerdeJsonError> for Error {
    fn from(err: SerdeJsonError) -> Self {
        Error::JsonError(err.to_string())
    }
}

/// A specialized [`Result`] type for verifier operations.
pub type Result<T> = CoreResult<T, Error>;

#[cfg(test)]
mod tests {
    use serde_json::{Value, from_str};

    use super::*;

    #[test]
    fn error_display() {
        let err = Error::InvalidScalar {
            name: "r",
            reason: "33 bytes".to_string(),
        };
        assert_eq!(err.to_string(), "invalid signature scalar r: 33 bytes");

        let err = Error::UnsupportedByVersion {
            feature: "array type uint256[]".to_string(),
            version: "V3",
        };
        assert_eq!(
            err.to_string(),
            "array type uint256[] is not supported by typed data V3"
        );
    }

    #[test]
    fn from_hex_error() {
        let hex_err = FromHexError::OddLength;
        let err: Error = hex_err.into();
        assert!(matches!(err, Error::HexDecodeFailed(_)));
    }

    #[test]
    fn from_json_error() {
        let json_err = from_str::<Value>("{\"v\":").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::JsonError(_)));
    }
}
