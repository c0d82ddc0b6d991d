//! [EIP-191] personal message hashing.
//!
//! ```text
//! keccak256("\x19Ethereum Signed Message:\n" || len(message) || message)
//! ```
//!
//! `len` is the decimal byte length of the message.
//!
//! [EIP-191]: https://eips.ethereum.org/EIPS/eip-191

use alloy_primitives::{B256, keccak256};

/// The personal message prefix, without the length.
pub const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Computes the hash a wallet signs for `personal_sign`.
///
/// # Example
///
/// ```
/// use keycard_verifier_core::eip191::hash_personal_message;
///
/// let hash = hash_personal_message(b"hello");
/// assert!(!hash.is_zero());
/// ```
#[must_use]
pub fn hash_personal_message(message: &[u8]) -> B256 {
    let prefix = format!("{PERSONAL_MESSAGE_PREFIX}{}", message.len());

    let mut data = Vec::with_capacity(prefix.len() + message.len());
    data.extend_from_slice(prefix.as_bytes());
    data.extend_from_slice(message);

    keccak256(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_includes_byte_length() {
        let expected = keccak256(b"\x19Ethereum Signed Message:\n5hello");
        assert_eq!(hash_personal_message(b"hello"), expected);
    }

    #[test]
    fn multibyte_length_counts_bytes() {
        // "é" is two bytes in UTF-8.
        let expected = keccak256("\x19Ethereum Signed Message:\n2é".as_bytes());
        assert_eq!(hash_personal_message("é".as_bytes()), expected);
    }

    #[test]
    fn empty_message() {
        let expected = keccak256(b"\x19Ethereum Signed Message:\n0");
        assert_eq!(hash_personal_message(b""), expected);
    }
}
