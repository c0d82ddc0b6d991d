//! Ethereum address derivation from secp256k1 public keys.
//!
//! The derivation follows the standard Ethereum rule:
//!
//! 1. Take the uncompressed public key (65 bytes: `0x04 || x || y`)
//! 2. Remove the `0x04` prefix to get 64 bytes (`x || y`)
//! 3. Compute the Keccak-256 hash of the 64 bytes
//! 4. Take the last 20 bytes of the hash as the address
//!
//! # Example
//!
//! ```
//! use keycard_verifier_core::Address;
//!
//! let addr = Address::from_hex("0xcd2a3d9f938e13cd947ec05abc7fe734df8dd826").unwrap();
//! assert_eq!(addr.to_hex(), "0xcd2a3d9f938e13cd947ec05abc7fe734df8dd826");
//! ```

use std::fmt;

use alloy_primitives::{Address as AlloyAddress, keccak256};
use k256::ecdsa::VerifyingKey;
use serde::{Deserialize, Serialize};

use crate::display::decode_hex;
use crate::error::{Error, Result};

/// An Ethereum address (20 bytes).
///
/// Wraps [`alloy_primitives::Address`]. [`Address::to_hex`] renders the
/// lowercase form that verification compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(AlloyAddress);

impl Address {
    /// The length of an Ethereum address in bytes.
    pub const BYTE_LEN: usize = 20;

    /// Creates a new address from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; Self::BYTE_LEN]) -> Self {
        Self(AlloyAddress::new(bytes))
    }

    /// Returns the zero address.
    #[must_use]
    pub const fn zero() -> Self {
        Self(AlloyAddress::ZERO)
    }

    /// Checks if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Derives the address of a secp256k1 verifying key.
    #[must_use]
    pub fn from_public_key(public_key: &VerifyingKey) -> Self {
        let encoded = public_key.to_encoded_point(false);
        Self::from_uncompressed_coordinates(&encoded.as_bytes()[1..])
    }

    /// Derives an address from raw public key bytes.
    ///
    /// # Arguments
    ///
    /// * `bytes` - 65 bytes (`0x04 || x || y`), 64 bytes (`x || y`), or a
    ///   33-byte compressed SEC1 point
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPublicKey`] if:
    /// - The byte length is not 33, 64 or 65
    /// - For 65-byte input, the first byte is not `0x04`
    /// - A compressed point is not on the curve
    pub fn from_public_key_bytes(bytes: &[u8]) -> Result<Self> {
        match bytes.len() {
            64 => Ok(Self::from_uncompressed_coordinates(bytes)),
            65 => {
                if bytes[0] != 0x04 {
                    return Err(Error::InvalidPublicKey(
                        "65-byte public key must start with 0x04".to_string(),
                    ));
                }
                Ok(Self::from_uncompressed_coordinates(&bytes[1..]))
            }
            33 => {
                let key = VerifyingKey::from_sec1_bytes(bytes)
                    .map_err(|e| Error::InvalidPublicKey(e.to_string()))?;
                Ok(Self::from_public_key(&key))
            }
            len => Err(Error::InvalidPublicKey(format!(
                "expected 33, 64 or 65 bytes, got {len}"
            ))),
        }
    }

    /// Derives an address from a hex-encoded public key as reported by the
    /// device's "get public key" command.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HexDecodeFailed`] for malformed hex, or
    /// [`Error::InvalidPublicKey`] as in [`Address::from_public_key_bytes`].
    pub fn from_public_key_hex(hex_str: &str) -> Result<Self> {
        Self::from_public_key_bytes(&decode_hex(hex_str)?)
    }

    fn from_uncompressed_coordinates(xy: &[u8]) -> Self {
        let hash = keccak256(xy);

        let mut address_bytes = [0u8; Self::BYTE_LEN];
        address_bytes.copy_from_slice(&hash[12..]);

        Self::new(address_bytes)
    }

    /// Returns the address bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; Self::BYTE_LEN] {
        self.0.as_ref()
    }

    /// Returns the address as an EIP-55 checksummed hex string.
    #[must_use]
    pub fn to_checksum_hex(&self) -> String {
        self.0.to_checksum(None)
    }

    /// Returns the address as a lowercase hex string with `0x` prefix.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.as_bytes()))
    }

    /// Parses an address from a hex string, optionally prefixed with `0x`.
    ///
    /// Any letter case is accepted; the checksum is not enforced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HexDecodeFailed`] if the hex string is invalid, or
    /// [`Error::InvalidAddress`] if the decoded bytes are not 20 bytes.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = decode_hex(hex_str)?;

        let address_bytes: [u8; Self::BYTE_LEN] = bytes.as_slice().try_into().map_err(|_| {
            Error::InvalidAddress(format!(
                "expected {} bytes, got {}",
                Self::BYTE_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self::new(address_bytes))
    }

    /// Returns the inner [`alloy_primitives::Address`].
    #[must_use]
    pub const fn inner(&self) -> AlloyAddress {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_checksum_hex())
    }
}

impl From<AlloyAddress> for Address {
    fn from(addr: AlloyAddress) -> Self {
        Self(addr)
    }
}

impl From<Address> for AlloyAddress {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self::new(bytes)
    }
}

#[cfg(test)]
mod tests {
    use k256::ecdsa::SigningKey;

    use super::*;

    /// Private key from the web3.js account documentation.
    const KNOWN_KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    const KNOWN_ADDRESS: &str = "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23";

    fn known_key() -> SigningKey {
        SigningKey::from_slice(&hex::decode(KNOWN_KEY).unwrap()).unwrap()
    }

    #[test]
    fn address_from_known_key() {
        let addr = Address::from_public_key(known_key().verifying_key());
        assert_eq!(addr.to_hex(), KNOWN_ADDRESS);
    }

    #[test]
    fn address_from_all_key_encodings() {
        let key = known_key();
        let verifying = key.verifying_key();

        let uncompressed = verifying.to_encoded_point(false);
        let compressed = verifying.to_encoded_point(true);

        let from_65 = Address::from_public_key_bytes(uncompressed.as_bytes()).unwrap();
        let from_64 = Address::from_public_key_bytes(&uncompressed.as_bytes()[1..]).unwrap();
        let from_33 = Address::from_public_key_bytes(compressed.as_bytes()).unwrap();

        assert_eq!(from_65.to_hex(), KNOWN_ADDRESS);
        assert_eq!(from_64, from_65);
        assert_eq!(from_33, from_65);
    }

    #[test]
    fn address_from_public_key_hex() {
        let key = known_key();
        let pubkey_hex = hex::encode(key.verifying_key().to_encoded_point(false).as_bytes());

        let addr = Address::from_public_key_hex(&pubkey_hex).unwrap();
        let upper = Address::from_public_key_hex(&pubkey_hex.to_uppercase()).unwrap();

        assert_eq!(addr.to_hex(), KNOWN_ADDRESS);
        assert_eq!(addr, upper);
    }

    #[test]
    fn address_from_public_key_bytes_invalid_prefix() {
        let mut pubkey_bytes = [0u8; 65];
        pubkey_bytes[0] = 0x02;

        let result = Address::from_public_key_bytes(&pubkey_bytes);
        assert!(matches!(result, Err(Error::InvalidPublicKey(_))));
    }

    #[test]
    fn address_from_public_key_bytes_invalid_length() {
        let result = Address::from_public_key_bytes(&[0u8; 63]);
        assert!(matches!(result, Err(Error::InvalidPublicKey(_))));
    }

    #[test]
    fn address_from_hex_mixed_case() {
        let lower = Address::from_hex(KNOWN_ADDRESS).unwrap();
        let checksummed = Address::from_hex("0x2c7536E3605D9C16a7a3D7b1898e529396a65c23").unwrap();
        assert_eq!(lower, checksummed);
    }

    #[test]
    fn address_from_hex_invalid_length() {
        let result = Address::from_hex("0x1234");
        assert!(matches!(result, Err(Error::InvalidAddress(_))));
    }

    #[test]
    fn address_display_is_checksummed() {
        let addr = Address::from_hex(KNOWN_ADDRESS).unwrap();
        assert_eq!(format!("{addr}"), "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23");
    }

    #[test]
    fn address_alloy_conversions() {
        let addr: Address = AlloyAddress::ZERO.into();
        assert!(addr.is_zero());
        assert_eq!(addr, Address::zero());

        let alloy_addr: AlloyAddress = Address::new([1u8; 20]).into();
        assert_eq!(alloy_addr.as_slice(), &[1u8; 20]);
    }
}
