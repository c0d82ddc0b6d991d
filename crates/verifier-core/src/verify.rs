//! Verification entry points for device signature responses.
//!
//! Each function is a pure, synchronous check over data the caller already
//! fetched from the device:
//!
//! - [`verify_transaction_signature`]: Keccak-256 of raw transaction bytes,
//!   verified against the device's public key
//! - [`verify_personal_message_signature`]: EIP-191 recovery, compared to the
//!   expected address
//! - [`verify_typed_data_signature`]: EIP-712 v4 recovery, compared to the
//!   expected address
//!
//! Structural problems (bad hex, an unparsable key, a payload that cannot be
//! hashed) are returned as [`Error`](crate::Error). A signature that is
//! well-formed but does not match yields `signed == false`.
//!
//! # Example
//!
//! ```
//! use keycard_verifier_core::{DeviceSignature, verify_transaction_signature};
//!
//! let response = DeviceSignature::new(27, "11".repeat(32), "22".repeat(32));
//! // Not a point on the curve: a structural error, not `signed == false`.
//! let result = verify_transaction_signature(&response, "deadbeef", &"00".repeat(65));
//! assert!(result.is_err());
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::address::Address;
use crate::crypto::{message_digest, parse_public_key, verify_prehash};
use crate::display::decode_hex;
use crate::eip712::{TypedData, TypedDataVersion};
use crate::error::Result;
use crate::recovery::{PersonalMessageRecovery, SignerRecovery, TypedDataRecovery};
use crate::signature::{CompactSignature, DeviceSignature};

/// The outcome of verifying one device signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// The display-ready signature encoding.
    pub signature: String,

    /// Whether the signature was produced by the expected signer.
    pub signed: bool,
}

/// Verifies a transaction signature against the signer's public key.
///
/// # Arguments
///
/// * `response` - The `{v, r, s}` response from `signEthTransaction`
/// * `message` - The hex-encoded transaction payload sent to the device
/// * `public_key` - The SEC1 public key reported by the device, hex encoded
///
/// # Returns
///
/// A [`VerificationResult`] whose `signature` is `r || s` as lowercase hex
/// without prefix.
///
/// # Errors
///
/// Returns an error if `message`, `r`, `s` or `public_key` is not valid hex,
/// or if `public_key` is not a secp256k1 point.
///
/// # Example
///
/// ```
/// use k256::ecdsa::SigningKey;
/// use keycard_verifier_core::{DeviceSignature, verify_transaction_signature};
///
/// let key = SigningKey::from_slice(&[0x11; 32]).unwrap();
/// let tx = hex::decode("e6808504a817c80082520894").unwrap();
/// let hash = alloy_primitives::keccak256(&tx);
///
/// let (sig, recid) = key.sign_prehash_recoverable(hash.as_slice()).unwrap();
/// let bytes = sig.to_bytes();
/// let response = DeviceSignature::new(
///     27 + u64::from(recid.to_byte()),
///     hex::encode(&bytes[..32]),
///     hex::encode(&bytes[32..]),
/// );
/// let public_key = hex::encode(key.verifying_key().to_encoded_point(false).as_bytes());
///
/// let result = verify_transaction_signature(&response, "e6808504a817c80082520894", &public_key).unwrap();
/// assert!(result.signed);
/// assert_eq!(result.signature, hex::encode(bytes.as_slice()));
/// ```
pub fn verify_transaction_signature(
    response: &DeviceSignature,
    message: &str,
    public_key: &str,
) -> Result<VerificationResult> {
    let message_bytes = decode_hex(message)?;
    let hash = message_digest(&message_bytes);
    let signature = CompactSignature::from_device(response)?;
    let key = parse_public_key(public_key)?;

    let signed = verify_prehash(&hash, &signature, &key);
    debug!(%hash, v = response.v, signed, "verified transaction signature");

    Ok(VerificationResult {
        signature: signature.rs_hex(),
        signed,
    })
}

/// Verifies a message signature by recovering its signer.
///
/// The recovery convention is supplied by the caller. The returned
/// `signature` is the full 65-byte compact signature with `0x` prefix.
///
/// # Errors
///
/// Returns an error if `r` or `s` cannot be decoded; any error raised by
/// `recovery` is passed through unchanged.
pub fn verify_message_signature<R>(
    response: &DeviceSignature,
    expected: &Address,
    payload: &R::Payload,
    recovery: &R,
) -> Result<VerificationResult>
where
    R: SignerRecovery + ?Sized,
{
    let signature = CompactSignature::from_device(response)?;
    let recovered = recovery.recover(payload, &signature, TypedDataVersion::V4)?;

    let signed = recovered.to_hex() == expected.to_hex();
    debug!(
        recovered = %recovered.to_hex(),
        expected = %expected.to_hex(),
        signed,
        "verified message signature"
    );

    Ok(VerificationResult {
        signature: signature.to_hex(),
        signed,
    })
}

/// Verifies an EIP-191 personal message signature.
///
/// # Arguments
///
/// * `response` - The `{v, r, s}` response from `signEthPersonalMessage`
/// * `expected` - The address the device should have signed with
/// * `message` - The raw message bytes, without the EIP-191 prefix
///
/// # Errors
///
/// See [`verify_message_signature`].
///
/// # Example
///
/// ```
/// use keycard_verifier_core::{Address, DeviceSignature, verify_personal_message_signature};
///
/// let response = DeviceSignature::new(
///     28,
///     "b91467e570a6466aa9e9876cbcd013baba02900b8979d43fe208a4a4f339f5fd",
///     "6007e74cd82e037b800186422fc2da167c747ef045e5d18a5f5d4300f8e1a029",
/// );
/// let expected = Address::from_hex("0x2c7536E3605D9C16a7a3D7b1898e529396a65c23").unwrap();
///
/// let result = verify_personal_message_signature(&response, &expected, b"Some data").unwrap();
/// assert!(result.signed);
/// assert!(result.signature.ends_with("01"));
/// ```
pub fn verify_personal_message_signature(
    response: &DeviceSignature,
    expected: &Address,
    message: &[u8],
) -> Result<VerificationResult> {
    verify_message_signature(response, expected, message, &PersonalMessageRecovery)
}

/// Verifies an EIP-712 typed data signature.
///
/// The payload is hashed under the v4 rules.
///
/// # Arguments
///
/// * `response` - The `{v, r, s}` response from `signEIP712Message`
/// * `expected` - The address the device should have signed with
/// * `typed_data` - The payload that was sent to the device
///
/// # Errors
///
/// See [`verify_message_signature`].
///
/// # Example
///
/// ```
/// use k256::ecdsa::SigningKey;
/// use keycard_verifier_core::{Address, DeviceSignature, TypedData, verify_typed_data_signature};
///
/// let typed_data = TypedData::from_json(r#"{
///     "types": {"Ping": [{"name": "seq", "type": "uint64"}]},
///     "primaryType": "Ping",
///     "message": {"seq": 7}
/// }"#).unwrap();
///
/// let key = SigningKey::from_slice(&[0x09; 32]).unwrap();
/// let hash = typed_data.signing_hash().unwrap();
/// let (sig, recid) = key.sign_prehash_recoverable(hash.as_slice()).unwrap();
/// let bytes = sig.to_bytes();
/// let response = DeviceSignature::new(
///     u64::from(recid.to_byte()),
///     hex::encode(&bytes[..32]),
///     hex::encode(&bytes[32..]),
/// );
///
/// let signer = Address::from_public_key(key.verifying_key());
/// assert!(verify_typed_data_signature(&response, &signer, &typed_data).unwrap().signed);
///
/// let stranger = Address::from_hex("0x0000000000000000000000000000000000000001").unwrap();
/// assert!(!verify_typed_data_signature(&response, &stranger, &typed_data).unwrap().signed);
/// ```
pub fn verify_typed_data_signature(
    response: &DeviceSignature,
    expected: &Address,
    typed_data: &TypedData,
) -> Result<VerificationResult> {
    verify_message_signature(response, expected, typed_data, &TypedDataRecovery)
}
