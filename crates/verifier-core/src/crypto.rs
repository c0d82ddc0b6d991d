//! secp256k1 primitives used by the verifiers.
//!
//! - Public key parsing from device hex
//! - Prehash ECDSA verification
//! - Signer address recovery from a compact signature
//!
//! All hashing is Keccak-256 (the Ethereum variant, not SHA3-256).

use alloy_primitives::{B256, keccak256};
use k256::FieldBytes;
use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{RecoveryId, Signature as K256Signature, VerifyingKey};

use crate::address::Address;
use crate::display::decode_hex;
use crate::error::{Error, Result};
use crate::signature::CompactSignature;

/// Hashes raw bytes with Keccak-256.
#[must_use]
pub fn message_digest(bytes: &[u8]) -> B256 {
    keccak256(bytes)
}

/// Parses a SEC1 public key (compressed or uncompressed) from hex.
///
/// The hex is lowercased first, so keys reported in any letter case parse to
/// the same point.
///
/// # Errors
///
/// Returns [`Error::HexDecodeFailed`] for malformed hex, or
/// [`Error::InvalidPublicKey`] if the bytes are not a point on the curve.
pub fn parse_public_key(hex_str: &str) -> Result<VerifyingKey> {
    let bytes = decode_hex(&hex_str.to_ascii_lowercase())?;
    VerifyingKey::from_sec1_bytes(&bytes).map_err(|e| Error::InvalidPublicKey(e.to_string()))
}

/// Verifies a signature over a 32-byte prehash.
///
/// Out-of-range scalars and high-S signatures do not verify.
///
/// # Returns
///
/// [`true`](bool) if the signature is valid, [`false`](bool) otherwise.
#[must_use]
pub fn verify_prehash(hash: &B256, signature: &CompactSignature, public_key: &VerifyingKey) -> bool {
    let r_field = FieldBytes::from(*signature.r());
    let s_field = FieldBytes::from(*signature.s());

    if let Ok(sig) = K256Signature::from_scalars(r_field, s_field) {
        public_key.verify_prehash(hash.as_slice(), &sig).is_ok()
    } else {
        false
    }
}

/// Recovers the signing address from a prehash and compact signature.
///
/// A recovery byte below 27 is read as `27 + byte`, matching Ethereum's
/// `ecrecover`. High-S signatures are folded to low-S with the recovery id
/// flipped, so both forms recover the same key.
///
/// # Errors
///
/// Returns [`Error::InvalidSignature`] if `r` or `s` is zero or not below the
/// curve order, or [`Error::RecoveryFailed`] if no key matches.
pub fn recover_address(hash: &B256, signature: &CompactSignature) -> Result<Address> {
    let key = recover_public_key(hash, signature)?;
    Ok(Address::from_public_key(&key))
}

fn recover_public_key(hash: &B256, signature: &CompactSignature) -> Result<VerifyingKey> {
    let sig = K256Signature::from_scalars(
        FieldBytes::from(*signature.r()),
        FieldBytes::from(*signature.s()),
    )
    .map_err(|_| Error::InvalidSignature("signature scalars out of range".to_string()))?;

    let v = ethereum_v(signature.recovery_id());
    let mut is_y_odd = v == 28;

    let sig = match sig.normalize_s() {
        Some(low_s) => {
            is_y_odd = !is_y_odd;
            low_s
        }
        None => sig,
    };

    let recovery_id = RecoveryId::new(is_y_odd, false);
    VerifyingKey::recover_from_prehash(hash.as_slice(), &sig, recovery_id)
        .map_err(|e| Error::RecoveryFailed(e.to_string()))
}

/// Lifts a `0`/`1` recovery byte into the `27`/`28` range.
const fn ethereum_v(recovery_byte: u8) -> u8 {
    if recovery_byte < 27 {
        recovery_byte + 27
    } else {
        recovery_byte
    }
}

#[cfg(test)]
mod tests {
    use k256::Scalar;
    use k256::ecdsa::SigningKey;

    use super::*;

    fn test_key() -> SigningKey {
        SigningKey::from_slice(&[0x42; 32]).unwrap()
    }

    fn sign(key: &SigningKey, hash: &B256) -> CompactSignature {
        let (sig, recid) = key.sign_prehash_recoverable(hash.as_slice()).unwrap();
        let mut bytes = sig.to_bytes().to_vec();
        bytes.push(recid.to_byte());
        CompactSignature::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn digest_is_keccak() {
        // keccak256("") is the well-known empty hash.
        assert_eq!(
            hex::encode(message_digest(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn parse_public_key_any_case() {
        let key = test_key();
        let hex_key = hex::encode(key.verifying_key().to_encoded_point(false).as_bytes());

        let lower = parse_public_key(&hex_key).unwrap();
        let upper = parse_public_key(&hex_key.to_uppercase()).unwrap();
        let prefixed = parse_public_key(&format!("0x{hex_key}")).unwrap();

        assert_eq!(lower, upper);
        assert_eq!(lower, prefixed);
    }

    #[test]
    fn parse_public_key_rejects_garbage() {
        assert!(matches!(
            parse_public_key("04zz"),
            Err(Error::HexDecodeFailed(_))
        ));
        assert!(matches!(
            parse_public_key(&"00".repeat(65)),
            Err(Error::InvalidPublicKey(_))
        ));
    }

    #[test]
    fn verify_roundtrip() {
        let key = test_key();
        let hash = message_digest(b"keycard");
        let sig = sign(&key, &hash);

        assert!(verify_prehash(&hash, &sig, key.verifying_key()));
        assert!(!verify_prehash(&message_digest(b"other"), &sig, key.verifying_key()));
    }

    #[test]
    fn verify_out_of_range_scalars_is_false() {
        let key = test_key();
        let hash = message_digest(b"keycard");
        let zero = CompactSignature::new([0u8; 32], [0u8; 32], 0);
        let max = CompactSignature::new([0xff; 32], [0xff; 32], 0);

        assert!(!verify_prehash(&hash, &zero, key.verifying_key()));
        assert!(!verify_prehash(&hash, &max, key.verifying_key()));
    }

    #[test]
    fn recover_matches_signer() {
        let key = test_key();
        let hash = message_digest(b"recover me");
        let sig = sign(&key, &hash);

        let recovered = recover_address(&hash, &sig).unwrap();
        assert_eq!(recovered, Address::from_public_key(key.verifying_key()));
    }

    #[test]
    fn recover_accepts_high_s() {
        let key = test_key();
        let hash = message_digest(b"malleable");
        let sig = sign(&key, &hash);

        let low = K256Signature::from_scalars(
            FieldBytes::from(*sig.r()),
            FieldBytes::from(*sig.s()),
        )
        .unwrap();
        // n - s, with the parity of R flipped.
        let s_scalar: Scalar = *low.s().as_ref();
        let mut high_s = [0u8; 32];
        high_s.copy_from_slice(&(-s_scalar).to_bytes());
        let high = CompactSignature::new(*sig.r(), high_s, sig.recovery_id() ^ 1);

        let expected = Address::from_public_key(key.verifying_key());
        assert_eq!(recover_address(&hash, &high).unwrap(), expected);
    }

    #[test]
    fn recover_rejects_zero_scalars() {
        let hash = message_digest(b"x");
        let sig = CompactSignature::new([0u8; 32], [0u8; 32], 0);
        assert!(matches!(
            recover_address(&hash, &sig),
            Err(Error::InvalidSignature(_))
        ));
    }
}
