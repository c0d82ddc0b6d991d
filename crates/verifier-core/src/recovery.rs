//! Signer recovery strategies for message signatures.
//!
//! Personal messages and typed data share the same compact signature format
//! and recovery procedure; they differ only in how the payload is hashed
//! first. The caller picks the convention by choosing a [`SignerRecovery`]
//! implementation.

use alloy_primitives::B256;
use tracing::trace;

use crate::address::Address;
use crate::crypto::recover_address;
use crate::eip191::hash_personal_message;
use crate::eip712::{TypedData, TypedDataVersion};
use crate::error::Result;
use crate::signature::CompactSignature;

/// Recovers the address that produced a signature over a payload.
pub trait SignerRecovery {
    /// The payload type this convention hashes.
    type Payload: ?Sized;

    /// Hashes `payload` under this convention.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be encoded.
    fn hash(&self, payload: &Self::Payload, version: TypedDataVersion) -> Result<B256>;

    /// Recovers the signer of `payload`.
    ///
    /// `version` selects the typed-data encoding rules; conventions that do
    /// not hash typed data ignore it.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be hashed or no public key can
    /// be recovered from the signature.
    fn recover(
        &self,
        payload: &Self::Payload,
        signature: &CompactSignature,
        version: TypedDataVersion,
    ) -> Result<Address> {
        let hash = self.hash(payload, version)?;
        let address = recover_address(&hash, signature)?;
        trace!(%hash, address = %address.to_hex(), "recovered signer");
        Ok(address)
    }
}

/// [EIP-191] `personal_sign` recovery over raw message bytes.
///
/// [EIP-191]: https://eips.ethereum.org/EIPS/eip-191
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonalMessageRecovery;

impl SignerRecovery for PersonalMessageRecovery {
    type Payload = [u8];

    fn hash(&self, payload: &[u8], _version: TypedDataVersion) -> Result<B256> {
        Ok(hash_personal_message(payload))
    }
}

/// [EIP-712] typed data recovery.
///
/// [EIP-712]: https://eips.ethereum.org/EIPS/eip-712
#[derive(Debug, Clone, Copy, Default)]
pub struct TypedDataRecovery;

impl SignerRecovery for TypedDataRecovery {
    type Payload = TypedData;

    fn hash(&self, payload: &TypedData, version: TypedDataVersion) -> Result<B256> {
        payload.signing_hash_with_version(version)
    }
}

#[cfg(test)]
mod tests {
    use k256::ecdsa::SigningKey;
    use serde_json::json;

    use super::*;

    fn sign(key: &SigningKey, hash: &B256) -> CompactSignature {
        let (sig, recid) = key.sign_prehash_recoverable(hash.as_slice()).unwrap();
        let mut bytes = sig.to_bytes().to_vec();
        bytes.push(recid.to_byte());
        CompactSignature::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn personal_message_recovers_signer() {
        let key = SigningKey::from_slice(&[0x07; 32]).unwrap();
        let message = b"hello";
        let signature = sign(&key, &hash_personal_message(message));

        let recovered = PersonalMessageRecovery
            .recover(message, &signature, TypedDataVersion::V4)
            .unwrap();
        assert_eq!(recovered, Address::from_public_key(key.verifying_key()));
    }

    #[test]
    fn personal_message_ignores_version() {
        let key = SigningKey::from_slice(&[0x07; 32]).unwrap();
        let signature = sign(&key, &hash_personal_message(b"v"));

        let v3 = PersonalMessageRecovery.recover(b"v", &signature, TypedDataVersion::V3);
        let v4 = PersonalMessageRecovery.recover(b"v", &signature, TypedDataVersion::V4);
        assert_eq!(v3.unwrap(), v4.unwrap());
    }

    #[test]
    fn typed_data_recovers_signer() {
        let key = SigningKey::from_slice(&[0x09; 32]).unwrap();
        let typed_data = TypedData::new(
            json!({"Ping": [{"name": "seq", "type": "uint64"}]}),
            "Ping".to_string(),
            json!({}),
            json!({"seq": 7}),
        )
        .unwrap();

        let hash = TypedDataRecovery
            .hash(&typed_data, TypedDataVersion::V4)
            .unwrap();
        let signature = sign(&key, &hash);

        let recovered = TypedDataRecovery
            .recover(&typed_data, &signature, TypedDataVersion::V4)
            .unwrap();
        assert_eq!(recovered, Address::from_public_key(key.verifying_key()));
    }

    #[test]
    fn typed_data_hash_errors_propagate() {
        let typed_data = TypedData::new(
            json!({}),
            "Missing".to_string(),
            json!({}),
            json!({}),
        )
        .unwrap();
        let signature = CompactSignature::new([0x11; 32], [0x22; 32], 0);

        assert!(
            TypedDataRecovery
                .recover(&typed_data, &signature, TypedDataVersion::V4)
                .is_err()
        );
    }
}
