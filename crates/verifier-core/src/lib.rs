//! Keycard Verifier Core Library
//!
//! This crate checks the signatures a Keycard hardware wallet returns for
//! transactions, personal messages and EIP-712 typed data, using secp256k1
//! (the Ethereum curve).
//!
//! # Overview
//!
//! A signing session with the device ends with a `{v, r, s}` response. Before
//! the response is shown to the user it is verified locally:
//!
//! - **Transactions**: the Keccak-256 hash of the raw transaction bytes is
//!   verified against the public key the device reported
//! - **Personal messages**: the signer is recovered under [EIP-191] and
//!   compared with the expected address
//! - **Typed data**: the signer is recovered under [EIP-712] and compared with
//!   the expected address
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Verification (verify)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │   Recovery    │   EIP-191    │   EIP-712    │   Signature   │
//! │   Strategy    │   Hashing    │   Hashing    │    Parsing    │
//! ├─────────────────────────────────────────────────────────────┤
//! │         secp256k1 (crypto)     │     Address Derivation     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## Verifying a Typed Data Signature
//!
//! ```rust
//! use keycard_verifier_core::{Address, DeviceSignature, TypedData, verify_typed_data_signature};
//!
//! let typed_data = TypedData::from_json(r#"{
//!     "types": {
//!         "EIP712Domain": [
//!             {"name": "name", "type": "string"},
//!             {"name": "version", "type": "string"},
//!             {"name": "chainId", "type": "uint256"},
//!             {"name": "verifyingContract", "type": "address"}
//!         ],
//!         "Person": [
//!             {"name": "name", "type": "string"},
//!             {"name": "wallet", "type": "address"}
//!         ],
//!         "Mail": [
//!             {"name": "from", "type": "Person"},
//!             {"name": "to", "type": "Person"},
//!             {"name": "contents", "type": "string"}
//!         ]
//!     },
//!     "primaryType": "Mail",
//!     "domain": {
//!         "name": "Ether Mail",
//!         "version": "1",
//!         "chainId": 1,
//!         "verifyingContract": "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"
//!     },
//!     "message": {
//!         "from": {"name": "Cow", "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"},
//!         "to": {"name": "Bob", "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB"},
//!         "contents": "Hello, Bob!"
//!     }
//! }"#).unwrap();
//!
//! let response = DeviceSignature::new(
//!     28,
//!     "4355c47d63924e8a72e509b65029052eb6c299d53a04e167c5775fd466751c9d",
//!     "07299936d304c153f6443dfa05f40ff007d72911b6f72307f996231605b91562",
//! );
//! let expected = Address::from_hex("0xcd2a3d9f938e13cd947ec05abc7fe734df8dd826").unwrap();
//!
//! let result = verify_typed_data_signature(&response, &expected, &typed_data).unwrap();
//! assert!(result.signed);
//! ```
//!
//! ## Verifying a Transaction Signature
//!
//! ```rust
//! use keycard_verifier_core::{DeviceSignature, verify_transaction_signature};
//!
//! let response = DeviceSignature::from_json(r#"{"v": "27", "r": "01", "s": "02"}"#).unwrap();
//! let public_key = "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798\
//!                   483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8";
//!
//! let result = verify_transaction_signature(&response, "deadbeef", public_key).unwrap();
//! assert!(!result.signed);
//! assert_eq!(result.signature.len(), 128);
//! ```
//!
//! # Feature Flags
//!
//! This crate has no optional features.
//!
//! [EIP-191]: https://eips.ethereum.org/EIPS/eip-191
//! [EIP-712]: https://eips.ethereum.org/EIPS/eip-712

// Modules
pub mod address;
pub mod crypto;
pub mod display;
pub mod eip191;
pub mod eip712;
pub mod error;
pub mod recovery;
pub mod signature;
pub mod verify;

// Re-exports for convenience
pub use address::Address;
pub use display::formatted_date;
pub use eip712::{TypedData, TypedDataVersion};
pub use error::{Error, Result};
pub use recovery::{PersonalMessageRecovery, SignerRecovery, TypedDataRecovery};
pub use signature::{CompactSignature, DeviceSignature, normalize_recovery_id};
pub use verify::{
    VerificationResult, verify_message_signature, verify_personal_message_signature,
    verify_transaction_signature, verify_typed_data_signature,
};

// Re-export commonly used alloy types
pub use alloy_primitives::B256;
