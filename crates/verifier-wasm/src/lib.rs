//! Keycard Verifier WASM Library
//!
//! This crate provides WebAssembly bindings for the Keycard Pro signature
//! verifier, so the web app can check every `{v, r, s}` response the device
//! returns before showing it to the user.
//!
//! The device itself is driven from JavaScript; these bindings only see the
//! data that came back.
//!
//! # Quick Start
//!
//! ```javascript
//! import init, {
//!     SigningCommand, verifyTypedData, outcomeMessage, logLine,
//! } from 'keycard-verifier-wasm';
//!
//! await init();
//!
//! const { publicKey } = await app.getPublicKey(path);
//! const response = await app.signEIP712Message(path, typedData);
//!
//! const outcome = verifyTypedData(
//!     JSON.stringify(response),
//!     publicKey,
//!     JSON.stringify(typedData),
//! );
//! panel.innerHTML += logLine(outcomeMessage(SigningCommand.TypedData, outcome));
//! ```
//!
//! # API Reference
//!
//! - [`verifyTransaction(signatureJson, message, publicKey)`](verify_transaction)
//! - [`verifyPersonalMessage(signatureJson, publicKey, message)`](verify_personal_message)
//! - [`verifyTypedData(signatureJson, publicKey, typedDataJson)`](verify_typed_data)
//! - [`formattedDate()`](log::formatted_date_js)
//! - [`logLine(message)`](log::log_line)
//! - [`outcomeMessage(command, outcome)`](log::outcome_message)
//! - [`describeDeviceError(statusCode, message)`](status::describe_device_error)
//! - [`getVersion()`](get_version)
//!
//! Each `verify*` function returns a [`VerificationOutcome`] with `signature`
//! and `signed` properties, or throws an `Error` if the inputs are malformed.
//!
//! # Feature Flags
//!
//! - `console_error_panic_hook` (default): forwards Rust panics to
//!   `console.error`.

pub mod error;
pub mod log;
pub mod status;

pub use error::{WasmError, WasmResult};
pub use log::SigningCommand;
pub use status::StatusWord;

use keycard_verifier_core::{
    Address, DeviceSignature, TypedData, VerificationResult, verify_personal_message_signature,
    verify_transaction_signature, verify_typed_data_signature,
};
use wasm_bindgen::prelude::*;

/// Initializes the WASM module.
///
/// This function is automatically called when the module is loaded.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// The result of verifying a device signature, as seen from JavaScript.
#[wasm_bindgen]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOutcome {
    signature: String,
    signed: bool,
}

#[wasm_bindgen]
impl VerificationOutcome {
    /// The signature in display form.
    #[wasm_bindgen(getter)]
    pub fn signature(&self) -> String {
        self.signature.clone()
    }

    /// Whether the expected signer produced the signature.
    #[wasm_bindgen(getter)]
    pub fn signed(&self) -> bool {
        self.signed
    }
}

impl From<VerificationResult> for VerificationOutcome {
    fn from(result: VerificationResult) -> Self {
        Self {
            signature: result.signature,
            signed: result.signed,
        }
    }
}

fn parse_signature(signature_json: &str) -> WasmResult<DeviceSignature> {
    serde_json::from_str(signature_json).map_err(|e| WasmError::InvalidSignature(e.to_string()))
}

fn signer_address(public_key: &str) -> WasmResult<Address> {
    Address::from_public_key_hex(public_key).map_err(|e| WasmError::InvalidSigner(e.to_string()))
}

/// Verifies a transaction signature against the device's public key.
///
/// # Arguments
///
/// * `signature_json` - The `{v, r, s}` object returned by the device, as JSON
/// * `message` - The hex-encoded transaction sent to the device
/// * `public_key` - The hex-encoded public key reported by the device
///
/// # Errors
///
/// Returns an error if any input is malformed.
#[wasm_bindgen(js_name = "verifyTransaction")]
pub fn verify_transaction(
    signature_json: &str,
    message: &str,
    public_key: &str,
) -> WasmResult<VerificationOutcome> {
    let response = parse_signature(signature_json)?;
    Ok(verify_transaction_signature(&response, message, public_key)?.into())
}

/// Verifies a personal message signature.
///
/// The expected signer is the address of `public_key`.
///
/// # Errors
///
/// Returns an error if any input is malformed.
#[wasm_bindgen(js_name = "verifyPersonalMessage")]
pub fn verify_personal_message(
    signature_json: &str,
    public_key: &str,
    message: &str,
) -> WasmResult<VerificationOutcome> {
    let response = parse_signature(signature_json)?;
    let expected = signer_address(public_key)?;
    Ok(verify_personal_message_signature(&response, &expected, message.as_bytes())?.into())
}

/// Verifies an EIP-712 typed data signature.
///
/// The expected signer is the address of `public_key`.
///
/// # Errors
///
/// Returns an error if any input is malformed or the typed data cannot be
/// encoded.
#[wasm_bindgen(js_name = "verifyTypedData")]
pub fn verify_typed_data(
    signature_json: &str,
    public_key: &str,
    typed_data_json: &str,
) -> WasmResult<VerificationOutcome> {
    let response = parse_signature(signature_json)?;
    let expected = signer_address(public_key)?;
    let typed_data: TypedData = serde_json::from_str(typed_data_json)
        .map_err(|e| WasmError::InvalidTypedData(e.to_string()))?;
    Ok(verify_typed_data_signature(&response, &expected, &typed_data)?.into())
}

/// Returns the library version.
///
/// # Returns
///
/// The version string (e.g., `"0.1.0"`).
#[wasm_bindgen(js_name = "getVersion")]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Import for WASM tests
    #[expect(unused_imports, reason = "import for WASM tests")]
    use wasm_bindgen_test::wasm_bindgen_test;

    // web3.js `accounts.sign("Some data", ...)` for key 0x4c08...2318.
    const PUBLIC_KEY: &str = "044e3b81af9c2234cad09d679ce6035ed1392347ce64ce405f5dcd36228a25de6e\
                              47fd35c4215d1edf53e6f83de344615ce719bdb0fd878f6ed76f06dd277956de";

    const SOME_DATA_SIGNATURE: &str = r#"{
        "v": "0x1c",
        "r": "b91467e570a6466aa9e9876cbcd013baba02900b8979d43fe208a4a4f339f5fd",
        "s": "6007e74cd82e037b800186422fc2da167c747ef045e5d18a5f5d4300f8e1a029"
    }"#;

    #[test]
    fn version() {
        let version = get_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn outcome_from_result() {
        let outcome = VerificationOutcome::from(VerificationResult {
            signature: "0xab".to_string(),
            signed: true,
        });
        assert_eq!(outcome.signature(), "0xab");
        assert!(outcome.signed());
    }

    #[test]
    fn personal_message_signed() {
        let outcome = verify_personal_message(SOME_DATA_SIGNATURE, PUBLIC_KEY, "Some data").unwrap();
        assert!(outcome.signed());
        assert_eq!(
            outcome.signature(),
            "0xb91467e570a6466aa9e9876cbcd013baba02900b8979d43fe208a4a4f339f5fd\
             6007e74cd82e037b800186422fc2da167c747ef045e5d18a5f5d4300f8e1a02901"
        );
    }

    #[test]
    fn personal_message_other_text() {
        let outcome = verify_personal_message(SOME_DATA_SIGNATURE, PUBLIC_KEY, "Other data").unwrap();
        assert!(!outcome.signed());
    }

    #[test]
    fn transaction_unsigned_for_unrelated_hash() {
        let outcome = verify_transaction(SOME_DATA_SIGNATURE, "deadbeef", PUBLIC_KEY).unwrap();
        assert!(!outcome.signed());
        assert_eq!(outcome.signature().len(), 128);
    }

    #[test]
    fn malformed_signature_json() {
        let result = verify_transaction("{\"v\": 27}", "00", PUBLIC_KEY);
        assert!(matches!(result, Err(WasmError::InvalidSignature(_))));
    }

    #[test]
    fn malformed_public_key() {
        let result = verify_personal_message(SOME_DATA_SIGNATURE, "04zz", "Some data");
        assert!(matches!(result, Err(WasmError::InvalidSigner(_))));
    }

    #[test]
    fn malformed_typed_data() {
        let result = verify_typed_data(SOME_DATA_SIGNATURE, &"ab".repeat(64), "{\"types\": 1}");
        assert!(matches!(result, Err(WasmError::InvalidTypedData(_))));
    }
}
