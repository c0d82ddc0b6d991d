//! JavaScript-friendly error types for WASM bindings.
//!
//! All errors implement conversion to [`JsValue`], so a binding that returns
//! [`WasmResult`] rejects on the JavaScript side with an `Error` object.

use std::{error, fmt};

use js_sys::Error as JsError;
use keycard_verifier_core::Error as CoreError;
use wasm_bindgen::prelude::*;

/// Error type for WASM operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WasmError {
    /// The device signature JSON could not be read.
    InvalidSignature(String),

    /// The expected signer address could not be derived.
    InvalidSigner(String),

    /// Invalid typed data (EIP-712).
    InvalidTypedData(String),

    /// Core library error.
    CoreError(String),
}

impl fmt::Display for WasmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSignature(msg) => {
                write!(f, "Invalid signature: {msg}")
            }
            Self::InvalidSigner(msg) => {
                write!(f, "Invalid signer: {msg}")
            }
            Self::InvalidTypedData(msg) => {
                write!(f, "Invalid typed data: {msg}")
            }
            Self::CoreError(msg) => {
                write!(f, "Core error: {msg}")
            }
        }
    }
}

impl error::Error for WasmError {}

impl From<WasmError> for JsValue {
    fn from(error: WasmError) -> Self {
        JsError::new(&error.to_string()).into()
    }
}

impl From<CoreError> for WasmError {
    fn from(error: CoreError) -> Self {
        Self::CoreError(error.to_string())
    }
}

/// Result type for WASM operations.
pub type WasmResult<T> = Result<T, WasmError>;
