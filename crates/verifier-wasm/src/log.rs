//! Log panel lines.
//!
//! Every entry the web app shows is prefixed with a `DD-MM-YYYY HH:MM:SS`
//! timestamp and a non-breaking space, since the panel renders HTML.

use keycard_verifier_core::formatted_date;
use wasm_bindgen::prelude::*;

use crate::VerificationOutcome;

/// Separator between the timestamp and the message.
pub const LOG_SEPARATOR: &str = "&nbsp;";

/// Message shown when a returned signature does not verify.
pub const INVALID_SIGNATURE: &str = "Error. Invalid signature";

/// The signing commands whose results are logged.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningCommand {
    /// `signEthTransaction`
    Transaction,

    /// `signEthPersonalMessage`
    PersonalMessage,

    /// `signEIP712Message`
    TypedData,
}

impl SigningCommand {
    const fn label(self) -> &'static str {
        match self {
            Self::Transaction => "Transaction",
            Self::PersonalMessage => "Personal message",
            Self::TypedData => "EIP712 Message",
        }
    }

    /// Transaction signatures are bare `r || s` hex; message signatures
    /// already carry a `0x` prefix.
    const fn signature_prefix(self) -> &'static str {
        match self {
            Self::Transaction => "0x",
            Self::PersonalMessage | Self::TypedData => "",
        }
    }
}

/// Builds the log message for a verified signing result.
///
/// # Arguments
///
/// * `command` - The device command that produced the signature
/// * `outcome` - The result of the matching `verify*` call
///
/// # Example
///
/// ```javascript
/// const outcome = verifyTransaction(JSON.stringify(response), tx, publicKey);
/// panel.innerHTML += logLine(outcomeMessage(SigningCommand.Transaction, outcome));
/// ```
#[wasm_bindgen(js_name = "outcomeMessage")]
pub fn outcome_message(command: SigningCommand, outcome: &VerificationOutcome) -> String {
    if !outcome.signed() {
        return INVALID_SIGNATURE.to_string();
    }

    format!(
        "{} successfully signed. Signature - {}{}",
        command.label(),
        command.signature_prefix(),
        outcome.signature()
    )
}

/// Prefixes `message` with the given timestamp.
#[must_use]
pub fn compose_log_line(timestamp: &str, message: &str) -> String {
    format!("{timestamp}{LOG_SEPARATOR}{message}")
}

/// Returns the current local time as `DD-MM-YYYY HH:MM:SS`.
#[wasm_bindgen(js_name = "formattedDate")]
pub fn formatted_date_js() -> String {
    formatted_date()
}

/// Builds a timestamped log line and echoes it to the browser console.
#[wasm_bindgen(js_name = "logLine")]
pub fn log_line(message: &str) -> String {
    let timestamp = formatted_date();
    web_sys::console::log_1(&JsValue::from_str(&format!("{timestamp} {message}")));
    compose_log_line(&timestamp, message)
}

#[cfg(test)]
mod tests {
    use keycard_verifier_core::VerificationResult;

    use super::*;

    fn outcome(signature: &str, signed: bool) -> VerificationOutcome {
        VerificationOutcome::from(VerificationResult {
            signature: signature.to_string(),
            signed,
        })
    }

    #[test]
    fn compose() {
        assert_eq!(
            compose_log_line("02-01-2024 03:04:05", "KPro Wallet connected"),
            "02-01-2024 03:04:05&nbsp;KPro Wallet connected"
        );
    }

    #[test]
    fn transaction_outcome_gets_prefix() {
        let message = outcome_message(SigningCommand::Transaction, &outcome("abcd", true));
        assert_eq!(message, "Transaction successfully signed. Signature - 0xabcd");
    }

    #[test]
    fn message_outcomes_keep_signature() {
        let ok = outcome("0xabcd01", true);
        assert_eq!(
            outcome_message(SigningCommand::PersonalMessage, &ok),
            "Personal message successfully signed. Signature - 0xabcd01"
        );
        assert_eq!(
            outcome_message(SigningCommand::TypedData, &ok),
            "EIP712 Message successfully signed. Signature - 0xabcd01"
        );
    }

    #[test]
    fn unsigned_outcome() {
        for command in [
            SigningCommand::Transaction,
            SigningCommand::PersonalMessage,
            SigningCommand::TypedData,
        ] {
            assert_eq!(outcome_message(command, &outcome("00", false)), INVALID_SIGNATURE);
        }
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use wasm_bindgen_test::*;

    use super::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn formatted_date_shape() {
        let date = formatted_date_js();
        // DD-MM-YYYY HH:MM:SS
        assert_eq!(date.len(), 19);
        assert_eq!(&date[2..3], "-");
        assert_eq!(&date[10..11], " ");
    }

    #[wasm_bindgen_test]
    fn log_line_is_timestamped() {
        let line = log_line("KPro Wallet connected");
        assert!(line.ends_with("&nbsp;KPro Wallet connected"));
    }
}
