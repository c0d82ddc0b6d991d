//! Device status words.
//!
//! A Keycard Pro command that fails rejects with an error carrying the
//! ISO 7816-4 status word (`SW1 << 8 | SW2`) of the last APDU response.
//! Only a refusal on the device gets its own wording in the log panel.

use wasm_bindgen::prelude::*;

/// Log text for a load the user refused on the device.
pub const USER_CANCELED: &str = "Firmware update canceled by user";

/// An ISO 7816-4 status word returned by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusWord(u16);

impl StatusWord {
    /// The user refused the operation on the device (0x6982).
    pub const SECURITY_STATUS_NOT_SATISFIED: Self = Self(0x6982);

    /// Creates a status word from its numeric value.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Checks if the user canceled the operation on the device.
    #[must_use]
    pub const fn is_user_cancellation(self) -> bool {
        self.0 == Self::SECURITY_STATUS_NOT_SATISFIED.0
    }
}

impl From<u16> for StatusWord {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

/// Describes a failed device command for the log panel.
///
/// A cancellation on the device is reported as such; any other failure is
/// reported with the message the device layer raised.
#[must_use]
pub fn describe_status(status: StatusWord, message: &str) -> String {
    if status.is_user_cancellation() {
        format!("Error: {USER_CANCELED}")
    } else {
        format!("Error: {message}")
    }
}

/// Describes a failed device command for the log panel.
///
/// `status_code` is the `statusCode` field of the error the device layer
/// rejected with.
#[wasm_bindgen(js_name = "describeDeviceError")]
pub fn describe_device_error(status_code: u16, message: &str) -> String {
    describe_status(StatusWord::new(status_code), message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_status() {
        assert!(StatusWord::new(0x6982).is_user_cancellation());
        assert!(!StatusWord::new(0x6985).is_user_cancellation());
        assert!(!StatusWord::from(0x9000).is_user_cancellation());
    }

    #[test]
    fn cancellation_is_described() {
        assert_eq!(
            describe_device_error(0x6982, "Device error (0x6982)"),
            "Error: Firmware update canceled by user"
        );
    }

    #[test]
    fn other_errors_keep_message() {
        assert_eq!(
            describe_device_error(0x6A80, "Incorrect data"),
            "Error: Incorrect data"
        );
    }
}
