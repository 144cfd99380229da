// src/status.rs

//! Status taxonomy for the settings-apply call and the mapping from status
//! codes to the fixed outcome messages handed back to callers.
//!
//! Every apply outcome, including the failure codes, is a normal returned
//! value here; nothing in this module raises an error.

use serde::{Deserialize, Serialize};

/// Return code of the native `ChangeDisplaySettingsEx` call, decoded at the
/// boundary. Codes outside the eight documented values are preserved in
/// [`DispChange::Other`] rather than collapsed, so logs keep the raw number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispChange {
    Successful,
    Restart,
    Failed,
    BadMode,
    NotUpdated,
    BadFlags,
    BadParam,
    BadDualView,
    Other(i32),
}

impl DispChange {
    /// Decodes a raw status code.
    pub fn from_raw(code: i32) -> Self {
        match code {
            0 => DispChange::Successful,
            1 => DispChange::Restart,
            -1 => DispChange::Failed,
            -2 => DispChange::BadMode,
            -3 => DispChange::NotUpdated,
            -4 => DispChange::BadFlags,
            -5 => DispChange::BadParam,
            -6 => DispChange::BadDualView,
            other => DispChange::Other(other),
        }
    }

    /// The raw status code this variant was decoded from.
    pub fn raw(self) -> i32 {
        match self {
            DispChange::Successful => 0,
            DispChange::Restart => 1,
            DispChange::Failed => -1,
            DispChange::BadMode => -2,
            DispChange::NotUpdated => -3,
            DispChange::BadFlags => -4,
            DispChange::BadParam => -5,
            DispChange::BadDualView => -6,
            DispChange::Other(code) => code,
        }
    }

    pub fn is_success(self) -> bool {
        self == DispChange::Successful
    }

    /// The fixed outcome message for this status code.
    ///
    /// Total and pure: the same code always yields the same message,
    /// independent of call history.
    pub fn message(self) -> &'static str {
        match self {
            DispChange::Successful => "Resolution updated.",
            DispChange::Restart => "A restart is required for this resolution to take effect.",
            DispChange::BadMode => "resolution is not valid.",
            DispChange::BadDualView => {
                "The settings change was unsuccessful because system is DualView capable."
            }
            DispChange::BadFlags => "An invalid set of flags was passed in.",
            DispChange::BadParam => {
                "An invalid parameter was passed in. This can include an invalid flag or combination of flags."
            }
            DispChange::Failed => "Resolution failed to update.",
            DispChange::NotUpdated => "Unable to write settings to the registry.",
            DispChange::Other(_) => "Unknown return value from ChangeDisplaySettings API.",
        }
    }
}
