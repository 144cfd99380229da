// src/native/mod.rs

//! The boundary to the OS display subsystem.
//!
//! Everything the core logic needs from the OS is expressed through the
//! [`DisplayApi`] trait: device enumeration by index, per-device mode queries,
//! the settings apply/commit pair, and the extended display-configuration
//! queries used to resolve monitor friendly names. The trait methods return
//! decoded, owned values only — raw structs, wide strings, and in particular
//! the overlapping target/source mode-info union never cross this boundary.
//!
//! Native failures surface as `std::io::Error` values carrying the OS error
//! code, so their display form is the system's own translated message.
//!
//! The real backend lives in [`win32`] and is only compiled on Windows; tests
//! run against the scripted backend in [`mock`].

use bitflags::bitflags;

use crate::model::{DeviceStateFlags, Mode};
use crate::status::DispChange;

#[cfg(test)]
pub mod mock;
#[cfg(windows)]
pub mod win32;

bitflags! {
    /// Flag set accepted by the settings-apply call (the `CDS_*` bit layout).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ApplyFlags: u32 {
        const UPDATE_REGISTRY      = 0x0000_0001;
        const TEST                 = 0x0000_0002;
        const FULLSCREEN           = 0x0000_0004;
        const GLOBAL               = 0x0000_0008;
        const SET_PRIMARY          = 0x0000_0010;
        const VIDEO_PARAMETERS     = 0x0000_0020;
        const ENABLE_UNSAFE_MODES  = 0x0000_0100;
        const DISABLE_UNSAFE_MODES = 0x0000_0200;
        const RESET                = 0x4000_0000;
        const RESET_EX             = 0x2000_0000;
        /// Write the change without applying it. Staged changes take effect
        /// on the next flagless commit call.
        const NO_RESET             = 0x1000_0000;
    }
}

/// Index argument of the per-device mode query.
///
/// `Current` is the reserved "current settings" sentinel, a distinct request
/// from position 0 of the iterated mode list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeIndex {
    Position(u32),
    Current,
}

/// A device descriptor as decoded from the OS enumeration, before the
/// enumerator attaches its index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDevice {
    pub name: String,
    pub string: String,
    pub state: DeviceStateFlags,
}

/// Adapter identifier (a decoded LUID) keying per-target queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterId {
    pub low: u32,
    pub high: i32,
}

/// One active display path from the extended configuration query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathRecord {
    pub adapter: AdapterId,
    pub source_id: u32,
    pub target_id: u32,
}

/// One mode record from the extended configuration query, with the
/// target/source union decoded into a concrete shape per discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeRecord {
    pub adapter: AdapterId,
    pub id: u32,
    pub kind: ModeInfoKind,
}

/// Decoded payload of a mode record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeInfoKind {
    /// Signal timing on the monitor side of the path.
    Target(TargetModeInfo),
    /// The desktop surface scanned out to the path.
    Source(SourceModeInfo),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetModeInfo {
    pub active_width: u32,
    pub active_height: u32,
    /// Vertical refresh as a (numerator, denominator) rational.
    pub v_sync: (u32, u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceModeInfo {
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
}

/// Synchronous, blocking access to the OS display subsystem.
///
/// Calls are opaque blocking operations; no timeout is enforced here and a
/// hang in the OS call propagates to the caller. Implementations hold no lock
/// across calls, so concurrent external mutation between two calls of a
/// multi-step sequence is visible to the OS, not prevented here.
pub trait DisplayApi {
    /// Requests the device descriptor at `index`.
    ///
    /// `Ok(None)` means the OS reported no more devices; `Err` is a query
    /// failure, which callers treat as truncating enumeration.
    fn query_device(&mut self, index: u32) -> std::io::Result<Option<RawDevice>>;

    /// Requests one mode of `device`, either by iteration position or via the
    /// current-settings sentinel.
    ///
    /// For positional queries `Ok(None)` means the mode list is exhausted.
    /// The current-settings query reports `Err` on failure instead, since
    /// "no current mode" is not a state the OS can report.
    fn query_mode(&mut self, device: &str, index: ModeIndex) -> std::io::Result<Option<Mode>>;

    /// Writes `mode` for `device` with the given flag set.
    ///
    /// With [`ApplyFlags::NO_RESET`] this stages the change; without it the
    /// change takes effect immediately. Either way the OS status code is a
    /// normal return value, never an error.
    fn apply(&mut self, device: &str, mode: &Mode, flags: ApplyFlags) -> DispChange;

    /// The flagless, targetless apply call that puts every staged change into
    /// effect at once.
    fn commit(&mut self) -> DispChange;

    /// Required array sizes for the active display paths and modes.
    fn display_config_buffer_sizes(&mut self) -> std::io::Result<(u32, u32)>;

    /// The active path and mode arrays, sized by a preceding
    /// [`Self::display_config_buffer_sizes`] call.
    fn query_display_config(
        &mut self,
        path_count: u32,
        mode_count: u32,
    ) -> std::io::Result<(Vec<PathRecord>, Vec<ModeRecord>)>;

    /// The human-readable monitor name for one target, keyed by adapter
    /// identifier and target id.
    fn target_friendly_name(&mut self, adapter: AdapterId, target_id: u32) -> std::io::Result<String>;
}
