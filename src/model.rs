// src/model.rs

//! Data model for the display topology manager.
//!
//! Everything in this module is transient: records are rebuilt from scratch on
//! every query and never cached, because the authoritative state lives in the
//! OS display subsystem. A mutation performed through [`crate::mutate`] does
//! not invalidate snapshots held by callers; callers re-query instead.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// State bits reported for a display device by the OS device enumeration
    /// (the `DISPLAY_DEVICE.StateFlags` bit layout).
    ///
    /// Kept as a flag set with named accessors on the owning records rather
    /// than a raw integer, so core logic never tests magic bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct DeviceStateFlags: u32 {
        /// The device is part of the desktop.
        const ATTACHED_TO_DESKTOP = 0x0000_0001;
        const MULTI_DRIVER        = 0x0000_0002;
        /// The device is the primary display (coordinate-space origin).
        const PRIMARY_DEVICE      = 0x0000_0004;
        /// Pseudo device that mirrors application drawing for remoting.
        const MIRRORING_DRIVER    = 0x0000_0008;
        const VGA_COMPATIBLE      = 0x0000_0010;
        /// The device is removable; it cannot be the primary display.
        const REMOVABLE           = 0x0000_0020;
        /// The device has more display modes than its output devices support.
        const MODES_PRUNED        = 0x0800_0000;
        const REMOTE              = 0x0400_0000;
        const DISCONNECT          = 0x0200_0000;
    }
}

/// Screen orientation, one quarter-turn per variant.
///
/// The numeric mapping to the native `DMDO_*` values is owned by the native
/// boundary; core logic only ever sees this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Orientation {
    #[default]
    Degrees0,
    Degrees90,
    Degrees180,
    Degrees270,
}

impl Orientation {
    /// Maps a rotation angle in degrees to an orientation.
    ///
    /// Returns `None` for anything outside {0, 90, 180, 270}; callers that
    /// receive an unsupported angle keep the orientation they already have.
    pub fn from_angle(angle: i32) -> Option<Self> {
        match angle {
            0 => Some(Orientation::Degrees0),
            90 => Some(Orientation::Degrees90),
            180 => Some(Orientation::Degrees180),
            270 => Some(Orientation::Degrees270),
            _ => None,
        }
    }

    /// The rotation angle in degrees.
    pub fn angle(self) -> i32 {
        match self {
            Orientation::Degrees0 => 0,
            Orientation::Degrees90 => 90,
            Orientation::Degrees180 => 180,
            Orientation::Degrees270 => 270,
        }
    }
}

/// A desktop-space position in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// One concrete (resolution, depth, frequency, orientation) combination a
/// device can run.
///
/// `position` is populated only when the value represents a device's *current*
/// settings; entries of an enumerated mode catalog carry `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    pub width: u32,
    pub height: u32,
    pub bits_per_pixel: u32,
    pub frequency: u32,
    pub orientation: Orientation,
    pub position: Option<Position>,
}

impl Mode {
    /// The `"{width}x{height}"` key grouping mode variants in a catalog.
    pub fn resolution_key(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// All mode variants sharing one resolution key, in encounter order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionGroup {
    pub resolution: String,
    pub modes: Vec<Mode>,
}

/// Mapping from resolution key to the ordered mode variants sharing that
/// resolution. Insertion order of keys is preserved, matching the order the
/// OS reported the first variant of each resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionCatalog {
    groups: Vec<ResolutionGroup>,
}

impl ResolutionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a mode under its resolution key, creating the key's group on
    /// first sight.
    pub fn insert(&mut self, mode: Mode) {
        let key = mode.resolution_key();
        match self.groups.iter_mut().find(|g| g.resolution == key) {
            Some(group) => group.modes.push(mode),
            None => self.groups.push(ResolutionGroup {
                resolution: key,
                modes: vec![mode],
            }),
        }
    }

    pub fn get(&self, resolution: &str) -> Option<&[Mode]> {
        self.groups
            .iter()
            .find(|g| g.resolution == resolution)
            .map(|g| g.modes.as_slice())
    }

    pub fn contains_key(&self, resolution: &str) -> bool {
        self.groups.iter().any(|g| g.resolution == resolution)
    }

    /// Number of distinct resolution keys.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolutionGroup> {
        self.groups.iter()
    }
}

/// One device as reported by the OS device enumeration.
///
/// `index` is the raw enumeration index the OS returned the device at. The
/// primary-switch operation excludes its target from the rebasing loop by this
/// index, so it is carried alongside the name rather than recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub index: u32,
    /// Stable device key, e.g. `\\.\DISPLAY1`.
    pub name: String,
    /// Adapter description string.
    pub string: String,
    pub state: DeviceStateFlags,
}

impl DeviceRecord {
    pub fn is_attached(&self) -> bool {
        self.state.contains(DeviceStateFlags::ATTACHED_TO_DESKTOP)
    }

    pub fn is_primary(&self) -> bool {
        self.state.contains(DeviceStateFlags::PRIMARY_DEVICE)
    }
}

/// Aggregate view of one attached display: the device record, its mode
/// catalog, its current mode, and the resolved human-readable monitor name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayInformation {
    pub device_name: String,
    pub display_string: String,
    /// `"{monitor friendly name} on {adapter description}"`.
    pub friendly_name: String,
    pub state: DeviceStateFlags,
    pub supported_resolutions: ResolutionCatalog,
    pub current: Mode,
}

impl DisplayInformation {
    pub fn is_attached(&self) -> bool {
        self.state.contains(DeviceStateFlags::ATTACHED_TO_DESKTOP)
    }

    pub fn is_primary(&self) -> bool {
        self.state.contains(DeviceStateFlags::PRIMARY_DEVICE)
    }

    pub fn is_removable(&self) -> bool {
        self.state.contains(DeviceStateFlags::REMOVABLE)
    }

    pub fn is_mirroring_driver(&self) -> bool {
        self.state.contains(DeviceStateFlags::MIRRORING_DRIVER)
    }
}

/// Point-in-time snapshot of every attached display, in OS enumeration order.
///
/// Never refreshed automatically; a caller that mutates the configuration
/// re-queries to observe the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub displays: Vec<DisplayInformation>,
}

impl Topology {
    /// The display currently acting as the coordinate-space origin, if any.
    pub fn primary(&self) -> Option<&DisplayInformation> {
        self.displays.iter().find(|d| d.is_primary())
    }

    pub fn len(&self) -> usize {
        self.displays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.displays.is_empty()
    }
}
