// src/enumerate.rs

//! Device enumeration and per-device mode catalogs.
//!
//! Both walks favour availability over completeness: a native failure mid
//! list is logged and whatever was collected so far is returned. Records are
//! built fresh on every call and never cached.

use anyhow::{Context, Result};
use log::warn;

use crate::model::{DeviceRecord, DeviceStateFlags, Mode, ResolutionCatalog};
use crate::native::{DisplayApi, ModeIndex};

/// Walks the OS device list from index 0 and returns the devices attached to
/// the desktop, in enumeration order.
///
/// A failed device query truncates the walk: the records collected before the
/// failure point are returned and the native error is logged.
pub fn enumerate_devices<A: DisplayApi>(api: &mut A) -> Vec<DeviceRecord> {
    let mut devices = Vec::new();
    let mut index = 0u32;
    loop {
        match api.query_device(index) {
            Ok(Some(raw)) => {
                if raw.state.contains(DeviceStateFlags::ATTACHED_TO_DESKTOP) {
                    devices.push(DeviceRecord {
                        index,
                        name: raw.name,
                        string: raw.string,
                        state: raw.state,
                    });
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("device enumeration truncated at index {index}: {e}");
                break;
            }
        }
        index += 1;
    }
    devices
}

/// Enumerates every mode `device` supports, grouped under resolution keys in
/// encounter order.
///
/// Same truncation rule as [`enumerate_devices`]: a failed mode query returns
/// the partial catalog and logs the native error.
pub fn list_modes<A: DisplayApi>(api: &mut A, device: &str) -> ResolutionCatalog {
    let mut catalog = ResolutionCatalog::new();
    let mut index = 0u32;
    loop {
        match api.query_mode(device, ModeIndex::Position(index)) {
            Ok(Some(mode)) => catalog.insert(mode),
            Ok(None) => break,
            Err(e) => {
                warn!("mode enumeration for {device} truncated at index {index}: {e}");
                break;
            }
        }
        index += 1;
    }
    catalog
}

/// Reads the current settings of `device` via the reserved current-settings
/// sentinel. This is a distinct query, not position 0 of the iterated list.
pub fn current_mode<A: DisplayApi>(api: &mut A, device: &str) -> Result<Mode> {
    api.query_mode(device, ModeIndex::Current)
        .with_context(|| format!("failed to read current settings of {device}"))?
        .with_context(|| format!("no current settings reported for {device}"))
}
