// src/mutate.rs

//! The three topology mutations: primary switch, rotation, resolution change.
//!
//! All three read the target's current settings as a template, modify it, and
//! hand it back to the OS. The primary switch is two-phase: every affected
//! device is staged with `NO_RESET` (written but not applied), then a single
//! flagless commit call puts the whole arrangement into effect at once. No
//! lock is held across the sequence; atomicity beyond the OS's own commit
//! semantics is not offered here.
//!
//! Every apply status code, including the failure codes, comes back as a
//! fixed outcome message rather than an error.

use anyhow::{bail, Context, Result};
use log::{debug, warn};

use crate::enumerate::{current_mode, enumerate_devices};
use crate::model::{Orientation, Position};
use crate::native::{ApplyFlags, DisplayApi};

/// Parses the trailing numeric identifier of a device name into its
/// enumeration index, e.g. `\\.\DISPLAY2` → 1.
fn device_ordinal(device_name: &str) -> Option<u32> {
    let digits: String = device_name
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u32>().ok()?.checked_sub(1)
}

/// Promotes `device_name` to primary, preserving the relative arrangement of
/// every other attached display.
///
/// The target is staged at the coordinate-space origin with
/// {set-primary, update-registry, no-reset}; each other attached device is
/// staged at its old position minus the target's old offset with
/// {update-registry, no-reset}; one final targetless, flagless commit applies
/// all staged changes. The commit's status code is mapped to the returned
/// outcome message.
///
/// Precondition: the device name must carry a numeric identifier (the OS
/// names displays `\\.\DISPLAYn`); it is used only to exclude the target
/// from the rebasing loop by enumeration index. A name without one is
/// rejected rather than guessed at.
pub fn set_primary<A: DisplayApi>(api: &mut A, device_name: &str) -> Result<&'static str> {
    let target_index = match device_ordinal(device_name) {
        Some(index) => index,
        None => bail!("device name {device_name:?} carries no numeric identifier"),
    };

    let mut target_mode = current_mode(api, device_name)
        .with_context(|| format!("cannot stage primary switch for {device_name}"))?;
    let (dx, dy) = target_mode
        .position
        .map(|p| (p.x, p.y))
        .unwrap_or((0, 0));
    target_mode.position = Some(Position { x: 0, y: 0 });

    let staged = api.apply(
        device_name,
        &target_mode,
        ApplyFlags::SET_PRIMARY | ApplyFlags::UPDATE_REGISTRY | ApplyFlags::NO_RESET,
    );
    debug!("staged {device_name} as primary at (0,0): {staged:?}");

    // Rebase every other attached device so the relative layout survives the
    // origin moving to the new primary.
    for device in enumerate_devices(api) {
        if device.index == target_index {
            continue;
        }
        let mut mode = match current_mode(api, &device.name) {
            Ok(mode) => mode,
            Err(e) => {
                warn!("not rebasing {}: {e:#}", device.name);
                continue;
            }
        };
        match mode.position.as_mut() {
            Some(position) => {
                position.x -= dx;
                position.y -= dy;
            }
            None => mode.position = Some(Position { x: -dx, y: -dy }),
        }
        let staged = api.apply(
            &device.name,
            &mode,
            ApplyFlags::UPDATE_REGISTRY | ApplyFlags::NO_RESET,
        );
        debug!("staged {} at {:?}: {staged:?}", device.name, mode.position);
    }

    let committed = api.commit();
    debug!("primary switch commit: {committed:?}");
    Ok(committed.message())
}

/// Rotates `device_name` to `angle` degrees with the given post-rotation
/// dimensions.
///
/// Width and height are pinned to the supplied values exactly, whatever the
/// device was running before. Angles outside {0, 90, 180, 270} leave the
/// orientation as read; no error is raised for them. Applied in one phase
/// with {update-registry}.
pub fn rotate<A: DisplayApi>(
    api: &mut A,
    angle: i32,
    width: u32,
    height: u32,
    device_name: &str,
) -> Result<&'static str> {
    let mut mode = current_mode(api, device_name)
        .with_context(|| format!("cannot rotate {device_name}"))?;
    mode.width = width;
    mode.height = height;
    if let Some(orientation) = Orientation::from_angle(angle) {
        mode.orientation = orientation;
    }

    let status = api.apply(device_name, &mode, ApplyFlags::UPDATE_REGISTRY);
    debug!("rotate {device_name} to {angle} degrees at {width}x{height}: {status:?}");
    Ok(status.message())
}

/// Switches `device_name` to the given resolution, colour depth and refresh
/// frequency, applied in one phase with {update-registry}.
pub fn change_resolution<A: DisplayApi>(
    api: &mut A,
    device_name: &str,
    width: u32,
    height: u32,
    bits_per_pixel: u32,
    frequency: u32,
) -> Result<&'static str> {
    let mut mode = current_mode(api, device_name)
        .with_context(|| format!("cannot change resolution of {device_name}"))?;
    mode.width = width;
    mode.height = height;
    mode.bits_per_pixel = bits_per_pixel;
    mode.frequency = frequency;

    let status = api.apply(device_name, &mode, ApplyFlags::UPDATE_REGISTRY);
    debug!("change {device_name} to {width}x{height}x{bits_per_pixel}@{frequency}: {status:?}");
    Ok(status.message())
}
