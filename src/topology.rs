// src/topology.rs

//! Resolving monitor friendly names and assembling topology snapshots.

use anyhow::{Context, Result};
use log::warn;

use crate::enumerate::{current_mode, enumerate_devices, list_modes};
use crate::model::{DisplayInformation, Topology};
use crate::native::{DisplayApi, ModeInfoKind};

/// Resolves the human-readable monitor names of the active display paths.
///
/// Protocol: query the required array sizes, query the path and mode arrays
/// sized accordingly, then resolve a name for every target-kind mode record
/// via the per-target device-info query. Failures in any of these phases are
/// fatal — without valid buffers no safe topology can be built — and carry
/// the native error.
///
/// The returned sequence is assumed to align positionally with
/// [`enumerate_devices`] output. The extended configuration API exposes no
/// identifier tying its target records to enumerated device records, so the
/// correspondence is by order only; a disconnected or mirrored device that
/// shifts indices can attach a name to the wrong device.
pub fn friendly_names<A: DisplayApi>(api: &mut A) -> Result<Vec<String>> {
    let (path_count, mode_count) = api
        .display_config_buffer_sizes()
        .context("display configuration buffer size query failed")?;
    let (_paths, modes) = api
        .query_display_config(path_count, mode_count)
        .context("display configuration query failed")?;

    let mut names = Vec::new();
    for record in modes {
        if let ModeInfoKind::Target(_) = record.kind {
            let name = api
                .target_friendly_name(record.adapter, record.id)
                .with_context(|| format!("friendly name query failed for target {}", record.id))?;
            names.push(name);
        }
    }
    Ok(names)
}

/// Builds a point-in-time snapshot of every attached display.
///
/// Devices whose current settings cannot be read are skipped with a warning;
/// a missing friendly name falls back to the adapter description alone.
/// The snapshot is never refreshed automatically — callers re-query after
/// any mutation.
pub fn build_topology<A: DisplayApi>(api: &mut A) -> Result<Topology> {
    let names = friendly_names(api)?;
    let devices = enumerate_devices(api);

    let mut displays = Vec::with_capacity(devices.len());
    for (slot, device) in devices.into_iter().enumerate() {
        let supported_resolutions = list_modes(api, &device.name);
        let current = match current_mode(api, &device.name) {
            Ok(mode) => mode,
            Err(e) => {
                warn!("skipping {}: {e:#}", device.name);
                continue;
            }
        };
        let friendly_name = match names.get(slot) {
            Some(name) => format!("{} on {}", name, device.string),
            None => {
                warn!(
                    "no friendly name at position {slot} for {}, using adapter description",
                    device.name
                );
                device.string.clone()
            }
        };
        displays.push(DisplayInformation {
            device_name: device.name,
            display_string: device.string,
            friendly_name,
            state: device.state,
            supported_resolutions,
            current,
        });
    }
    Ok(Topology { displays })
}
