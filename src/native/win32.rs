// src/native/win32.rs
#![allow(non_snake_case)] // Win32 struct fields keep their native casing.

//! The real [`DisplayApi`] backend over user32, via the `winapi` crate.
//!
//! This module owns every `unsafe` block in the crate: UTF-16 string
//! conversion, zero-initialised native structs with their size bookkeeping,
//! and the decode of the overlapping target/source mode-info union. Nothing
//! above this file ever sees a raw native struct.

use std::io;
use std::mem;
use std::ptr;

use log::{debug, warn};

use winapi::shared::minwindef::{DWORD, WORD};
use winapi::shared::ntdef::{LONG, LUID};
use winapi::shared::winerror::ERROR_SUCCESS;
use winapi::um::wingdi::{
    DEVMODEW, DISPLAYCONFIG_DEVICE_INFO_GET_TARGET_NAME, DISPLAYCONFIG_DEVICE_INFO_HEADER,
    DISPLAYCONFIG_MODE_INFO, DISPLAYCONFIG_MODE_INFO_TYPE_SOURCE,
    DISPLAYCONFIG_MODE_INFO_TYPE_TARGET, DISPLAYCONFIG_PATH_INFO,
    DISPLAYCONFIG_TARGET_DEVICE_NAME, DISPLAY_DEVICEW, DMDO_180, DMDO_270, DMDO_90, DMDO_DEFAULT,
    DM_BITSPERPEL, DM_DISPLAYFREQUENCY, DM_DISPLAYORIENTATION, DM_PELSHEIGHT, DM_PELSWIDTH,
    DM_POSITION, QDC_ONLY_ACTIVE_PATHS,
};
use winapi::um::winuser::{
    ChangeDisplaySettingsExW, EnumDisplayDevicesW, EnumDisplaySettingsW, ENUM_CURRENT_SETTINGS,
};

// winapi 0.3 declares the DISPLAYCONFIG_* structs and QDC_* flags in wingdi
// but carries no bindings for the displayconfig entry points themselves, so
// they are declared here against its types.
#[link(name = "user32")]
extern "system" {
    fn GetDisplayConfigBufferSizes(
        flags: u32,
        numPathArrayElements: *mut u32,
        numModeInfoArrayElements: *mut u32,
    ) -> LONG;
    fn QueryDisplayConfig(
        flags: u32,
        numPathArrayElements: *mut u32,
        pathArray: *mut DISPLAYCONFIG_PATH_INFO,
        numModeInfoArrayElements: *mut u32,
        modeInfoArray: *mut DISPLAYCONFIG_MODE_INFO,
        // DISPLAYCONFIG_TOPOLOGY_ID out-param, only used with
        // QDC_DATABASE_CURRENT; always null here.
        currentTopologyId: *mut u32,
    ) -> LONG;
    fn DisplayConfigGetDeviceInfo(requestPacket: *mut DISPLAYCONFIG_DEVICE_INFO_HEADER) -> LONG;
}

use crate::model::{DeviceStateFlags, Mode, Orientation, Position};
use crate::native::{
    AdapterId, ApplyFlags, DisplayApi, ModeIndex, ModeInfoKind, ModeRecord, PathRecord, RawDevice,
    SourceModeInfo, TargetModeInfo,
};
use crate::status::DispChange;

/// Stateless handle to the live Win32 display subsystem.
#[derive(Debug, Default)]
pub struct Win32DisplayApi;

impl Win32DisplayApi {
    pub fn new() -> Self {
        Win32DisplayApi
    }
}

/// Nul-terminated UTF-16 for passing to the W-suffixed entry points.
fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Decodes a fixed-size UTF-16 buffer up to its first nul.
fn from_wide(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

/// A zeroed DEVMODEW with its size fields filled in, as the mode queries
/// require before the call.
fn empty_devmode() -> DEVMODEW {
    // SAFETY: DEVMODEW is a plain C struct; all-zero is a valid value.
    let mut dm: DEVMODEW = unsafe { mem::zeroed() };
    dm.dmSize = mem::size_of::<DEVMODEW>() as WORD;
    dm.dmDriverExtra = 0;
    dm
}

fn decode_orientation(raw: DWORD) -> Orientation {
    match raw {
        DMDO_DEFAULT => Orientation::Degrees0,
        DMDO_90 => Orientation::Degrees90,
        DMDO_180 => Orientation::Degrees180,
        DMDO_270 => Orientation::Degrees270,
        other => {
            warn!("unexpected native orientation value {}, treating as 0 degrees", other);
            Orientation::Degrees0
        }
    }
}

fn encode_orientation(orientation: Orientation) -> DWORD {
    match orientation {
        Orientation::Degrees0 => DMDO_DEFAULT,
        Orientation::Degrees90 => DMDO_90,
        Orientation::Degrees180 => DMDO_180,
        Orientation::Degrees270 => DMDO_270,
    }
}

fn decode_devmode(dm: &DEVMODEW) -> Mode {
    // SAFETY: for display devices the first anonymous union of DEVMODEW holds
    // the position/orientation block, selected here via the s2 accessor.
    let display = unsafe { dm.u1.s2() };
    Mode {
        width: dm.dmPelsWidth,
        height: dm.dmPelsHeight,
        bits_per_pixel: dm.dmBitsPerPel,
        frequency: dm.dmDisplayFrequency,
        orientation: decode_orientation(display.dmDisplayOrientation),
        position: Some(Position {
            x: display.dmPosition.x,
            y: display.dmPosition.y,
        }),
    }
}

fn encode_devmode(mode: &Mode) -> DEVMODEW {
    let mut dm = empty_devmode();
    dm.dmPelsWidth = mode.width;
    dm.dmPelsHeight = mode.height;
    dm.dmBitsPerPel = mode.bits_per_pixel;
    dm.dmDisplayFrequency = mode.frequency;
    dm.dmFields =
        DM_PELSWIDTH | DM_PELSHEIGHT | DM_BITSPERPEL | DM_DISPLAYFREQUENCY | DM_DISPLAYORIENTATION;
    {
        // SAFETY: same union selection as in decode_devmode.
        let display = unsafe { dm.u1.s2_mut() };
        display.dmDisplayOrientation = encode_orientation(mode.orientation);
        if let Some(position) = mode.position {
            display.dmPosition.x = position.x;
            display.dmPosition.y = position.y;
        }
    }
    if mode.position.is_some() {
        dm.dmFields |= DM_POSITION;
    }
    dm
}

fn luid_to_adapter(luid: &LUID) -> AdapterId {
    AdapterId {
        low: luid.LowPart,
        high: luid.HighPart,
    }
}

fn adapter_to_luid(adapter: AdapterId) -> LUID {
    let mut luid: LUID = unsafe { mem::zeroed() };
    luid.LowPart = adapter.low;
    luid.HighPart = adapter.high;
    luid
}

impl DisplayApi for Win32DisplayApi {
    fn query_device(&mut self, index: u32) -> io::Result<Option<RawDevice>> {
        // SAFETY: dd is sized and zeroed before the call; user32 fills it.
        let mut dd: DISPLAY_DEVICEW = unsafe { mem::zeroed() };
        dd.cb = mem::size_of::<DISPLAY_DEVICEW>() as DWORD;
        let ok = unsafe { EnumDisplayDevicesW(ptr::null(), index, &mut dd, 0) };
        if ok == 0 {
            // The OS reports end-of-list and failure identically here; both
            // end the enumeration.
            return Ok(None);
        }
        Ok(Some(RawDevice {
            name: from_wide(&dd.DeviceName),
            string: from_wide(&dd.DeviceString),
            state: DeviceStateFlags::from_bits_truncate(dd.StateFlags),
        }))
    }

    fn query_mode(&mut self, device: &str, index: ModeIndex) -> io::Result<Option<Mode>> {
        let device_w = wide(device);
        let mut dm = empty_devmode();
        let mode_num = match index {
            ModeIndex::Position(i) => i,
            ModeIndex::Current => ENUM_CURRENT_SETTINGS,
        };
        // SAFETY: device_w outlives the call; dm carries its size fields.
        let ok = unsafe { EnumDisplaySettingsW(device_w.as_ptr(), mode_num, &mut dm) };
        if ok == 0 {
            return match index {
                // Positional queries end the iteration this way.
                ModeIndex::Position(_) => Ok(None),
                // The current-settings sentinel has no end-of-list meaning.
                ModeIndex::Current => Err(io::Error::last_os_error()),
            };
        }
        let mut mode = decode_devmode(&dm);
        if matches!(index, ModeIndex::Position(_)) {
            // Positions are only meaningful for current settings.
            mode.position = None;
        }
        Ok(Some(mode))
    }

    fn apply(&mut self, device: &str, mode: &Mode, flags: ApplyFlags) -> DispChange {
        let device_w = wide(device);
        let mut dm = encode_devmode(mode);
        let code = unsafe {
            ChangeDisplaySettingsExW(
                device_w.as_ptr(),
                &mut dm,
                ptr::null_mut(),
                flags.bits(),
                ptr::null_mut(),
            )
        };
        let status = DispChange::from_raw(code);
        debug!("ChangeDisplaySettingsExW({}, {:?}) -> {:?}", device, flags, status);
        status
    }

    fn commit(&mut self) -> DispChange {
        // No target, no mode, no flags: this is the call that puts every
        // staged NO_RESET change into effect.
        let code = unsafe {
            ChangeDisplaySettingsExW(ptr::null(), ptr::null_mut(), ptr::null_mut(), 0, ptr::null_mut())
        };
        let status = DispChange::from_raw(code);
        debug!("ChangeDisplaySettingsExW(commit) -> {:?}", status);
        status
    }

    fn display_config_buffer_sizes(&mut self) -> io::Result<(u32, u32)> {
        let mut path_count: u32 = 0;
        let mut mode_count: u32 = 0;
        let code = unsafe {
            GetDisplayConfigBufferSizes(QDC_ONLY_ACTIVE_PATHS, &mut path_count, &mut mode_count)
        };
        if code as DWORD != ERROR_SUCCESS {
            return Err(io::Error::from_raw_os_error(code));
        }
        Ok((path_count, mode_count))
    }

    fn query_display_config(
        &mut self,
        path_count: u32,
        mode_count: u32,
    ) -> io::Result<(Vec<PathRecord>, Vec<ModeRecord>)> {
        let mut paths: Vec<DISPLAYCONFIG_PATH_INFO> =
            vec![unsafe { mem::zeroed() }; path_count as usize];
        let mut modes: Vec<DISPLAYCONFIG_MODE_INFO> =
            vec![unsafe { mem::zeroed() }; mode_count as usize];
        let mut path_count = path_count;
        let mut mode_count = mode_count;
        let code = unsafe {
            QueryDisplayConfig(
                QDC_ONLY_ACTIVE_PATHS,
                &mut path_count,
                paths.as_mut_ptr(),
                &mut mode_count,
                modes.as_mut_ptr(),
                ptr::null_mut(),
            )
        };
        if code as DWORD != ERROR_SUCCESS {
            return Err(io::Error::from_raw_os_error(code));
        }
        // The call may shrink the counts; only the filled prefix is valid.
        paths.truncate(path_count as usize);
        modes.truncate(mode_count as usize);

        let path_records = paths
            .iter()
            .map(|p| PathRecord {
                adapter: luid_to_adapter(&p.sourceInfo.adapterId),
                source_id: p.sourceInfo.id,
                target_id: p.targetInfo.id,
            })
            .collect();

        let mut mode_records = Vec::with_capacity(modes.len());
        for info in &modes {
            // The union is decoded right here, per the discriminant; the raw
            // overlapping representation stays on this side of the boundary.
            let kind = match info.infoType {
                DISPLAYCONFIG_MODE_INFO_TYPE_TARGET => {
                    // SAFETY: discriminant says the target arm is the live one.
                    let signal = unsafe { &info.u.targetMode().targetVideoSignalInfo };
                    ModeInfoKind::Target(TargetModeInfo {
                        active_width: signal.activeSize.cx,
                        active_height: signal.activeSize.cy,
                        v_sync: (signal.vSyncFreq.Numerator, signal.vSyncFreq.Denominator),
                    })
                }
                DISPLAYCONFIG_MODE_INFO_TYPE_SOURCE => {
                    // SAFETY: discriminant says the source arm is the live one.
                    let source = unsafe { info.u.sourceMode() };
                    ModeInfoKind::Source(SourceModeInfo {
                        width: source.width,
                        height: source.height,
                        x: source.position.x,
                        y: source.position.y,
                    })
                }
                other => {
                    warn!("skipping mode record with unknown info type {}", other);
                    continue;
                }
            };
            mode_records.push(ModeRecord {
                adapter: luid_to_adapter(&info.adapterId),
                id: info.id,
                kind,
            });
        }
        Ok((path_records, mode_records))
    }

    fn target_friendly_name(&mut self, adapter: AdapterId, target_id: u32) -> io::Result<String> {
        // SAFETY: plain C struct, zero is valid; header fields are filled in
        // before the call as the device-info protocol requires.
        let mut name: DISPLAYCONFIG_TARGET_DEVICE_NAME = unsafe { mem::zeroed() };
        name.header.type_ = DISPLAYCONFIG_DEVICE_INFO_GET_TARGET_NAME;
        name.header.size = mem::size_of::<DISPLAYCONFIG_TARGET_DEVICE_NAME>() as u32;
        name.header.adapterId = adapter_to_luid(adapter);
        name.header.id = target_id;
        let code = unsafe { DisplayConfigGetDeviceInfo(&mut name.header) };
        if code as DWORD != ERROR_SUCCESS {
            return Err(io::Error::from_raw_os_error(code));
        }
        Ok(from_wide(&name.monitorFriendlyDeviceName))
    }
}
