// src/native/mock.rs

//! Scripted [`DisplayApi`] backend for tests.
//!
//! The mock holds a small in-memory display subsystem: a list of displays
//! with mode lists and current settings, plus switches for injecting native
//! failures mid-enumeration. Staged changes (applies carrying `NO_RESET`)
//! accumulate and only land on `commit()`, so tests can observe both the
//! call sequence and the post-commit state.

use std::io;

use crate::model::{DeviceStateFlags, Mode, Orientation, Position};
use crate::native::{
    AdapterId, ApplyFlags, DisplayApi, ModeIndex, ModeInfoKind, ModeRecord, PathRecord, RawDevice,
    SourceModeInfo, TargetModeInfo,
};
use crate::status::DispChange;

/// One display known to the mock subsystem.
#[derive(Debug, Clone)]
pub struct MockDisplay {
    pub name: String,
    pub string: String,
    pub state: DeviceStateFlags,
    pub friendly: String,
    /// Enumerable mode list, positions stripped.
    pub modes: Vec<Mode>,
    /// Current settings, position populated.
    pub current: Mode,
}

/// Everything the mutator sent through `apply`/`commit`, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Apply {
        device: String,
        mode: Mode,
        flags: ApplyFlags,
    },
    Commit,
}

#[derive(Debug)]
pub struct MockDisplayApi {
    displays: Vec<MockDisplay>,
    /// Fail `query_device` at this enumeration index.
    pub fail_device_query_at: Option<u32>,
    /// Fail positional `query_mode` at this mode index (any device).
    pub fail_mode_query_at: Option<u32>,
    /// Fail the buffer-size phase of the extended configuration query.
    pub fail_buffer_sizes: bool,
    /// Leave this many trailing target records out of the configuration
    /// query, as when a path has no resolvable monitor name.
    pub omit_trailing_target_records: usize,
    /// Status code returned by every apply call.
    pub apply_result: DispChange,
    /// Status code returned by `commit`.
    pub commit_result: DispChange,
    /// Chronological record of apply/commit calls.
    pub journal: Vec<MockCall>,
    staged: Vec<(String, Mode, ApplyFlags)>,
}

impl MockDisplayApi {
    pub fn new() -> Self {
        Self {
            displays: Vec::new(),
            fail_device_query_at: None,
            fail_mode_query_at: None,
            fail_buffer_sizes: false,
            omit_trailing_target_records: 0,
            apply_result: DispChange::Successful,
            commit_result: DispChange::Successful,
            journal: Vec::new(),
            staged: Vec::new(),
        }
    }

    pub fn push_display(&mut self, display: MockDisplay) {
        self.displays.push(display);
    }

    pub fn display(&self, name: &str) -> Option<&MockDisplay> {
        self.displays.iter().find(|d| d.name == name)
    }

    fn display_mut(&mut self, name: &str) -> Option<&mut MockDisplay> {
        self.displays.iter_mut().find(|d| d.name == name)
    }

    /// Writes one mode into a display's state, honouring which fields an
    /// apply call actually carries.
    fn write_mode(&mut self, name: &str, mode: &Mode, flags: ApplyFlags) {
        if flags.contains(ApplyFlags::SET_PRIMARY) {
            for display in &mut self.displays {
                display.state.remove(DeviceStateFlags::PRIMARY_DEVICE);
            }
        }
        if let Some(display) = self.display_mut(name) {
            let position = mode.position.or(display.current.position);
            display.current = Mode {
                position,
                ..*mode
            };
            if flags.contains(ApplyFlags::SET_PRIMARY) {
                display.state.insert(DeviceStateFlags::PRIMARY_DEVICE);
            }
        }
    }

    fn injected_error(what: &str) -> io::Error {
        io::Error::new(io::ErrorKind::Other, format!("injected {what} failure"))
    }
}

/// Convenience constructor for a display with one enumerable mode per entry
/// of `modes`, current settings taken from `current`.
pub fn display(
    name: &str,
    string: &str,
    friendly: &str,
    state: DeviceStateFlags,
    modes: Vec<Mode>,
    current: Mode,
) -> MockDisplay {
    MockDisplay {
        name: name.to_string(),
        string: string.to_string(),
        friendly: friendly.to_string(),
        state,
        modes,
        current,
    }
}

/// A plain 32bpp mode without position.
pub fn mode(width: u32, height: u32, frequency: u32) -> Mode {
    Mode {
        width,
        height,
        bits_per_pixel: 32,
        frequency,
        orientation: Orientation::Degrees0,
        position: None,
    }
}

/// Like [`mode`], positioned for use as current settings.
pub fn current_at(width: u32, height: u32, frequency: u32, x: i32, y: i32) -> Mode {
    Mode {
        position: Some(Position { x, y }),
        ..mode(width, height, frequency)
    }
}

impl DisplayApi for MockDisplayApi {
    fn query_device(&mut self, index: u32) -> io::Result<Option<RawDevice>> {
        if self.fail_device_query_at == Some(index) {
            return Err(Self::injected_error("device query"));
        }
        Ok(self.displays.get(index as usize).map(|d| RawDevice {
            name: d.name.clone(),
            string: d.string.clone(),
            state: d.state,
        }))
    }

    fn query_mode(&mut self, device: &str, index: ModeIndex) -> io::Result<Option<Mode>> {
        let display = self
            .display(device)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no device {device}")))?
            .clone();
        match index {
            ModeIndex::Position(i) => {
                if self.fail_mode_query_at == Some(i) {
                    return Err(Self::injected_error("mode query"));
                }
                Ok(display.modes.get(i as usize).copied())
            }
            ModeIndex::Current => Ok(Some(display.current)),
        }
    }

    fn apply(&mut self, device: &str, mode: &Mode, flags: ApplyFlags) -> DispChange {
        self.journal.push(MockCall::Apply {
            device: device.to_string(),
            mode: *mode,
            flags,
        });
        if self.apply_result.is_success() {
            if flags.contains(ApplyFlags::NO_RESET) {
                self.staged.push((device.to_string(), *mode, flags));
            } else {
                self.write_mode(device, mode, flags);
            }
        }
        self.apply_result
    }

    fn commit(&mut self) -> DispChange {
        self.journal.push(MockCall::Commit);
        if self.commit_result.is_success() {
            let staged = std::mem::take(&mut self.staged);
            for (device, mode, flags) in staged {
                self.write_mode(&device, &mode, flags);
            }
        }
        self.commit_result
    }

    fn display_config_buffer_sizes(&mut self) -> io::Result<(u32, u32)> {
        if self.fail_buffer_sizes {
            return Err(Self::injected_error("buffer size query"));
        }
        let attached = self
            .displays
            .iter()
            .filter(|d| d.state.contains(DeviceStateFlags::ATTACHED_TO_DESKTOP))
            .count() as u32;
        // One path plus a source/target record pair per attached display.
        Ok((attached, attached * 2))
    }

    fn query_display_config(
        &mut self,
        path_count: u32,
        _mode_count: u32,
    ) -> io::Result<(Vec<PathRecord>, Vec<ModeRecord>)> {
        let mut paths = Vec::new();
        let mut modes = Vec::new();
        let attached: Vec<&MockDisplay> = self
            .displays
            .iter()
            .filter(|d| d.state.contains(DeviceStateFlags::ATTACHED_TO_DESKTOP))
            .take(path_count as usize)
            .collect();
        let named = attached.len().saturating_sub(self.omit_trailing_target_records);
        for (i, display) in attached.into_iter().enumerate() {
            let adapter = AdapterId { low: 0, high: 0 };
            let target_id = i as u32;
            paths.push(PathRecord {
                adapter,
                source_id: i as u32,
                target_id,
            });
            modes.push(ModeRecord {
                adapter,
                id: i as u32,
                kind: ModeInfoKind::Source(SourceModeInfo {
                    width: display.current.width,
                    height: display.current.height,
                    x: display.current.position.map_or(0, |p| p.x),
                    y: display.current.position.map_or(0, |p| p.y),
                }),
            });
            if i < named {
                modes.push(ModeRecord {
                    adapter,
                    id: target_id,
                    kind: ModeInfoKind::Target(TargetModeInfo {
                        active_width: display.current.width,
                        active_height: display.current.height,
                        v_sync: (display.current.frequency, 1),
                    }),
                });
            }
        }
        Ok((paths, modes))
    }

    fn target_friendly_name(&mut self, _adapter: AdapterId, target_id: u32) -> io::Result<String> {
        self.displays
            .iter()
            .filter(|d| d.state.contains(DeviceStateFlags::ATTACHED_TO_DESKTOP))
            .nth(target_id as usize)
            .map(|d| d.friendly.clone())
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("no target {target_id}"))
            })
    }
}
