// src/lib.rs

//! Multi-monitor display topology management for the Win32 display subsystem.
//!
//! The crate discovers attached display devices, enumerates the modes each
//! one supports, resolves human-readable monitor names, and assembles all of
//! that into a [`model::Topology`] snapshot. On the mutation side it promotes
//! a display to primary (a two-phase stage/commit sequence that rebases every
//! other display so the relative layout survives), rotates a display, and
//! changes its resolution, translating the OS status code of each operation
//! into a fixed outcome message.
//!
//! All operations are synchronous and blocking, run no internal threads, and
//! hold no process-wide state. The OS display configuration is the single
//! source of truth: snapshots are point-in-time reads, and callers re-query
//! after a mutation to observe its effect.
//!
//! The OS itself is reached through the [`native::DisplayApi`] trait; the
//! only real implementation is [`native::win32::Win32DisplayApi`], compiled
//! on Windows. Tests exercise the full stack against a scripted backend.

pub mod enumerate;
pub mod model;
pub mod mutate;
pub mod native;
pub mod status;
pub mod topology;


use anyhow::Result;

use crate::model::Topology;
use crate::native::DisplayApi;

/// The operation surface exposed to collaborators such as a remote command
/// dispatcher, bound to one [`DisplayApi`] backend.
#[derive(Debug)]
pub struct DisplayManager<A: DisplayApi> {
    api: A,
}

impl<A: DisplayApi> DisplayManager<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// A fresh snapshot of every attached display.
    pub fn query_topology(&mut self) -> Result<Topology> {
        topology::build_topology(&mut self.api)
    }

    /// Promotes `device_name` to primary and returns the outcome message.
    pub fn set_primary(&mut self, device_name: &str) -> Result<&'static str> {
        mutate::set_primary(&mut self.api, device_name)
    }

    /// Rotates `device_name` and returns the outcome message.
    pub fn rotate(
        &mut self,
        angle: i32,
        width: u32,
        height: u32,
        device_name: &str,
    ) -> Result<&'static str> {
        mutate::rotate(&mut self.api, angle, width, height, device_name)
    }

    /// Changes the resolution of `device_name` and returns the outcome
    /// message.
    pub fn change_resolution(
        &mut self,
        device_name: &str,
        width: u32,
        height: u32,
        bits_per_pixel: u32,
        frequency: u32,
    ) -> Result<&'static str> {
        mutate::change_resolution(&mut self.api, device_name, width, height, bits_per_pixel, frequency)
    }
}

#[cfg(windows)]
impl DisplayManager<native::win32::Win32DisplayApi> {
    /// A manager bound to the live Win32 display subsystem.
    pub fn system() -> Self {
        Self::new(native::win32::Win32DisplayApi::new())
    }
}
