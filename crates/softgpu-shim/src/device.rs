// SPDX-License-Identifier: AGPL-3.0-only

//! The per-device emulation context.

use std::os::unix::io::RawFd;
use std::sync::Arc;

use softgpu_chip::pcie;
use softgpu_chip::profiles::DeviceProfile;

use crate::bo::BoHeap;
use crate::error::Result;
use crate::select;
use crate::session::{Session, SessionRegistry};

/// One emulated GPU: the active profile plus the mutable state behind
/// it (buffer-object heap, session table).
///
/// Every handler receives its device explicitly; there is no process
/// global, so tests can emulate several models side by side.
#[derive(Debug)]
pub struct ShimDevice {
    profile: &'static DeviceProfile,
    heap: BoHeap,
    sessions: SessionRegistry,
}

impl ShimDevice {
    /// Create a device emulating `profile`.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the buffer-object backing store cannot
    /// be created.
    pub fn new(profile: &'static DeviceProfile) -> Result<Self> {
        tracing::info!(
            "emulating {} ({}, {} driver v{}.{}.{})",
            profile.name,
            pcie::lspci_filter(profile.dev.device_id),
            pcie::DRIVER_NAME,
            pcie::version::MAJOR,
            pcie::version::MINOR,
            pcie::version::PATCHLEVEL,
        );
        Ok(Self {
            profile,
            heap: BoHeap::new()?,
            sessions: SessionRegistry::new(),
        })
    }

    /// Create a device from the `SOFTGPU_GPU_ID` selection variable.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ShimError::UnknownGpu`] for an unmatched name,
    /// or the OS error from backing-store creation.
    pub fn from_env() -> Result<Self> {
        Self::new(select::select_from_env()?)
    }

    /// The profile this device answers queries from.
    #[must_use]
    pub fn profile(&self) -> &'static DeviceProfile {
        self.profile
    }

    /// Register a session for a newly opened descriptor.
    pub fn open_session(&self, fd: RawFd) -> Arc<Session> {
        tracing::debug!(fd, "session opened");
        self.sessions.open(fd)
    }

    /// Look up the session for a descriptor.
    #[must_use]
    pub fn session(&self, fd: RawFd) -> Option<Arc<Session>> {
        self.sessions.lookup(fd)
    }

    /// Drop the session for a closed descriptor.
    pub fn close_session(&self, fd: RawFd) {
        tracing::debug!(fd, "session closed");
        self.sessions.close(fd);
    }

    pub(crate) fn heap(&self) -> &BoHeap {
        &self.heap
    }
}
