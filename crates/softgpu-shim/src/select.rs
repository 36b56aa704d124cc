// SPDX-License-Identifier: AGPL-3.0-only

//! Profile selection.
//!
//! Runs once, before any request is served, and fixes which GPU model
//! the process emulates. Selection never changes afterward; every
//! [`crate::ShimDevice`] carries the chosen profile for its lifetime.

use softgpu_chip::profiles::{self, DeviceProfile};

use crate::error::{Result, ShimError};

/// Environment variable naming the GPU model to emulate.
pub const GPU_ID_ENV: &str = "SOFTGPU_GPU_ID";

/// Select a profile by optional name.
///
/// With no name, the first table entry is chosen. With a name, the
/// first profile whose symbolic name matches ASCII case-insensitively
/// wins.
///
/// # Errors
///
/// Returns [`ShimError::UnknownGpu`] if a name was given and matches no
/// profile.
pub fn select_profile(requested: Option<&str>) -> Result<&'static DeviceProfile> {
    match requested {
        None => Ok(profiles::DEFAULT),
        Some(name) => profiles::find(name).ok_or_else(|| ShimError::unknown_gpu(name)),
    }
}

/// Select a profile from [`GPU_ID_ENV`].
///
/// # Errors
///
/// Returns [`ShimError::UnknownGpu`] if the variable is set and matches
/// no profile.
pub fn select_from_env() -> Result<&'static DeviceProfile> {
    let requested = std::env::var(GPU_ID_ENV).ok();
    select_profile(requested.as_deref())
}

/// Select a profile from [`GPU_ID_ENV`], aborting the process on a miss.
///
/// A requested-but-unknown model is a configuration error: every later
/// query would answer for the wrong hardware, so the process terminates
/// after reporting the name it could not find. This is the only fatal
/// path in the crate.
pub fn select_or_abort() -> &'static DeviceProfile {
    match select_from_env() {
        Ok(profile) => profile,
        Err(err) => {
            tracing::error!("{err}");
            std::process::abort();
        }
    }
}
