// SPDX-License-Identifier: AGPL-3.0-only

//! Request-dispatch and device-emulation engine for softgpu.
//!
//! softgpu makes a user-space graphics stack believe it is talking to a
//! real GPU kernel driver. Every control request the stack would issue
//! against the device node is answered here, from a static profile of
//! one GPU model — no hardware, no real memory, no command execution.
//! Driver initialization and capability probing succeed with bit-exact
//! answers; workload submission is acknowledged and discarded.
//!
//! The profile data itself lives in [`softgpu_chip`]; this crate is the
//! machinery: profile selection, the request dispatcher, the
//! information-query responder, and the virtual buffer-object store.
//!
//! # Quick start
//!
//! ```
//! use softgpu_chip::abi::{self, InfoQuery};
//! use softgpu_shim::{InfoArgs, IoctlArg, ShimDevice};
//!
//! # fn main() -> softgpu_shim::Result<()> {
//! let dev = ShimDevice::new(softgpu_chip::profiles::DEFAULT)?;
//! let session = dev.open_session(3);
//!
//! let mut arg = IoctlArg::Info(InfoArgs::new(InfoQuery::Memory));
//! dev.ioctl(&session, abi::REQ_INFO, &mut arg)?;
//! # Ok(())
//! # }
//! ```
//!
//! Selection is fixed per device: set `SOFTGPU_GPU_ID=stoney` (or any
//! profile name, case-insensitively) before startup, or leave it unset
//! for the default model. A name that matches nothing is a fatal
//! configuration error on the [`select_or_abort`] path.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

mod bo;
mod device;
mod dispatch;
mod error;
pub mod query;
mod select;
mod session;
pub mod sysfs;

pub use bo::{Bo, BoHeap, PAGE_SIZE};
pub use device::ShimDevice;
pub use dispatch::{InfoArgs, IoctlArg};
pub use error::{Result, ShimError};
pub use select::{select_from_env, select_or_abort, select_profile, GPU_ID_ENV};
pub use session::{Session, SessionRegistry};

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        select_profile, InfoArgs, IoctlArg, Result, Session, ShimDevice, ShimError,
    };
    pub use softgpu_chip::abi::InfoQuery;
    pub use softgpu_chip::profiles::DeviceProfile;
}
