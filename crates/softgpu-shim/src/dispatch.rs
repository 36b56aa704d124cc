// SPDX-License-Identifier: AGPL-3.0-only

//! The request dispatcher.
//!
//! Maps a raw request code to its handler. The mapping is an explicit
//! `match` over named codes with a default arm, so nothing depends on
//! the numeric density of the external ABI and an unknown code is
//! always an explicit rejection.
//!
//! Most of the control surface is acknowledged without doing anything:
//! context creation, command submission, synchronization and friends
//! succeed with no side effect, because the emulator's job is to make
//! driver initialization and capability probing work, not to execute
//! workloads. Only buffer-object creation and mapping touch state.

use softgpu_chip::abi::{self, GemCreateArgs, GemMmapArgs, InfoQuery, InfoReply};

use crate::device::ShimDevice;
use crate::error::{Result, ShimError};
use crate::query;
use crate::session::Session;

/// Parameter block for the info request: the decoded query going in,
/// the synthesized record coming out.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoArgs {
    /// In: the decoded query.
    pub query: InfoQuery,
    /// Out: the answer, set by a successful dispatch.
    pub reply: Option<InfoReply>,
}

impl InfoArgs {
    /// Wrap a query with no answer yet.
    #[must_use]
    pub const fn new(query: InfoQuery) -> Self {
        Self { query, reply: None }
    }
}

/// The in/out parameter block of one request, by request shape.
///
/// No-op requests carry [`IoctlArg::Opaque`]: the emulator never reads
/// or writes their parameters.
#[derive(Debug)]
pub enum IoctlArg {
    /// Parameters of [`abi::REQ_GEM_CREATE`].
    GemCreate(GemCreateArgs),
    /// Parameters of [`abi::REQ_GEM_MMAP`].
    GemMmap(GemMmapArgs),
    /// Parameters of [`abi::REQ_INFO`].
    Info(InfoArgs),
    /// Parameters the emulator acknowledges without touching.
    Opaque,
}

impl ShimDevice {
    /// Dispatch one control request.
    ///
    /// # Errors
    ///
    /// [`ShimError::InvalidRequest`] for a code outside the modeled
    /// surface (or a parameter block that does not fit the code),
    /// [`ShimError::InvalidQuery`] for an unrecognized info query, and
    /// a propagated allocation failure from buffer-object creation.
    /// Errors are scoped to this request; no state leaks into later
    /// ones.
    ///
    /// # Panics
    ///
    /// Mapping a handle that was never returned by a create request on
    /// the same session is a caller contract violation and panics.
    pub fn ioctl(&self, session: &Session, code: u32, arg: &mut IoctlArg) -> Result<()> {
        match (code, arg) {
            (abi::REQ_GEM_CREATE, IoctlArg::GemCreate(args)) => self.gem_create(session, args),
            (abi::REQ_GEM_MMAP, IoctlArg::GemMmap(args)) => {
                Self::gem_mmap(session, args);
                Ok(())
            }
            (abi::REQ_INFO, IoctlArg::Info(args)) => {
                args.reply = Some(query::respond(self.profile(), &args.query)?);
                Ok(())
            }
            // Acknowledged, never modeled.
            (
                abi::REQ_CTX
                | abi::REQ_BO_LIST
                | abi::REQ_CS
                | abi::REQ_GEM_METADATA
                | abi::REQ_GEM_WAIT_IDLE
                | abi::REQ_GEM_VA
                | abi::REQ_WAIT_CS
                | abi::REQ_GEM_OP
                | abi::REQ_GEM_USERPTR
                | abi::REQ_WAIT_FENCES
                | abi::REQ_VM
                | abi::REQ_FENCE_TO_HANDLE
                | abi::REQ_SCHED,
                _,
            ) => Ok(()),
            (code, _) => Err(ShimError::invalid_request(code)),
        }
    }

    fn gem_create(&self, session: &Session, args: &mut GemCreateArgs) -> Result<()> {
        let bo = self.heap().alloc(args.bo_size)?;
        args.handle = session.register(bo);
        tracing::debug!(
            fd = session.fd(),
            size = args.bo_size,
            handle = args.handle,
            "buffer object created"
        );
        Ok(())
    }

    fn gem_mmap(session: &Session, args: &mut GemMmapArgs) {
        let bo = session
            .lookup(args.handle)
            .unwrap_or_else(|| panic!("handle {} not registered with this session", args.handle));
        args.addr_ptr = bo.mmap_offset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use softgpu_chip::profiles;

    fn device() -> ShimDevice {
        ShimDevice::new(profiles::DEFAULT).unwrap()
    }

    #[test]
    fn unknown_codes_are_rejected_not_fatal() {
        let dev = device();
        let session = dev.open_session(3);
        for code in [0x16, 0x40, 0xdead] {
            let err = dev.ioctl(&session, code, &mut IoctlArg::Opaque).unwrap_err();
            assert!(matches!(err, ShimError::InvalidRequest { .. }));
        }
        // The device still works afterwards.
        let mut arg = IoctlArg::Info(InfoArgs::new(InfoQuery::AccelWorking));
        dev.ioctl(&session, abi::REQ_INFO, &mut arg).unwrap();
    }

    #[test]
    fn noop_codes_succeed_without_state() {
        let dev = device();
        let session = dev.open_session(3);
        for code in [
            abi::REQ_CTX,
            abi::REQ_BO_LIST,
            abi::REQ_CS,
            abi::REQ_GEM_METADATA,
            abi::REQ_GEM_WAIT_IDLE,
            abi::REQ_GEM_VA,
            abi::REQ_WAIT_CS,
            abi::REQ_GEM_OP,
            abi::REQ_GEM_USERPTR,
            abi::REQ_WAIT_FENCES,
            abi::REQ_VM,
            abi::REQ_FENCE_TO_HANDLE,
            abi::REQ_SCHED,
        ] {
            dev.ioctl(&session, code, &mut IoctlArg::Opaque).unwrap();
        }
        assert_eq!(session.bo_count(), 0);
    }

    #[test]
    fn mismatched_parameter_block_is_invalid() {
        let dev = device();
        let session = dev.open_session(3);
        let err = dev
            .ioctl(&session, abi::REQ_GEM_CREATE, &mut IoctlArg::Opaque)
            .unwrap_err();
        assert!(matches!(err, ShimError::InvalidRequest { .. }));
    }

    #[test]
    fn create_then_map_round_trip() {
        let dev = device();
        let session = dev.open_session(3);

        let mut create = IoctlArg::GemCreate(GemCreateArgs {
            bo_size: 1 << 20,
            ..GemCreateArgs::default()
        });
        dev.ioctl(&session, abi::REQ_GEM_CREATE, &mut create).unwrap();
        let IoctlArg::GemCreate(created) = create else {
            unreachable!()
        };
        assert_ne!(created.handle, 0);

        let mut mmap = IoctlArg::GemMmap(GemMmapArgs {
            handle: created.handle,
            addr_ptr: 0,
        });
        dev.ioctl(&session, abi::REQ_GEM_MMAP, &mut mmap).unwrap();
        let IoctlArg::GemMmap(mapped) = mmap else {
            unreachable!()
        };
        assert_ne!(mapped.addr_ptr, 0);
    }

    #[test]
    fn zero_sized_create_succeeds() {
        let dev = device();
        let session = dev.open_session(3);
        let mut create = IoctlArg::GemCreate(GemCreateArgs::default());
        dev.ioctl(&session, abi::REQ_GEM_CREATE, &mut create).unwrap();
        let IoctlArg::GemCreate(created) = create else {
            unreachable!()
        };
        assert_eq!(created.handle, 1);
    }

    #[test]
    #[should_panic(expected = "not registered with this session")]
    fn mapping_an_unknown_handle_is_a_contract_violation() {
        let dev = device();
        let session = dev.open_session(3);
        let mut mmap = IoctlArg::GemMmap(GemMmapArgs {
            handle: 42,
            addr_ptr: 0,
        });
        let _ = dev.ioctl(&session, abi::REQ_GEM_MMAP, &mut mmap);
    }

    #[test]
    fn info_requests_fill_the_reply() {
        let dev = device();
        let session = dev.open_session(3);
        let mut arg = IoctlArg::Info(InfoArgs::new(InfoQuery::DevInfo));
        dev.ioctl(&session, abi::REQ_INFO, &mut arg).unwrap();
        let IoctlArg::Info(info) = arg else {
            unreachable!()
        };
        match info.reply.unwrap() {
            InfoReply::Device(dev_info) => {
                assert_eq!(dev_info.device_id, profiles::DEFAULT.dev.device_id);
            }
            other => panic!("unexpected reply {other:?}"),
        }
    }

    #[test]
    fn unknown_query_kind_is_rejected() {
        let dev = device();
        let session = dev.open_session(3);
        let mut arg = IoctlArg::Info(InfoArgs::new(InfoQuery::Other(0x33)));
        let err = dev.ioctl(&session, abi::REQ_INFO, &mut arg).unwrap_err();
        assert!(matches!(err, ShimError::InvalidQuery { query: 0x33 }));
    }
}
