//! Static hardware model for the softgpu emulator.
//!
//! This crate has **no dependencies** and **no OS access** — it is a pure
//! description of the emulated silicon: the control ABI a user-space
//! driver speaks to the kernel, the memory-mapped registers the driver
//! probes, and one hand-authored profile per supported GPU model.
//!
//! Every value in [`profiles`] was captured from the real kernel driver
//! running on the corresponding machine, so query answers synthesized
//! from a profile match what the hardware would report.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`abi`] | Request codes, query codes, and the record structs they carry |
//! | [`regs`] | Memory-mapped register tuple model and known offsets |
//! | [`pcie`] | PCI identity constants and descriptor formatting |
//! | [`profiles`] | The static device-profile table |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod abi;
pub mod pcie;
pub mod profiles;
pub mod regs;
