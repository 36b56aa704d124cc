// SPDX-License-Identifier: AGPL-3.0-only

//! The information-query responder.
//!
//! One multiplexed request code carries a query kind plus its
//! parameters; each kind has its own synthesis rule against the active
//! profile. Every answer is a pure function of (profile, query) — no
//! state survives between calls.

use softgpu_chip::abi::{
    self, FirmwareInfo, HeapInfo, HwIpInfo, InfoQuery, InfoReply, MemoryInfo, VideoCapsInfo,
};
use softgpu_chip::profiles::DeviceProfile;

use crate::error::{Result, ShimError};

/// Answer one info query against `profile`.
///
/// # Errors
///
/// Returns [`ShimError::InvalidQuery`] for a query kind outside the
/// modeled surface. Recognized kinds never fail.
pub fn respond(profile: &DeviceProfile, query: &InfoQuery) -> Result<InfoReply> {
    match *query {
        // The emulated accelerator is always operational.
        InfoQuery::AccelWorking => Ok(InfoReply::AccelWorking(1)),
        InfoQuery::HwIpInfo { ip_type } => Ok(InfoReply::HwIp(hw_ip_info(profile, ip_type))),
        InfoQuery::FwVersion { fw_type } => Ok(InfoReply::Firmware(fw_version(profile, fw_type))),
        InfoQuery::ReadMmrReg {
            offset,
            count,
            instance,
        } => Ok(InfoReply::MmrRegs(read_mmr_regs(
            profile, offset, count, instance,
        ))),
        InfoQuery::DevInfo => Ok(InfoReply::Device(profile.dev)),
        InfoQuery::Memory => Ok(InfoReply::Memory(memory_info(profile))),
        // No video codec capability, unconditionally.
        InfoQuery::VideoCaps { .. } => Ok(InfoReply::VideoCaps(VideoCapsInfo::default())),
        InfoQuery::Other(code) => Err(ShimError::invalid_query(code)),
    }
}

/// Capability record for one functional-unit type.
///
/// Unmodeled types answer with a zeroed record, not an error.
#[must_use]
pub fn hw_ip_info(profile: &DeviceProfile, ip_type: u32) -> HwIpInfo {
    match ip_type {
        abi::hw_ip::GFX => profile.hw_ip_gfx,
        abi::hw_ip::COMPUTE => profile.hw_ip_compute,
        _ => HwIpInfo::default(),
    }
}

/// Version record for one firmware component.
///
/// Unmodeled components answer with a zeroed record, not an error.
#[must_use]
pub fn fw_version(profile: &DeviceProfile, fw_type: u32) -> FirmwareInfo {
    match fw_type {
        abi::fw::GFX_ME => profile.fw_gfx_me,
        abi::fw::GFX_PFP => profile.fw_gfx_pfp,
        abi::fw::GFX_MEC => profile.fw_gfx_mec,
        _ => FirmwareInfo::default(),
    }
}

/// Read `count` consecutive registers starting at `offset`.
///
/// Each address is resolved by a front-to-back scan of the profile's
/// register table; the first `(offset, instance)` match is
/// authoritative. An address with no match reads as zero and is
/// reported at warn level — never as an error.
#[must_use]
pub fn read_mmr_regs(profile: &DeviceProfile, offset: u32, count: u32, instance: u32) -> Vec<u32> {
    (0..count)
        .map(|i| {
            let reg = offset.wrapping_add(i);
            let hit = profile
                .mmr_regs
                .iter()
                .find(|r| r.offset == reg && r.instance == instance);
            match hit {
                Some(r) => r.value,
                None => {
                    tracing::warn!("reg {reg:#06x} is unknown");
                    0
                }
            }
        })
        .collect()
}

/// Memory-heap record, synthesized from the profile's stored totals.
///
/// All three heaps derive identically: the whole heap is usable,
/// usage is zero, and the largest single allocation is three quarters
/// of capacity.
#[must_use]
pub fn memory_info(profile: &DeviceProfile) -> MemoryInfo {
    MemoryInfo {
        vram: HeapInfo::from_total(profile.mem.vram),
        cpu_accessible_vram: HeapInfo::from_total(profile.mem.cpu_accessible_vram),
        gtt: HeapInfo::from_total(profile.mem.gtt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use softgpu_chip::profiles::{self, ChipFamily, MemoryTotals};
    use softgpu_chip::regs::{MmrReg, INSTANCE_BROADCAST};

    fn renoir() -> &'static DeviceProfile {
        profiles::find("renoir").unwrap()
    }

    #[test]
    fn accel_probe_always_succeeds() {
        for p in profiles::PROFILES {
            assert_eq!(
                respond(p, &InfoQuery::AccelWorking).unwrap(),
                InfoReply::AccelWorking(1)
            );
        }
    }

    #[test]
    fn hw_ip_records_come_back_verbatim() {
        let p = renoir();
        assert_eq!(hw_ip_info(p, abi::hw_ip::GFX), p.hw_ip_gfx);
        assert_eq!(hw_ip_info(p, abi::hw_ip::COMPUTE), p.hw_ip_compute);
        assert_eq!(p.hw_ip_gfx.available_rings, 0x1);
        assert_eq!(p.hw_ip_compute.available_rings, 0xf);
    }

    #[test]
    fn unmodeled_hw_ip_type_reads_zeroed() {
        assert_eq!(hw_ip_info(renoir(), 99), HwIpInfo::default());
    }

    #[test]
    fn firmware_records_come_back_verbatim() {
        let p = renoir();
        assert_eq!(fw_version(p, abi::fw::GFX_ME).ver, 166);
        assert_eq!(fw_version(p, abi::fw::GFX_PFP).ver, 194);
        assert_eq!(fw_version(p, abi::fw::GFX_MEC).ver, 464);
    }

    #[test]
    fn unmodeled_firmware_component_reads_zeroed() {
        assert_eq!(fw_version(renoir(), 0x0b), FirmwareInfo::default());
    }

    #[test]
    fn dev_info_is_the_profile_record() {
        for p in profiles::PROFILES {
            match respond(p, &InfoQuery::DevInfo).unwrap() {
                InfoReply::Device(dev) => assert_eq!(dev, p.dev),
                other => panic!("unexpected reply {other:?}"),
            }
        }
    }

    #[test]
    fn heap_derivation_holds_for_all_profiles_and_heaps() {
        for p in profiles::PROFILES {
            let mem = memory_info(p);
            for (heap, total) in [
                (mem.vram, p.mem.vram),
                (mem.cpu_accessible_vram, p.mem.cpu_accessible_vram),
                (mem.gtt, p.mem.gtt),
            ] {
                assert_eq!(heap.total_heap_size, total);
                assert_eq!(heap.usable_heap_size, total);
                assert_eq!(heap.heap_usage, 0);
                assert_eq!(heap.max_allocation, total * 3 / 4);
            }
        }
    }

    #[test]
    fn renoir_heap_numbers() {
        // 64 MiB vram: usable 64 MiB, usage 0, max allocation 48 MiB.
        let mem = memory_info(renoir());
        assert_eq!(mem.vram.usable_heap_size, 64 << 20);
        assert_eq!(mem.vram.heap_usage, 0);
        assert_eq!(mem.vram.max_allocation, 48 << 20);
    }

    #[test]
    fn max_allocation_truncates() {
        let heap = HeapInfo::from_total(10);
        assert_eq!(heap.max_allocation, 7);
    }

    #[test]
    fn register_reads_resolve_per_address() {
        let p = renoir();
        let vals = read_mmr_regs(p, 0x263e, 2, INSTANCE_BROADCAST);
        assert_eq!(vals, vec![0x2601_0042, 0]);
    }

    #[test]
    fn register_read_result_has_requested_length() {
        assert_eq!(read_mmr_regs(renoir(), 0x100, 7, 0).len(), 7);
        assert!(read_mmr_regs(renoir(), 0x100, 0, 0).is_empty());
    }

    #[test]
    fn register_instance_must_match() {
        let vals = read_mmr_regs(renoir(), 0x263e, 1, 0);
        assert_eq!(vals, vec![0]);
    }

    #[test]
    fn duplicate_register_entries_resolve_to_first_match() {
        static DOUBLED: &[MmrReg] = &[
            MmrReg::new(0x100, 0xffff_ffff, 0, 0xabcd),
            MmrReg::new(0x100, 0xffff_ffff, 0, 0xeeee),
        ];
        let profile = DeviceProfile {
            name: "doubled",
            family: ChipFamily::Raven,
            hw_ip_gfx: HwIpInfo::ZERO,
            hw_ip_compute: HwIpInfo::ZERO,
            fw_gfx_me: FirmwareInfo { ver: 0, feature: 0 },
            fw_gfx_pfp: FirmwareInfo { ver: 0, feature: 0 },
            fw_gfx_mec: FirmwareInfo { ver: 0, feature: 0 },
            mmr_regs: DOUBLED,
            dev: softgpu_chip::abi::DeviceDetails::ZERO,
            mem: MemoryTotals {
                vram: 0,
                cpu_accessible_vram: 0,
                gtt: 0,
            },
        };
        assert_eq!(read_mmr_regs(&profile, 0x100, 2, 0), vec![0xabcd, 0]);
    }

    #[test]
    fn video_caps_are_always_zeroed() {
        for cap_type in [0, 1, 99] {
            match respond(renoir(), &InfoQuery::VideoCaps { cap_type }).unwrap() {
                InfoReply::VideoCaps(caps) => assert_eq!(caps, VideoCapsInfo::default()),
                other => panic!("unexpected reply {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_query_kinds_are_rejected() {
        let err = respond(renoir(), &InfoQuery::Other(0x1b)).unwrap_err();
        assert!(matches!(err, ShimError::InvalidQuery { query: 0x1b }));
    }
}
