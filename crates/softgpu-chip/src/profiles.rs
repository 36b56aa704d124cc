//! The static device-profile table.
//!
//! One [`DeviceProfile`] per supported GPU model, captured from the real
//! kernel driver on the corresponding machine. Profiles are immutable
//! compile-time constants; the first table entry is the default model.

use crate::abi::{DeviceDetails, FirmwareInfo, HwIpInfo};
use crate::regs::{MmrReg, GB_ADDR_CONFIG, INSTANCE_BROADCAST};

/// Hardware family code, as the device-information record reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ChipFamily {
    /// Carrizo / Stoney family.
    Carrizo = 135,
    /// Raven family (also covers Renoir).
    Raven = 142,
}

impl ChipFamily {
    /// Numeric family code.
    #[must_use]
    pub const fn id(self) -> u32 {
        self as u32
    }
}

/// Stored heap capacities; everything else in a memory query is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryTotals {
    /// Device-local memory capacity, in bytes.
    pub vram: u64,
    /// CPU-visible device-local capacity, in bytes.
    pub cpu_accessible_vram: u64,
    /// Mappable system-memory capacity, in bytes.
    pub gtt: u64,
}

/// One emulated GPU model.
#[derive(Debug)]
pub struct DeviceProfile {
    /// Symbolic name used for selection.
    pub name: &'static str,
    /// Hardware family.
    pub family: ChipFamily,
    /// Graphics pipeline capability record.
    pub hw_ip_gfx: HwIpInfo,
    /// Compute pipeline capability record.
    pub hw_ip_compute: HwIpInfo,
    /// Graphics micro-engine firmware record.
    pub fw_gfx_me: FirmwareInfo,
    /// Prefetch-parser firmware record.
    pub fw_gfx_pfp: FirmwareInfo,
    /// Compute micro-engine firmware record.
    pub fw_gfx_mec: FirmwareInfo,
    /// Modeled registers, in scan order.
    pub mmr_regs: &'static [MmrReg],
    /// Device-information record returned verbatim.
    pub dev: DeviceDetails,
    /// Stored heap capacities.
    pub mem: MemoryTotals,
}

/// Find a profile by symbolic name (ASCII case-insensitive, first match).
#[must_use]
pub fn find(name: &str) -> Option<&'static DeviceProfile> {
    PROFILES.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// The profile selected when no name is requested.
pub const DEFAULT: &DeviceProfile = &PROFILES[0];

const MIB: u64 = 1 << 20;

const fn cu_bitmap(first: u32) -> [[u32; 4]; 4] {
    let mut map = [[0u32; 4]; 4];
    map[0][0] = first;
    map
}

/// All supported GPU models. The first entry is the default.
pub const PROFILES: &[DeviceProfile] = &[
    // Renoir APU, as shipped in a Ryzen 4000 laptop.
    DeviceProfile {
        name: "renoir",
        family: ChipFamily::Raven,
        hw_ip_gfx: HwIpInfo {
            hw_ip_version_major: 9,
            ib_start_alignment: 32,
            ib_size_alignment: 32,
            available_rings: 0x1,
            ip_discovery_version: 0x0009_0300,
            ..HwIpInfo::ZERO
        },
        hw_ip_compute: HwIpInfo {
            hw_ip_version_major: 9,
            ib_start_alignment: 32,
            ib_size_alignment: 32,
            available_rings: 0xf,
            ip_discovery_version: 0x0009_0300,
            ..HwIpInfo::ZERO
        },
        fw_gfx_me: FirmwareInfo { ver: 166, feature: 53 },
        fw_gfx_pfp: FirmwareInfo { ver: 194, feature: 53 },
        fw_gfx_mec: FirmwareInfo { ver: 464, feature: 53 },
        mmr_regs: &[MmrReg::new(
            GB_ADDR_CONFIG,
            0xffff_ffff,
            INSTANCE_BROADCAST,
            0x2601_0042,
        )],
        dev: DeviceDetails {
            device_id: 0x15e7,
            external_rev: 0xa1,
            pci_rev: 0xe9,
            family: ChipFamily::Raven.id(),
            num_shader_engines: 1,
            num_shader_arrays_per_engine: 1,
            gpu_counter_freq: 100_000,
            max_engine_clock: 1_800_000,
            max_memory_clock: 1_333_000,
            cu_active_number: 7,
            cu_ao_mask: 0xfe,
            cu_bitmap: cu_bitmap(0xfe),
            enabled_rb_pipes_mask: 0x3,
            num_rb_pipes: 2,
            num_hw_gfx_contexts: 8,
            ids_flags: 0x5,
            virtual_address_offset: 0x20_0000,
            virtual_address_max: 0x8000_0000_0000,
            virtual_address_alignment: 4096,
            pte_fragment_size: 2_097_152,
            gart_page_size: 4096,
            ce_ram_size: 32768,
            vram_type: 11,
            vram_bit_width: 128,
            gc_double_offchip_lds_buf: 1,
            wave_front_size: 64,
            num_shader_visible_vgprs: 256,
            num_cu_per_sh: 8,
            num_tcc_blocks: 4,
            gs_vgt_table_depth: 32,
            gs_prim_buffer_depth: 1792,
            max_gs_waves_per_vgt: 32,
            cu_ao_bitmap: cu_bitmap(0xfe),
            high_va_offset: 0xffff_8000_0000_0000,
            high_va_max: 0xffff_ffff_ffe0_0000,
            ..DeviceDetails::ZERO
        },
        mem: MemoryTotals {
            vram: 64 * MIB,
            cpu_accessible_vram: 64 * MIB,
            gtt: 4096 * MIB,
        },
    },
    // Raven Ridge APU (Ryzen 2000/3000 desktop parts).
    DeviceProfile {
        name: "raven",
        family: ChipFamily::Raven,
        hw_ip_gfx: HwIpInfo {
            hw_ip_version_major: 9,
            ib_start_alignment: 32,
            ib_size_alignment: 32,
            available_rings: 0x1,
            ..HwIpInfo::ZERO
        },
        hw_ip_compute: HwIpInfo {
            hw_ip_version_major: 9,
            ib_start_alignment: 32,
            ib_size_alignment: 32,
            available_rings: 0xf,
            ..HwIpInfo::ZERO
        },
        fw_gfx_me: FirmwareInfo { ver: 162, feature: 47 },
        fw_gfx_pfp: FirmwareInfo { ver: 185, feature: 47 },
        fw_gfx_mec: FirmwareInfo { ver: 427, feature: 47 },
        mmr_regs: &[MmrReg::new(
            GB_ADDR_CONFIG,
            0xffff_ffff,
            INSTANCE_BROADCAST,
            0x2400_0042,
        )],
        dev: DeviceDetails {
            device_id: 0x15d8,
            chip_rev: 0x01,
            external_rev: 0x42,
            pci_rev: 0xc1,
            family: ChipFamily::Raven.id(),
            num_shader_engines: 1,
            num_shader_arrays_per_engine: 1,
            gpu_counter_freq: 25_000,
            max_engine_clock: 1_400_000,
            max_memory_clock: 1_200_000,
            cu_active_number: 10,
            cu_ao_mask: 0x3ff,
            cu_bitmap: cu_bitmap(0x3ff),
            enabled_rb_pipes_mask: 0x3,
            num_rb_pipes: 2,
            num_hw_gfx_contexts: 8,
            ids_flags: 0x1,
            virtual_address_offset: 0x20_0000,
            virtual_address_max: 0x8000_0000_0000,
            virtual_address_alignment: 4096,
            pte_fragment_size: 2_097_152,
            gart_page_size: 4096,
            ce_ram_size: 32768,
            vram_type: 8,
            vram_bit_width: 128,
            gc_double_offchip_lds_buf: 1,
            wave_front_size: 64,
            num_shader_visible_vgprs: 256,
            num_cu_per_sh: 11,
            num_tcc_blocks: 4,
            gs_vgt_table_depth: 32,
            gs_prim_buffer_depth: 1792,
            max_gs_waves_per_vgt: 32,
            cu_ao_bitmap: cu_bitmap(0x3ff),
            high_va_offset: 0xffff_8000_0000_0000,
            high_va_max: 0xffff_ffff_ffe0_0000,
            ..DeviceDetails::ZERO
        },
        mem: MemoryTotals {
            vram: 64 * MIB,
            cpu_accessible_vram: 64 * MIB,
            gtt: 3072 * MIB,
        },
    },
    // Stoney Ridge APU — gfx8, and the only profile with a full tiling
    // register dump (gfx8 winsys layers read all of it).
    DeviceProfile {
        name: "stoney",
        family: ChipFamily::Carrizo,
        hw_ip_gfx: HwIpInfo {
            hw_ip_version_major: 8,
            hw_ip_version_minor: 1,
            ib_start_alignment: 32,
            ib_size_alignment: 32,
            available_rings: 0x1,
            ..HwIpInfo::ZERO
        },
        hw_ip_compute: HwIpInfo {
            hw_ip_version_major: 8,
            hw_ip_version_minor: 1,
            ib_start_alignment: 32,
            ib_size_alignment: 32,
            available_rings: 0xf,
            ..HwIpInfo::ZERO
        },
        fw_gfx_me: FirmwareInfo { ver: 52, feature: 35 },
        fw_gfx_pfp: FirmwareInfo { ver: 77, feature: 35 },
        fw_gfx_mec: FirmwareInfo { ver: 134, feature: 35 },
        mmr_regs: STONEY_MMR_REGS,
        dev: DeviceDetails {
            device_id: 0x98e4,
            external_rev: 0x61,
            pci_rev: 0xeb,
            family: ChipFamily::Carrizo.id(),
            num_shader_engines: 1,
            num_shader_arrays_per_engine: 1,
            gpu_counter_freq: 48_000,
            max_engine_clock: 600_000,
            max_memory_clock: 933_000,
            cu_active_number: 3,
            cu_ao_mask: 0x3,
            cu_bitmap: cu_bitmap(0x7),
            enabled_rb_pipes_mask: 0x1,
            num_rb_pipes: 1,
            num_hw_gfx_contexts: 8,
            ids_flags: 0x1,
            virtual_address_offset: 0x20_0000,
            virtual_address_max: 0xf_ffe0_0000,
            virtual_address_alignment: 4096,
            pte_fragment_size: 2_097_152,
            gart_page_size: 4096,
            ce_ram_size: 32768,
            vram_bit_width: 64,
            vce_harvest_config: 2,
            wave_front_size: 64,
            num_shader_visible_vgprs: 256,
            num_cu_per_sh: 3,
            num_tcc_blocks: 2,
            max_gs_waves_per_vgt: 16,
            cu_ao_bitmap: cu_bitmap(0x3),
            ..DeviceDetails::ZERO
        },
        mem: MemoryTotals {
            vram: 16 * MIB,
            cpu_accessible_vram: 16 * MIB,
            gtt: 3072 * MIB,
        },
    },
];

const fn reg(offset: u32, instance: u32, value: u32) -> MmrReg {
    MmrReg::new(offset, 0xffff_ffff, instance, value)
}

// Full register dump from a Stoney machine: addressing config, render
// backend masks, RAM config, the 32 tiling modes and 16 macro-tiling
// modes.
const STONEY_MMR_REGS: &[MmrReg] = &[
    reg(0x263e, INSTANCE_BROADCAST, 0x0201_0001),
    reg(0x263d, 0x0000_ff00, 0x0000_0000),
    reg(0xa0d4, 0x0000_ff00, 0x0000_0000),
    reg(0xa0d5, 0x0000_ff00, 0x0000_0000),
    reg(0x09d8, INSTANCE_BROADCAST, 0x0000_7111),
    reg(0x2644, INSTANCE_BROADCAST, 0x0080_0010),
    reg(0x2645, INSTANCE_BROADCAST, 0x0080_0810),
    reg(0x2646, INSTANCE_BROADCAST, 0x0080_1010),
    reg(0x2647, INSTANCE_BROADCAST, 0x0080_1810),
    reg(0x2648, INSTANCE_BROADCAST, 0x0080_2810),
    reg(0x2649, INSTANCE_BROADCAST, 0x0080_2808),
    reg(0x264a, INSTANCE_BROADCAST, 0x0080_2814),
    reg(0x264b, INSTANCE_BROADCAST, 0x0000_0000),
    reg(0x264c, INSTANCE_BROADCAST, 0x0000_0004),
    reg(0x264d, INSTANCE_BROADCAST, 0x0200_0008),
    reg(0x264e, INSTANCE_BROADCAST, 0x0200_0010),
    reg(0x264f, INSTANCE_BROADCAST, 0x0600_0014),
    reg(0x2650, INSTANCE_BROADCAST, 0x0000_0000),
    reg(0x2651, INSTANCE_BROADCAST, 0x0240_0008),
    reg(0x2652, INSTANCE_BROADCAST, 0x0240_0010),
    reg(0x2653, INSTANCE_BROADCAST, 0x0240_0030),
    reg(0x2654, INSTANCE_BROADCAST, 0x0640_0014),
    reg(0x2655, INSTANCE_BROADCAST, 0x0000_0000),
    reg(0x2656, INSTANCE_BROADCAST, 0x0040_000c),
    reg(0x2657, INSTANCE_BROADCAST, 0x0100_000c),
    reg(0x2658, INSTANCE_BROADCAST, 0x0100_001c),
    reg(0x2659, INSTANCE_BROADCAST, 0x0100_0034),
    reg(0x265a, INSTANCE_BROADCAST, 0x0100_0024),
    reg(0x265b, INSTANCE_BROADCAST, 0x0000_0000),
    reg(0x265c, INSTANCE_BROADCAST, 0x0040_001c),
    reg(0x265d, INSTANCE_BROADCAST, 0x0100_0020),
    reg(0x265e, INSTANCE_BROADCAST, 0x0100_0038),
    reg(0x265f, INSTANCE_BROADCAST, 0x02c0_0008),
    reg(0x2660, INSTANCE_BROADCAST, 0x02c0_0010),
    reg(0x2661, INSTANCE_BROADCAST, 0x06c0_0014),
    reg(0x2662, INSTANCE_BROADCAST, 0x0000_0000),
    reg(0x2663, INSTANCE_BROADCAST, 0x0000_0000),
    reg(0x2664, INSTANCE_BROADCAST, 0x0000_00a8),
    reg(0x2665, INSTANCE_BROADCAST, 0x0000_00a4),
    reg(0x2666, INSTANCE_BROADCAST, 0x0000_0090),
    reg(0x2667, INSTANCE_BROADCAST, 0x0000_0090),
    reg(0x2668, INSTANCE_BROADCAST, 0x0000_0090),
    reg(0x2669, INSTANCE_BROADCAST, 0x0000_0090),
    reg(0x266a, INSTANCE_BROADCAST, 0x0000_0090),
    reg(0x266b, INSTANCE_BROADCAST, 0x0000_0000),
    reg(0x266c, INSTANCE_BROADCAST, 0x0000_00ee),
    reg(0x266d, INSTANCE_BROADCAST, 0x0000_00ea),
    reg(0x266e, INSTANCE_BROADCAST, 0x0000_00e9),
    reg(0x266f, INSTANCE_BROADCAST, 0x0000_00e5),
    reg(0x2670, INSTANCE_BROADCAST, 0x0000_00e4),
    reg(0x2671, INSTANCE_BROADCAST, 0x0000_00e0),
    reg(0x2672, INSTANCE_BROADCAST, 0x0000_0090),
    reg(0x2673, INSTANCE_BROADCAST, 0x0000_0000),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_first_entry() {
        assert_eq!(DEFAULT.name, PROFILES[0].name);
        assert_eq!(DEFAULT.name, "renoir");
    }

    #[test]
    fn names_are_unique() {
        for (i, a) in PROFILES.iter().enumerate() {
            for b in &PROFILES[i + 1..] {
                assert!(!a.name.eq_ignore_ascii_case(b.name));
            }
        }
    }

    #[test]
    fn find_is_case_insensitive() {
        assert_eq!(find("RAVEN").unwrap().name, "raven");
        assert_eq!(find("Stoney").unwrap().name, "stoney");
        assert!(find("fiji").is_none());
    }

    #[test]
    fn every_profile_models_the_addressing_register() {
        for p in PROFILES {
            assert!(
                p.mmr_regs
                    .iter()
                    .any(|r| r.offset == GB_ADDR_CONFIG && r.value != 0),
                "{} lacks GB_ADDR_CONFIG",
                p.name
            );
        }
    }

    #[test]
    fn stoney_register_dump_is_complete() {
        let stoney = find("stoney").unwrap();
        assert_eq!(stoney.mmr_regs.len(), 53);
        // 32 tiling modes + 16 macro-tiling modes are contiguous.
        for i in 0..32 {
            assert!(stoney.mmr_regs.iter().any(|r| r.offset == 0x2644 + i));
        }
        for i in 0..16 {
            assert!(stoney.mmr_regs.iter().any(|r| r.offset == 0x2664 + i));
        }
    }

    #[test]
    fn family_codes_match_device_records() {
        for p in PROFILES {
            assert_eq!(p.family.id(), p.dev.family, "{}", p.name);
        }
    }

    #[test]
    fn integrated_parts_have_fusion_flag() {
        for p in PROFILES {
            assert_eq!(p.dev.ids_flags & 0x1, 0x1, "{}", p.name);
        }
    }
}
