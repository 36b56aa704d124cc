//! Control ABI of the amdgpu character device.
//!
//! Request codes, info-query codes, and the records they carry, as a
//! user-space driver stack (libdrm and the GL/Vulkan winsys layers)
//! issues them. Field layouts follow the kernel uapi; only the subset
//! the emulator answers is modeled.

// ── Request codes ────────────────────────────────────────────────────────────

/// Create a GEM buffer object.
pub const REQ_GEM_CREATE: u32 = 0x00;
/// Retrieve the fake-offset used to mmap a buffer object.
pub const REQ_GEM_MMAP: u32 = 0x01;
/// Create / destroy a command-submission context.
pub const REQ_CTX: u32 = 0x02;
/// Create / destroy a buffer-object list.
pub const REQ_BO_LIST: u32 = 0x03;
/// Submit a command stream.
pub const REQ_CS: u32 = 0x04;
/// Multiplexed information query (see `INFO_*`).
pub const REQ_INFO: u32 = 0x05;
/// Set / query buffer-object metadata.
pub const REQ_GEM_METADATA: u32 = 0x06;
/// Wait for a buffer object to become idle.
pub const REQ_GEM_WAIT_IDLE: u32 = 0x07;
/// Map / unmap a buffer object in the GPU virtual address space.
pub const REQ_GEM_VA: u32 = 0x08;
/// Wait for a submitted command stream.
pub const REQ_WAIT_CS: u32 = 0x09;
/// Buffer-object operations (query info, set placement).
pub const REQ_GEM_OP: u32 = 0x10;
/// Import user pages as a buffer object.
pub const REQ_GEM_USERPTR: u32 = 0x11;
/// Wait for multiple fences.
pub const REQ_WAIT_FENCES: u32 = 0x12;
/// Virtual-memory housekeeping.
pub const REQ_VM: u32 = 0x13;
/// Convert a fence to a sync handle.
pub const REQ_FENCE_TO_HANDLE: u32 = 0x14;
/// Scheduler priority control.
pub const REQ_SCHED: u32 = 0x15;

// ── Info query codes ─────────────────────────────────────────────────────────

/// Is the accelerator operational?
pub const INFO_ACCEL_WORKING: u32 = 0x00;
/// Capability record of one functional-unit (hw ip) type.
pub const INFO_HW_IP_INFO: u32 = 0x02;
/// Version/feature record of one firmware component.
pub const INFO_FW_VERSION: u32 = 0x0e;
/// Read a range of memory-mapped registers.
pub const INFO_READ_MMR_REG: u32 = 0x15;
/// The flat device-information record.
pub const INFO_DEV_INFO: u32 = 0x16;
/// Memory-heap sizes and usage.
pub const INFO_MEMORY: u32 = 0x19;
/// Video codec capabilities.
pub const INFO_VIDEO_CAPS: u32 = 0x21;

/// Functional-unit (hw ip) type selectors for [`INFO_HW_IP_INFO`].
pub mod hw_ip {
    /// Graphics pipeline.
    pub const GFX: u32 = 0;
    /// Compute pipeline.
    pub const COMPUTE: u32 = 1;
}

/// Firmware component selectors for [`INFO_FW_VERSION`].
pub mod fw {
    /// Graphics micro-engine.
    pub const GFX_ME: u32 = 0x04;
    /// Graphics prefetch parser.
    pub const GFX_PFP: u32 = 0x05;
    /// Graphics compute micro-engine.
    pub const GFX_MEC: u32 = 0x08;
}

// ── Records ──────────────────────────────────────────────────────────────────

/// Capability record of one functional-unit type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HwIpInfo {
    /// Hardware interface major version.
    pub hw_ip_version_major: u32,
    /// Hardware interface minor version.
    pub hw_ip_version_minor: u32,
    /// Capability flag bits.
    pub capabilities_flags: u64,
    /// Required start alignment of indirect buffers, in bytes.
    pub ib_start_alignment: u32,
    /// Required size alignment of indirect buffers, in bytes.
    pub ib_size_alignment: u32,
    /// Bitmask of available execution rings.
    pub available_rings: u32,
    /// IP discovery version (`0xMMmmrr`), zero when not discovered.
    pub ip_discovery_version: u32,
}

impl HwIpInfo {
    /// All-zero record, for profile table entries and unmodeled types.
    pub const ZERO: Self = Self {
        hw_ip_version_major: 0,
        hw_ip_version_minor: 0,
        capabilities_flags: 0,
        ib_start_alignment: 0,
        ib_size_alignment: 0,
        available_rings: 0,
        ip_discovery_version: 0,
    };
}

/// Version record of one firmware component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FirmwareInfo {
    /// Firmware version number.
    pub ver: u32,
    /// Firmware feature-flag number.
    pub feature: u32,
}

/// One memory heap as reported by [`INFO_MEMORY`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapInfo {
    /// Nominal capacity of the heap, in bytes.
    pub total_heap_size: u64,
    /// Capacity currently usable by this process, in bytes.
    pub usable_heap_size: u64,
    /// Bytes currently allocated from the heap.
    pub heap_usage: u64,
    /// Largest single allocation the heap will satisfy, in bytes.
    pub max_allocation: u64,
}

impl HeapInfo {
    /// Synthesize a full heap record from a nominal capacity.
    ///
    /// The emulator has no allocation pressure: the whole heap is usable,
    /// nothing is in use, and the largest single allocation is capped at
    /// three quarters of capacity (integer division), matching the real
    /// driver's reporting.
    #[must_use]
    pub const fn from_total(total: u64) -> Self {
        Self {
            total_heap_size: total,
            usable_heap_size: total,
            heap_usage: 0,
            max_allocation: total * 3 / 4,
        }
    }
}

/// The three heaps reported by [`INFO_MEMORY`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryInfo {
    /// Device-local memory.
    pub vram: HeapInfo,
    /// CPU-visible subset of device-local memory.
    pub cpu_accessible_vram: HeapInfo,
    /// System memory mappable by the device.
    pub gtt: HeapInfo,
}

/// Capability record of one video codec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VideoCodecInfo {
    /// Non-zero when the codec is present.
    pub valid: u32,
    /// Maximum frame width in pixels.
    pub max_width: u32,
    /// Maximum frame height in pixels.
    pub max_height: u32,
    /// Maximum pixels per frame.
    pub max_pixels_per_frame: u32,
    /// Maximum supported codec level.
    pub max_level: u32,
}

/// Number of codec slots in a [`VideoCapsInfo`] record.
pub const VIDEO_CAPS_CODEC_COUNT: usize = 8;

/// Video codec capabilities, one slot per codec index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VideoCapsInfo {
    /// Per-codec capability records.
    pub codec_info: [VideoCodecInfo; VIDEO_CAPS_CODEC_COUNT],
}

/// The flat device-information record returned by [`INFO_DEV_INFO`].
///
/// Scalar hardware parameters the winsys layers consume verbatim.
/// Unpopulated fields read as zero, exactly as the kernel leaves them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceDetails {
    /// PCI device id.
    pub device_id: u32,
    /// Internal chip revision.
    pub chip_rev: u32,
    /// Revision id the driver stack keys behavior on.
    pub external_rev: u32,
    /// PCI revision id.
    pub pci_rev: u32,
    /// Hardware family code.
    pub family: u32,
    /// Number of shader engines.
    pub num_shader_engines: u32,
    /// Shader arrays per engine.
    pub num_shader_arrays_per_engine: u32,
    /// GPU counter frequency in kHz.
    pub gpu_counter_freq: u32,
    /// Maximum engine clock in kHz.
    pub max_engine_clock: u64,
    /// Maximum memory clock in kHz.
    pub max_memory_clock: u64,
    /// Number of active compute units.
    pub cu_active_number: u32,
    /// Always-on compute-unit mask.
    pub cu_ao_mask: u32,
    /// Per-SE/SH compute-unit bitmaps.
    pub cu_bitmap: [[u32; 4]; 4],
    /// Enabled render-backend pipe mask.
    pub enabled_rb_pipes_mask: u32,
    /// Number of render-backend pipes.
    pub num_rb_pipes: u32,
    /// Number of hardware graphics contexts.
    pub num_hw_gfx_contexts: u32,
    /// Identification flag bits (bit 0: integrated part).
    pub ids_flags: u64,
    /// Start of the usable GPU virtual address range.
    pub virtual_address_offset: u64,
    /// End of the usable GPU virtual address range.
    pub virtual_address_max: u64,
    /// Required virtual-address alignment, in bytes.
    pub virtual_address_alignment: u32,
    /// Page-table fragment size, in bytes.
    pub pte_fragment_size: u32,
    /// GART page size, in bytes.
    pub gart_page_size: u32,
    /// Constant-engine RAM size, in bytes.
    pub ce_ram_size: u32,
    /// Memory type identifier.
    pub vram_type: u32,
    /// Memory bus width, in bits.
    pub vram_bit_width: u32,
    /// VCE harvesting configuration.
    pub vce_harvest_config: u32,
    /// Double off-chip LDS buffers enabled.
    pub gc_double_offchip_lds_buf: u32,
    /// Wavefront lane count.
    pub wave_front_size: u32,
    /// Shader-visible vector registers per SIMD.
    pub num_shader_visible_vgprs: u32,
    /// Compute units per shader array.
    pub num_cu_per_sh: u32,
    /// Number of texture-cache blocks.
    pub num_tcc_blocks: u32,
    /// Geometry-shader VGT table depth.
    pub gs_vgt_table_depth: u32,
    /// Geometry-shader primitive buffer depth.
    pub gs_prim_buffer_depth: u32,
    /// Maximum geometry-shader waves per VGT.
    pub max_gs_waves_per_vgt: u32,
    /// Always-on compute-unit bitmaps.
    pub cu_ao_bitmap: [[u32; 4]; 4],
    /// Start of the high virtual address range.
    pub high_va_offset: u64,
    /// End of the high virtual address range.
    pub high_va_max: u64,
}

impl DeviceDetails {
    /// All-zero record, the base for profile table entries.
    pub const ZERO: Self = Self {
        device_id: 0,
        chip_rev: 0,
        external_rev: 0,
        pci_rev: 0,
        family: 0,
        num_shader_engines: 0,
        num_shader_arrays_per_engine: 0,
        gpu_counter_freq: 0,
        max_engine_clock: 0,
        max_memory_clock: 0,
        cu_active_number: 0,
        cu_ao_mask: 0,
        cu_bitmap: [[0; 4]; 4],
        enabled_rb_pipes_mask: 0,
        num_rb_pipes: 0,
        num_hw_gfx_contexts: 0,
        ids_flags: 0,
        virtual_address_offset: 0,
        virtual_address_max: 0,
        virtual_address_alignment: 0,
        pte_fragment_size: 0,
        gart_page_size: 0,
        ce_ram_size: 0,
        vram_type: 0,
        vram_bit_width: 0,
        vce_harvest_config: 0,
        gc_double_offchip_lds_buf: 0,
        wave_front_size: 0,
        num_shader_visible_vgprs: 0,
        num_cu_per_sh: 0,
        num_tcc_blocks: 0,
        gs_vgt_table_depth: 0,
        gs_prim_buffer_depth: 0,
        max_gs_waves_per_vgt: 0,
        cu_ao_bitmap: [[0; 4]; 4],
        high_va_offset: 0,
        high_va_max: 0,
    };
}

// ── Parameter blocks ─────────────────────────────────────────────────────────

/// In/out parameter block for [`REQ_GEM_CREATE`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GemCreateArgs {
    /// In: requested size in bytes.
    pub bo_size: u64,
    /// In: requested alignment in bytes.
    pub alignment: u64,
    /// In: placement domain bits.
    pub domains: u64,
    /// In: placement flag bits.
    pub domain_flags: u64,
    /// Out: handle of the created buffer object.
    pub handle: u32,
}

/// In/out parameter block for [`REQ_GEM_MMAP`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GemMmapArgs {
    /// In: handle of a buffer object owned by the calling session.
    pub handle: u32,
    /// Out: fake-offset to pass to mmap for this object.
    pub addr_ptr: u64,
}

/// A decoded information query, one variant per query kind.
///
/// Kinds the emulator does not recognize stay representable through
/// [`InfoQuery::Other`] so the responder can reject them explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoQuery {
    /// Is the accelerator operational?
    AccelWorking,
    /// Capability record for one functional-unit type.
    HwIpInfo {
        /// Selector from [`hw_ip`].
        ip_type: u32,
    },
    /// Version record for one firmware component.
    FwVersion {
        /// Selector from [`fw`].
        fw_type: u32,
    },
    /// Read `count` consecutive registers starting at `offset`.
    ReadMmrReg {
        /// First register offset (dwords).
        offset: u32,
        /// Number of consecutive registers to read.
        count: u32,
        /// Register instance selector.
        instance: u32,
    },
    /// The flat device-information record.
    DevInfo,
    /// Memory-heap sizes and usage.
    Memory,
    /// Video codec capabilities.
    VideoCaps {
        /// Decode/encode capability selector.
        cap_type: u32,
    },
    /// A query kind the emulator does not model.
    Other(u32),
}

impl InfoQuery {
    /// The raw query code this variant decodes.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            Self::AccelWorking => INFO_ACCEL_WORKING,
            Self::HwIpInfo { .. } => INFO_HW_IP_INFO,
            Self::FwVersion { .. } => INFO_FW_VERSION,
            Self::ReadMmrReg { .. } => INFO_READ_MMR_REG,
            Self::DevInfo => INFO_DEV_INFO,
            Self::Memory => INFO_MEMORY,
            Self::VideoCaps { .. } => INFO_VIDEO_CAPS,
            Self::Other(code) => *code,
        }
    }
}

/// The record written back for a recognized [`InfoQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoReply {
    /// Accelerator status word (always 1).
    AccelWorking(u32),
    /// Functional-unit capability record.
    HwIp(HwIpInfo),
    /// Firmware version record.
    Firmware(FirmwareInfo),
    /// One value per requested register.
    MmrRegs(Vec<u32>),
    /// Device-information record.
    Device(DeviceDetails),
    /// Memory-heap record.
    Memory(MemoryInfo),
    /// Video codec capability record.
    VideoCaps(VideoCapsInfo),
}
