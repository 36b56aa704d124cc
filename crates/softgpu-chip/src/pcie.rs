//! PCI identity and drm driver constants.
//!
//! The values a real device node advertises through sysfs and the drm
//! version ioctl. The interception layer renders descriptor files from
//! these plus the active profile's identity fields.

/// AMD vendor id (PCI-SIG assigned).
pub const AMD_VENDOR_ID: u16 = 0x1002;

/// Subsystem vendor id reported for every profile.
pub const SUBSYS_VENDOR_ID: u16 = 0x1002;

/// Subsystem device id reported for every profile.
pub const SUBSYS_DEVICE_ID: u16 = 0x1636;

/// PCI class of a display controller (VGA-compatible).
pub const PCI_CLASS_DISPLAY: u32 = 0x30000;

/// Bus slot the emulated device claims to occupy.
pub const PCI_SLOT_NAME: &str = "0000:04:00.0";

/// Name the drm driver registers under.
pub const DRIVER_NAME: &str = "amdgpu";

/// drm driver interface version the emulator reports.
pub mod version {
    /// Major version.
    pub const MAJOR: u32 = 3;
    /// Minor version.
    pub const MINOR: u32 = 49;
    /// Patch level.
    pub const PATCHLEVEL: u32 = 0;
}

/// The driver stack opens render nodes before card nodes.
pub const PREFERS_FIRST_RENDER_NODE: bool = true;

/// Format a `vendor:device` string for use with `lspci -d`.
#[must_use]
pub fn lspci_filter(device_id: u32) -> String {
    format!("{AMD_VENDOR_ID:04x}:{device_id:04x}")
}

/// Format the modalias string for a device id.
#[must_use]
pub fn modalias(device_id: u32) -> String {
    format!(
        "pci:v{:08X}d{device_id:08X}sv{:08X}sd{:08X}bc03sc00i00",
        AMD_VENDOR_ID, SUBSYS_VENDOR_ID, SUBSYS_DEVICE_ID
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lspci_filter_format() {
        assert_eq!(lspci_filter(0x15e7), "1002:15e7");
    }

    #[test]
    fn modalias_format() {
        assert_eq!(
            modalias(0x15e7),
            "pci:v00001002d000015E7sv00001002sd00001636bc03sc00i00"
        );
    }
}
