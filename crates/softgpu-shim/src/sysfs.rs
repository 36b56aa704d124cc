// SPDX-License-Identifier: AGPL-3.0-only

//! Synthetic sysfs descriptor text.
//!
//! Device enumerators read a handful of sysfs files under the device's
//! bus directory before they ever open the node. The interception layer
//! overrides those paths once at initialization with text rendered
//! here from the active profile's identity fields. Every file ends
//! with a newline, as the kernel's do.

use softgpu_chip::pcie;
use softgpu_chip::profiles::DeviceProfile;

/// The `uevent` block for the emulated device.
#[must_use]
pub fn uevent_text(profile: &DeviceProfile) -> String {
    format!(
        "DRIVER={}\n\
         PCI_CLASS={:X}\n\
         PCI_ID={:04X}:{:04X}\n\
         PCI_SUBSYS_ID={:04X}:{:04X}\n\
         PCI_SLOT_NAME={}\n\
         MODALIAS={}\n",
        pcie::DRIVER_NAME,
        pcie::PCI_CLASS_DISPLAY,
        pcie::AMD_VENDOR_ID,
        profile.dev.device_id,
        pcie::SUBSYS_VENDOR_ID,
        pcie::SUBSYS_DEVICE_ID,
        pcie::PCI_SLOT_NAME,
        pcie::modalias(profile.dev.device_id),
    )
}

/// One identity attribute file, by sysfs file name.
///
/// Returns `None` for attributes the emulator does not synthesize.
#[must_use]
pub fn attribute_text(profile: &DeviceProfile, attribute: &str) -> Option<String> {
    let text = match attribute {
        "vendor" => format!("{:#06x}\n", pcie::AMD_VENDOR_ID),
        "device" => format!("{:#06x}\n", profile.dev.device_id),
        "revision" => format!("{:#04x}\n", profile.dev.pci_rev),
        "subsystem_vendor" => format!("{:#06x}\n", pcie::SUBSYS_VENDOR_ID),
        "subsystem_device" => format!("{:#06x}\n", pcie::SUBSYS_DEVICE_ID),
        _ => return None,
    };
    Some(text)
}
