//! GPU vendor identification.

use serde::{Deserialize, Serialize};

/// PCI vendor id reported by the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct VendorId(pub u32);

impl VendorId {
    /// Raw id value.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// GPU vendors we know how to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceVendor {
    Amd,
    Arm,
    Intel,
    Nvidia,
    Qualcomm,
}

impl DeviceVendor {
    /// Identify vendor from PCI vendor ID.
    pub const fn from_id(id: VendorId) -> Option<Self> {
        match id.0 {
            0x1002 => Some(Self::Amd),
            0x13B5 => Some(Self::Arm),
            0x8086 => Some(Self::Intel),
            0x10DE => Some(Self::Nvidia),
            0x5143 => Some(Self::Qualcomm),
            _ => None,
        }
    }

    /// The vendor's PCI id.
    pub const fn id(self) -> VendorId {
        match self {
            Self::Amd => VendorId(0x1002),
            Self::Arm => VendorId(0x13B5),
            Self::Intel => VendorId(0x8086),
            Self::Nvidia => VendorId(0x10DE),
            Self::Qualcomm => VendorId(0x5143),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_identification() {
        assert_eq!(DeviceVendor::from_id(VendorId(0x10DE)), Some(DeviceVendor::Nvidia));
        assert_eq!(DeviceVendor::from_id(VendorId(0x1002)), Some(DeviceVendor::Amd));
        assert_eq!(DeviceVendor::from_id(VendorId(0x8086)), Some(DeviceVendor::Intel));
        assert_eq!(DeviceVendor::from_id(VendorId(0x13B5)), Some(DeviceVendor::Arm));
        assert_eq!(DeviceVendor::from_id(VendorId(0x5143)), Some(DeviceVendor::Qualcomm));
    }

    #[test]
    fn unknown_vendor() {
        assert_eq!(DeviceVendor::from_id(VendorId(0x106B)), None);
        assert_eq!(DeviceVendor::from_id(VendorId(0)), None);
    }

    #[test]
    fn id_matches_from_id() {
        for vendor in [
            DeviceVendor::Amd,
            DeviceVendor::Arm,
            DeviceVendor::Intel,
            DeviceVendor::Nvidia,
            DeviceVendor::Qualcomm,
        ] {
            assert_eq!(DeviceVendor::from_id(vendor.id()), Some(vendor));
        }
    }
}
