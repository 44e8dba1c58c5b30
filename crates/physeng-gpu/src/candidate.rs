//! Physical device snapshots.

use std::ffi::CStr;
use std::fmt;

use ash::vk;
use physeng_core::{DeviceVendor, SemanticVersion, VendorId};

use crate::queue::QueueFamilyDescriptor;
use crate::version::from_vulkan_version;

/// Coarse GPU classification used as a selection signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    Discrete,
    Integrated,
    Virtual,
    Other,
}

impl DeviceType {
    /// Classify a Vulkan device type. CPU implementations count as `Other`.
    pub fn from_vulkan(device_type: vk::PhysicalDeviceType) -> Self {
        match device_type {
            vk::PhysicalDeviceType::DISCRETE_GPU => Self::Discrete,
            vk::PhysicalDeviceType::INTEGRATED_GPU => Self::Integrated,
            vk::PhysicalDeviceType::VIRTUAL_GPU => Self::Virtual,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discrete => f.write_str("discrete"),
            Self::Integrated => f.write_str("integrated"),
            Self::Virtual => f.write_str("virtual"),
            Self::Other => f.write_str("other"),
        }
    }
}

/// A physical device and the properties selection looks at.
///
/// The handle belongs to the driver and is never destroyed by us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCandidate {
    /// Driver handle
    pub handle: vk::PhysicalDevice,
    /// Device name
    pub name: String,
    /// Device type
    pub device_type: DeviceType,
    /// PCI vendor id
    pub vendor: VendorId,
    /// Highest Vulkan version the device supports
    pub api_version: SemanticVersion,
    /// Queue families, in driver order
    pub queue_families: Vec<QueueFamilyDescriptor>,
}

impl DeviceCandidate {
    /// Create a candidate without queue families.
    pub fn new(handle: vk::PhysicalDevice, name: impl Into<String>, device_type: DeviceType) -> Self {
        Self {
            handle,
            name: name.into(),
            device_type,
            vendor: VendorId(0),
            api_version: SemanticVersion::default(),
            queue_families: Vec::new(),
        }
    }

    /// Set the queue families.
    pub fn with_queue_families(mut self, queue_families: Vec<QueueFamilyDescriptor>) -> Self {
        self.queue_families = queue_families;
        self
    }

    /// Set the supported Vulkan version.
    pub const fn with_api_version(mut self, api_version: SemanticVersion) -> Self {
        self.api_version = api_version;
        self
    }

    /// Set the vendor id.
    pub const fn with_vendor(mut self, vendor: VendorId) -> Self {
        self.vendor = vendor;
        self
    }

    /// Known vendor, if any.
    pub const fn known_vendor(&self) -> Option<DeviceVendor> {
        DeviceVendor::from_id(self.vendor)
    }

    /// Query a snapshot of a physical device.
    ///
    /// # Safety
    /// The instance and physical device must be valid.
    pub unsafe fn query(instance: &ash::Instance, physical_device: vk::PhysicalDevice) -> Self {
        let properties = unsafe { instance.get_physical_device_properties(physical_device) };
        let queue_family_properties =
            unsafe { instance.get_physical_device_queue_family_properties(physical_device) };

        let name = unsafe { CStr::from_ptr(properties.device_name.as_ptr()) }
            .to_string_lossy()
            .into_owned();

        Self {
            handle: physical_device,
            name,
            device_type: DeviceType::from_vulkan(properties.device_type),
            vendor: VendorId(properties.vendor_id),
            api_version: from_vulkan_version(properties.api_version),
            queue_families: QueueFamilyDescriptor::from_properties(&queue_family_properties),
        }
    }

    /// Get a human-readable summary of the device.
    pub fn summary(&self) -> String {
        let vendor = self
            .known_vendor()
            .map_or_else(|| format!("{:#06x}", self.vendor.get()), |v| format!("{v:?}"));

        format!(
            "{} ({}, {}) - Vulkan {} - {} queue families",
            self.name,
            self.device_type,
            vendor,
            self.api_version,
            self.queue_families.len(),
        )
    }
}
