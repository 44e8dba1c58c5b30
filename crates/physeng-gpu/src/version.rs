//! Conversions between [`SemanticVersion`] and Vulkan's packed version numbers.

use ash::vk;
use physeng_core::SemanticVersion;

/// Minimum Vulkan version the engine runs on.
pub const MINIMUM_VULKAN_VERSION: SemanticVersion = SemanticVersion::new(1, 3, 0);

/// Unpack a Vulkan version number. The variant bits are dropped.
#[inline]
pub fn from_vulkan_version(version: u32) -> SemanticVersion {
    SemanticVersion::new(
        vk::api_version_major(version),
        vk::api_version_minor(version),
        vk::api_version_patch(version),
    )
}

/// Pack a version the way Vulkan expects it.
#[inline]
pub fn to_vulkan_version(version: SemanticVersion) -> u32 {
    vk::make_api_version(0, version.major, version.minor, version.patch)
}
