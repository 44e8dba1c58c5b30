//! GPU error types.

use ash::vk;
use physeng_core::SemanticVersion;
use thiserror::Error;

/// Reasons physical device selection can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// The candidate list was empty.
    #[error("No physical devices found")]
    NoDevicesFound,

    /// Every candidate was rejected by the selection criteria.
    #[error("No suitable physical device found: {0}")]
    NoSuitableDeviceFound(String),
}

/// GPU-related errors.
#[derive(Error, Debug)]
pub enum GpuError {
    /// Vulkan error.
    #[error("Vulkan error: {0}")]
    Vulkan(#[from] vk::Result),

    /// The Vulkan loader could not be loaded.
    #[error("Failed to load Vulkan: {0}")]
    Loading(String),

    /// The installed Vulkan implementation is too old.
    #[error(
        "The most recent Vulkan version found is {found}, but the minimum required version is \
         {required}. Please upgrade Vulkan to a newer version."
    )]
    VersionTooLow {
        found: SemanticVersion,
        required: SemanticVersion,
    },

    /// Physical device selection failed.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Error from the core crate.
    #[error(transparent)]
    Core(#[from] physeng_core::Error),

    /// Invalid state.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, GpuError>;
