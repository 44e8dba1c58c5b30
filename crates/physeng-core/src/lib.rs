//! Core types for the physeng engine.
//!
//! This crate provides the foundational types used throughout the engine:
//! - Semantic versions for applications and the Vulkan API
//! - GPU vendor identification
//! - Application metadata
//! - Engine-wide error types
//!
//! Nothing in here talks to the graphics driver; see `physeng-gpu` for that.

pub mod app_info;
pub mod error;
pub mod vendor;
pub mod version;

pub use app_info::ApplicationInfo;
pub use error::{Error, Result};
pub use vendor::{DeviceVendor, VendorId};
pub use version::SemanticVersion;

/// Name reported to the driver as the engine name.
pub const ENGINE_NAME: &str = "physeng";

/// Version of the engine itself.
pub const ENGINE_VERSION: SemanticVersion = SemanticVersion::new(0, 1, 0);
