//! Vulkan layer for the physeng engine.
//!
//! This crate provides:
//! - Vulkan instance creation with optional validation and debug messaging
//! - Enumeration of physical devices into plain [`DeviceCandidate`] snapshots
//! - Queue family selection ([`select_from`])
//! - Physical device selection ([`select`])
//! - Logical device creation from a queue allocation
//!
//! The two selectors are pure functions over already enumerated data and never
//! call into the driver.

pub mod candidate;
pub mod device;
pub mod error;
pub mod instance;
pub mod queue;
pub mod queue_selector;
pub mod selector;
pub mod version;

pub use candidate::{DeviceCandidate, DeviceType};
pub use device::{Device, Queue};
pub use error::{GpuError, Result, SelectionError};
pub use instance::Instance;
pub use queue::{QueueAllocation, QueueFamilyDescriptor, QueuePurpose, QueueRequest};
pub use queue_selector::{select_from, QueueSelector};
pub use selector::{select, DeviceRating, PhysicalDeviceSelector, SelectionCriteria};
