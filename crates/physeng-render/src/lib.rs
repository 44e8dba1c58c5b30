//! Render system bring-up for the physeng engine.
//!
//! [`RenderSystemBuilder`] ties the GPU layer together: it creates the Vulkan
//! instance, picks a physical device and its queues, and creates the logical
//! device. Selection failures come back as errors for the caller to handle.
//!
//! ```no_run
//! use physeng_render::RenderSystemBuilder;
//!
//! let mut system = RenderSystemBuilder::new().validation(false).build()?;
//! system.update(1.0 / 60.0);
//! # Ok::<(), physeng_gpu::GpuError>(())
//! ```

mod system;

pub use system::{RenderSystem, RenderSystemBuilder};

// Re-export commonly used types for convenience
pub use physeng_core::{ApplicationInfo, SemanticVersion};
pub use physeng_gpu::{
    DeviceCandidate, DeviceType, GpuError, QueuePurpose, QueueRequest, SelectionCriteria,
};
