//! Render system and its builder.

use physeng_core::{ApplicationInfo, ENGINE_NAME, ENGINE_VERSION};
use physeng_gpu::{
    select, select_from, Device, DeviceCandidate, Instance, QueueAllocation, QueuePurpose,
    Result, SelectionCriteria,
};

/// Builder for creating a [`RenderSystem`].
#[derive(Debug, Clone)]
pub struct RenderSystemBuilder {
    app_info: Option<ApplicationInfo>,
    enable_validation: bool,
    criteria: SelectionCriteria,
}

impl Default for RenderSystemBuilder {
    fn default() -> Self {
        Self {
            app_info: None,
            enable_validation: cfg!(debug_assertions),
            criteria: SelectionCriteria::default(),
        }
    }
}

impl RenderSystemBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the application info forwarded to the driver.
    ///
    /// Defaults to the engine name and version.
    pub fn app_info(mut self, app_info: ApplicationInfo) -> Self {
        self.app_info = Some(app_info);
        self
    }

    /// Enable or disable validation layers.
    pub const fn validation(mut self, enable: bool) -> Self {
        self.enable_validation = enable;
        self
    }

    /// Set the physical device selection criteria.
    pub const fn criteria(mut self, criteria: SelectionCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    /// Whether validation will be requested.
    pub const fn validation_enabled(&self) -> bool {
        self.enable_validation
    }

    /// The selection criteria that will be used.
    pub const fn selection_criteria(&self) -> &SelectionCriteria {
        &self.criteria
    }

    /// Build the render system.
    pub fn build(self) -> Result<RenderSystem> {
        let app_info = match self.app_info {
            Some(app_info) => app_info,
            None => ApplicationInfo::new(ENGINE_NAME, ENGINE_VERSION)?,
        };

        let instance = Instance::new(&app_info, self.enable_validation)?;

        let candidates = instance.enumerate_candidates()?;
        let gpu = select(candidates, &self.criteria)?;
        tracing::info!("Using gpu \"{}\"", gpu.name);
        tracing::debug!("{}", gpu.summary());

        let target = self.criteria.target_version();
        if gpu.api_version < target {
            tracing::warn!(
                "\"{}\" supports Vulkan {}, below the desired {}",
                gpu.name,
                gpu.api_version,
                target
            );
        }

        let allocation = select_from(&gpu.queue_families, self.criteria.queues);
        let missing = allocation.shortfall(&self.criteria.queues);
        for purpose in QueuePurpose::ALL {
            let count = missing.count(purpose);
            if count > 0 {
                tracing::warn!(
                    "\"{}\" is missing {} of the requested {} {} queues",
                    gpu.name,
                    count,
                    self.criteria.queues.count(purpose),
                    purpose
                );
            }
        }

        let device = Device::new(&instance, &gpu, &allocation)?;

        Ok(RenderSystem {
            device,
            gpu,
            allocation,
            frame_count: 0,
            elapsed: 0.0,
            instance,
        })
    }
}

/// The engine's GPU state: instance, selected device and its queues.
pub struct RenderSystem {
    // Dropped before the instance.
    device: Device,
    gpu: DeviceCandidate,
    allocation: QueueAllocation,
    frame_count: u64,
    elapsed: f64,
    instance: Instance,
}

impl RenderSystem {
    /// The logical device.
    pub const fn device(&self) -> &Device {
        &self.device
    }

    /// The selected physical device.
    pub const fn gpu(&self) -> &DeviceCandidate {
        &self.gpu
    }

    /// Queues allocated on the selected device.
    pub const fn allocation(&self) -> &QueueAllocation {
        &self.allocation
    }

    /// The Vulkan instance.
    pub const fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Number of updates so far.
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Total time passed to [`Self::update`], in seconds.
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Advance one frame.
    pub fn update(&mut self, dt: f32) {
        self.frame_count += 1;
        self.elapsed += f64::from(dt);
        tracing::trace!(frame = self.frame_count, dt, "Render system update");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use physeng_core::SemanticVersion;
    use physeng_gpu::{DeviceType, QueueRequest};

    #[test]
    fn builder_defaults() {
        let builder = RenderSystemBuilder::new();
        assert!(builder.app_info.is_none());
        assert_eq!(builder.validation_enabled(), cfg!(debug_assertions));
        assert_eq!(*builder.selection_criteria(), SelectionCriteria::default());
    }

    #[test]
    fn builder_setters() {
        let app_info = ApplicationInfo::new("sph", SemanticVersion::new(1, 2, 3)).unwrap();
        let criteria = SelectionCriteria::new()
            .with_preferred_device_type(DeviceType::Integrated)
            .with_queues(QueueRequest::NONE.with_compute_queues(2));

        let builder = RenderSystemBuilder::new()
            .app_info(app_info.clone())
            .validation(false)
            .criteria(criteria);

        assert_eq!(builder.app_info, Some(app_info));
        assert!(!builder.validation_enabled());
        assert_eq!(builder.selection_criteria().queues.compute, 2);
        assert_eq!(
            builder.selection_criteria().preferred_device_type,
            DeviceType::Integrated
        );
    }

    #[test]
    #[ignore = "requires a Vulkan driver"]
    fn build_and_update() {
        let mut system = RenderSystemBuilder::new()
            .validation(false)
            .criteria(SelectionCriteria::new().allow_any_device_type(true))
            .build()
            .unwrap();

        assert!(!system.allocation().is_empty());
        assert_eq!(
            system.device().all_queues().len() as u32,
            system.allocation().total()
        );

        system.update(0.5);
        system.update(0.5);
        assert_eq!(system.frame_count(), 2);
        assert!((system.elapsed() - 1.0).abs() < f64::EPSILON);
    }
}
