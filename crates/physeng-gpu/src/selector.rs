//! Physical device selection.
//!
//! Every candidate gets a rating made of a device type grade and the number of
//! requested queues it can provide. The best rated suitable candidate wins;
//! ties go to the candidate listed first.

use physeng_core::SemanticVersion;
use tracing::debug;

use crate::candidate::{DeviceCandidate, DeviceType};
use crate::error::SelectionError;
use crate::queue::{QueueFamilyDescriptor, QueueRequest};
use crate::queue_selector::select_from;
use crate::version::MINIMUM_VULKAN_VERSION;

const PREFERRED_TYPE_GRADE: i64 = 100;
const DISCRETE_GPU_GRADE: i64 = 80;
const INTEGRATED_GPU_GRADE: i64 = 50;
const VIRTUAL_GPU_GRADE: i64 = 25;
const REJECTION_GRADE: i64 = 0;

/// What to look for when selecting a physical device.
///
/// By default the selector wants a discrete GPU supporting Vulkan 1.3 with one
/// graphics and one transfer queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionCriteria {
    /// Device type that gets the top grade.
    pub preferred_device_type: DeviceType,
    /// Whether other device types are graded by kind instead of rejected.
    pub allow_any_device_type: bool,
    /// Devices below this version are never selected.
    pub minimum_version: SemanticVersion,
    /// Version to target when the device supports it.
    pub desired_version: SemanticVersion,
    /// Queues to request from the selected device.
    pub queues: QueueRequest,
}

impl Default for SelectionCriteria {
    fn default() -> Self {
        Self {
            preferred_device_type: DeviceType::Discrete,
            allow_any_device_type: false,
            minimum_version: MINIMUM_VULKAN_VERSION,
            desired_version: MINIMUM_VULKAN_VERSION,
            queues: QueueRequest::default(),
        }
    }
}

impl SelectionCriteria {
    /// Create criteria with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the preferred device type.
    pub const fn with_preferred_device_type(mut self, device_type: DeviceType) -> Self {
        self.preferred_device_type = device_type;
        self
    }

    /// Grade non-preferred device types instead of rejecting them.
    pub const fn allow_any_device_type(mut self, allow: bool) -> Self {
        self.allow_any_device_type = allow;
        self
    }

    /// Set the minimum Vulkan version.
    pub const fn with_minimum_vulkan_version(mut self, version: SemanticVersion) -> Self {
        self.minimum_version = version;
        self
    }

    /// Set the desired Vulkan version.
    pub const fn with_desired_vulkan_version(mut self, version: SemanticVersion) -> Self {
        self.desired_version = version;
        self
    }

    /// Set all queue counts at once.
    pub const fn with_queues(mut self, queues: QueueRequest) -> Self {
        self.queues = queues;
        self
    }

    /// Set the number of graphics queues.
    pub const fn with_graphics_queues(mut self, count: u32) -> Self {
        self.queues = self.queues.with_graphics_queues(count);
        self
    }

    /// Set the number of compute queues.
    pub const fn with_compute_queues(mut self, count: u32) -> Self {
        self.queues = self.queues.with_compute_queues(count);
        self
    }

    /// Set the number of transfer queues.
    pub const fn with_transfer_queues(mut self, count: u32) -> Self {
        self.queues = self.queues.with_transfer_queues(count);
        self
    }

    /// The version to request from the driver.
    ///
    /// A desired version lower than the minimum is ignored.
    pub fn target_version(&self) -> SemanticVersion {
        self.desired_version.max(self.minimum_version)
    }

    /// Grade a device type.
    pub fn rate_device_type(&self, device_type: DeviceType) -> i64 {
        if device_type == self.preferred_device_type {
            return PREFERRED_TYPE_GRADE;
        }

        if !self.allow_any_device_type {
            return REJECTION_GRADE;
        }

        match device_type {
            DeviceType::Discrete => DISCRETE_GPU_GRADE,
            DeviceType::Integrated => INTEGRATED_GPU_GRADE,
            DeviceType::Virtual => VIRTUAL_GPU_GRADE,
            DeviceType::Other => REJECTION_GRADE,
        }
    }

    /// Number of requested queues a device with these families can provide.
    pub fn rate_device_queues(&self, queue_families: &[QueueFamilyDescriptor]) -> i64 {
        i64::from(select_from(queue_families, self.queues).total())
    }

    /// Rate a candidate.
    pub fn rate_device(&self, candidate: &DeviceCandidate) -> DeviceRating {
        DeviceRating {
            type_score: self.rate_device_type(candidate.device_type),
            queue_score: self.rate_device_queues(&candidate.queue_families),
        }
    }
}

/// A candidate's score under some [`SelectionCriteria`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceRating {
    /// Device type grade.
    pub type_score: i64,
    /// Number of requested queues the device can provide.
    pub queue_score: i64,
}

impl DeviceRating {
    /// Combined score used for comparison.
    #[inline]
    pub const fn total(&self) -> i64 {
        self.type_score + self.queue_score
    }

    /// A device is only selected with a positive score.
    #[inline]
    pub const fn is_suitable(&self) -> bool {
        self.total() > REJECTION_GRADE
    }
}

/// Picks the best physical device for a set of criteria.
///
/// ```
/// use ash::vk;
/// use physeng_gpu::{DeviceCandidate, DeviceType, PhysicalDeviceSelector, QueueFamilyDescriptor, SelectionCriteria};
/// use physeng_core::SemanticVersion;
///
/// let gpu = DeviceCandidate::new(vk::PhysicalDevice::null(), "GPU", DeviceType::Integrated)
///     .with_api_version(SemanticVersion::new(1, 3, 0))
///     .with_queue_families(vec![QueueFamilyDescriptor::new(
///         0,
///         vk::QueueFlags::GRAPHICS | vk::QueueFlags::TRANSFER,
///         2,
///     )]);
///
/// let criteria = SelectionCriteria::new().allow_any_device_type(true);
/// let selected = PhysicalDeviceSelector::new(criteria).select(vec![gpu]).unwrap();
/// assert_eq!(selected.name, "GPU");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PhysicalDeviceSelector {
    criteria: SelectionCriteria,
}

impl PhysicalDeviceSelector {
    /// Create a selector.
    pub const fn new(criteria: SelectionCriteria) -> Self {
        Self { criteria }
    }

    /// The criteria used for selection.
    pub const fn criteria(&self) -> &SelectionCriteria {
        &self.criteria
    }

    /// Select the best candidate.
    ///
    /// A candidate is suitable when it supports at least the minimum Vulkan
    /// version and its rating is positive. Among suitable candidates the
    /// highest rating wins, the first one listed on a tie.
    pub fn select(
        &self,
        mut candidates: Vec<DeviceCandidate>,
    ) -> Result<DeviceCandidate, SelectionError> {
        if candidates.is_empty() {
            return Err(SelectionError::NoDevicesFound);
        }

        let minimum_version = self.criteria.minimum_version;
        let mut best: Option<(usize, i64)> = None;
        let mut rejections = Vec::new();

        for (position, candidate) in candidates.iter().enumerate() {
            if candidate.api_version < minimum_version {
                debug!(
                    "The physical device \"{}\" only supports Vulkan {}, {} is required",
                    candidate.name, candidate.api_version, minimum_version
                );
                rejections.push(format!(
                    "\"{}\" supports Vulkan {} < {}",
                    candidate.name, candidate.api_version, minimum_version
                ));
                continue;
            }

            let rating = self.criteria.rate_device(candidate);
            debug!(
                type_score = rating.type_score,
                queue_score = rating.queue_score,
                "The physical device \"{}\" was given a rating of {}",
                candidate.name,
                rating.total()
            );

            if !rating.is_suitable() {
                rejections.push(format!(
                    "\"{}\" ({}) was rated {}",
                    candidate.name,
                    candidate.device_type,
                    rating.total()
                ));
                continue;
            }

            if best.map_or(true, |(_, score)| rating.total() > score) {
                best = Some((position, rating.total()));
            }
        }

        match best {
            Some((position, _)) => Ok(candidates.swap_remove(position)),
            None => Err(SelectionError::NoSuitableDeviceFound(rejections.join("; "))),
        }
    }
}

/// Select the best candidate for `criteria`.
///
/// Shorthand for `PhysicalDeviceSelector::new(*criteria).select(candidates)`.
pub fn select(
    candidates: Vec<DeviceCandidate>,
    criteria: &SelectionCriteria,
) -> Result<DeviceCandidate, SelectionError> {
    PhysicalDeviceSelector::new(*criteria).select(candidates)
}
