//! Queue family data model.

use std::collections::BTreeMap;
use std::fmt;

use ash::vk;

/// What a created queue will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueuePurpose {
    Graphics,
    Compute,
    Transfer,
}

impl QueuePurpose {
    /// Every purpose the selector tracks.
    pub const ALL: [Self; 3] = [Self::Graphics, Self::Compute, Self::Transfer];

    /// The capability bit a family needs to serve this purpose.
    #[inline]
    pub const fn flag(self) -> vk::QueueFlags {
        match self {
            Self::Graphics => vk::QueueFlags::GRAPHICS,
            Self::Compute => vk::QueueFlags::COMPUTE,
            Self::Transfer => vk::QueueFlags::TRANSFER,
        }
    }
}

impl fmt::Display for QueuePurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Graphics => f.write_str("graphics"),
            Self::Compute => f.write_str("compute"),
            Self::Transfer => f.write_str("transfer"),
        }
    }
}

/// Driver-reported description of one queue family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyDescriptor {
    /// Position of the family in the device's family array.
    pub index: u32,
    /// Operations supported by queues of this family.
    pub flags: vk::QueueFlags,
    /// Maximum number of queues that can be created from this family.
    pub queue_count: u32,
}

impl QueueFamilyDescriptor {
    /// Create a descriptor.
    #[inline]
    pub const fn new(index: u32, flags: vk::QueueFlags, queue_count: u32) -> Self {
        Self {
            index,
            flags,
            queue_count,
        }
    }

    /// Build descriptors from the array returned by
    /// `vkGetPhysicalDeviceQueueFamilyProperties`.
    pub fn from_properties(properties: &[vk::QueueFamilyProperties]) -> Vec<Self> {
        properties
            .iter()
            .enumerate()
            .map(|(index, props)| Self::new(index as u32, props.queue_flags, props.queue_count))
            .collect()
    }

    /// Whether this family advertises the capability for `purpose`.
    #[inline]
    pub fn supports(&self, purpose: QueuePurpose) -> bool {
        self.flags.contains(purpose.flag())
    }
}

/// How many queues of each purpose the caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueRequest {
    pub graphics: u32,
    pub compute: u32,
    pub transfer: u32,
}

impl Default for QueueRequest {
    /// One graphics and one transfer queue, no compute queue.
    fn default() -> Self {
        Self {
            graphics: 1,
            compute: 0,
            transfer: 1,
        }
    }
}

impl QueueRequest {
    /// A request for no queues at all.
    pub const NONE: Self = Self {
        graphics: 0,
        compute: 0,
        transfer: 0,
    };

    /// Create a request with the default counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of graphics queues.
    pub const fn with_graphics_queues(mut self, count: u32) -> Self {
        self.graphics = count;
        self
    }

    /// Set the number of compute queues.
    pub const fn with_compute_queues(mut self, count: u32) -> Self {
        self.compute = count;
        self
    }

    /// Set the number of transfer queues.
    pub const fn with_transfer_queues(mut self, count: u32) -> Self {
        self.transfer = count;
        self
    }

    /// Set the count for `purpose`.
    pub const fn with_count(mut self, purpose: QueuePurpose, count: u32) -> Self {
        match purpose {
            QueuePurpose::Graphics => self.graphics = count,
            QueuePurpose::Compute => self.compute = count,
            QueuePurpose::Transfer => self.transfer = count,
        }
        self
    }

    /// Requested count for `purpose`.
    #[inline]
    pub const fn count(&self, purpose: QueuePurpose) -> u32 {
        match purpose {
            QueuePurpose::Graphics => self.graphics,
            QueuePurpose::Compute => self.compute,
            QueuePurpose::Transfer => self.transfer,
        }
    }

    /// Sum of all requested queues.
    pub const fn total(&self) -> u32 {
        self.graphics
            .saturating_add(self.compute)
            .saturating_add(self.transfer)
    }
}

/// Result of queue selection: the purposes assigned to each family.
///
/// Position `i` in a family's list is the purpose of queue `i` of that family.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueAllocation {
    families: BTreeMap<u32, Vec<QueuePurpose>>,
}

impl QueueAllocation {
    /// Create an empty allocation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `count` queues of `purpose` to family `index`.
    pub(crate) fn assign(&mut self, index: u32, purpose: QueuePurpose, count: u32) {
        if count == 0 {
            return;
        }

        self.families
            .entry(index)
            .or_default()
            .extend(std::iter::repeat(purpose).take(count as usize));
    }

    /// Number of queues already assigned in family `index`.
    #[inline]
    pub fn assigned_in(&self, index: u32) -> u32 {
        self.families.get(&index).map_or(0, |queues| queues.len() as u32)
    }

    /// True if no queue was allocated.
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Number of families with at least one queue.
    pub fn family_count(&self) -> usize {
        self.families.len()
    }

    /// Purposes assigned to family `index`, if any.
    pub fn family(&self, index: u32) -> Option<&[QueuePurpose]> {
        self.families.get(&index).map(Vec::as_slice)
    }

    /// Iterate families in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[QueuePurpose])> {
        self.families
            .iter()
            .map(|(&index, queues)| (index, queues.as_slice()))
    }

    /// `(family index, queue index)` of every queue allocated for `purpose`.
    pub fn queues(&self, purpose: QueuePurpose) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.iter().flat_map(move |(family, queues)| {
            queues
                .iter()
                .enumerate()
                .filter(move |(_, &p)| p == purpose)
                .map(move |(queue, _)| (family, queue as u32))
        })
    }

    /// Number of queues allocated for `purpose`.
    pub fn count(&self, purpose: QueuePurpose) -> u32 {
        self.families
            .values()
            .flatten()
            .filter(|&&p| p == purpose)
            .count() as u32
    }

    /// Number of queues allocated across all purposes.
    pub fn total(&self) -> u32 {
        self.families.values().map(|queues| queues.len() as u32).sum()
    }

    /// The part of `request` this allocation does not cover.
    pub fn shortfall(&self, request: &QueueRequest) -> QueueRequest {
        QueueRequest {
            graphics: request.graphics.saturating_sub(self.count(QueuePurpose::Graphics)),
            compute: request.compute.saturating_sub(self.count(QueuePurpose::Compute)),
            transfer: request.transfer.saturating_sub(self.count(QueuePurpose::Transfer)),
        }
    }

    /// True if every requested queue was allocated.
    pub fn satisfies(&self, request: &QueueRequest) -> bool {
        self.shortfall(request) == QueueRequest::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request() {
        let request = QueueRequest::default();
        assert_eq!(request.graphics, 1);
        assert_eq!(request.compute, 0);
        assert_eq!(request.transfer, 1);
        assert_eq!(request.total(), 2);
    }

    #[test]
    fn request_builder() {
        let request = QueueRequest::new()
            .with_graphics_queues(2)
            .with_compute_queues(3)
            .with_transfer_queues(0);
        assert_eq!(request.count(QueuePurpose::Graphics), 2);
        assert_eq!(request.count(QueuePurpose::Compute), 3);
        assert_eq!(request.count(QueuePurpose::Transfer), 0);
    }

    #[test]
    fn descriptors_from_properties_use_array_position() {
        let properties = [
            vk::QueueFamilyProperties::default()
                .queue_flags(vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE)
                .queue_count(16),
            vk::QueueFamilyProperties::default()
                .queue_flags(vk::QueueFlags::TRANSFER)
                .queue_count(2),
        ];

        let families = QueueFamilyDescriptor::from_properties(&properties);
        assert_eq!(families.len(), 2);
        assert_eq!(families[0].index, 0);
        assert_eq!(families[0].queue_count, 16);
        assert!(families[0].supports(QueuePurpose::Graphics));
        assert!(families[0].supports(QueuePurpose::Compute));
        assert!(!families[0].supports(QueuePurpose::Transfer));
        assert_eq!(families[1].index, 1);
        assert!(families[1].supports(QueuePurpose::Transfer));
    }

    #[test]
    fn assign_appends() {
        let mut allocation = QueueAllocation::new();
        allocation.assign(3, QueuePurpose::Compute, 1);
        allocation.assign(3, QueuePurpose::Transfer, 2);
        allocation.assign(1, QueuePurpose::Graphics, 0);

        assert_eq!(
            allocation.family(3),
            Some(
                [
                    QueuePurpose::Compute,
                    QueuePurpose::Transfer,
                    QueuePurpose::Transfer
                ]
                .as_slice()
            )
        );
        assert_eq!(allocation.family(1), None);
        assert_eq!(allocation.assigned_in(3), 3);
        assert_eq!(allocation.family_count(), 1);
    }

    #[test]
    fn counts_and_shortfall() {
        let mut allocation = QueueAllocation::new();
        allocation.assign(0, QueuePurpose::Graphics, 1);
        allocation.assign(0, QueuePurpose::Transfer, 1);
        allocation.assign(2, QueuePurpose::Transfer, 1);

        assert_eq!(allocation.count(QueuePurpose::Graphics), 1);
        assert_eq!(allocation.count(QueuePurpose::Compute), 0);
        assert_eq!(allocation.count(QueuePurpose::Transfer), 2);
        assert_eq!(allocation.total(), 3);

        let request = QueueRequest::new().with_compute_queues(2);
        let missing = allocation.shortfall(&request);
        assert_eq!(missing, QueueRequest::NONE.with_compute_queues(2));
        assert!(!allocation.satisfies(&request));
        assert!(allocation.satisfies(&QueueRequest::default()));
    }

    #[test]
    fn queue_positions_per_purpose() {
        let mut allocation = QueueAllocation::new();
        allocation.assign(2, QueuePurpose::Transfer, 1);
        allocation.assign(0, QueuePurpose::Graphics, 1);
        allocation.assign(0, QueuePurpose::Transfer, 1);

        let transfer: Vec<_> = allocation.queues(QueuePurpose::Transfer).collect();
        assert_eq!(transfer, vec![(0, 1), (2, 0)]);

        let graphics: Vec<_> = allocation.queues(QueuePurpose::Graphics).collect();
        assert_eq!(graphics, vec![(0, 0)]);
    }
}
