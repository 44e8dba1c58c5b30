//! Logical device creation from a queue allocation.

use ash::vk;

use crate::candidate::DeviceCandidate;
use crate::error::{GpuError, Result};
use crate::instance::Instance;
use crate::queue::{QueueAllocation, QueuePurpose};

/// Priority given to every created queue.
pub const QUEUE_PRIORITY: f32 = 1.0;

/// A queue retrieved from the logical device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Queue {
    pub handle: vk::Queue,
    pub purpose: QueuePurpose,
    pub family_index: u32,
    pub queue_index: u32,
}

/// Per-family queue priorities for `vkCreateDevice`, in ascending family order.
///
/// Families without allocated queues are left out.
pub fn queue_create_layout(allocation: &QueueAllocation) -> Vec<(u32, Vec<f32>)> {
    allocation
        .iter()
        .filter(|(_, queues)| !queues.is_empty())
        .map(|(family, queues)| (family, vec![QUEUE_PRIORITY; queues.len()]))
        .collect()
}

/// Logical device plus the queues created for it.
pub struct Device {
    device: ash::Device,
    physical_device: vk::PhysicalDevice,
    queues: Vec<Queue>,
}

impl Device {
    /// Create a logical device on `candidate` with the queues in `allocation`.
    ///
    /// Every feature the device supports is enabled.
    pub fn new(
        instance: &Instance,
        candidate: &DeviceCandidate,
        allocation: &QueueAllocation,
    ) -> Result<Self> {
        if allocation.is_empty() {
            return Err(GpuError::InvalidState(format!(
                "no queues allocated on \"{}\"",
                candidate.name
            )));
        }

        let layout = queue_create_layout(allocation);
        let queue_create_infos: Vec<vk::DeviceQueueCreateInfo> = layout
            .iter()
            .map(|(family, priorities)| {
                vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(*family)
                    .queue_priorities(priorities)
            })
            .collect();

        let raw_instance = instance.raw();
        let features = unsafe { raw_instance.get_physical_device_features(candidate.handle) };

        let create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos)
            .enabled_features(&features);

        let device = unsafe { raw_instance.create_device(candidate.handle, &create_info, None) }?;
        tracing::info!("Vulkan device created");

        let queues: Vec<Queue> = allocation
            .iter()
            .flat_map(|(family, purposes)| {
                purposes
                    .iter()
                    .enumerate()
                    .map(move |(queue, &purpose)| (family, queue as u32, purpose))
            })
            .map(|(family_index, queue_index, purpose)| Queue {
                handle: unsafe { device.get_device_queue(family_index, queue_index) },
                purpose,
                family_index,
                queue_index,
            })
            .collect();

        tracing::info!(
            "Created {} graphics, {} compute and {} transfer queues",
            allocation.count(QueuePurpose::Graphics),
            allocation.count(QueuePurpose::Compute),
            allocation.count(QueuePurpose::Transfer),
        );

        Ok(Self {
            device,
            physical_device: candidate.handle,
            queues,
        })
    }

    /// Get the device handle.
    pub fn raw(&self) -> &ash::Device {
        &self.device
    }

    /// Physical device the logical device was created on.
    pub const fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    /// All created queues.
    pub fn all_queues(&self) -> &[Queue] {
        &self.queues
    }

    /// Queues created for `purpose`, in family then queue order.
    pub fn queues(&self, purpose: QueuePurpose) -> impl Iterator<Item = &Queue> {
        self.queues.iter().filter(move |q| q.purpose == purpose)
    }

    /// Wait for the device to become idle.
    pub fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.device.device_wait_idle()?;
        }
        Ok(())
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        unsafe {
            let _ = self.device.device_wait_idle();
            self.device.destroy_device(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::{QueueFamilyDescriptor, QueueRequest};
    use crate::queue_selector::select_from;

    #[test]
    fn layout_of_empty_allocation() {
        assert!(queue_create_layout(&QueueAllocation::new()).is_empty());
    }

    #[test]
    fn layout_has_one_priority_per_queue() {
        let families = [
            QueueFamilyDescriptor::new(
                0,
                vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER,
                16,
            ),
            QueueFamilyDescriptor::new(1, vk::QueueFlags::TRANSFER, 2),
            QueueFamilyDescriptor::new(2, vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER, 8),
        ];
        let request = QueueRequest::new()
            .with_graphics_queues(2)
            .with_compute_queues(1)
            .with_transfer_queues(1);

        let allocation = select_from(&families, request);
        let layout = queue_create_layout(&allocation);

        let total: usize = layout.iter().map(|(_, p)| p.len()).sum();
        assert_eq!(total as u32, allocation.total());
        assert!(layout.windows(2).all(|w| w[0].0 < w[1].0));
        for (family, priorities) in &layout {
            assert_eq!(priorities.len() as u32, allocation.assigned_in(*family));
            assert!(priorities.iter().all(|&p| (p - QUEUE_PRIORITY).abs() < f32::EPSILON));
        }
    }

    #[test]
    fn layout_for_shared_family() {
        let families = [QueueFamilyDescriptor::new(
            0,
            vk::QueueFlags::GRAPHICS | vk::QueueFlags::TRANSFER,
            4,
        )];
        let allocation = select_from(&families, QueueRequest::default());

        assert_eq!(queue_create_layout(&allocation), vec![(0, vec![1.0, 1.0])]);
    }
}
