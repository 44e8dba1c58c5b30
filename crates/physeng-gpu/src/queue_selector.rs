//! Queue family selection.
//!
//! Splits a device's queue families between graphics, compute and transfer
//! work. Families that only do one of the three are used first for compute
//! and transfer so those queues do not contend with graphics; everything else
//! falls back to whichever capable family still has free queues.

use tracing::debug;

use crate::queue::{QueueAllocation, QueueFamilyDescriptor, QueuePurpose, QueueRequest};

/// Which families a pass looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FamilyFilter {
    /// Families supporting the purpose and none of the other tracked purposes.
    Specialized,
    /// Every family supporting the purpose.
    Any,
}

#[derive(Debug, Clone, Copy)]
struct Pass {
    purpose: QueuePurpose,
    filter: FamilyFilter,
}

impl Pass {
    const fn new(purpose: QueuePurpose, filter: FamilyFilter) -> Self {
        Self { purpose, filter }
    }

    fn accepts(&self, family: &QueueFamilyDescriptor) -> bool {
        if !family.supports(self.purpose) {
            return false;
        }

        match self.filter {
            FamilyFilter::Any => true,
            FamilyFilter::Specialized => QueuePurpose::ALL
                .iter()
                .filter(|&&other| other != self.purpose)
                .all(|&other| !family.supports(other)),
        }
    }
}

/// Order in which demand is served. Each pass only sees what earlier passes left.
const PASSES: [Pass; 5] = [
    Pass::new(QueuePurpose::Compute, FamilyFilter::Specialized),
    Pass::new(QueuePurpose::Transfer, FamilyFilter::Specialized),
    Pass::new(QueuePurpose::Graphics, FamilyFilter::Any),
    Pass::new(QueuePurpose::Compute, FamilyFilter::Any),
    Pass::new(QueuePurpose::Transfer, FamilyFilter::Any),
];

/// Selects queues from a device's queue families.
///
/// Selection never fails. When the device cannot provide everything that was
/// requested the allocation simply holds fewer queues; compare it against the
/// request with [`QueueAllocation::shortfall`] if that matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueSelector {
    request: QueueRequest,
}

impl QueueSelector {
    /// Create a selector for `request`.
    pub const fn new(request: QueueRequest) -> Self {
        Self { request }
    }

    /// The request this selector serves.
    pub const fn request(&self) -> &QueueRequest {
        &self.request
    }

    /// Allocate queues from `queue_families`.
    pub fn select_from(&self, queue_families: &[QueueFamilyDescriptor]) -> QueueAllocation {
        let mut families: Vec<&QueueFamilyDescriptor> = queue_families.iter().collect();
        families.sort_by_key(|family| family.index);

        debug!(
            "Trying to find {} graphics queues, {} compute queues and {} transfer queues",
            self.request.graphics, self.request.compute, self.request.transfer
        );

        let mut allocation = QueueAllocation::new();
        let mut remaining = self.request;

        for pass in &PASSES {
            let wanted = remaining.count(pass.purpose);
            if wanted == 0 {
                continue;
            }

            let mut left = wanted;
            for family in families.iter().filter(|family| pass.accepts(family)) {
                if left == 0 {
                    break;
                }

                let available = family
                    .queue_count
                    .saturating_sub(allocation.assigned_in(family.index));
                let selected = left.min(available);

                allocation.assign(family.index, pass.purpose, selected);
                left -= selected;
            }

            debug!(
                purpose = %pass.purpose,
                specialized = pass.filter == FamilyFilter::Specialized,
                "Found {} of {} queues",
                wanted - left,
                wanted
            );

            remaining = remaining.with_count(pass.purpose, left);
        }

        if remaining != QueueRequest::NONE {
            debug!(
                "Missing {} graphics queues, {} compute queues and {} transfer queues",
                remaining.graphics, remaining.compute, remaining.transfer
            );
        }

        allocation
    }
}

/// Allocate queues for `request` from `queue_families`.
///
/// Shorthand for `QueueSelector::new(request).select_from(queue_families)`.
pub fn select_from(
    queue_families: &[QueueFamilyDescriptor],
    request: QueueRequest,
) -> QueueAllocation {
    QueueSelector::new(request).select_from(queue_families)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::QueueFlags;

    const G: QueueFlags = QueueFlags::GRAPHICS;
    const C: QueueFlags = QueueFlags::COMPUTE;
    const T: QueueFlags = QueueFlags::TRANSFER;
    const SB: QueueFlags = QueueFlags::SPARSE_BINDING;

    fn family(index: u32, flags: QueueFlags, queue_count: u32) -> QueueFamilyDescriptor {
        QueueFamilyDescriptor::new(index, flags, queue_count)
    }

    fn request(graphics: u32, compute: u32, transfer: u32) -> QueueRequest {
        QueueRequest {
            graphics,
            compute,
            transfer,
        }
    }

    /// Checks capacity, capability and request bounds.
    fn assert_valid(families: &[QueueFamilyDescriptor], req: QueueRequest, out: &QueueAllocation) {
        for (index, queues) in out.iter() {
            let capacity: u32 = families
                .iter()
                .filter(|f| f.index == index)
                .map(|f| f.queue_count)
                .max()
                .unwrap_or(0);
            assert!(queues.len() as u32 <= capacity, "family {index} over-allocated");

            for purpose in queues {
                assert!(
                    families
                        .iter()
                        .any(|f| f.index == index && f.supports(*purpose)),
                    "family {index} cannot do {purpose}"
                );
            }
        }

        for purpose in QueuePurpose::ALL {
            assert!(out.count(purpose) <= req.count(purpose));
        }
    }

    #[test]
    fn empty_families_give_empty_allocation() {
        let allocation = select_from(&[], QueueRequest::default());
        assert!(allocation.is_empty());

        let allocation = select_from(&[], request(4, 4, 4));
        assert!(allocation.is_empty());
    }

    #[test]
    fn empty_request_gives_empty_allocation() {
        let families = [family(0, G | C | T, 16)];
        assert!(select_from(&families, QueueRequest::NONE).is_empty());
    }

    #[test]
    fn shared_family_serves_graphics_and_transfer() {
        let families = [family(0, G | T, 2)];
        let allocation = select_from(&families, request(1, 0, 1));

        assert_eq!(
            allocation.family(0),
            Some([QueuePurpose::Graphics, QueuePurpose::Transfer].as_slice())
        );
        assert_eq!(allocation.total(), 2);
    }

    #[test]
    fn unsupported_purpose_stays_unsatisfied() {
        let families = [family(0, G, 1), family(1, C, 1)];
        let req = request(1, 1, 1);
        let allocation = select_from(&families, req);

        assert_eq!(allocation.family(0), Some([QueuePurpose::Graphics].as_slice()));
        assert_eq!(allocation.family(1), Some([QueuePurpose::Compute].as_slice()));
        assert_eq!(allocation.count(QueuePurpose::Transfer), 0);
        assert_eq!(allocation.shortfall(&req), QueueRequest::NONE.with_transfer_queues(1));
    }

    #[test]
    fn specialized_compute_family_is_preferred() {
        let families = [family(0, C, 2), family(1, G | C, 2)];
        let allocation = select_from(&families, request(0, 1, 0));

        assert_eq!(allocation.family(0), Some([QueuePurpose::Compute].as_slice()));
        assert_eq!(allocation.family(1), None);
    }

    #[test]
    fn specialized_family_wins_even_at_higher_index() {
        let families = [family(0, G | C | T, 16), family(1, T, 2), family(2, C, 4)];
        let allocation = select_from(&families, request(1, 1, 1));

        assert_eq!(allocation.family(0), Some([QueuePurpose::Graphics].as_slice()));
        assert_eq!(allocation.family(1), Some([QueuePurpose::Transfer].as_slice()));
        assert_eq!(allocation.family(2), Some([QueuePurpose::Compute].as_slice()));
    }

    #[test]
    fn compute_family_with_transfer_bit_is_not_specialized() {
        // A COMPUTE | TRANSFER family only serves compute in the general pass,
        // which runs after graphics took the first family.
        let families = [family(0, G | C | T, 4), family(1, C | T, 4)];
        let allocation = select_from(&families, request(1, 1, 0));

        assert_eq!(
            allocation.family(0),
            Some([QueuePurpose::Graphics, QueuePurpose::Compute].as_slice())
        );
        assert_eq!(allocation.family(1), None);
    }

    #[test]
    fn capacity_is_shared_between_passes() {
        let families = [family(0, G | C | T, 2)];
        let req = request(1, 1, 1);
        let allocation = select_from(&families, req);

        assert_eq!(
            allocation.family(0),
            Some([QueuePurpose::Graphics, QueuePurpose::Compute].as_slice())
        );
        assert_eq!(allocation.count(QueuePurpose::Transfer), 0);
        assert_valid(&families, req, &allocation);
    }

    #[test]
    fn general_pass_uses_leftover_specialized_capacity() {
        let families = [family(0, G, 1), family(1, C, 3)];
        let allocation = select_from(&families, request(1, 3, 0));

        assert_eq!(allocation.family(1).map(<[_]>::len), Some(3));
        assert_eq!(allocation.count(QueuePurpose::Compute), 3);
    }

    #[test]
    fn demand_spills_into_later_families() {
        let families = [family(0, G | C | T, 1), family(1, G | C | T, 2)];
        let allocation = select_from(&families, request(3, 0, 0));

        assert_eq!(allocation.family(0), Some([QueuePurpose::Graphics].as_slice()));
        assert_eq!(
            allocation.family(1),
            Some([QueuePurpose::Graphics, QueuePurpose::Graphics].as_slice())
        );
    }

    #[test]
    fn families_are_visited_by_index() {
        let families = [family(1, G, 1), family(0, G, 1)];
        let allocation = select_from(&families, request(1, 0, 0));

        assert_eq!(allocation.family(0), Some([QueuePurpose::Graphics].as_slice()));
        assert_eq!(allocation.family(1), None);
    }

    #[test]
    fn zero_capacity_families_are_skipped() {
        let families = [family(0, C, 0), family(1, G | C, 1)];
        let allocation = select_from(&families, request(0, 1, 0));

        assert_eq!(allocation.family(0), None);
        assert_eq!(allocation.family(1), Some([QueuePurpose::Compute].as_slice()));
    }

    #[test]
    fn discrete_gpu_layout() {
        // Family layout reported by a typical desktop discrete GPU.
        let families = [
            family(0, G | C | T | SB, 16),
            family(1, T | SB, 2),
            family(2, C | T | SB, 8),
        ];

        let allocation = select_from(&families, QueueRequest::default());
        assert_eq!(allocation.family(0), Some([QueuePurpose::Graphics].as_slice()));
        assert_eq!(allocation.family(1), Some([QueuePurpose::Transfer].as_slice()));
        assert_eq!(allocation.family(2), None);

        let req = request(1, 2, 2);
        let allocation = select_from(&families, req);
        assert_eq!(
            allocation.family(0),
            Some(
                [
                    QueuePurpose::Graphics,
                    QueuePurpose::Compute,
                    QueuePurpose::Compute
                ]
                .as_slice()
            )
        );
        assert_eq!(
            allocation.family(1),
            Some([QueuePurpose::Transfer, QueuePurpose::Transfer].as_slice())
        );
        assert!(allocation.satisfies(&req));
    }

    #[test]
    fn single_queue_graphics_family_layout() {
        // One graphics queue, a compute family and a transfer-only family.
        let families = [
            family(0, G | C | T | SB, 1),
            family(1, C | T | SB, 4),
            family(2, T | SB, 2),
        ];
        let req = request(1, 1, 1);
        let allocation = select_from(&families, req);

        assert_eq!(allocation.family(0), Some([QueuePurpose::Graphics].as_slice()));
        assert_eq!(allocation.family(1), Some([QueuePurpose::Compute].as_slice()));
        assert_eq!(allocation.family(2), Some([QueuePurpose::Transfer].as_slice()));
        assert!(allocation.satisfies(&req));
    }

    #[test]
    fn allocations_respect_invariants() {
        let flag_sets = [G, C, T, G | C, G | T, C | T, G | C | T, SB, T | SB];

        for (a, &flags_a) in flag_sets.iter().enumerate() {
            for &flags_b in &flag_sets[a..] {
                for count_a in 0..3 {
                    for count_b in 0..3 {
                        let families = [family(0, flags_a, count_a), family(1, flags_b, count_b)];
                        for req in [
                            request(0, 0, 0),
                            request(1, 0, 1),
                            request(1, 1, 1),
                            request(2, 3, 1),
                            request(0, 4, 4),
                        ] {
                            let allocation = select_from(&families, req);
                            assert_valid(&families, req, &allocation);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn selection_is_deterministic() {
        let families = [
            family(0, G | C | T, 2),
            family(1, C, 2),
            family(2, T, 1),
            family(3, G, 1),
        ];
        let req = request(2, 3, 2);

        let first = select_from(&families, req);
        for _ in 0..8 {
            assert_eq!(select_from(&families, req), first);
        }
    }

    #[test]
    fn selector_struct_matches_free_function() {
        let families = [family(0, G | C | T, 4), family(1, T, 1)];
        let req = request(1, 1, 2);

        let selector = QueueSelector::new(req);
        assert_eq!(selector.request(), &req);
        assert_eq!(selector.select_from(&families), select_from(&families, req));
    }
}
