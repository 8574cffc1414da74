//! Partition sets and per-unit indices.

/// Ordered partitions `[0, count)` of a project run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionSet {
    count: u32,
}

impl PartitionSet {
    /// A set of `count` partitions; zero is clamped to one.
    pub fn new(count: u32) -> Self {
        Self {
            count: count.max(1),
        }
    }

    pub fn single() -> Self {
        Self::new(1)
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Partition-specific naming and environment only apply when there is
    /// more than one member.
    pub fn is_multi(&self) -> bool {
        self.count > 1
    }

    /// Partitions to dispatch, in order, honouring an optional filter.
    ///
    /// A filter outside `[0, count)` selects nothing.
    pub fn selected(&self, filter: Option<u32>) -> impl Iterator<Item = u32> {
        (0..self.count).filter(move |part| filter.is_none_or(|wanted| wanted == *part))
    }

    pub fn unit_index(&self, partition: u32, example: Option<u32>) -> UnitIndex {
        UnitIndex {
            partition: self.is_multi().then_some(partition),
            example,
        }
    }
}

/// Position of one unit within a run.
///
/// `partition` is only present when the run has several partitions, so a
/// single-partition unit is named and configured exactly like an unpartitioned one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitIndex {
    pub partition: Option<u32>,
    pub example: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_partitions_clamp_to_one() {
        let set = PartitionSet::new(0);
        assert_eq!(set.count(), 1);
        assert!(!set.is_multi());
    }

    #[test]
    fn unfiltered_selection_yields_every_partition() {
        let parts: Vec<u32> = PartitionSet::new(4).selected(None).collect();
        assert_eq!(parts, vec![0, 1, 2, 3]);
    }

    #[test]
    fn filter_selects_exactly_one_partition_in_range() {
        let set = PartitionSet::new(5);
        for wanted in 0..5 {
            let parts: Vec<u32> = set.selected(Some(wanted)).collect();
            assert_eq!(parts, vec![wanted]);
        }
    }

    #[test]
    fn filter_out_of_range_selects_nothing() {
        let set = PartitionSet::new(3);
        assert_eq!(set.selected(Some(3)).count(), 0);
        assert_eq!(set.selected(Some(42)).count(), 0);
    }

    #[test]
    fn unit_index_drops_partition_for_single_sets() {
        assert_eq!(
            PartitionSet::single().unit_index(0, Some(7)),
            UnitIndex {
                partition: None,
                example: Some(7),
            }
        );
        assert_eq!(
            PartitionSet::new(2).unit_index(1, None),
            UnitIndex {
                partition: Some(1),
                example: None,
            }
        );
    }
}
