//! Structural change detection between two partitions

use crate::layout::PaginationResult;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// What counts as a structural change between two passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffMode {
    /// Compare the number of blocks on every page
    #[default]
    BlockCounts,
    /// Also compare which source block (and which split part) sits in every slot
    BlockIdentity,
}

/// Comparable summary of a partition
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartitionShape {
    counts: SmallVec<[usize; 32]>,
    identity: Option<Vec<(usize, Option<u8>)>>,
}

impl PartitionShape {
    pub fn of(result: &PaginationResult, mode: DiffMode) -> Self {
        let identity = match mode {
            DiffMode::BlockCounts => None,
            DiffMode::BlockIdentity => Some(
                result
                    .pages
                    .iter()
                    .flat_map(|page| page.blocks.iter())
                    .map(|block| (block.source_index, block.marker().map(|m| m.part.as_u8())))
                    .collect(),
            ),
        };
        Self {
            counts: result.block_counts(),
            identity,
        }
    }

    pub fn page_count(&self) -> usize {
        self.counts.len()
    }

    /// Blocks placed on each page
    pub fn block_counts(&self) -> &[usize] {
        &self.counts
    }
}

/// Whether `next` must be installed into the live tree
pub fn is_structural_change(previous: Option<&PartitionShape>, next: &PartitionShape) -> bool {
    previous != Some(next)
}
