//! Pagination: distributing measured blocks across fixed-height pages

use crate::document::{ContentNode, SplitMarker};
use crate::layout::engine::MeasuredBlock;
use rustc_hash::FxHashMap;
use serde::Serialize;
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::rc::Rc;

/// Tolerance for floating point height comparisons
pub const EPSILON: f32 = 0.01;

/// Tunables for the pagination pass
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationPolicy {
    /// Smallest remaining space worth splitting a block into
    pub min_split_height: f32,
    /// Cap on fragments produced from one source block
    pub max_fragments: usize,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            min_split_height: 60.0,
            max_fragments: 512,
        }
    }
}

/// The two fragments of a successful split, already measured
#[derive(Debug, Clone, PartialEq)]
pub struct SplitPair {
    pub first: MeasuredBlock,
    pub second: MeasuredBlock,
}

/// Splits a block that does not fit into the remaining page space
pub trait SplitBlock {
    fn try_split(&self, block: &MeasuredBlock, available_height: f32) -> Option<SplitPair>;
}

/// Never splits; oversized blocks overflow on their own page
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSplit;

impl SplitBlock for NoSplit {
    fn try_split(&self, _: &MeasuredBlock, _: f32) -> Option<SplitPair> {
        None
    }
}

impl<S: SplitBlock + ?Sized> SplitBlock for &S {
    fn try_split(&self, block: &MeasuredBlock, available_height: f32) -> Option<SplitPair> {
        (**self).try_split(block, available_height)
    }
}

/// A block or fragment placed on a page
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedBlock {
    /// Index of the input block this came from
    pub source_index: usize,
    pub node: Rc<ContentNode>,
    pub height: f32,
}

impl PlacedBlock {
    pub fn marker(&self) -> Option<SplitMarker> {
        SplitMarker::read(&self.node)
    }

    pub fn is_fragment(&self) -> bool {
        self.marker().is_some()
    }
}

impl From<MeasuredBlock> for PlacedBlock {
    fn from(block: MeasuredBlock) -> Self {
        Self {
            source_index: block.index,
            node: block.node,
            height: block.height,
        }
    }
}

/// One page of placed blocks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub blocks: Vec<PlacedBlock>,
    /// Sum of placed outer heights
    pub height: f32,
}

impl Page {
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Source block index of every placed block
    pub fn block_indices(&self) -> SmallVec<[usize; 16]> {
        self.blocks.iter().map(|b| b.source_index).collect()
    }

    /// Serialized fragment of every placed block
    pub fn fragments(&self) -> Vec<String> {
        self.blocks.iter().map(|b| b.node.to_markup()).collect()
    }
}

/// Output of a pagination pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaginationResult {
    pub pages: Vec<Page>,
    pub page_count: usize,
}

impl PaginationResult {
    fn from_pages(pages: Vec<Page>) -> Self {
        let page_count = pages.len();
        Self { pages, page_count }
    }

    /// Placed nodes in flat page order
    pub fn flatten(&self) -> Vec<Rc<ContentNode>> {
        self.pages
            .iter()
            .flat_map(|page| page.blocks.iter().map(|b| Rc::clone(&b.node)))
            .collect()
    }

    /// Number of placed blocks per page
    pub fn block_counts(&self) -> SmallVec<[usize; 32]> {
        self.pages.iter().map(Page::len).collect()
    }

    /// Total number of placed blocks
    pub fn block_count(&self) -> usize {
        self.pages.iter().map(Page::len).sum()
    }

    /// Page holding the `flat_index`-th placed block
    pub fn page_of(&self, flat_index: usize) -> Option<usize> {
        let mut seen = 0;
        for (page_idx, page) in self.pages.iter().enumerate() {
            seen += page.len();
            if flat_index < seen {
                return Some(page_idx);
            }
        }
        None
    }

    /// Serializable summary for hosts and the CLI
    pub fn report(&self, content_height: f32) -> PaginationReport {
        PaginationReport {
            page_count: self.page_count,
            content_height,
            pages: self
                .pages
                .iter()
                .map(|page| PageReport {
                    height: page.height,
                    blocks: page
                        .blocks
                        .iter()
                        .map(|block| {
                            let marker = block.marker();
                            BlockReport {
                                source_index: block.source_index,
                                height: block.height,
                                split_id: marker.as_ref().map(|m| m.split_id.to_string()),
                                split_part: marker.map(|m| m.part.as_u8()),
                                markup: block.node.to_markup(),
                            }
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// JSON view of a pagination result
#[derive(Debug, Clone, Serialize)]
pub struct PaginationReport {
    pub page_count: usize,
    pub content_height: f32,
    pub pages: Vec<PageReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    pub height: f32,
    pub blocks: Vec<BlockReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockReport {
    pub source_index: usize,
    pub height: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_part: Option<u8>,
    pub markup: String,
}

/// Accumulates blocks onto the current page
struct PageBuilder {
    content_height: f32,
    current: Page,
    pages: Vec<Page>,
}

impl PageBuilder {
    fn new(content_height: f32) -> Self {
        Self {
            content_height,
            current: Page::default(),
            pages: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    fn remaining(&self) -> f32 {
        (self.content_height - self.current.height).max(0.0)
    }

    fn fits(&self, height: f32) -> bool {
        height <= EPSILON || self.current.height + height <= self.content_height + EPSILON
    }

    fn place(&mut self, block: MeasuredBlock) {
        self.current.height += block.height;
        self.current.blocks.push(block.into());
    }

    fn close(&mut self) {
        if !self.current.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
        }
    }

    fn finish(mut self) -> Vec<Page> {
        self.close();
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        self.pages
    }
}

/// Partition measured blocks into pages of at most `content_height`.
///
/// Blocks are placed in order. A block that overflows the current page is
/// offered to `splitter` when enough space remains; otherwise it moves to a
/// fresh page. A block taller than an empty page is split against the full
/// height or, failing that, placed alone on an overflowing page.
pub fn paginate<S: SplitBlock + ?Sized>(
    blocks: Vec<MeasuredBlock>,
    content_height: f32,
    splitter: &S,
    policy: &PaginationPolicy,
) -> PaginationResult {
    let mut queue: VecDeque<MeasuredBlock> = blocks.into();
    let mut builder = PageBuilder::new(content_height);
    // Splits performed per source index
    let mut splits: FxHashMap<usize, usize> = FxHashMap::default();

    let mut try_split = |block: &MeasuredBlock, available: f32| -> Option<SplitPair> {
        let done = splits.get(&block.index).copied().unwrap_or(0);
        if done + 2 > policy.max_fragments {
            log::debug!(
                "block {} reached the fragment cap of {}",
                block.index,
                policy.max_fragments
            );
            return None;
        }
        let pair = splitter.try_split(block, available)?;
        *splits.entry(block.index).or_insert(0) += 1;
        Some(pair)
    };

    while let Some(block) = queue.pop_front() {
        if block.break_before && !builder.is_empty() {
            builder.close();
        }

        if builder.fits(block.height) {
            let break_after = block.break_after;
            builder.place(block);
            if break_after {
                builder.close();
            }
            continue;
        }

        if !builder.is_empty() {
            let remaining = builder.remaining();
            if remaining >= policy.min_split_height {
                if let Some(pair) = try_split(&block, remaining) {
                    builder.place(pair.first);
                    builder.close();
                    queue.push_front(pair.second);
                    continue;
                }
            }
            builder.close();
        }

        if builder.fits(block.height) {
            let break_after = block.break_after;
            builder.place(block);
            if break_after {
                builder.close();
            }
            continue;
        }

        // Taller than an empty page
        if let Some(pair) = try_split(&block, content_height) {
            builder.place(pair.first);
            builder.close();
            queue.push_front(pair.second);
            continue;
        }

        log::warn!(
            "block {} ({:.1}px) exceeds the {:.1}px content height and cannot be split",
            block.index,
            block.height,
            content_height
        );
        builder.place(block);
        builder.close();
    }

    let result = PaginationResult::from_pages(builder.finish());
    log::debug!(
        "paginated {} blocks onto {} pages",
        result.block_count(),
        result.page_count
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(index: usize, height: f32) -> MeasuredBlock {
        MeasuredBlock {
            index,
            height,
            break_before: false,
            break_after: false,
            node: Rc::new(ContentNode::new("p").with_text(&format!("block {index}"))),
        }
    }

    fn indices(result: &PaginationResult) -> Vec<Vec<usize>> {
        result
            .pages
            .iter()
            .map(|p| p.block_indices().to_vec())
            .collect()
    }

    #[test]
    fn test_blocks_fill_pages_in_order() {
        let blocks = vec![block(0, 300.0), block(1, 400.0), block(2, 500.0)];
        let result = paginate(blocks, 1000.0, &NoSplit, &PaginationPolicy::default());
        assert_eq!(indices(&result), vec![vec![0, 1], vec![2]]);
        assert_eq!(result.page_count, 2);
        assert_eq!(result.pages[0].height, 700.0);
    }

    #[test]
    fn test_empty_input_gives_one_empty_page() {
        let result = paginate(Vec::new(), 1000.0, &NoSplit, &PaginationPolicy::default());
        assert_eq!(result.page_count, 1);
        assert!(result.pages[0].is_empty());
    }

    #[test]
    fn test_oversized_block_overflows_alone() {
        let blocks = vec![block(0, 100.0), block(1, 1500.0), block(2, 100.0)];
        let result = paginate(blocks, 1000.0, &NoSplit, &PaginationPolicy::default());
        assert_eq!(indices(&result), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn test_break_hints() {
        let mut blocks = vec![block(0, 100.0), block(1, 100.0), block(2, 100.0)];
        blocks[0].break_after = true;
        blocks[2].break_before = true;
        let result = paginate(blocks, 1000.0, &NoSplit, &PaginationPolicy::default());
        assert_eq!(indices(&result), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn test_break_before_on_first_block_adds_no_page() {
        let mut blocks = vec![block(0, 100.0)];
        blocks[0].break_before = true;
        let result = paginate(blocks, 1000.0, &NoSplit, &PaginationPolicy::default());
        assert_eq!(result.page_count, 1);
    }

    #[test]
    fn test_zero_height_blocks_always_fit() {
        let blocks = vec![block(0, 1000.0), block(1, 0.0), block(2, 10.0)];
        let result = paginate(blocks, 1000.0, &NoSplit, &PaginationPolicy::default());
        assert_eq!(indices(&result), vec![vec![0, 1], vec![2]]);
    }

    /// Halves any block, marking nothing
    struct Halve;

    impl SplitBlock for Halve {
        fn try_split(&self, block: &MeasuredBlock, available: f32) -> Option<SplitPair> {
            if available < 1.0 {
                return None;
            }
            let first = MeasuredBlock {
                height: available.min(block.height / 2.0),
                break_after: false,
                ..block.clone()
            };
            let second = MeasuredBlock {
                height: block.height - first.height,
                break_before: false,
                ..block.clone()
            };
            Some(SplitPair { first, second })
        }
    }

    #[test]
    fn test_split_respects_min_height() {
        let blocks = vec![block(0, 950.0), block(1, 200.0)];
        let result = paginate(blocks, 1000.0, &Halve, &PaginationPolicy::default());
        // 50px left is below the split threshold
        assert_eq!(indices(&result), vec![vec![0], vec![1]]);

        let blocks = vec![block(0, 900.0), block(1, 200.0)];
        let result = paginate(blocks, 1000.0, &Halve, &PaginationPolicy::default());
        assert_eq!(indices(&result), vec![vec![0, 1], vec![1]]);
        assert_eq!(result.pages[0].height, 1000.0);
    }

    #[test]
    fn test_fragment_cap() {
        let policy = PaginationPolicy {
            max_fragments: 2,
            ..PaginationPolicy::default()
        };
        let blocks = vec![block(0, 4000.0)];
        let result = paginate(blocks, 1000.0, &Halve, &policy);
        // One split allowed, the 3000px remainder overflows
        assert_eq!(result.page_count, 2);
        assert_eq!(result.pages[1].height, 3000.0);
    }

    #[test]
    fn test_report_serializes() {
        let result = paginate(vec![block(0, 10.0)], 100.0, &NoSplit, &PaginationPolicy::default());
        let json = serde_json::to_string(&result.report(100.0)).unwrap();
        assert!(json.contains("\"page_count\":1"));
        assert!(json.contains("<p>block 0</p>"));
        assert!(!json.contains("split_id"));
    }

    #[test]
    fn test_page_of() {
        let blocks = vec![block(0, 600.0), block(1, 600.0), block(2, 100.0)];
        let result = paginate(blocks, 1000.0, &NoSplit, &PaginationPolicy::default());
        assert_eq!(result.page_of(0), Some(0));
        assert_eq!(result.page_of(2), Some(1));
        assert_eq!(result.page_of(3), None);
    }
}
