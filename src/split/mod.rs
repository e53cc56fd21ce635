//! Block splitting and recombination
//!
//! A block too tall for the space left on a page is cut into two fragments
//! that carry a shared split marker. Two strategies are tried in order:
//! between immediate children, then inside the linearized text. Fragments
//! are recombined into their source block before every measurement pass.

mod child_split;
mod recombine;
mod text_split;

pub use recombine::{chain_spans, merge_fragments, merge_markup, recombine, recombine_markup};

use crate::document::{
    strip_marker, ContentNode, SplitIdGenerator, SplitMarker, SplitPart, SplitStrategy,
};
use crate::layout::{MeasuredBlock, MeasurementOracle, SplitBlock, SplitPair, EPSILON};
use std::rc::Rc;

/// Strategies in the order they are tried
const STRATEGIES: [SplitStrategy; 2] = [SplitStrategy::ChildBoundary, SplitStrategy::TextBoundary];

/// Extra attempts at a smaller budget when a cut does not fit
const MAX_REFITS: usize = 3;

/// Block splitter over a measurement oracle
pub struct Splitter<'a, O: ?Sized> {
    oracle: &'a O,
    ids: &'a SplitIdGenerator,
}

impl<'a, O: MeasurementOracle + ?Sized> Splitter<'a, O> {
    pub fn new(oracle: &'a O, ids: &'a SplitIdGenerator) -> Self {
        Self { oracle, ids }
    }

    /// Split `node` so the first fragment fits in `available` pixels.
    ///
    /// Returns `None` for atomic elements, blocks forcing a page break
    /// before them, and whenever no legal cut exists. A fragment that is
    /// already part of a chain keeps its split id and may only be cut
    /// again with the chain's strategy.
    pub fn split_node(&self, node: &ContentNode, available: f32) -> Option<(ContentNode, ContentNode)> {
        if node.is_atomic() || node.break_before() {
            return None;
        }

        let existing = SplitMarker::read(node);
        let chain_strategy = match &existing {
            Some(marker) => Some(marker.split_id.strategy()?),
            None => None,
        };

        let measurement = self.oracle.measure(node);
        let budget = available - measurement.margin_top - measurement.margin_bottom;
        if budget <= 0.0 {
            return None;
        }

        let base = strip_marker(node);
        for strategy in STRATEGIES {
            if chain_strategy.is_some_and(|s| s != strategy) {
                continue;
            }

            let Some((first, second)) = self.cut(node, strategy, budget, available) else {
                continue;
            };
            let rejoined = recombine::merge_with(base.shell(), &[&first, &second], Some(strategy));
            if rejoined != base {
                log::debug!("{strategy:?} split of <{}> would not recombine", node.tag());
                continue;
            }

            let (first_marker, second_marker) = match &existing {
                Some(marker) => (
                    marker.clone(),
                    SplitMarker::new(marker.split_id.clone(), SplitPart::Rest),
                ),
                None => {
                    let id = self.ids.next_id(strategy);
                    (
                        SplitMarker::new(id.clone(), SplitPart::First),
                        SplitMarker::new(id, SplitPart::Rest),
                    )
                }
            };
            log::debug!(
                "split <{}> by {strategy:?} as {}",
                node.tag(),
                first_marker.split_id
            );
            return Some((first_marker.apply(first), second_marker.apply(second)));
        }
        None
    }

    /// Cut with one strategy, shrinking the budget while the first
    /// fragment overshoots `available` (margins of nested blocks that the
    /// budget does not see)
    fn cut(
        &self,
        node: &ContentNode,
        strategy: SplitStrategy,
        mut budget: f32,
        available: f32,
    ) -> Option<(ContentNode, ContentNode)> {
        for _ in 0..=MAX_REFITS {
            let (first, second) = match strategy {
                SplitStrategy::ChildBoundary => {
                    child_split::split_at_children(node, budget, self.oracle)
                }
                SplitStrategy::TextBoundary => text_split::split_at_text(node, budget, self.oracle),
            }?;

            if first.is_blank() || second.is_blank() {
                log::debug!("{strategy:?} split of <{}> leaves a blank fragment", node.tag());
                return None;
            }
            let overshoot = self.oracle.measure(&first).outer_height() - available;
            if overshoot <= EPSILON {
                return Some((first, second));
            }
            log::debug!(
                "{strategy:?} split of <{}> overshoots by {overshoot}px",
                node.tag()
            );
            budget -= overshoot;
            if budget <= 0.0 {
                return None;
            }
        }
        None
    }
}

impl<O: MeasurementOracle + ?Sized> SplitBlock for Splitter<'_, O> {
    fn try_split(&self, block: &MeasuredBlock, available_height: f32) -> Option<SplitPair> {
        let (first, second) = self.split_node(&block.node, available_height)?;

        let mut first = MeasuredBlock::measure(block.index, Rc::new(first), self.oracle);
        first.break_before = block.break_before;
        first.break_after = false;

        let mut second = MeasuredBlock::measure(block.index, Rc::new(second), self.oracle);
        second.break_before = false;
        second.break_after = block.break_after;

        Some(SplitPair { first, second })
    }
}
