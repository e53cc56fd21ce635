//! Page constraints and block measurement

use crate::document::ContentNode;
use crate::layout::oracle::MeasurementOracle;
use std::rc::Rc;

/// Layout constraints for the document, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConstraints {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
}

impl Default for LayoutConstraints {
    fn default() -> Self {
        Self {
            page_width: 794.0, // A4 at 96 DPI
            page_height: 1123.0,
            margin_top: 96.0, // 1 inch
            margin_bottom: 96.0,
            margin_left: 96.0,
            margin_right: 96.0,
        }
    }
}

impl LayoutConstraints {
    /// Get usable content width
    pub fn content_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    /// Get usable content height per page
    pub fn content_height(&self) -> f32 {
        self.page_height - self.margin_top - self.margin_bottom
    }
}

/// One block as seen by the layout engine
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredBlock {
    /// Position in the (recombined) input block list
    pub index: usize,
    /// Outer height: border box plus both margins
    pub height: f32,
    pub break_before: bool,
    pub break_after: bool,
    pub node: Rc<ContentNode>,
}

impl MeasuredBlock {
    /// Measure one node through the oracle
    pub fn measure<O: MeasurementOracle + ?Sized>(
        index: usize,
        node: Rc<ContentNode>,
        oracle: &O,
    ) -> Self {
        let m = oracle.measure(&node);
        let height = m.outer_height();
        Self {
            index,
            height: if height.is_finite() { height.max(0.0) } else { 0.0 },
            break_before: m.break_before,
            break_after: m.break_after,
            node,
        }
    }
}

/// Measure a block list in order
pub fn measure_blocks<O: MeasurementOracle + ?Sized>(
    blocks: &[Rc<ContentNode>],
    oracle: &O,
) -> Vec<MeasuredBlock> {
    blocks
        .iter()
        .enumerate()
        .map(|(index, node)| MeasuredBlock::measure(index, Rc::clone(node), oracle))
        .collect()
}
