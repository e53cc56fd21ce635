//! Measurement oracle seam
//!
//! The engine never computes layout itself. Heights, margins, break hints
//! and character positions all come from an oracle, normally backed by a
//! real renderer; [`MetricsOracle`](crate::layout::MetricsOracle) is the
//! in-crate implementation over fixed font metrics.

use crate::document::ContentNode;

/// Rendered geometry of one node
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Measurement {
    /// Border-box height
    pub height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub break_before: bool,
    pub break_after: bool,
}

impl Measurement {
    /// Height including both margins
    pub fn outer_height(&self) -> f32 {
        self.margin_top + self.height + self.margin_bottom
    }
}

/// Vertical extent of the line box holding one character,
/// relative to the block's content top
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextProbe {
    pub top: f32,
    pub bottom: f32,
}

/// Source of rendered geometry
pub trait MeasurementOracle {
    /// Measure a detached node as it would render at the top of a page
    fn measure(&self, node: &ContentNode) -> Measurement;

    /// Where the character at `char_offset` of text run `run_index`
    /// (runs in the order of [`ContentNode::text_runs`]) lands vertically
    fn probe_position(&self, node: &ContentNode, run_index: usize, char_offset: usize)
        -> TextProbe;
}

impl<T: MeasurementOracle + ?Sized> MeasurementOracle for &T {
    fn measure(&self, node: &ContentNode) -> Measurement {
        (**self).measure(node)
    }

    fn probe_position(
        &self,
        node: &ContentNode,
        run_index: usize,
        char_offset: usize,
    ) -> TextProbe {
        (**self).probe_position(node, run_index, char_offset)
    }
}
