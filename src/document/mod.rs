//! Document model: an ordered list of top-level content blocks

mod block;
pub mod markup;
mod node;
mod split_marker;

pub use block::{AtomicKind, BlockKind};
pub use node::{Child, ContentNode, NodePath};
pub use split_marker::{
    strip_marker, SplitId, SplitIdGenerator, SplitMarker, SplitPart, SplitStrategy,
    SPLIT_ID_ATTR, SPLIT_PART_ATTR,
};

pub(crate) use node::char_slice;

use crate::error::MarkupError;
use std::rc::Rc;

/// The main document structure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    blocks: Vec<Rc<ContentNode>>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from an ordered block list
    pub fn from_blocks(blocks: Vec<Rc<ContentNode>>) -> Self {
        Self { blocks }
    }

    /// Parse freshly loaded markup.
    ///
    /// Split markers never survive a reload, so any found in the input are
    /// stripped here.
    pub fn from_markup(src: &str) -> Result<Self, MarkupError> {
        let blocks = markup::parse_blocks(src)?
            .into_iter()
            .map(|block| match SplitMarker::read(&block) {
                Some(_) => Rc::new(strip_marker(&block)),
                None => block,
            })
            .collect();
        Ok(Self { blocks })
    }

    pub fn blocks(&self) -> &[Rc<ContentNode>] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Rc<ContentNode>> {
        self.blocks
    }

    /// Get block count
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Check if document is empty
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Get the full document text, one line per block
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(|block| block.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Serialize every block
    pub fn to_markup(&self) -> Vec<String> {
        self.blocks.iter().map(|block| markup::to_markup(block)).collect()
    }
}
