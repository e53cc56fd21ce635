//! Cursor capture and restore across re-layout

use crate::document::{ContentNode, NodePath};
use std::rc::Rc;

/// Caret as a block index plus a char offset into the block's linearized text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct CursorPosition {
    /// Block in the current block ordering
    pub block_index: usize,
    /// Chars from the start of the block's text
    pub text_offset: usize,
}

impl CursorPosition {
    pub fn new(block_index: usize, text_offset: usize) -> Self {
        Self {
            block_index,
            text_offset,
        }
    }
}

impl PartialOrd for CursorPosition {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CursorPosition {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.block_index.cmp(&other.block_index) {
            std::cmp::Ordering::Equal => self.text_offset.cmp(&other.text_offset),
            other => other,
        }
    }
}

/// Cursor affinity for ambiguous positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Affinity {
    /// Prefer the end of the preceding text run
    Upstream,
    /// Prefer the start of the following text run
    #[default]
    Downstream,
}

/// Caret inside the live tree: a text node (by child path) and a char offset in it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreeCaret {
    pub block_index: usize,
    /// Path to a text child; empty when the block has no text
    pub path: NodePath,
    pub offset: usize,
}

impl TreeCaret {
    pub fn new(block_index: usize, path: NodePath, offset: usize) -> Self {
        Self {
            block_index,
            path,
            offset,
        }
    }
}

/// Linearize a live caret into a block-relative text offset.
///
/// A caret that does not point at a text run lands at the start of the
/// next run after it, or at the end of the block.
pub fn capture(blocks: &[Rc<ContentNode>], caret: &TreeCaret) -> Option<CursorPosition> {
    let block = blocks.get(caret.block_index)?;
    let mut start = 0;
    for (path, text) in block.text_runs_with_paths() {
        let len = text.chars().count();
        if path == caret.path {
            return Some(CursorPosition::new(
                caret.block_index,
                start + caret.offset.min(len),
            ));
        }
        if path > caret.path {
            return Some(CursorPosition::new(caret.block_index, start));
        }
        start += len;
    }
    Some(CursorPosition::new(caret.block_index, start))
}

/// Walk `position.text_offset` chars into the block and place a caret there.
///
/// Offsets past the end clamp to the end of the block. Returns `None` when
/// the block no longer exists.
pub fn resolve(
    blocks: &[Rc<ContentNode>],
    position: CursorPosition,
    affinity: Affinity,
) -> Option<TreeCaret> {
    let block = blocks.get(position.block_index)?;
    let runs = block.text_runs_with_paths();
    let last = runs.len().saturating_sub(1);

    let mut start = 0;
    for (idx, (path, text)) in runs.iter().enumerate() {
        let len = text.chars().count();
        let end = start + len;
        let inside = position.text_offset < end
            || (position.text_offset == end && (affinity == Affinity::Upstream || idx == last));
        if inside {
            return Some(TreeCaret::new(
                position.block_index,
                path.clone(),
                position.text_offset - start,
            ));
        }
        start = end;
    }

    match runs.last() {
        Some((path, text)) => Some(TreeCaret::new(
            position.block_index,
            path.clone(),
            text.chars().count(),
        )),
        None => Some(TreeCaret::new(position.block_index, NodePath::new(), 0)),
    }
}
