//! The live document the controller reads from and installs into

use crate::document::ContentNode;
use crate::editing::TreeCaret;
use crate::layout::PaginationResult;
use std::rc::Rc;

/// Editing surface holding the currently rendered pages
pub trait LiveTree {
    /// Current blocks (possibly split fragments) in flat page order
    fn blocks(&self) -> Vec<Rc<ContentNode>>;

    /// Replace the rendered pages with a new partition
    fn install(&mut self, result: &PaginationResult);

    fn caret(&self) -> Option<TreeCaret>;

    fn place_caret(&mut self, caret: TreeCaret);
}

/// Page-structured tree kept in memory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryTree {
    pages: Vec<Vec<Rc<ContentNode>>>,
    caret: Option<TreeCaret>,
}

impl InMemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// All blocks on a single page
    pub fn from_blocks(blocks: Vec<Rc<ContentNode>>) -> Self {
        Self {
            pages: vec![blocks],
            caret: None,
        }
    }

    pub fn pages(&self) -> &[Vec<Rc<ContentNode>>] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn block_count(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }

    /// Serialized blocks of every page
    pub fn page_markup(&self) -> Vec<Vec<String>> {
        self.pages
            .iter()
            .map(|page| page.iter().map(|block| block.to_markup()).collect())
            .collect()
    }

    pub fn set_caret(&mut self, caret: Option<TreeCaret>) {
        self.caret = caret;
    }

    /// Replace the block at a flat index
    pub fn replace_block(&mut self, index: usize, node: ContentNode) -> bool {
        match self.locate(index) {
            Some((page, slot)) => {
                self.pages[page][slot] = Rc::new(node);
                true
            }
            None => false,
        }
    }

    /// Insert before the block at a flat index; an index one past the end appends
    pub fn insert_block(&mut self, index: usize, node: ContentNode) -> bool {
        let node = Rc::new(node);
        if let Some((page, slot)) = self.locate(index) {
            self.pages[page].insert(slot, node);
            return true;
        }
        if index != self.block_count() {
            return false;
        }
        match self.pages.last_mut() {
            Some(page) => page.push(node),
            None => self.pages.push(vec![node]),
        }
        true
    }

    pub fn remove_block(&mut self, index: usize) -> Option<Rc<ContentNode>> {
        let (page, slot) = self.locate(index)?;
        Some(self.pages[page].remove(slot))
    }

    fn locate(&self, index: usize) -> Option<(usize, usize)> {
        let mut remaining = index;
        for (page_idx, page) in self.pages.iter().enumerate() {
            if remaining < page.len() {
                return Some((page_idx, remaining));
            }
            remaining -= page.len();
        }
        None
    }
}

impl LiveTree for InMemoryTree {
    fn blocks(&self) -> Vec<Rc<ContentNode>> {
        self.pages.iter().flatten().cloned().collect()
    }

    fn install(&mut self, result: &PaginationResult) {
        self.pages = result
            .pages
            .iter()
            .map(|page| page.blocks.iter().map(|b| Rc::clone(&b.node)).collect())
            .collect();
        // Installed content replaces the nodes the caret lived in
        self.caret = None;
    }

    fn caret(&self) -> Option<TreeCaret> {
        self.caret.clone()
    }

    fn place_caret(&mut self, caret: TreeCaret) {
        self.caret = Some(caret);
    }
}
