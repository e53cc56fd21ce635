//! Mini-Pager: a paginated live document engine
//!
//! This crate distributes rich-content blocks across fixed-size pages and
//! keeps that distribution correct while the content is edited:
//! - Pure layout engine partitioning measured blocks into pages
//! - Block splitter cutting oversized blocks into recombinable fragments
//! - Debounced re-pagination controller with caret save/restore
//! - Pluggable measurement oracle, with a font-metrics reference implementation

pub mod config;
pub mod controller;
pub mod document;
pub mod editing;
pub mod error;
pub mod layout;
pub mod split;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::WasmPager;

// Re-export primary types
pub use config::{Margins, PagePreset, PageSize, PagerConfig};
pub use controller::{
    DiffMode, InMemoryTree, LiveTree, PagerEvent, PagerState, PassOutcome, RepaginationController,
};
pub use document::{ContentNode, Document, SplitMarker};
pub use editing::{CursorPosition, TreeCaret};
pub use error::{ConfigError, MarkupError, PagerError};
pub use layout::{
    paginate, LayoutConstraints, MeasuredBlock, MeasurementOracle, MetricsOracle, PaginationPolicy,
    PaginationReport, PaginationResult,
};
pub use split::{recombine, recombine_markup, Splitter};

use document::markup::parse_block;

/// The pager state combining controller, live tree and reference oracle
pub struct Pager {
    config: PagerConfig,
    controller: RepaginationController<MetricsOracle>,
    tree: InMemoryTree,
}

impl Pager {
    /// Create a pager with a validated configuration
    pub fn new(config: PagerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: PagerConfig) -> Self {
        let oracle = MetricsOracle::new(config.font.clone(), config.constraints().content_width());
        let controller = RepaginationController::new(oracle, config.controller_settings());
        Self {
            config,
            controller,
            tree: InMemoryTree::new(),
        }
    }

    /// Create a pager and load initial content
    pub fn with_markup(markup: &str, config: PagerConfig) -> Result<Self, PagerError> {
        let mut pager = Self::new(config)?;
        pager.load(markup)?;
        Ok(pager)
    }

    pub fn config(&self) -> &PagerConfig {
        &self.config
    }

    pub fn controller(&self) -> &RepaginationController<MetricsOracle> {
        &self.controller
    }

    pub fn tree(&self) -> &InMemoryTree {
        &self.tree
    }

    pub fn state(&self) -> PagerState {
        self.controller.state()
    }

    /// Replace the whole document
    pub fn load(&mut self, markup: &str) -> Result<PassOutcome, MarkupError> {
        self.controller.load(markup, &mut self.tree)
    }

    /// Replace one live block and arm the debounce timer
    pub fn replace_block(&mut self, index: usize, markup: &str, now_ms: u64) -> Result<bool, MarkupError> {
        let node = parse_block(markup)?;
        let replaced = self.tree.replace_block(index, node);
        if replaced {
            self.controller.notify_mutation(now_ms);
        }
        Ok(replaced)
    }

    /// Insert a live block and arm the debounce timer
    pub fn insert_block(&mut self, index: usize, markup: &str, now_ms: u64) -> Result<bool, MarkupError> {
        let node = parse_block(markup)?;
        let inserted = self.tree.insert_block(index, node);
        if inserted {
            self.controller.notify_mutation(now_ms);
        }
        Ok(inserted)
    }

    /// Remove a live block and arm the debounce timer
    pub fn remove_block(&mut self, index: usize, now_ms: u64) -> bool {
        let removed = self.tree.remove_block(index).is_some();
        if removed {
            self.controller.notify_mutation(now_ms);
        }
        removed
    }

    pub fn set_caret(&mut self, caret: Option<TreeCaret>) {
        self.tree.set_caret(caret);
    }

    pub fn caret(&self) -> Option<TreeCaret> {
        self.tree.caret()
    }

    /// Feed a controller event against the owned tree
    pub fn dispatch(&mut self, event: PagerEvent) -> Option<PassOutcome> {
        self.controller.dispatch(event, &mut self.tree)
    }

    /// Advance the host clock
    pub fn tick(&mut self, now_ms: u64) -> Option<PassOutcome> {
        self.controller.poll(now_ms, &mut self.tree)
    }

    /// Report that the last install was painted
    pub fn painted(&mut self) {
        self.controller.on_paint(&mut self.tree);
    }

    /// Re-paginate immediately
    pub fn flush(&mut self) -> PassOutcome {
        self.controller.flush(&mut self.tree)
    }

    pub fn page_count(&self) -> usize {
        self.controller.page_count()
    }

    /// Serialized blocks of the last pass in flat page order
    pub fn cached_markup(&self) -> &[String] {
        self.controller.cached_markup()
    }

    /// Recombined document markup, split fragments merged
    pub fn document_markup(&self) -> Vec<String> {
        recombine(&self.tree.blocks())
            .iter()
            .map(|block| block.to_markup())
            .collect()
    }

    /// Serializable view of the last pass
    pub fn report(&self) -> PaginationReport {
        let content_height = self.config.constraints().content_height();
        self.controller
            .last_result()
            .map(|result| result.report(content_height))
            .unwrap_or_else(|| PaginationResult::default().report(content_height))
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self::build(PagerConfig::default())
    }
}
