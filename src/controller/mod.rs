//! Re-pagination controller
//!
//! Drives the live-edit loop for one mounted document: mutations arm a
//! debounce timer, the timer starts a pass (recombine, measure, paginate),
//! and a pass whose partition differs structurally from the previous one is
//! installed into the live tree. The caret is captured before the install
//! and replayed on the next paint.
//!
//! Time is supplied by the host in milliseconds, so the timer is fully
//! deterministic.

mod diff;
mod tree;

pub use diff::{is_structural_change, DiffMode, PartitionShape};
pub use tree::{InMemoryTree, LiveTree};

use crate::document::{ContentNode, Document, SplitIdGenerator};
use crate::editing::{capture, resolve, Affinity, CursorPosition};
use crate::error::MarkupError;
use crate::layout::{
    measure_blocks, paginate, MeasurementOracle, PaginationPolicy, PaginationResult,
};
use crate::split::{chain_spans, recombine, Splitter};
use std::collections::VecDeque;
use std::rc::Rc;

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagerState {
    #[default]
    Idle,
    /// A pass will run once `deadline_ms` is reached
    PendingRepagination { deadline_ms: u64 },
    Repaginating,
    /// A new partition is installed; waiting for paint to restore the caret
    Committing,
}

/// Inputs to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerEvent {
    /// The live tree changed
    Mutation { at_ms: u64 },
    /// Host clock tick
    Tick { now_ms: u64 },
    /// The host finished painting the last install
    Painted,
}

/// Result of a completed pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// Same structure as before; only the cached markup was refreshed
    Unchanged { page_count: usize },
    /// A new partition was installed
    Committed {
        page_count: usize,
        /// Where the caret will be placed on the next paint
        cursor: Option<CursorPosition>,
    },
}

impl PassOutcome {
    pub fn page_count(&self) -> usize {
        match self {
            PassOutcome::Unchanged { page_count } | PassOutcome::Committed { page_count, .. } => {
                *page_count
            }
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, PassOutcome::Committed { .. })
    }
}

/// Pass parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    pub content_height: f32,
    pub debounce_ms: u64,
    pub policy: PaginationPolicy,
    pub diff_mode: DiffMode,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            content_height: 931.0,
            debounce_ms: 500,
            policy: PaginationPolicy::default(),
            diff_mode: DiffMode::default(),
        }
    }
}

/// Re-pagination state machine for one document
pub struct RepaginationController<O> {
    oracle: O,
    settings: ControllerSettings,
    state: PagerState,
    /// Mutations that arrived while a pass was committing
    deferred: VecDeque<PagerEvent>,
    ids: SplitIdGenerator,
    session: u64,
    last_shape: Option<PartitionShape>,
    last_result: Option<PaginationResult>,
    pending_cursor: Option<CursorPosition>,
    cached_markup: Vec<String>,
}

impl<O: MeasurementOracle> RepaginationController<O> {
    pub fn new(oracle: O, settings: ControllerSettings) -> Self {
        Self {
            oracle,
            settings,
            state: PagerState::Idle,
            deferred: VecDeque::new(),
            ids: SplitIdGenerator::new(0),
            session: 0,
            last_shape: None,
            last_result: None,
            pending_cursor: None,
            cached_markup: Vec::new(),
        }
    }

    pub fn state(&self) -> PagerState {
        self.state
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Serialized blocks of the most recent pass, in flat page order
    pub fn cached_markup(&self) -> &[String] {
        &self.cached_markup
    }

    /// Partition computed by the most recent pass
    pub fn last_result(&self) -> Option<&PaginationResult> {
        self.last_result.as_ref()
    }

    pub fn page_count(&self) -> usize {
        self.last_result.as_ref().map_or(0, |r| r.page_count)
    }

    /// Feed one event
    pub fn dispatch<T: LiveTree + ?Sized>(
        &mut self,
        event: PagerEvent,
        tree: &mut T,
    ) -> Option<PassOutcome> {
        match event {
            PagerEvent::Mutation { at_ms } => {
                self.notify_mutation(at_ms);
                None
            }
            PagerEvent::Tick { now_ms } => self.poll(now_ms, tree),
            PagerEvent::Painted => {
                self.on_paint(tree);
                None
            }
        }
    }

    /// Record a mutation of the live tree
    pub fn notify_mutation(&mut self, now_ms: u64) {
        match self.state {
            PagerState::Idle | PagerState::PendingRepagination { .. } => {
                self.state = PagerState::PendingRepagination {
                    deadline_ms: now_ms.saturating_add(self.settings.debounce_ms),
                };
            }
            PagerState::Repaginating | PagerState::Committing => {
                log::debug!("deferring mutation at {now_ms}ms until the pass completes");
                self.deferred.push_back(PagerEvent::Mutation { at_ms: now_ms });
            }
        }
    }

    /// Run a pass if the debounce timer has expired
    pub fn poll<T: LiveTree + ?Sized>(&mut self, now_ms: u64, tree: &mut T) -> Option<PassOutcome> {
        match self.state {
            PagerState::PendingRepagination { deadline_ms } if now_ms >= deadline_ms => {
                Some(self.repaginate(tree))
            }
            _ => None,
        }
    }

    /// Run a pass now, ignoring the timer
    pub fn flush<T: LiveTree + ?Sized>(&mut self, tree: &mut T) -> PassOutcome {
        if self.state == PagerState::Committing {
            self.on_paint(tree);
        }
        self.repaginate(tree)
    }

    /// Restore the caret after the host painted a committed partition
    pub fn on_paint<T: LiveTree + ?Sized>(&mut self, tree: &mut T) {
        if self.state != PagerState::Committing {
            return;
        }

        if let Some(position) = self.pending_cursor.take() {
            let blocks = tree.blocks();
            match resolve(&blocks, position, Affinity::Downstream) {
                Some(caret) => tree.place_caret(caret),
                None => log::debug!(
                    "block {} is gone; leaving the caret to the host",
                    position.block_index
                ),
            }
        }

        self.state = PagerState::Idle;
        self.drain_deferred();
    }

    /// Replace the document wholesale.
    ///
    /// Split markers in the input are discarded and a new split-id session
    /// starts. The result is installed immediately.
    pub fn load<T: LiveTree + ?Sized>(
        &mut self,
        markup: &str,
        tree: &mut T,
    ) -> Result<PassOutcome, MarkupError> {
        let document = Document::from_markup(markup)?;
        self.session += 1;
        self.ids = SplitIdGenerator::new(self.session);
        self.deferred.clear();
        self.pending_cursor = None;

        let result = self.partition(document.blocks());
        tree.install(&result);
        let shape = PartitionShape::of(&result, self.settings.diff_mode);
        self.remember(result, shape);
        self.state = PagerState::Idle;

        log::debug!(
            "loaded {} blocks onto {} pages (session {})",
            document.block_count(),
            self.page_count(),
            self.session
        );
        Ok(PassOutcome::Committed {
            page_count: self.page_count(),
            cursor: None,
        })
    }

    fn repaginate<T: LiveTree + ?Sized>(&mut self, tree: &mut T) -> PassOutcome {
        self.state = PagerState::Repaginating;

        let live = tree.blocks();
        let source_cursor = tree
            .caret()
            .and_then(|caret| capture(&live, &caret))
            .map(|pos| (pos, to_source_position(&live, pos)));

        let blocks = recombine(&live);
        let result = self.partition(&blocks);
        let shape = PartitionShape::of(&result, self.settings.diff_mode);
        let changed = is_structural_change(self.last_shape.as_ref(), &shape);

        if !changed {
            let page_count = result.page_count;
            self.remember(result, shape);
            self.state = PagerState::Idle;
            log::debug!("pass unchanged ({page_count} pages)");
            self.drain_deferred();
            return PassOutcome::Unchanged { page_count };
        }

        self.state = PagerState::Committing;
        self.pending_cursor = source_cursor.map(|(literal, source)| {
            source
                .and_then(|(index, offset)| to_partition_position(&result, index, offset))
                .unwrap_or(literal)
        });
        tree.install(&result);
        let page_count = result.page_count;
        self.remember(result, shape);

        log::debug!("committed new partition ({page_count} pages)");
        PassOutcome::Committed {
            page_count,
            cursor: self.pending_cursor,
        }
    }

    fn partition(&self, blocks: &[Rc<ContentNode>]) -> PaginationResult {
        let measured = measure_blocks(blocks, &self.oracle);
        let splitter = Splitter::new(&self.oracle, &self.ids);
        paginate(
            measured,
            self.settings.content_height,
            &splitter,
            &self.settings.policy,
        )
    }

    fn remember(&mut self, result: PaginationResult, shape: PartitionShape) {
        self.cached_markup = result
            .flatten()
            .iter()
            .map(|node| node.to_markup())
            .collect();
        self.last_shape = Some(shape);
        self.last_result = Some(result);
    }

    fn drain_deferred(&mut self) {
        let latest = self
            .deferred
            .drain(..)
            .filter_map(|event| match event {
                PagerEvent::Mutation { at_ms } => Some(at_ms),
                _ => None,
            })
            .max();
        if let Some(at_ms) = latest {
            self.notify_mutation(at_ms);
        }
    }
}

/// Live position to (recombined block index, offset in the merged text)
fn to_source_position(live: &[Rc<ContentNode>], pos: CursorPosition) -> Option<(usize, usize)> {
    chain_spans(live)
        .into_iter()
        .enumerate()
        .find(|(_, span)| span.contains(&pos.block_index))
        .map(|(source, span)| {
            let before: usize = live[span.start..pos.block_index]
                .iter()
                .map(|node| node.text_len())
                .sum();
            (source, before + pos.text_offset)
        })
}

/// Fragment of `result` holding `offset` of source block `source`
fn to_partition_position(
    result: &PaginationResult,
    source: usize,
    offset: usize,
) -> Option<CursorPosition> {
    let mut found = None;
    let mut consumed = 0;
    for (flat, block) in result
        .pages
        .iter()
        .flat_map(|page| page.blocks.iter())
        .enumerate()
        .filter(|(_, block)| block.source_index == source)
    {
        let len = block.node.text_len();
        found = Some(CursorPosition::new(flat, offset.saturating_sub(consumed)));
        if offset < consumed + len {
            break;
        }
        consumed += len;
    }
    found
}
