//! Split markers tying block fragments back to their original block

use crate::document::ContentNode;
use std::cell::Cell;
use std::fmt;

/// Reserved attribute holding the split id
pub const SPLIT_ID_ATTR: &str = "split-id";

/// Reserved attribute holding the fragment part (0 or 1)
pub const SPLIT_PART_ATTR: &str = "split-part";

/// How a chain of fragments was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitStrategy {
    /// Cut between immediate children
    ChildBoundary,
    /// Cut inside the linearized text
    TextBoundary,
}

impl SplitStrategy {
    fn prefix(self) -> char {
        match self {
            SplitStrategy::ChildBoundary => 'c',
            SplitStrategy::TextBoundary => 't',
        }
    }
}

/// Which side of a split a fragment is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SplitPart {
    First,
    Rest,
}

impl SplitPart {
    pub fn as_u8(self) -> u8 {
        match self {
            SplitPart::First => 0,
            SplitPart::Rest => 1,
        }
    }
}

/// Opaque identifier shared by sibling fragments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SplitId(String);

impl SplitId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Strategy encoded in ids minted by [`SplitIdGenerator`]
    pub fn strategy(&self) -> Option<SplitStrategy> {
        match self.0.chars().next() {
            Some('c') => Some(SplitStrategy::ChildBoundary),
            Some('t') => Some(SplitStrategy::TextBoundary),
            _ => None,
        }
    }
}

impl fmt::Display for SplitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Marker attached to the root of a fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitMarker {
    pub split_id: SplitId,
    pub part: SplitPart,
}

impl SplitMarker {
    pub fn new(split_id: SplitId, part: SplitPart) -> Self {
        Self { split_id, part }
    }

    /// Read the marker from a node's reserved attributes
    pub fn read(node: &ContentNode) -> Option<Self> {
        let id = node.attr(SPLIT_ID_ATTR)?.trim();
        if id.is_empty() {
            return None;
        }
        let part = match node.attr(SPLIT_PART_ATTR).map(str::trim) {
            Some("0") => SplitPart::First,
            _ => SplitPart::Rest,
        };
        Some(Self::new(SplitId::new(id), part))
    }

    /// Stamp the marker onto a node
    pub fn apply(&self, node: ContentNode) -> ContentNode {
        node.with_attr(SPLIT_ID_ATTR, self.split_id.as_str())
            .with_attr(SPLIT_PART_ATTR, self.part.as_u8().to_string())
    }
}

/// Copy of `node` without marker attributes
pub fn strip_marker(node: &ContentNode) -> ContentNode {
    node.without_attrs(&[SPLIT_ID_ATTR, SPLIT_PART_ATTR])
}

/// Mints split ids unique within one loaded session
#[derive(Debug)]
pub struct SplitIdGenerator {
    session: u64,
    next: Cell<u64>,
}

impl Default for SplitIdGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}

impl SplitIdGenerator {
    pub fn new(session: u64) -> Self {
        Self {
            session,
            next: Cell::new(0),
        }
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    /// Allocate a fresh id for a chain produced by `strategy`
    pub fn next_id(&self, strategy: SplitStrategy) -> SplitId {
        let seq = self.next.get();
        self.next.set(seq + 1);
        SplitId(format!("{}{:x}-{}", strategy.prefix(), self.session, seq))
    }
}
