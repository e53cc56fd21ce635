//! Immutable content tree
//!
//! Nodes are plain values shared through `Rc`: cloning a node to build a
//! fragment copies one level and shares every untouched subtree.

use crate::document::block::BlockKind;
use smallvec::SmallVec;
use std::ops::Range;
use std::rc::Rc;

/// Path of child indices from a block root down to one of its nodes
pub type NodePath = SmallVec<[usize; 8]>;

/// A child of a content node: a nested element or a text run
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Element(Rc<ContentNode>),
    Text(Rc<str>),
}

impl Child {
    /// Create a text child
    pub fn text(text: &str) -> Self {
        Child::Text(Rc::from(text))
    }

    /// Wrap an element
    pub fn element(node: ContentNode) -> Self {
        Child::Element(Rc::new(node))
    }

    /// Number of linearized characters this child contributes
    pub fn text_len(&self) -> usize {
        match self {
            Child::Text(text) => text.chars().count(),
            Child::Element(node) if node.is_atomic() => 0,
            Child::Element(node) => node.text_len(),
        }
    }
}

/// One markup element: tag, ordered attributes and ordered children
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContentNode {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Child>,
}

impl ContentNode {
    /// Create an empty element
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: set an attribute (replacing an existing value in place)
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder: append a text run
    pub fn with_text(mut self, text: &str) -> Self {
        self.push_child(Child::text(text));
        self
    }

    /// Builder: append a nested element
    pub fn with_element(mut self, node: ContentNode) -> Self {
        self.push_child(Child::element(node));
        self
    }

    /// Builder: replace all children
    pub fn with_children(mut self, children: impl IntoIterator<Item = Child>) -> Self {
        self.children.clear();
        for child in children {
            self.push_child(child);
        }
        self
    }

    /// Append a child, coalescing adjacent text runs and dropping empty ones
    pub fn push_child(&mut self, child: Child) {
        if let Child::Text(text) = &child {
            if text.is_empty() {
                return;
            }
            if let Some(Child::Text(prev)) = self.children.last_mut() {
                let joined = format!("{prev}{text}");
                *prev = Rc::from(joined);
                return;
            }
        }
        self.children.push(child);
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into().to_ascii_lowercase();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Copy without the named attributes
    pub fn without_attrs(&self, keys: &[&str]) -> Self {
        Self {
            tag: self.tag.clone(),
            attributes: self
                .attributes
                .iter()
                .filter(|(k, _)| !keys.contains(&k.as_str()))
                .cloned()
                .collect(),
            children: self.children.clone(),
        }
    }

    /// Same tag and attributes, no children
    pub fn shell(&self) -> Self {
        Self {
            tag: self.tag.clone(),
            attributes: self.attributes.clone(),
            children: Vec::new(),
        }
    }

    /// Check whether two nodes share tag and attributes
    pub fn same_shell(&self, other: &ContentNode) -> bool {
        self.tag == other.tag && self.attributes == other.attributes
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn kind(&self) -> BlockKind {
        BlockKind::from_tag(&self.tag)
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// Element children only
    pub fn elements(&self) -> impl Iterator<Item = &Rc<ContentNode>> + '_ {
        self.children.iter().filter_map(|child| match child {
            Child::Element(node) => Some(node),
            Child::Text(_) => None,
        })
    }

    /// Check if this element is never split or entered for text
    pub fn is_atomic(&self) -> bool {
        self.kind().is_atomic()
    }

    /// Value of an inline style property (case-insensitive name)
    pub fn style_property(&self, name: &str) -> Option<&str> {
        let style = self.attr("style")?;
        style
            .split(';')
            .filter_map(|decl| decl.split_once(':'))
            .find(|(prop, _)| prop.trim().eq_ignore_ascii_case(name))
            .map(|(_, value)| value.trim())
    }

    /// Forced page break before this element
    pub fn break_before(&self) -> bool {
        forces_break(self.style_property("break-before"))
            || forces_break(self.style_property("page-break-before"))
    }

    /// Forced page break after this element
    pub fn break_after(&self) -> bool {
        forces_break(self.style_property("break-after"))
            || forces_break(self.style_property("page-break-after"))
    }

    /// Text runs in document order, skipping atomic subtrees
    pub fn text_runs(&self) -> Vec<&str> {
        let mut runs = Vec::new();
        self.visit_runs(&mut NodePath::new(), &mut |_, text| runs.push(text));
        runs
    }

    /// Text runs with the child path leading to each of them
    pub fn text_runs_with_paths(&self) -> Vec<(NodePath, &str)> {
        let mut runs = Vec::new();
        self.visit_runs(&mut NodePath::new(), &mut |path, text| {
            runs.push((path.clone(), text))
        });
        runs
    }

    fn visit_runs<'a>(&'a self, path: &mut NodePath, f: &mut dyn FnMut(&NodePath, &'a str)) {
        for (idx, child) in self.children.iter().enumerate() {
            path.push(idx);
            match child {
                Child::Text(text) => f(path, text),
                Child::Element(node) if node.is_atomic() => {}
                Child::Element(node) => node.visit_runs(path, f),
            }
            path.pop();
        }
    }

    /// Total linearized text length in chars
    pub fn text_len(&self) -> usize {
        self.children.iter().map(Child::text_len).sum()
    }

    /// Linearized text content
    pub fn text(&self) -> String {
        self.text_runs().concat()
    }

    /// Node at a child path, if the path is valid
    pub fn child_at(&self, path: &[usize]) -> Option<&Child> {
        let (last, parents) = path.split_last()?;
        let mut node = self;
        for idx in parents {
            match node.children.get(*idx)? {
                Child::Element(child) => node = child,
                Child::Text(_) => return None,
            }
        }
        node.children.get(*last)
    }

    /// Contains an atomic element anywhere below
    pub fn has_atomic_descendant(&self) -> bool {
        self.elements()
            .any(|node| node.is_atomic() || node.has_atomic_descendant())
    }

    /// No visible text and nothing atomic
    pub fn is_blank(&self) -> bool {
        self.text_runs()
            .iter()
            .all(|run| run.trim().is_empty())
            && !self.has_atomic_descendant()
    }

    /// Has a direct text child with non-whitespace content
    pub fn has_direct_text(&self) -> bool {
        self.children
            .iter()
            .any(|child| matches!(child, Child::Text(text) if !text.trim().is_empty()))
    }

    /// Copy keeping only the text in `range` (char offsets over the linearized text).
    ///
    /// Elements straddling a range boundary are cloned with their children
    /// sliced, so inline formatting survives on both sides of a cut.
    /// Zero-length elements belong to the range containing their position;
    /// those at the very end of the text belong to the range ending there.
    pub fn slice_text(&self, range: Range<usize>) -> ContentNode {
        let total = self.text_len();
        let mut pos = 0;
        let children = slice_children(&self.children, &range, total, &mut pos);
        self.shell().with_children(children)
    }
}

fn forces_break(value: Option<&str>) -> bool {
    matches!(
        value.map(str::to_ascii_lowercase).as_deref(),
        Some("always" | "page" | "left" | "right" | "recto" | "verso")
    )
}

fn owns_point(range: &Range<usize>, point: usize, total: usize) -> bool {
    (range.start..range.end).contains(&point) || (point == range.end && range.end == total)
}

fn slice_children(
    children: &[Child],
    range: &Range<usize>,
    total: usize,
    pos: &mut usize,
) -> Vec<Child> {
    let mut out = Vec::new();
    for child in children {
        let start = *pos;
        let len = child.text_len();
        let end = start + len;
        *pos = end;

        if len == 0 {
            if owns_point(range, start, total) {
                out.push(child.clone());
            }
            continue;
        }
        if start >= range.end || end <= range.start {
            continue;
        }
        if start >= range.start && end <= range.end {
            out.push(child.clone());
            continue;
        }

        match child {
            Child::Text(text) => {
                let lo = range.start.max(start) - start;
                let hi = range.end.min(end) - start;
                out.push(Child::text(char_slice(text, lo..hi)));
            }
            Child::Element(node) => {
                let mut inner = start;
                let sliced = slice_children(&node.children, range, total, &mut inner);
                out.push(Child::element(node.shell().with_children(sliced)));
            }
        }
    }
    out
}

/// Substring by char offsets
pub(crate) fn char_slice(text: &str, range: Range<usize>) -> &str {
    let byte_at = |char_idx: usize| {
        text.char_indices()
            .nth(char_idx)
            .map(|(b, _)| b)
            .unwrap_or(text.len())
    };
    &text[byte_at(range.start)..byte_at(range.end)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para() -> ContentNode {
        ContentNode::new("p")
            .with_text("Hello ")
            .with_element(ContentNode::new("b").with_text("bold words"))
            .with_text(" tail")
    }

    #[test]
    fn test_text_coalescing() {
        let node = ContentNode::new("p").with_text("a").with_text("").with_text("b");
        assert_eq!(node.children().len(), 1);
        assert_eq!(node.text(), "ab");
    }

    #[test]
    fn test_text_runs_skip_atomic() {
        let node = ContentNode::new("div")
            .with_text("one")
            .with_element(ContentNode::new("script").with_text("var x;"))
            .with_element(ContentNode::new("span").with_text("two"));
        assert_eq!(node.text_runs(), vec!["one", "two"]);
        assert_eq!(node.text_len(), 6);

        let paths = node.text_runs_with_paths();
        assert_eq!(paths[1].0.as_slice(), &[2, 0]);
    }

    #[test]
    fn test_break_flags_from_style() {
        let node = ContentNode::new("p").with_attr("style", "color: red; Page-Break-Before: always");
        assert!(node.break_before());
        assert!(!node.break_after());

        let node = ContentNode::new("p").with_attr("style", "break-after:page");
        assert!(node.break_after());

        let node = ContentNode::new("p").with_attr("style", "break-after: auto");
        assert!(!node.break_after());
    }

    #[test]
    fn test_slice_cuts_inline_formatting() {
        let node = para();
        // "Hello bold words tail", cut inside "bold words"
        let first = node.slice_text(0..10);
        let second = node.slice_text(10..node.text_len());

        assert_eq!(first.text(), "Hello bold");
        assert_eq!(second.text(), " words tail");
        assert!(matches!(first.children().last(), Some(Child::Element(b)) if b.tag() == "b"));
        assert!(matches!(second.children().first(), Some(Child::Element(b)) if b.tag() == "b"));
    }

    #[test]
    fn test_slice_places_zero_length_elements_once() {
        let node = ContentNode::new("p")
            .with_text("abc")
            .with_element(ContentNode::new("br"))
            .with_text("def")
            .with_element(ContentNode::new("img").with_attr("src", "x.png"));

        let first = node.slice_text(0..3);
        let second = node.slice_text(3..6);
        assert_eq!(first.children().len(), 1);
        assert_eq!(second.children().len(), 3);
    }

    #[test]
    fn test_blank_detection() {
        assert!(ContentNode::new("p").with_text("  \n ").is_blank());
        assert!(!ContentNode::new("p").with_element(ContentNode::new("img")).is_blank());
        assert!(!para().is_blank());
    }

    #[test]
    fn test_child_at() {
        let node = para();
        assert!(matches!(node.child_at(&[1, 0]), Some(Child::Text(t)) if &**t == "bold words"));
        assert!(node.child_at(&[0, 0]).is_none());
        assert!(node.child_at(&[]).is_none());
    }
}
