//! Recombining split fragments into their original blocks

use crate::document::markup::{parse_block, root_attr};
use crate::document::{
    strip_marker, Child, ContentNode, SplitMarker, SplitStrategy, SPLIT_ID_ATTR,
};
use std::ops::Range;
use std::rc::Rc;

/// Group a block list into maximal runs sharing one split id.
///
/// Unmarked blocks form runs of length one.
pub fn chain_spans(blocks: &[Rc<ContentNode>]) -> Vec<Range<usize>> {
    let markers: Vec<Option<SplitMarker>> =
        blocks.iter().map(|block| SplitMarker::read(block)).collect();
    let mut spans = Vec::new();
    let mut start = 0;
    while start < blocks.len() {
        let mut end = start + 1;
        if let Some(marker) = &markers[start] {
            while end < blocks.len()
                && markers[end].as_ref().map(|m| &m.split_id) == Some(&marker.split_id)
            {
                end += 1;
            }
        }
        spans.push(start..end);
        start = end;
    }
    spans
}

/// Merge every run of sibling fragments back into one unmarked block.
///
/// Unmarked blocks pass through untouched, so the operation is idempotent.
pub fn recombine(blocks: &[Rc<ContentNode>]) -> Vec<Rc<ContentNode>> {
    chain_spans(blocks)
        .into_iter()
        .map(|span| {
            let run = &blocks[span];
            if SplitMarker::read(&run[0]).is_none() {
                return Rc::clone(&run[0]);
            }
            merge_fragments(run)
                .map(Rc::new)
                .unwrap_or_else(|| Rc::clone(&run[0]))
        })
        .collect()
}

/// Merge one chain of fragments under the first fragment's shell,
/// split markers stripped
pub fn merge_fragments(fragments: &[Rc<ContentNode>]) -> Option<ContentNode> {
    let first = fragments.first()?;
    let strategy = SplitMarker::read(first).and_then(|m| m.split_id.strategy());
    let parts: Vec<&ContentNode> = fragments.iter().map(|f| f.as_ref()).collect();
    Some(merge_with(strip_marker(first).shell(), &parts, strategy))
}

/// Merge fragment children under `shell`.
///
/// Text-boundary chains are joined at the seam: touching text runs
/// concatenate and an element cut in two is rejoined. Everything else
/// concatenates child lists.
pub(crate) fn merge_with(
    shell: ContentNode,
    fragments: &[&ContentNode],
    strategy: Option<SplitStrategy>,
) -> ContentNode {
    let mut children: Vec<Child> = Vec::new();
    for fragment in fragments {
        match strategy {
            Some(SplitStrategy::TextBoundary) => append_children(&mut children, fragment.children()),
            _ => children.extend(fragment.children().iter().cloned()),
        }
    }
    shell.with_children(children)
}

fn append_children(target: &mut Vec<Child>, next: &[Child]) {
    let mut rest = next.iter();
    if let (Some(last), Some(head)) = (target.last_mut(), next.first()) {
        if let Some(joined) = join_seam(last, head) {
            *last = joined;
            rest.next();
        }
    }
    target.extend(rest.cloned());
}

fn join_seam(left: &Child, right: &Child) -> Option<Child> {
    match (left, right) {
        (Child::Text(a), Child::Text(b)) => Some(Child::text(&format!("{a}{b}"))),
        (Child::Element(a), Child::Element(b)) if !a.is_atomic() && a.same_shell(b) => {
            let mut children = a.children().to_vec();
            append_children(&mut children, b.children());
            Some(Child::element(a.shell().with_children(children)))
        }
        _ => None,
    }
}

/// Merge one run of serialized fragments.
///
/// If any fragment fails to parse the first fragment is returned unmodified.
pub fn merge_markup(run: &[String]) -> Option<String> {
    let first = run.first()?;
    let parsed: Result<Vec<Rc<ContentNode>>, _> = run
        .iter()
        .map(|src| parse_block(src).map(Rc::new))
        .collect();
    match parsed {
        Ok(nodes) => merge_fragments(&nodes).map(|merged| merged.to_markup()),
        Err(err) => {
            log::warn!("keeping first fragment of a malformed split run: {err}");
            Some(first.clone())
        }
    }
}

/// Recombine serialized blocks.
///
/// Runs are grouped by the split id on each entry's root tag, read
/// without a full parse, and merged with [`merge_markup`]; a run holding
/// malformed markup collapses to its first fragment. Unmarked entries
/// pass through verbatim.
pub fn recombine_markup(fragments: &[String]) -> Vec<String> {
    let ids: Vec<Option<String>> = fragments.iter().map(|src| fragment_split_id(src)).collect();

    let mut out = Vec::with_capacity(fragments.len());
    let mut idx = 0;
    while idx < fragments.len() {
        let Some(id) = &ids[idx] else {
            out.push(fragments[idx].clone());
            idx += 1;
            continue;
        };
        let mut end = idx + 1;
        while ids.get(end).is_some_and(|next| next.as_ref() == Some(id)) {
            end += 1;
        }
        out.extend(merge_markup(&fragments[idx..end]));
        idx = end;
    }
    out
}

fn fragment_split_id(src: &str) -> Option<String> {
    root_attr(src, SPLIT_ID_ATTR)
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}
