//! Splitting between immediate children

use crate::document::{Child, ContentNode};
use crate::layout::{MeasurementOracle, EPSILON};

/// Whether a child-boundary cut can apply: more than one element child
/// and no loose text of its own
pub(crate) fn applies(node: &ContentNode) -> bool {
    node.elements().nth(1).is_some() && !node.has_direct_text()
}

/// Cut before the first child whose bottom edge passes `budget`.
///
/// Child heights are outer heights stacked from the block's content top.
pub(crate) fn split_at_children<O: MeasurementOracle + ?Sized>(
    node: &ContentNode,
    budget: f32,
    oracle: &O,
) -> Option<(ContentNode, ContentNode)> {
    if !applies(node) {
        return None;
    }

    let mut bottom = 0.0;
    let mut cut = None;
    for (idx, child) in node.children().iter().enumerate() {
        if let Child::Element(el) = child {
            bottom += oracle.measure(el).outer_height();
            if bottom > budget + EPSILON {
                cut = Some(idx);
                break;
            }
        }
    }
    let cut = cut?;

    let (head, tail) = node.children().split_at(cut);
    if !head.iter().any(|child| matches!(child, Child::Element(_))) {
        return None;
    }

    let first = node.shell().with_children(head.iter().cloned());
    let second = node.shell().with_children(tail.iter().cloned());
    Some((first, second))
}
