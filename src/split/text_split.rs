//! Splitting inside the linearized text

use crate::document::ContentNode;
use crate::layout::{MeasurementOracle, EPSILON};
use unicode_segmentation::UnicodeSegmentation;

/// First char offset (over the linearized text) whose line box ends
/// below `budget`, found by probing each run's last char and then
/// binary-searching the run that crosses the boundary
pub(crate) fn natural_break<O: MeasurementOracle + ?Sized>(
    node: &ContentNode,
    budget: f32,
    oracle: &O,
) -> Option<usize> {
    let fits = |run: usize, offset: usize| {
        oracle.probe_position(node, run, offset).bottom <= budget + EPSILON
    };

    let mut run_start = 0;
    for (run_idx, run) in node.text_runs().iter().enumerate() {
        let len = run.chars().count();
        if len == 0 || fits(run_idx, len - 1) {
            run_start += len;
            continue;
        }

        // Invariant: offsets >= hi overflow
        let (mut lo, mut hi) = (0, len - 1);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if fits(run_idx, mid) {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        return Some(run_start + lo);
    }
    None
}

/// Choose the cut offset for a natural break.
///
/// Backs up to the nearest whitespace at or before `natural`. Without one,
/// a single-run block is not splittable; a multi-run block is cut at the
/// last grapheme boundary not after `natural`.
pub(crate) fn choose_offset(runs: &[&str], natural: usize) -> Option<usize> {
    if natural == 0 {
        return None;
    }
    let text: String = runs.concat();
    let chars: Vec<char> = text.chars().collect();
    if natural >= chars.len() {
        return None;
    }

    if let Some(at) = (1..=natural).rev().find(|&i| chars[i].is_whitespace()) {
        return Some(at);
    }
    if runs.iter().filter(|run| !run.is_empty()).count() < 2 {
        return None;
    }

    let mut char_idx = 0;
    let mut best = None;
    let mut last_byte = 0;
    for (byte, _) in text.grapheme_indices(true) {
        char_idx += text[last_byte..byte].chars().count();
        last_byte = byte;
        if char_idx > natural {
            break;
        }
        if char_idx > 0 {
            best = Some(char_idx);
        }
    }
    best
}

/// Cut a block's text so the first half fits in `budget`
pub(crate) fn split_at_text<O: MeasurementOracle + ?Sized>(
    node: &ContentNode,
    budget: f32,
    oracle: &O,
) -> Option<(ContentNode, ContentNode)> {
    let natural = natural_break(node, budget, oracle)?;
    let runs = node.text_runs();
    let at = choose_offset(&runs, natural)?;
    let total = node.text_len();
    Some((node.slice_text(0..at), node.slice_text(at..total)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Measurement, TextProbe};

    /// One char per 1px line across all runs
    struct CharLines;

    impl MeasurementOracle for CharLines {
        fn measure(&self, node: &ContentNode) -> Measurement {
            Measurement {
                height: node.text_len() as f32,
                ..Measurement::default()
            }
        }

        fn probe_position(&self, node: &ContentNode, run: usize, offset: usize) -> TextProbe {
            let before: usize = node.text_runs()[..run]
                .iter()
                .map(|r| r.chars().count())
                .sum();
            let top = (before + offset) as f32;
            TextProbe {
                top,
                bottom: top + 1.0,
            }
        }
    }

    #[test]
    fn test_natural_break_across_runs() {
        let node = ContentNode::new("p")
            .with_text("abcd")
            .with_element(ContentNode::new("i").with_text("efgh"));
        assert_eq!(natural_break(&node, 6.0, &CharLines), Some(6));
        assert_eq!(natural_break(&node, 2.0, &CharLines), Some(2));
        assert_eq!(natural_break(&node, 8.0, &CharLines), None);
    }

    #[test]
    fn test_backs_up_to_whitespace() {
        assert_eq!(choose_offset(&["hello world again"], 14), Some(11));
        assert_eq!(choose_offset(&["hello world"], 5), Some(5));
    }

    #[test]
    fn test_single_run_without_whitespace_rejects() {
        assert_eq!(choose_offset(&["abcdefgh"], 4), None);
        assert_eq!(choose_offset(&["abc def"], 0), None);
    }

    #[test]
    fn test_multi_run_snaps_to_grapheme() {
        // "e" + combining acute spans chars 4..6
        assert_eq!(choose_offset(&["abcde\u{301}", "fg"], 5), Some(4));
        assert_eq!(choose_offset(&["abcd", "efgh"], 6), Some(6));
    }

    #[test]
    fn test_split_keeps_formatting_on_both_sides() {
        let node = ContentNode::new("p")
            .with_text("one two ")
            .with_element(ContentNode::new("b").with_text("three four"))
            .with_text(" five");
        // natural break inside "four", backs up to the space before it
        let (first, second) = split_at_text(&node, 15.0, &CharLines).unwrap();
        assert_eq!(first.text(), "one two three");
        assert_eq!(second.text(), " four five");
        assert_eq!(first.to_markup(), "<p>one two <b>three</b></p>");
        assert_eq!(second.to_markup(), "<p><b> four</b> five</p>");
    }
}
