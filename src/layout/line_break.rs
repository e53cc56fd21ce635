//! Line breaking algorithm

use crate::layout::font::FontMetrics;
use std::ops::Range;
use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

/// One laid-out line of an inline run
#[derive(Debug, Clone, PartialEq)]
pub struct LineBox {
    /// Byte range of the source text covered by this line.
    /// Consecutive lines tile the text, trailing spaces and newlines included.
    pub byte_range: Range<usize>,
    /// Advance width, trailing whitespace excluded
    pub width: f32,
}

/// Greedy line breaker over Unicode break opportunities
#[derive(Debug, Clone, Copy, Default)]
pub struct LineBreaker;

impl LineBreaker {
    pub fn new() -> Self {
        Self
    }

    /// Break `text` into lines no wider than `max_width`
    pub fn break_lines(&self, text: &str, max_width: f32, metrics: &FontMetrics) -> Vec<LineBox> {
        if text.is_empty() {
            return vec![LineBox {
                byte_range: 0..0,
                width: 0.0,
            }];
        }

        let mut lines = Vec::new();
        let mut line_start = 0;
        let mut line_width: f32 = 0.0;
        let mut segment_start = 0;

        for (offset, opportunity) in linebreaks(text) {
            let segment = &text[segment_start..offset];
            let trimmed = segment.trim_end();
            let full_width = text_width(segment, metrics);
            let visible_width = text_width(trimmed, metrics);

            // Soft wrap before this segment
            if line_start < segment_start && line_width + visible_width > max_width {
                lines.push(LineBox {
                    byte_range: line_start..segment_start,
                    width: line_width,
                });
                line_start = segment_start;
                line_width = 0.0;
            }

            // A single word wider than the line: emergency break by grapheme
            if line_start == segment_start && visible_width > max_width {
                let mut x: f32 = 0.0;
                for (idx, grapheme) in trimmed.grapheme_indices(true) {
                    let w = metrics.grapheme_width(grapheme);
                    let at = segment_start + idx;
                    if x + w > max_width && at > line_start {
                        lines.push(LineBox {
                            byte_range: line_start..at,
                            width: x,
                        });
                        line_start = at;
                        x = 0.0;
                    }
                    x += w;
                }
                line_width = x + (full_width - visible_width);
            } else {
                line_width += full_width;
            }

            let hard_break = opportunity == BreakOpportunity::Mandatory
                && offset < text.len()
                || (offset == text.len() && text.ends_with('\n'));
            if hard_break {
                lines.push(LineBox {
                    byte_range: line_start..offset,
                    width: text_width(text[line_start..offset].trim_end(), metrics),
                });
                line_start = offset;
                line_width = 0.0;
            }

            segment_start = offset;
        }

        if line_start < text.len() || lines.is_empty() {
            lines.push(LineBox {
                byte_range: line_start..text.len(),
                width: text_width(text[line_start..].trim_end(), metrics),
            });
        }

        lines
    }
}

fn text_width(text: &str, metrics: &FontMetrics) -> f32 {
    text.graphemes(true).map(|g| metrics.grapheme_width(g)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> FontMetrics {
        FontMetrics::monospace(10.0, 8.0)
    }

    #[test]
    fn test_empty_text() {
        let lines = LineBreaker::new().break_lines("", 100.0, &metrics());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].byte_range, 0..0);
    }

    #[test]
    fn test_single_line() {
        let lines = LineBreaker::new().break_lines("Hello", 100.0, &metrics());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].byte_range, 0..5);
        assert_eq!(lines[0].width, 40.0);
    }

    #[test]
    fn test_line_wrap() {
        // With 8px per char, 40px width = 5 chars per line
        let lines = LineBreaker::new().break_lines("Hello World", 40.0, &metrics());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].byte_range, 0..6);
        assert_eq!(lines[1].byte_range, 6..11);
    }

    #[test]
    fn test_explicit_newline() {
        let lines = LineBreaker::new().break_lines("Hello\nWorld", 1000.0, &metrics());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].byte_range, 0..6);
        assert_eq!(lines[1].byte_range, 6..11);
    }

    #[test]
    fn test_long_word_breaks_by_grapheme() {
        let lines = LineBreaker::new().break_lines("abcdefghijkl", 40.0, &metrics());
        let ranges: Vec<_> = lines.iter().map(|l| l.byte_range.clone()).collect();
        assert_eq!(ranges, vec![0..5, 5..10, 10..12]);
    }

    #[test]
    fn test_lines_tile_the_text() {
        let text = "The quick brown fox jumps over the lazy dog\nand again";
        let lines = LineBreaker::new().break_lines(text, 64.0, &metrics());
        let mut expected_start = 0;
        for line in &lines {
            assert_eq!(line.byte_range.start, expected_start);
            expected_start = line.byte_range.end;
        }
        assert_eq!(expected_start, text.len());
    }
}
