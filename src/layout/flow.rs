//! Block flow over fixed font metrics

use crate::document::{BlockKind, Child, ContentNode};
use crate::layout::font::FontMetrics;
use crate::layout::line_break::LineBreaker;
use crate::layout::oracle::{Measurement, MeasurementOracle, TextProbe};
use std::ops::Range;

/// Chars of one text run that landed on the same line
#[derive(Debug, Clone, PartialEq)]
pub struct LineSpan {
    /// Char range local to the run
    pub chars: Range<usize>,
    pub top: f32,
    pub bottom: f32,
}

/// Vertical placement of every char of one text run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunPlacement {
    pub spans: Vec<LineSpan>,
}

impl RunPlacement {
    fn record(&mut self, char_offset: usize, top: f32, bottom: f32) {
        if let Some(last) = self.spans.last_mut() {
            if last.chars.end == char_offset && last.top == top && last.bottom == bottom {
                last.chars.end += 1;
                return;
            }
        }
        self.spans.push(LineSpan {
            chars: char_offset..char_offset + 1,
            top,
            bottom,
        });
    }

    /// Line extent holding `char_offset`; offsets past the end clamp to the last line
    pub fn probe(&self, char_offset: usize) -> Option<TextProbe> {
        self.spans
            .iter()
            .find(|span| span.chars.contains(&char_offset))
            .or_else(|| self.spans.last())
            .map(|span| TextProbe {
                top: span.top,
                bottom: span.bottom,
            })
    }
}

/// Result of flowing one block's content
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowLayout {
    /// Content height, own margins excluded
    pub height: f32,
    /// One entry per text run, in `text_runs` order
    pub runs: Vec<RunPlacement>,
}

/// Reference oracle: greedy line breaking over fixed metrics
#[derive(Debug, Clone)]
pub struct MetricsOracle {
    metrics: FontMetrics,
    content_width: f32,
    line_breaker: LineBreaker,
}

impl MetricsOracle {
    pub fn new(metrics: FontMetrics, content_width: f32) -> Self {
        Self {
            metrics,
            content_width,
            line_breaker: LineBreaker::new(),
        }
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    pub fn content_width(&self) -> f32 {
        self.content_width
    }

    /// Flow a node's content from y = 0
    pub fn layout_flow(&self, node: &ContentNode) -> FlowLayout {
        let kind = node.kind();
        if kind.is_atomic() {
            return FlowLayout {
                height: atomic_height(node),
                runs: Vec::new(),
            };
        }

        let mut state = FlowState::default();
        let ctx = FlowContext {
            width: (self.content_width - kind.indent()).max(1.0),
            line_height: self.metrics.line_height * kind.line_height_multiplier(),
        };
        self.flow_children(node, ctx, &mut state);
        self.flush(ctx, &mut state);

        FlowLayout {
            height: state.y,
            runs: state.runs,
        }
    }

    fn flow_children(&self, node: &ContentNode, ctx: FlowContext, state: &mut FlowState) {
        for child in node.children() {
            match child {
                Child::Text(text) => {
                    let run = state.runs.len();
                    state.runs.push(RunPlacement::default());
                    for (offset, c) in text.chars().enumerate() {
                        state.push_char(c, Some((run, offset)));
                    }
                }
                Child::Element(el) => match el.kind() {
                    BlockKind::LineBreak => state.push_char('\n', None),
                    kind @ BlockKind::Atomic(_) => {
                        self.flush(ctx, state);
                        state.y += kind.margin_top() + atomic_height(el) + kind.margin_bottom();
                    }
                    kind if kind.is_block_level() => {
                        self.flush(ctx, state);
                        state.y += kind.margin_top();
                        let inner = FlowContext {
                            width: (ctx.width - kind.indent()).max(1.0),
                            line_height: self.metrics.line_height
                                * kind.line_height_multiplier(),
                        };
                        self.flow_children(el, inner, state);
                        self.flush(inner, state);
                        state.y += kind.margin_bottom();
                    }
                    _ => self.flow_children(el, ctx, state),
                },
            }
        }
    }

    /// Break the pending inline content into lines and advance y
    fn flush(&self, ctx: FlowContext, state: &mut FlowState) {
        if state.buffer.is_empty() {
            return;
        }

        let glyphs = std::mem::take(&mut state.glyphs);
        let buffer = std::mem::take(&mut state.buffer);

        // Collapsible whitespace between blocks takes no room
        if buffer.trim().is_empty() {
            for (_, owner) in glyphs {
                if let Some((run, offset)) = owner {
                    state.runs[run].record(offset, state.y, state.y);
                }
            }
            return;
        }

        let lines = self
            .line_breaker
            .break_lines(&buffer, ctx.width, &self.metrics);
        let mut glyphs = glyphs.into_iter().peekable();
        for (idx, line) in lines.iter().enumerate() {
            let top = state.y + idx as f32 * ctx.line_height;
            let bottom = top + ctx.line_height;
            while let Some((byte, owner)) = glyphs.peek().copied() {
                if byte >= line.byte_range.end {
                    break;
                }
                glyphs.next();
                if let Some((run, offset)) = owner {
                    state.runs[run].record(offset, top, bottom);
                }
            }
        }
        state.y += lines.len() as f32 * ctx.line_height;
    }
}

impl MeasurementOracle for MetricsOracle {
    fn measure(&self, node: &ContentNode) -> Measurement {
        let kind = node.kind();
        Measurement {
            height: self.layout_flow(node).height,
            margin_top: kind.margin_top(),
            margin_bottom: kind.margin_bottom(),
            break_before: node.break_before(),
            break_after: node.break_after(),
        }
    }

    fn probe_position(
        &self,
        node: &ContentNode,
        run_index: usize,
        char_offset: usize,
    ) -> TextProbe {
        let flow = self.layout_flow(node);
        flow.runs
            .get(run_index)
            .and_then(|run| run.probe(char_offset))
            .unwrap_or(TextProbe {
                top: flow.height,
                bottom: flow.height,
            })
    }
}

#[derive(Debug, Clone, Copy)]
struct FlowContext {
    width: f32,
    line_height: f32,
}

#[derive(Debug, Default)]
struct FlowState {
    y: f32,
    buffer: String,
    /// Byte offset in `buffer` and owning (run, char) of every pending char
    glyphs: Vec<(usize, Option<(usize, usize)>)>,
    runs: Vec<RunPlacement>,
}

impl FlowState {
    fn push_char(&mut self, c: char, owner: Option<(usize, usize)>) {
        self.glyphs.push((self.buffer.len(), owner));
        self.buffer.push(c);
    }
}

/// Explicit `height` attribute, else the kind's default
fn atomic_height(node: &ContentNode) -> f32 {
    if matches!(
        node.kind(),
        BlockKind::Atomic(crate::document::AtomicKind::Script)
    ) {
        return 0.0;
    }
    node.attr("height")
        .map(|h| h.trim().trim_end_matches("px"))
        .and_then(|h| h.parse::<f32>().ok())
        .filter(|h| h.is_finite() && *h >= 0.0)
        .unwrap_or_else(|| node.kind().default_atomic_height())
}
