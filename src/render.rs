//! Host-side rendering of a block document into terminal lines.
//!
//! Everything here sits on top of the core queries: visual lines come from
//! the layout module, styled runs from the segment resolver, and selection
//! shading from the range algebra. Nothing in this module mutates the
//! document.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthChar;

use crate::document::{Block, BlockDocument, BlockKind};
use crate::editor::selection::selection_for_block;
use crate::layout::segments::line_segments;
use crate::layout::{FontMetrics, compute_visual_lines};
use crate::richtext::StyleMask;
use crate::session::EditorSessionState;

/// Terminal cell metrics: advances are column counts at base size 1.
pub struct TermMetrics;

impl FontMetrics for TermMetrics {
    fn glyph_advance(&self, ch: char) -> Option<f32> {
        UnicodeWidthChar::width(ch).map(|width| width as f32)
    }

    fn space_advance(&self) -> f32 {
        1.0
    }

    fn base_size(&self) -> f32 {
        1.0
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CursorVisualPosition {
    pub line: usize,
    pub column: u16,
}

#[derive(Debug)]
pub struct RenderResult {
    pub lines: Vec<Line<'static>>,
    pub cursor: Option<CursorVisualPosition>,
    pub total_lines: usize,
}

pub fn render_document(
    document: &BlockDocument,
    width: usize,
    session: &EditorSessionState,
) -> RenderResult {
    let mut renderer = Renderer::new(width.max(1), session);
    for (index, block) in document.blocks().iter().enumerate() {
        if index > 0 {
            renderer.push_blank_line();
        }
        renderer.render_block(document, block, index);
    }
    renderer.finish()
}

struct Renderer<'a> {
    wrap_width: usize,
    session: &'a EditorSessionState,
    lines: Vec<Line<'static>>,
    cursor: Option<CursorVisualPosition>,
    numbered_run: usize,
}

impl<'a> Renderer<'a> {
    fn new(wrap_width: usize, session: &'a EditorSessionState) -> Self {
        Self {
            wrap_width,
            session,
            lines: Vec::new(),
            cursor: None,
            numbered_run: 0,
        }
    }

    fn render_block(&mut self, document: &BlockDocument, block: &Block, index: usize) {
        if block.kind != BlockKind::NumberedList {
            self.numbered_run = 0;
        }
        match block.kind {
            BlockKind::Divider => self.render_divider(),
            BlockKind::Table => self.render_table_placeholder(),
            BlockKind::CodeBlock => self.render_code_block(document, block, index),
            _ => {
                let (first_prefix, base_style) = self.block_prefix(block);
                let continuation = " ".repeat(visible_width(&first_prefix));
                self.render_text_block(
                    document,
                    block,
                    index,
                    &first_prefix,
                    &continuation,
                    base_style,
                );
            }
        }
    }

    fn block_prefix(&mut self, block: &Block) -> (String, Style) {
        let indent = "  ".repeat(block.indent as usize);
        match block.kind {
            BlockKind::BulletList => (format!("{indent}• "), Style::default()),
            BlockKind::NumberedList => {
                self.numbered_run += 1;
                (format!("{indent}{}. ", self.numbered_run), Style::default())
            }
            BlockKind::CheckboxList => {
                let marker = if block.checked { "[✓] " } else { "[ ] " };
                (format!("{indent}{marker}"), Style::default())
            }
            BlockKind::Quote => ("| ".to_string(), Style::default().add_modifier(Modifier::ITALIC)),
            kind if kind.heading_level().is_some() => {
                (String::new(), Style::default().add_modifier(Modifier::BOLD))
            }
            _ => (String::new(), Style::default()),
        }
    }

    fn render_text_block(
        &mut self,
        document: &BlockDocument,
        block: &Block,
        index: usize,
        first_prefix: &str,
        continuation_prefix: &str,
        base_style: Style,
    ) {
        let available = self
            .wrap_width
            .saturating_sub(visible_width(first_prefix))
            .max(1);
        let visual_lines =
            compute_visual_lines(block.text.text(), &TermMetrics, 1.0, true, available as f32);
        let selection = self
            .session
            .selection()
            .and_then(|range| selection_for_block(document, range, index));
        let caret = (index == self.session.focused_block).then_some(self.session.caret);

        for (line_index, visual) in visual_lines.iter().enumerate() {
            let prefix = if line_index == 0 {
                first_prefix
            } else {
                continuation_prefix
            };
            let mut spans: Vec<Span<'static>> = Vec::new();
            if !prefix.is_empty() {
                spans.push(Span::raw(prefix.to_string()));
            }
            for segment in line_segments(block.text.spans(), visual.start, visual.len) {
                push_segment_spans(
                    &mut spans,
                    block,
                    base_style,
                    segment.start,
                    segment.end,
                    segment.style,
                    selection,
                );
            }

            if let Some(caret) = caret {
                let is_last = line_index + 1 == visual_lines.len();
                let next_start = visual_lines.get(line_index + 1).map(|next| next.start);
                let owns_caret = caret >= visual.start
                    && (caret < visual.end()
                        || (caret == visual.end()
                            && (is_last || next_start != Some(visual.end()))));
                if owns_caret {
                    let column = visible_width(prefix)
                        + visible_width(block.text.text_range(visual.start, caret));
                    self.cursor = Some(CursorVisualPosition {
                        line: self.lines.len(),
                        column: column as u16,
                    });
                }
            }

            self.lines.push(Line::from(spans));
        }
    }

    fn render_code_block(&mut self, document: &BlockDocument, block: &Block, index: usize) {
        let fence = "-".repeat(self.wrap_width.min(40).max(4));
        self.push_plain_line(&fence);
        // Code lines break on newlines only, never wrap.
        let visual_lines =
            compute_visual_lines(block.text.text(), &TermMetrics, 1.0, false, 0.0);
        let selection = self
            .session
            .selection()
            .and_then(|range| selection_for_block(document, range, index));
        let caret = (index == self.session.focused_block).then_some(self.session.caret);
        let code_style = Style::default().add_modifier(Modifier::DIM);

        for visual in &visual_lines {
            let mut spans: Vec<Span<'static>> = Vec::new();
            push_segment_spans(
                &mut spans,
                block,
                code_style,
                visual.start,
                visual.end(),
                StyleMask::empty(),
                selection,
            );
            if let Some(caret) = caret {
                // Newline-only breaking: each caret offset maps to exactly
                // one line, the one whose inclusive end it sits at or before.
                if caret >= visual.start && caret <= visual.end() {
                    let column = visible_width(block.text.text_range(visual.start, caret));
                    self.cursor = Some(CursorVisualPosition {
                        line: self.lines.len(),
                        column: column as u16,
                    });
                }
            }
            self.lines.push(Line::from(spans));
        }
        self.push_plain_line(&fence);
    }

    fn render_divider(&mut self) {
        let rule: String = std::iter::repeat('─').take(self.wrap_width).collect();
        self.lines.push(Line::from(Span::styled(
            rule,
            Style::default().add_modifier(Modifier::DIM),
        )));
    }

    fn render_table_placeholder(&mut self) {
        self.lines.push(Line::from(Span::styled(
            "[ embedded table ]".to_string(),
            Style::default().add_modifier(Modifier::DIM),
        )));
    }

    fn push_blank_line(&mut self) {
        self.lines.push(Line::from(""));
    }

    fn push_plain_line(&mut self, content: &str) {
        self.lines.push(Line::from(Span::raw(content.to_string())));
    }

    fn finish(mut self) -> RenderResult {
        if self.lines.is_empty() {
            self.lines.push(Line::from(""));
        }
        let total_lines = self.lines.len();
        RenderResult {
            lines: self.lines,
            cursor: self.cursor,
            total_lines,
        }
    }
}

/// Emits one styled segment, splitting it further where the selection
/// starts or ends inside it.
fn push_segment_spans(
    spans: &mut Vec<Span<'static>>,
    block: &Block,
    base_style: Style,
    start: usize,
    end: usize,
    mask: StyleMask,
    selection: Option<(usize, usize)>,
) {
    if start >= end {
        return;
    }
    let style = segment_style(base_style, mask);
    let mut cuts = vec![start, end];
    if let Some((sel_start, sel_end)) = selection {
        for cut in [sel_start, sel_end] {
            if cut > start && cut < end {
                cuts.push(cut);
            }
        }
    }
    cuts.sort_unstable();
    cuts.dedup();
    for piece in cuts.windows(2) {
        let text = block.text.text_range(piece[0], piece[1]).to_string();
        if text.is_empty() {
            continue;
        }
        let selected = selection
            .map(|(sel_start, sel_end)| piece[0] >= sel_start && piece[1] <= sel_end)
            .unwrap_or(false);
        let piece_style = if selected {
            style.bg(Color::DarkGray)
        } else {
            style
        };
        spans.push(Span::styled(text, piece_style));
    }
}

fn segment_style(base: Style, mask: StyleMask) -> Style {
    let mut style = base;
    if mask.contains(StyleMask::BOLD) {
        style = style.add_modifier(Modifier::BOLD);
    }
    if mask.contains(StyleMask::ITALIC) {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if mask.contains(StyleMask::CODE) {
        style = style.add_modifier(Modifier::DIM);
    }
    if mask.contains(StyleMask::STRIKETHROUGH) {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    if mask.contains(StyleMask::UNDERLINE) {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    if mask.contains(StyleMask::HIGHLIGHT) {
        style = style.add_modifier(Modifier::REVERSED);
    }
    style
}

fn visible_width(text: &str) -> usize {
    text.chars()
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
        .sum()
}
