//! Greedy word-wrap layout over the advance-width-per-codepoint model.
//!
//! Pure and idempotent: safe to recompute from `(text, width, metrics)`
//! every frame. Any caching belongs to the host.

pub mod segments;

/// Width a tab occupies, in multiples of the space advance.
const TAB_ADVANCE_FACTOR: f32 = 4.0;

/// Per-codepoint advance widths, expressed at some base size.
///
/// `space_advance` doubles as the fallback for codepoints without a glyph and
/// must never be zero, so layout always makes forward progress.
pub trait FontMetrics {
    fn glyph_advance(&self, ch: char) -> Option<f32>;
    fn space_advance(&self) -> f32;
    fn base_size(&self) -> f32;
}

/// One wrapped rendered line: a `(start, len)` char slice of logical text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisualLine {
    pub start: usize,
    pub len: usize,
}

impl VisualLine {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Breaks `text` into visual lines. The returned ranges cover the text
/// exactly, in order, with no gaps or overlaps; the chars consumed by `\n`
/// sit between adjacent ranges. Always returns at least one (possibly
/// empty) line.
///
/// With `word_wrap` off, or a non-positive `wrap_width`, only explicit
/// newlines break lines.
pub fn compute_visual_lines(
    text: &str,
    metrics: &dyn FontMetrics,
    font_size: f32,
    word_wrap: bool,
    wrap_width: f32,
) -> Vec<VisualLine> {
    let chars: Vec<char> = text.chars().collect();
    let scale = if metrics.base_size() > 0.0 {
        font_size / metrics.base_size()
    } else {
        1.0
    };
    let fallback = metrics.space_advance() * scale;
    let wrapping = word_wrap && wrap_width > 0.0;

    let mut lines = Vec::new();
    let mut line_start = 0usize;
    let mut width = 0.0f32;
    let mut last_break: Option<usize> = None;
    let mut idx = 0usize;

    while idx < chars.len() {
        let ch = chars[idx];
        if ch == '\n' {
            lines.push(VisualLine {
                start: line_start,
                len: idx - line_start,
            });
            line_start = idx + 1;
            width = 0.0;
            last_break = None;
            idx += 1;
            continue;
        }
        if ch == '\r' {
            idx += 1;
            continue;
        }
        let advance = match ch {
            '\t' => fallback * TAB_ADVANCE_FACTOR,
            _ => metrics
                .glyph_advance(ch)
                .map(|glyph| glyph * scale)
                .unwrap_or(fallback),
        };
        if wrapping && idx > line_start && width + advance > wrap_width {
            // Prefer the last space/tab in this line, consuming the break
            // char into the emitted line; without one, hard-break mid-word
            // so unbreakable runs wider than the wrap width still progress.
            let wrap_end = match last_break {
                Some(break_idx) if break_idx >= line_start => break_idx + 1,
                _ => idx,
            };
            lines.push(VisualLine {
                start: line_start,
                len: wrap_end - line_start,
            });
            line_start = wrap_end;
            width = 0.0;
            last_break = None;
            // Re-scan from the wrap point; the char that overflowed is not
            // skipped.
            idx = wrap_end;
            continue;
        }
        width += advance;
        if ch == ' ' || ch == '\t' {
            last_break = Some(idx);
        }
        idx += 1;
    }

    lines.push(VisualLine {
        start: line_start,
        len: chars.len() - line_start,
    });
    lines
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod layout_tests;
