//! Plain text buffer plus overlapping style spans.
//!
//! Spans address char offsets, may overlap arbitrarily, and are never
//! assumed sorted. All edit operations keep span offsets consistent with the
//! buffer so callers never reason about raw offsets themselves.

use bitflags::bitflags;

bitflags! {
    /// Composable inline style bits carried by a [`RichSpan`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StyleMask: u8 {
        const BOLD = 1 << 0;
        const ITALIC = 1 << 1;
        const CODE = 1 << 2;
        const STRIKETHROUGH = 1 << 3;
        const UNDERLINE = 1 << 4;
        const HIGHLIGHT = 1 << 5;
    }
}

/// The fixed style bits, in rendering precedence order.
pub const STYLE_BITS: [StyleMask; 6] = [
    StyleMask::BOLD,
    StyleMask::ITALIC,
    StyleMask::CODE,
    StyleMask::STRIKETHROUGH,
    StyleMask::UNDERLINE,
    StyleMask::HIGHLIGHT,
];

/// A `[start, start+len)` char range carrying a style mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RichSpan {
    pub start: usize,
    pub len: usize,
    pub style: StyleMask,
}

impl RichSpan {
    pub fn new(start: usize, len: usize, style: StyleMask) -> Self {
        Self { start, len, style }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Styled text content of a single block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RichText {
    text: String,
    spans: Vec<RichSpan>,
}

impl RichText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spans: Vec::new(),
        }
    }

    pub fn with_span(mut self, start: usize, len: usize, style: StyleMask) -> Self {
        self.spans.push(RichSpan::new(start, len, style));
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn spans(&self) -> &[RichSpan] {
        &self.spans
    }

    /// Length in chars, the unit all span offsets are expressed in.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Slice of the buffer between two char offsets, clamped to the text.
    pub fn text_range(&self, start: usize, end: usize) -> &str {
        let from = char_to_byte_idx(&self.text, start);
        let to = char_to_byte_idx(&self.text, end.max(start));
        &self.text[from..to]
    }

    /// Replaces the plain text without touching the spans. Span migration is
    /// the caller's responsibility (split/merge do their own).
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Inserts `fragment` at char offset `pos`, shifting spans at or past the
    /// insertion point and growing spans the point falls inside of.
    pub fn insert_range(&mut self, pos: usize, fragment: &str) {
        let added = fragment.chars().count();
        if added == 0 {
            return;
        }
        let pos = pos.min(self.len());
        let byte_idx = char_to_byte_idx(&self.text, pos);
        self.text.insert_str(byte_idx, fragment);
        for span in &mut self.spans {
            if span.start >= pos {
                span.start += added;
            } else if span.end() > pos {
                span.len += added;
            }
        }
    }

    /// Deletes `len` chars starting at char offset `start`, contracting or
    /// dropping the spans that overlap the removed range.
    pub fn delete_range(&mut self, start: usize, len: usize) {
        let total = self.len();
        let start = start.min(total);
        let end = (start + len).min(total);
        if start >= end {
            return;
        }
        let removed = end - start;
        let from = char_to_byte_idx(&self.text, start);
        let to = char_to_byte_idx(&self.text, end);
        self.text.drain(from..to);
        let collapse = |offset: usize| {
            if offset <= start {
                offset
            } else if offset >= end {
                offset - removed
            } else {
                start
            }
        };
        self.spans.retain_mut(|span| {
            let new_start = collapse(span.start);
            let new_end = collapse(span.end());
            span.start = new_start;
            span.len = new_end - new_start;
            span.len > 0
        });
    }

    pub fn replace_range(&mut self, start: usize, len: usize, fragment: &str) {
        self.delete_range(start, len);
        self.insert_range(start, fragment);
    }

    /// Uniform toggle: adds `style` across the range when any covered char
    /// lacks it, otherwise removes it across the range.
    pub fn toggle_span(&mut self, start: usize, len: usize, style: StyleMask) {
        if style.is_empty() {
            return;
        }
        let total = self.len();
        let start = start.min(total);
        let end = (start + len).min(total);
        if start >= end {
            return;
        }
        if !self.range_fully_styled(start, end, style) {
            self.spans.push(RichSpan::new(start, end - start, style));
            return;
        }
        let mut rebuilt = Vec::with_capacity(self.spans.len());
        for span in self.spans.drain(..) {
            if !span.style.intersects(style) || span.end() <= start || span.start >= end {
                rebuilt.push(span);
                continue;
            }
            let mid_start = span.start.max(start);
            let mid_end = span.end().min(end);
            if span.start < mid_start {
                rebuilt.push(RichSpan::new(span.start, mid_start - span.start, span.style));
            }
            let stripped = span.style.difference(style);
            if !stripped.is_empty() {
                rebuilt.push(RichSpan::new(mid_start, mid_end - mid_start, stripped));
            }
            if mid_end < span.end() {
                rebuilt.push(RichSpan::new(mid_end, span.end() - mid_end, span.style));
            }
        }
        self.spans = rebuilt;
    }

    fn range_fully_styled(&self, start: usize, end: usize, style: StyleMask) -> bool {
        (start..end).all(|offset| {
            let mut combined = StyleMask::empty();
            for span in &self.spans {
                if span.start <= offset && offset < span.end() {
                    combined |= span.style;
                }
            }
            combined.contains(style)
        })
    }

    /// Splits into the content before and after char offset `pos`. Spans
    /// straddling the split are clipped to each side; spans that become
    /// degenerate are dropped.
    pub fn split_at(&self, pos: usize) -> (RichText, RichText) {
        let pos = pos.min(self.len());
        let byte_idx = char_to_byte_idx(&self.text, pos);
        let mut head = RichText::plain(&self.text[..byte_idx]);
        let mut tail = RichText::plain(&self.text[byte_idx..]);
        for span in &self.spans {
            let head_end = span.end().min(pos);
            if span.start < head_end {
                head.spans
                    .push(RichSpan::new(span.start, head_end - span.start, span.style));
            }
            let tail_start = span.start.max(pos);
            if tail_start < span.end() {
                tail.spans.push(RichSpan::new(
                    tail_start - pos,
                    span.end() - tail_start,
                    span.style,
                ));
            }
        }
        (head, tail)
    }

    /// Concatenation for block merges: re-bases the right side's spans and
    /// coalesces spans that meet at the join with the same style, so a split
    /// followed by a merge restores the original span list.
    pub fn concat(&self, other: &RichText) -> RichText {
        let join = self.len();
        let mut result = self.clone();
        result.text.push_str(&other.text);
        for span in &other.spans {
            if span.len == 0 {
                continue;
            }
            let shifted = RichSpan::new(span.start + join, span.len, span.style);
            if shifted.start == join {
                if let Some(existing) = result
                    .spans
                    .iter_mut()
                    .find(|left| left.end() == join && left.style == span.style)
                {
                    existing.len += shifted.len;
                    continue;
                }
            }
            result.spans.push(shifted);
        }
        result
    }
}

/// Maps a char offset into a byte offset, clamping past-the-end offsets.
pub(crate) fn char_to_byte_idx(text: &str, char_idx: usize) -> usize {
    if char_idx == 0 {
        return 0;
    }
    for (count, (byte_idx, _)) in text.char_indices().enumerate() {
        if count == char_idx {
            return byte_idx;
        }
    }
    text.len()
}

#[cfg(test)]
#[path = "richtext_tests.rs"]
mod richtext_tests;
