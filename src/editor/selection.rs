//! Selection range algebra across one or more blocks.

use crate::document::BlockDocument;

/// A normalized cross-block selection: `start_block <= end_block`, and for a
/// single-block range the offsets are ordered too.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackedRange {
    pub start_block: usize,
    pub start_offset: usize,
    pub end_block: usize,
    pub end_offset: usize,
}

impl TrackedRange {
    /// Normalizes an anchor/focus pair, each a `(block index, char offset)`.
    /// The lower block index always becomes the start; within one block the
    /// lower offset does.
    pub fn from_anchor_focus(anchor: (usize, usize), focus: (usize, usize)) -> Self {
        let (start, end) = if anchor <= focus {
            (anchor, focus)
        } else {
            (focus, anchor)
        };
        Self {
            start_block: start.0,
            start_offset: start.1,
            end_block: end.0,
            end_offset: end.1,
        }
    }

    pub fn is_single_block(&self) -> bool {
        self.start_block == self.end_block
    }

    pub fn contains_block(&self, block_index: usize) -> bool {
        (self.start_block..=self.end_block).contains(&block_index)
    }
}

/// The part of `block_index` covered by `range`, clamped to the block's
/// text, or `None` when the block is outside the range or not text-editable
/// (dividers and structural blocks never take part in a text selection).
/// A collapsed in-block range comes back as an empty `(n, n)` pair.
pub fn selection_for_block(
    document: &BlockDocument,
    range: &TrackedRange,
    block_index: usize,
) -> Option<(usize, usize)> {
    if !range.contains_block(block_index) {
        return None;
    }
    let block = document.get(block_index)?;
    if !block.kind.is_text_editable() {
        return None;
    }
    let len = block.text.len();
    if range.is_single_block() {
        let start = range.start_offset.min(len);
        let end = range.end_offset.clamp(start, len);
        return Some((start, end));
    }
    if block_index == range.start_block {
        Some((range.start_offset.min(len), len))
    } else if block_index == range.end_block {
        Some((0, range.end_offset.min(len)))
    } else {
        Some((0, len))
    }
}

/// Concatenates the selected slice of every covered block, joined with a
/// single newline between the blocks that take part.
pub fn extract_text(document: &BlockDocument, range: &TrackedRange) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for block_index in range.start_block..=range.end_block {
        let Some((start, end)) = selection_for_block(document, range, block_index) else {
            continue;
        };
        let block = &document.blocks()[block_index];
        parts.push(block.text.text_range(start, end));
    }
    parts.join("\n")
}
