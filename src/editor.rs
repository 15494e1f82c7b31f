//! Enter/Backspace/Tab semantics over the block document.
//!
//! The state machine is a pure function of the focused block, the caret,
//! and the current edit buffer. It never mutates the document; every
//! transition is expressed as command values the host applies in emission
//! order before the next layout pass reads the document.

use crate::document::{BlockDocument, BlockKind, Command, MAX_INDENT};
use crate::order::OrderKey;
use crate::richtext::RichText;

pub mod selection;

/// A decoded boundary key event. Plain character input and caret motion
/// stay host concerns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryKey {
    Enter,
    Backspace,
    Tab,
    ShiftTab,
}

/// Commands to apply plus where focus and caret land afterwards.
#[derive(Clone, Debug)]
pub struct BoundaryOutcome {
    pub commands: Vec<Command>,
    pub focus: usize,
    pub caret: usize,
}

impl BoundaryOutcome {
    fn unchanged(focus: usize, caret: usize) -> Self {
        Self {
            commands: Vec::new(),
            focus,
            caret,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Handles one boundary key against the current document state.
///
/// `buffer` is the focused block's edit buffer as the host currently sees
/// it; it wins over the document copy, which may be a frame behind.
/// Out-of-range indices and structural blocks produce a no-op outcome, not
/// an error; stale UI state across frames is expected.
pub fn handle_boundary_key(
    document: &BlockDocument,
    key: BoundaryKey,
    block_index: usize,
    caret: usize,
    buffer: &RichText,
) -> BoundaryOutcome {
    let Some(block) = document.get(block_index) else {
        return BoundaryOutcome::unchanged(block_index, caret);
    };
    if !block.kind.is_text_editable() {
        return BoundaryOutcome::unchanged(block_index, caret);
    }
    match key {
        BoundaryKey::Enter => handle_enter(document, block_index, caret, buffer),
        BoundaryKey::Backspace => handle_backspace(document, block_index, caret, buffer),
        BoundaryKey::Tab => handle_indent(document, block_index, caret, 1),
        BoundaryKey::ShiftTab => handle_indent(document, block_index, caret, -1),
    }
}

fn handle_enter(
    document: &BlockDocument,
    block_index: usize,
    caret: usize,
    buffer: &RichText,
) -> BoundaryOutcome {
    let block = &document.blocks()[block_index];

    // Enter on an empty list item or quote demotes instead of splitting.
    if buffer.is_empty() && (block.kind.is_list() || block.kind == BlockKind::Quote) {
        return BoundaryOutcome {
            commands: vec![Command::ChangeBlockType {
                id: block.id,
                kind: BlockKind::Paragraph,
            }],
            focus: block_index,
            caret: 0,
        };
    }

    let continuation = block.kind.continuation();
    let indent = if continuation.is_list() { block.indent } else { 0 };
    let next_order = document.get(block_index + 1).map(|next| &next.order);

    if caret >= buffer.len() {
        let order = match next_order {
            Some(next) => OrderKey::between(Some(&block.order), Some(next)),
            None => OrderKey::after(&block.order),
        };
        return BoundaryOutcome {
            commands: vec![Command::AddBlock {
                order,
                kind: continuation,
                indent,
                text: RichText::new(),
            }],
            focus: block_index + 1,
            caret: 0,
        };
    }

    let (head, tail) = buffer.split_at(caret);
    let order = OrderKey::between(Some(&block.order), next_order);
    BoundaryOutcome {
        commands: vec![
            Command::SetBlockText {
                id: block.id,
                text: head,
            },
            Command::AddBlock {
                order,
                kind: continuation,
                indent,
                text: tail,
            },
        ],
        focus: block_index + 1,
        caret: 0,
    }
}

fn handle_backspace(
    document: &BlockDocument,
    block_index: usize,
    caret: usize,
    buffer: &RichText,
) -> BoundaryOutcome {
    // Only the block-boundary case belongs here; the host deletes chars.
    if caret != 0 || block_index == 0 {
        return BoundaryOutcome::unchanged(block_index, caret);
    }
    let block = &document.blocks()[block_index];

    // First demote, then merge on the next press.
    if block.kind != BlockKind::Paragraph {
        return BoundaryOutcome {
            commands: vec![Command::ChangeBlockType {
                id: block.id,
                kind: BlockKind::Paragraph,
            }],
            focus: block_index,
            caret: 0,
        };
    }

    let previous = &document.blocks()[block_index - 1];
    if buffer.is_empty() {
        return BoundaryOutcome {
            commands: vec![Command::RemoveBlock { id: block.id }],
            focus: block_index - 1,
            caret: previous.text.len(),
        };
    }
    if !previous.kind.is_text_editable() {
        // Nothing to merge text into.
        return BoundaryOutcome::unchanged(block_index, caret);
    }
    let join_offset = previous.text.len();
    BoundaryOutcome {
        commands: vec![
            Command::SetBlockText {
                id: previous.id,
                text: previous.text.concat(buffer),
            },
            Command::RemoveBlock { id: block.id },
        ],
        focus: block_index - 1,
        caret: join_offset,
    }
}

fn handle_indent(
    document: &BlockDocument,
    block_index: usize,
    caret: usize,
    delta: i8,
) -> BoundaryOutcome {
    let block = &document.blocks()[block_index];
    if !block.kind.is_list() {
        return BoundaryOutcome::unchanged(block_index, caret);
    }
    let level = (block.indent as i8 + delta).clamp(0, MAX_INDENT as i8) as u8;
    if level == block.indent {
        return BoundaryOutcome::unchanged(block_index, caret);
    }
    BoundaryOutcome {
        commands: vec![Command::SetBlockIndent {
            id: block.id,
            indent: level,
        }],
        focus: block_index,
        caret,
    }
}

#[cfg(test)]
#[path = "editor_tests.rs"]
mod editor_tests;

#[cfg(test)]
#[path = "editor/selection_tests.rs"]
mod selection_tests;
