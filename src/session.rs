//! Explicit per-session editor state.
//!
//! One struct per open document, owned by the host and passed by reference
//! into core calls; concurrently open documents are told apart by their
//! session id instead of any implicit "current" global.

use crate::editor::selection::TrackedRange;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

#[derive(Clone, Debug)]
pub struct EditorSessionState {
    pub session: SessionId,
    pub focused_block: usize,
    pub caret: usize,
    /// Where the active selection started, as `(block, offset)`.
    selection_anchor: Option<(usize, usize)>,
    selection: Option<TrackedRange>,
    /// Block the pointer moved into while a selection drag was active.
    pub drag_block: Option<usize>,
}

impl EditorSessionState {
    pub fn new(session: SessionId) -> Self {
        Self {
            session,
            focused_block: 0,
            caret: 0,
            selection_anchor: None,
            selection: None,
            drag_block: None,
        }
    }

    pub fn selection(&self) -> Option<&TrackedRange> {
        self.selection.as_ref()
    }

    pub fn begin_selection(&mut self, block: usize, offset: usize) {
        self.selection_anchor = Some((block, offset));
        self.selection = Some(TrackedRange::from_anchor_focus(
            (block, offset),
            (block, offset),
        ));
    }

    /// Extends the selection from its anchor to a new focus point,
    /// re-deriving the tracked range. Starts a selection at the current
    /// caret when none is active, which is what a shift-extend after a plain
    /// click amounts to.
    pub fn extend_selection(&mut self, block: usize, offset: usize) {
        let anchor = *self
            .selection_anchor
            .get_or_insert((self.focused_block, self.caret));
        self.selection = Some(TrackedRange::from_anchor_focus(anchor, (block, offset)));
    }

    /// Escape semantics: aborts transient interaction state only. Never
    /// touches the document.
    pub fn clear_transient(&mut self) {
        self.selection_anchor = None;
        self.selection = None;
        self.drag_block = None;
    }

    pub fn move_focus(&mut self, block: usize, caret: usize) {
        self.focused_block = block;
        self.caret = caret;
    }
}
