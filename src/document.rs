//! The flat, order-keyed block document and the command values that
//! mutate it.
//!
//! All mutation funnels through [`BlockDocument::apply`] so layout, the
//! boundary-key state machine, and an eventual undo path observe one
//! consistent document per frame. Commands referencing unknown block ids are
//! no-ops; stale ids from a previous frame must not crash the editor.

use crate::order::OrderKey;
use crate::richtext::{RichText, StyleMask};

/// Deepest list nesting the editor supports.
pub const MAX_INDENT: u8 = 3;

/// Stable block identity, unique within one document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockId(u64);

impl BlockId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
    BulletList,
    NumberedList,
    CheckboxList,
    Quote,
    CodeBlock,
    Divider,
    /// Opaque structural block (embedded table). Not text-editable.
    Table,
}

impl BlockKind {
    pub fn is_list(self) -> bool {
        matches!(
            self,
            Self::BulletList | Self::NumberedList | Self::CheckboxList
        )
    }

    /// Whether the block carries editable text. Structural blocks can never
    /// anchor, span, or terminate a text selection.
    pub fn is_text_editable(self) -> bool {
        !matches!(self, Self::Divider | Self::Table)
    }

    /// Block kind a new sibling created by Enter continues as. List kinds
    /// and quotes continue as themselves, everything else starts a fresh
    /// paragraph.
    pub fn continuation(self) -> BlockKind {
        if self.is_list() || self == Self::Quote {
            self
        } else {
            Self::Paragraph
        }
    }

    pub fn heading_level(self) -> Option<u8> {
        match self {
            Self::Heading1 => Some(1),
            Self::Heading2 => Some(2),
            Self::Heading3 => Some(3),
            Self::Heading4 => Some(4),
            Self::Heading5 => Some(5),
            Self::Heading6 => Some(6),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    pub order: OrderKey,
    pub indent: u8,
    pub checked: bool,
    pub text: RichText,
}

impl Block {
    fn new(id: BlockId, kind: BlockKind, order: OrderKey) -> Self {
        Self {
            id,
            kind,
            order,
            indent: 0,
            checked: false,
            text: RichText::new(),
        }
    }
}

/// One atomic document mutation, applied by the host in emission order.
#[derive(Clone, Debug)]
pub enum Command {
    AddBlock {
        order: OrderKey,
        kind: BlockKind,
        indent: u8,
        text: RichText,
    },
    RemoveBlock {
        id: BlockId,
    },
    SetBlockText {
        id: BlockId,
        text: RichText,
    },
    ChangeBlockType {
        id: BlockId,
        kind: BlockKind,
    },
    SetBlockIndent {
        id: BlockId,
        indent: u8,
    },
    SetBlockChecked {
        id: BlockId,
        checked: bool,
    },
    ToggleSpan {
        id: BlockId,
        start: usize,
        len: usize,
        style: StyleMask,
    },
}

/// Ordered collection of blocks. Invariants: blocks are always sorted by
/// `order`, no two blocks share an `order`, and rendering order equals this
/// sorted order.
#[derive(Clone, Debug)]
pub struct BlockDocument {
    blocks: Vec<Block>,
    next_id: u64,
}

impl BlockDocument {
    /// A fresh document always holds one empty paragraph so there is
    /// somewhere to type.
    pub fn new() -> Self {
        let mut document = Self {
            blocks: Vec::new(),
            next_id: 0,
        };
        let order = OrderKey::between(None, None);
        let id = document.allocate_id();
        document.blocks.push(Block::new(id, BlockKind::Paragraph, order));
        document
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn block_by_id(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == id)
    }

    pub fn index_of(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|block| block.id == id)
    }

    /// Appends a block after the current last one and returns its id.
    pub fn append_block(&mut self, kind: BlockKind, text: RichText) -> BlockId {
        let order = match self.blocks.last() {
            Some(last) => OrderKey::after(&last.order),
            None => OrderKey::between(None, None),
        };
        let id = self.allocate_id();
        let mut block = Block::new(id, kind, order);
        block.text = text;
        self.blocks.push(block);
        id
    }

    /// Applies one command. Returns whether the document changed; commands
    /// referencing unknown ids degrade to no-ops.
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::AddBlock {
                order,
                kind,
                indent,
                text,
            } => {
                let id = self.allocate_id();
                let mut block = Block::new(id, kind, order);
                block.indent = indent.min(MAX_INDENT);
                block.text = text;
                self.insert_sorted(block);
                true
            }
            Command::RemoveBlock { id } => {
                let Some(index) = self.index_of(id) else {
                    return false;
                };
                self.blocks.remove(index);
                true
            }
            Command::SetBlockText { id, text } => {
                let Some(block) = self.block_by_id_mut(id) else {
                    return false;
                };
                block.text = text;
                true
            }
            Command::ChangeBlockType { id, kind } => {
                let Some(block) = self.block_by_id_mut(id) else {
                    return false;
                };
                block.kind = kind;
                if !kind.is_list() {
                    block.indent = 0;
                }
                true
            }
            Command::SetBlockIndent { id, indent } => {
                let Some(block) = self.block_by_id_mut(id) else {
                    return false;
                };
                block.indent = indent.min(MAX_INDENT);
                true
            }
            Command::SetBlockChecked { id, checked } => {
                let Some(block) = self.block_by_id_mut(id) else {
                    return false;
                };
                block.checked = checked;
                true
            }
            Command::ToggleSpan {
                id,
                start,
                len,
                style,
            } => {
                let Some(block) = self.block_by_id_mut(id) else {
                    return false;
                };
                block.text.toggle_span(start, len, style);
                true
            }
        }
    }

    fn block_by_id_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|block| block.id == id)
    }

    fn allocate_id(&mut self) -> BlockId {
        let id = BlockId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert_sorted(&mut self, block: Block) {
        let index = self
            .blocks
            .partition_point(|existing| existing.order <= block.order);
        self.blocks.insert(index, block);
    }
}

impl Default for BlockDocument {
    fn default() -> Self {
        Self::new()
    }
}
