use super::*;
use crate::document::BlockId;
use crate::richtext::StyleMask;

fn document_with_paragraphs(texts: &[&str]) -> BlockDocument {
    let mut document = BlockDocument::new();
    let first = document.get(0).unwrap().id;
    let mut iter = texts.iter();
    if let Some(text) = iter.next() {
        document.apply(Command::SetBlockText {
            id: first,
            text: RichText::plain(*text),
        });
    }
    for text in iter {
        document.append_block(BlockKind::Paragraph, RichText::plain(*text));
    }
    document
}

fn apply_outcome(document: &mut BlockDocument, outcome: &BoundaryOutcome) {
    for command in outcome.commands.iter().cloned() {
        document.apply(command);
    }
}

fn block_id(document: &BlockDocument, index: usize) -> BlockId {
    document.get(index).unwrap().id
}

fn buffer_of(document: &BlockDocument, index: usize) -> RichText {
    document.get(index).unwrap().text.clone()
}

fn assert_order_sorted(document: &BlockDocument) {
    for pair in document.blocks().windows(2) {
        assert!(
            pair[0].order < pair[1].order,
            "blocks out of order: {:?} >= {:?}",
            pair[0].order,
            pair[1].order
        );
    }
}

#[test]
fn enter_mid_text_splits_the_block() {
    let mut document = document_with_paragraphs(&["ABCD"]);
    let buffer = buffer_of(&document, 0);

    let outcome = handle_boundary_key(&document, BoundaryKey::Enter, 0, 2, &buffer);
    apply_outcome(&mut document, &outcome);

    assert_eq!(document.len(), 2);
    assert_eq!(document.get(0).unwrap().text.text(), "AB");
    assert_eq!(document.get(1).unwrap().text.text(), "CD");
    assert_eq!(outcome.focus, 1);
    assert_eq!(outcome.caret, 0);
    assert_order_sorted(&document);
}

#[test]
fn enter_split_places_new_block_between_siblings() {
    let mut document = document_with_paragraphs(&["ABCD", "tail"]);
    let first_order = document.get(0).unwrap().order.clone();
    let tail_order = document.get(1).unwrap().order.clone();
    let buffer = buffer_of(&document, 0);

    let outcome = handle_boundary_key(&document, BoundaryKey::Enter, 0, 2, &buffer);
    apply_outcome(&mut document, &outcome);

    assert_eq!(document.len(), 3);
    assert_eq!(document.get(1).unwrap().text.text(), "CD");
    let inserted = document.get(1).unwrap().order.clone();
    assert!(first_order < inserted && inserted < tail_order);
    // The siblings kept their keys; only the new block got one.
    assert_eq!(document.get(0).unwrap().order, first_order);
    assert_eq!(document.get(2).unwrap().order, tail_order);
}

#[test]
fn enter_at_end_appends_an_empty_continuation() {
    let mut document = document_with_paragraphs(&["Hello"]);
    let buffer = buffer_of(&document, 0);

    let outcome = handle_boundary_key(&document, BoundaryKey::Enter, 0, 5, &buffer);
    apply_outcome(&mut document, &outcome);

    assert_eq!(document.len(), 2);
    assert_eq!(document.get(0).unwrap().text.text(), "Hello");
    assert!(document.get(1).unwrap().text.is_empty());
    assert_eq!(document.get(1).unwrap().kind, BlockKind::Paragraph);
    assert_eq!(outcome.focus, 1);
}

#[test]
fn enter_at_end_of_heading_continues_as_paragraph() {
    let mut document = BlockDocument::new();
    let id = block_id(&document, 0);
    document.apply(Command::ChangeBlockType {
        id,
        kind: BlockKind::Heading2,
    });
    document.apply(Command::SetBlockText {
        id,
        text: RichText::plain("Title"),
    });
    let buffer = buffer_of(&document, 0);

    let outcome = handle_boundary_key(&document, BoundaryKey::Enter, 0, 5, &buffer);
    apply_outcome(&mut document, &outcome);

    assert_eq!(document.get(1).unwrap().kind, BlockKind::Paragraph);
}

#[test]
fn enter_in_a_list_continues_the_list_and_indent() {
    let mut document = BlockDocument::new();
    let id = block_id(&document, 0);
    document.apply(Command::ChangeBlockType {
        id,
        kind: BlockKind::CheckboxList,
    });
    document.apply(Command::SetBlockIndent { id, indent: 2 });
    document.apply(Command::SetBlockChecked { id, checked: true });
    document.apply(Command::SetBlockText {
        id,
        text: RichText::plain("task"),
    });
    let buffer = buffer_of(&document, 0);

    let outcome = handle_boundary_key(&document, BoundaryKey::Enter, 0, 4, &buffer);
    apply_outcome(&mut document, &outcome);

    let continuation = document.get(1).unwrap();
    assert_eq!(continuation.kind, BlockKind::CheckboxList);
    assert_eq!(continuation.indent, 2);
    assert!(!continuation.checked, "continuation must start unchecked");
}

#[test]
fn enter_on_empty_list_item_demotes_to_paragraph() {
    let mut document = BlockDocument::new();
    let id = block_id(&document, 0);
    document.apply(Command::ChangeBlockType {
        id,
        kind: BlockKind::BulletList,
    });
    let buffer = buffer_of(&document, 0);

    let outcome = handle_boundary_key(&document, BoundaryKey::Enter, 0, 0, &buffer);
    apply_outcome(&mut document, &outcome);

    assert_eq!(document.len(), 1, "demotion must not split");
    assert_eq!(document.get(0).unwrap().kind, BlockKind::Paragraph);
    assert_eq!(outcome.focus, 0);
    assert_eq!(outcome.caret, 0);
}

#[test]
fn split_then_merge_restores_text_and_spans() {
    let mut document = BlockDocument::new();
    let id = block_id(&document, 0);
    let original = RichText::plain("ABCD")
        .with_span(0, 4, StyleMask::BOLD)
        .with_span(1, 2, StyleMask::ITALIC);
    document.apply(Command::SetBlockText {
        id,
        text: original.clone(),
    });

    let buffer = buffer_of(&document, 0);
    let split = handle_boundary_key(&document, BoundaryKey::Enter, 0, 2, &buffer);
    apply_outcome(&mut document, &split);
    assert_eq!(document.len(), 2);

    let successor = buffer_of(&document, 1);
    let merge = handle_boundary_key(&document, BoundaryKey::Backspace, 1, 0, &successor);
    apply_outcome(&mut document, &merge);

    assert_eq!(document.len(), 1);
    let merged = &document.get(0).unwrap().text;
    assert_eq!(merged.text(), original.text());
    assert_eq!(merged.spans(), original.spans());
    assert_eq!(merge.focus, 0);
    assert_eq!(merge.caret, 2);
}

#[test]
fn backspace_on_empty_block_removes_it_and_focuses_previous_end() {
    let mut document = document_with_paragraphs(&["Hello", ""]);
    let buffer = buffer_of(&document, 1);

    let outcome = handle_boundary_key(&document, BoundaryKey::Backspace, 1, 0, &buffer);
    apply_outcome(&mut document, &outcome);

    assert_eq!(document.len(), 1);
    assert_eq!(outcome.focus, 0);
    assert_eq!(outcome.caret, 5);
}

#[test]
fn backspace_merges_into_the_previous_block() {
    let mut document = document_with_paragraphs(&["Hello ", "World"]);
    let buffer = buffer_of(&document, 1);

    let outcome = handle_boundary_key(&document, BoundaryKey::Backspace, 1, 0, &buffer);
    apply_outcome(&mut document, &outcome);

    assert_eq!(document.len(), 1);
    assert_eq!(document.get(0).unwrap().text.text(), "Hello World");
    assert_eq!(outcome.focus, 0);
    assert_eq!(outcome.caret, 6, "caret lands at the join offset");
}

#[test]
fn backspace_demotes_non_paragraph_blocks_before_merging() {
    let mut document = document_with_paragraphs(&["intro", "item"]);
    let id = block_id(&document, 1);
    document.apply(Command::ChangeBlockType {
        id,
        kind: BlockKind::Quote,
    });
    let buffer = buffer_of(&document, 1);

    let outcome = handle_boundary_key(&document, BoundaryKey::Backspace, 1, 0, &buffer);
    apply_outcome(&mut document, &outcome);

    // Demotion only; the merge needs a second press.
    assert_eq!(document.len(), 2);
    assert_eq!(document.get(1).unwrap().kind, BlockKind::Paragraph);
    assert_eq!(outcome.focus, 1);
}

#[test]
fn backspace_at_the_first_block_is_a_noop() {
    let document = document_with_paragraphs(&["Hello"]);
    let buffer = buffer_of(&document, 0);
    let outcome = handle_boundary_key(&document, BoundaryKey::Backspace, 0, 0, &buffer);
    assert!(outcome.is_noop());
}

#[test]
fn backspace_mid_text_is_left_to_the_host() {
    let document = document_with_paragraphs(&["Hello"]);
    let buffer = buffer_of(&document, 0);
    let outcome = handle_boundary_key(&document, BoundaryKey::Backspace, 0, 3, &buffer);
    assert!(outcome.is_noop());
    assert_eq!(outcome.caret, 3);
}

#[test]
fn backspace_never_merges_into_a_divider() {
    let mut document = document_with_paragraphs(&["", "text"]);
    let id = block_id(&document, 0);
    document.apply(Command::ChangeBlockType {
        id,
        kind: BlockKind::Divider,
    });
    let buffer = buffer_of(&document, 1);

    let outcome = handle_boundary_key(&document, BoundaryKey::Backspace, 1, 0, &buffer);
    assert!(outcome.is_noop());
}

#[test]
fn tab_indents_list_blocks_and_clamps_at_the_maximum() {
    let mut document = BlockDocument::new();
    let id = block_id(&document, 0);
    document.apply(Command::ChangeBlockType {
        id,
        kind: BlockKind::BulletList,
    });

    for expected in 1..=MAX_INDENT {
        let buffer = buffer_of(&document, 0);
        let outcome = handle_boundary_key(&document, BoundaryKey::Tab, 0, 0, &buffer);
        apply_outcome(&mut document, &outcome);
        assert_eq!(document.get(0).unwrap().indent, expected);
    }

    let buffer = buffer_of(&document, 0);
    let outcome = handle_boundary_key(&document, BoundaryKey::Tab, 0, 0, &buffer);
    assert!(outcome.is_noop(), "indent past the maximum must be a no-op");
}

#[test]
fn shift_tab_at_level_zero_is_a_noop() {
    let mut document = BlockDocument::new();
    let id = block_id(&document, 0);
    document.apply(Command::ChangeBlockType {
        id,
        kind: BlockKind::NumberedList,
    });
    let buffer = buffer_of(&document, 0);
    let outcome = handle_boundary_key(&document, BoundaryKey::ShiftTab, 0, 0, &buffer);
    assert!(outcome.is_noop());
}

#[test]
fn tab_on_a_paragraph_is_a_noop() {
    let document = document_with_paragraphs(&["Hello"]);
    let buffer = buffer_of(&document, 0);
    let outcome = handle_boundary_key(&document, BoundaryKey::Tab, 0, 0, &buffer);
    assert!(outcome.is_noop());
}

#[test]
fn out_of_range_block_index_is_a_noop() {
    let document = document_with_paragraphs(&["Hello"]);
    let outcome =
        handle_boundary_key(&document, BoundaryKey::Enter, 7, 0, &RichText::new());
    assert!(outcome.is_noop());
    assert_eq!(outcome.focus, 7);
}

#[test]
fn stale_commands_degrade_to_noops() {
    let mut document = document_with_paragraphs(&["Hello", "World"]);
    let id = block_id(&document, 1);
    document.apply(Command::RemoveBlock { id });
    // Applying the same removal again must not panic or change anything.
    assert!(!document.apply(Command::RemoveBlock { id }));
    assert!(!document.apply(Command::SetBlockText {
        id,
        text: RichText::plain("ghost"),
    }));
    assert_eq!(document.len(), 1);
}

#[test]
fn repeated_splits_keep_the_document_sorted() {
    let mut document = document_with_paragraphs(&["abcdefgh"]);
    for _ in 0..12 {
        let buffer = buffer_of(&document, 0);
        let caret = 1.min(buffer.len());
        let outcome = handle_boundary_key(&document, BoundaryKey::Enter, 0, caret, &buffer);
        apply_outcome(&mut document, &outcome);
        assert_order_sorted(&document);
    }
    assert_eq!(document.len(), 13);
}
