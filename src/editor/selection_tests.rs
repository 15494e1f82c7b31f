use super::selection::{TrackedRange, extract_text, selection_for_block};
use crate::document::{BlockDocument, BlockKind, Command};
use crate::richtext::RichText;

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

fn range(start: (usize, usize), end: (usize, usize)) -> TrackedRange {
    TrackedRange::from_anchor_focus(start, end)
}

#[test]
fn anchor_and_focus_normalize_by_block_then_offset() {
    let forward = range((0, 3), (2, 5));
    let backward = range((2, 5), (0, 3));
    assert_eq!(forward, backward);
    assert_eq!(forward.start_block, 0);
    assert_eq!(forward.end_block, 2);

    let same_block = range((1, 7), (1, 2));
    assert_eq!(same_block.start_offset, 2);
    assert_eq!(same_block.end_offset, 7);
}

#[test]
fn blocks_outside_the_range_are_excluded() {
    let document = document_with_paragraphs(&["aaa", "bbb", "ccc", "ddd"]);
    let tracked = range((1, 0), (2, 1));
    assert_eq!(selection_for_block(&document, &tracked, 0), None);
    assert_eq!(selection_for_block(&document, &tracked, 3), None);
}

#[test]
fn middle_blocks_are_fully_selected() {
    let document = document_with_paragraphs(&["aaa", "bbbb", "ccc"]);
    let tracked = range((0, 1), (2, 2));
    assert_eq!(selection_for_block(&document, &tracked, 1), Some((0, 4)));
}

#[test]
fn boundary_blocks_are_partially_selected() {
    let document = document_with_paragraphs(&["Hello", "Middle", "World!"]);
    let tracked = range((0, 3), (2, 5));
    assert_eq!(selection_for_block(&document, &tracked, 0), Some((3, 5)));
    assert_eq!(selection_for_block(&document, &tracked, 2), Some((0, 5)));
}

#[test]
fn single_block_selection_clamps_to_the_text() {
    let document = document_with_paragraphs(&["abc"]);
    let tracked = range((0, 1), (0, 99));
    assert_eq!(selection_for_block(&document, &tracked, 0), Some((1, 3)));
}

#[test]
fn collapsed_single_block_selection_is_empty_but_present() {
    let document = document_with_paragraphs(&["abc"]);
    let tracked = range((0, 2), (0, 2));
    assert_eq!(selection_for_block(&document, &tracked, 0), Some((2, 2)));
}

#[test]
fn structural_blocks_never_take_part() {
    let mut document = document_with_paragraphs(&["Hello", "skip", "World"]);
    let id = document.get(1).unwrap().id;
    document.apply(Command::ChangeBlockType {
        id,
        kind: BlockKind::Divider,
    });

    let tracked = range((0, 3), (2, 5));
    assert_eq!(selection_for_block(&document, &tracked, 1), None);
    assert_eq!(extract_text(&document, &tracked), "lo\nWorld");
}

#[test]
fn extract_text_joins_block_slices_with_newlines() {
    let document = document_with_paragraphs(&["Hello", "Middle", "World!"]);
    let tracked = range((0, 3), (2, 5));
    assert_eq!(extract_text(&document, &tracked), "lo\nMiddle\nWorld");
}

#[test]
fn extract_text_from_a_single_block() {
    let document = document_with_paragraphs(&["Hello World"]);
    let tracked = range((0, 6), (0, 11));
    assert_eq!(extract_text(&document, &tracked), "World");
}

#[test]
fn extract_text_ignores_indices_past_the_document() {
    let document = document_with_paragraphs(&["Hello"]);
    let tracked = range((0, 0), (5, 3));
    assert_eq!(extract_text(&document, &tracked), "Hello");
}
