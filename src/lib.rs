//! Core of a block-based rich-text document editor.
//!
//! A document is an ordered sequence of typed blocks, positioned by opaque
//! fractional order keys so insertion never renumbers siblings. Each block
//! holds a plain text buffer with overlapping style spans. The library is
//! pure: it answers layout and selection queries and turns boundary key
//! events into command values; only the host applies commands and draws.

pub mod document;
pub mod editor;
pub mod layout;
pub mod order;
pub mod render;
pub mod richtext;
pub mod session;
