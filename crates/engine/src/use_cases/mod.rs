//! Use cases - User story orchestration.
//!
//! `board_editor` is the entry point for editing boards, cities and city
//! spaces; `validation` holds the field rules its forms share.

pub mod board_editor;
pub mod validation;

pub use board_editor::{BoardEditor, EditorError};
