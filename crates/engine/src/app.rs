//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::ports::BoardCrudRepo;
use crate::use_cases::board_editor::BoardEditor;

/// Main application state.
///
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub board_editor: BoardEditor,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(board_repo: Arc<dyn BoardCrudRepo>) -> Self {
        Self {
            board_editor: BoardEditor::new(board_repo),
        }
    }
}
