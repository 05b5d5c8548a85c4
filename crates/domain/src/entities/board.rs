//! Board - the rectangular play surface cities are placed on

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::BoardId;

/// Width given to a new board when none (or zero) is supplied.
pub const DEFAULT_BOARD_WIDTH: i32 = 800;

/// Height given to a new board when none (or zero) is supplied.
pub const DEFAULT_BOARD_HEIGHT: i32 = 500;

/// Maximum length of a board name, counted in characters after trimming.
pub const MAX_BOARD_NAME_LENGTH: usize = 100;

/// A stored board.
///
/// # Invariants
///
/// - `name` is unique across all boards (enforced by the repository)
/// - `width` and `height` are never negative (enforced before any write)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A board that has not been stored yet. Identity and timestamps are
/// assigned by the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBoard {
    pub name: String,
    pub width: i32,
    pub height: i32,
}

impl NewBoard {
    /// Create a board draft with the default 800x500 dimensions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
        }
    }

    /// Override the dimensions. Zero keeps the default for that axis.
    ///
    /// ```
    /// use cityroute_domain::NewBoard;
    ///
    /// let board = NewBoard::new("Town Map").with_dimensions(0, 640);
    /// assert_eq!((board.width, board.height), (800, 640));
    /// ```
    pub fn with_dimensions(mut self, width: i32, height: i32) -> Self {
        if width != 0 {
            self.width = width;
        }
        if height != 0 {
            self.height = height;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_board_uses_default_dimensions() {
        let board = NewBoard::new("Town Map");
        assert_eq!(board.width, 800);
        assert_eq!(board.height, 500);
    }

    #[test]
    fn zero_dimensions_keep_defaults() {
        let board = NewBoard::new("Town Map").with_dimensions(0, 0);
        assert_eq!((board.width, board.height), (800, 500));
    }

    #[test]
    fn board_serializes_camel_case() {
        let now = Utc::now();
        let board = Board {
            id: BoardId::new(),
            name: "Town Map".into(),
            width: 800,
            height: 500,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&board).expect("serialize board");
        assert_eq!(json["name"], "Town Map");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }
}
