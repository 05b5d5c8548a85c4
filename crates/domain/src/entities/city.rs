//! City - a named point on a board

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CitySpace;
use crate::{BoardId, CityId};

/// Position of a city on its board, in board pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A stored city with its trading post spaces, ordered by `order` ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: CityId,
    pub board_id: BoardId,
    pub name: String,
    pub position: Position,
    #[serde(rename = "spaces", default)]
    pub spaces: Vec<CitySpace>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A city that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCity {
    pub board_id: BoardId,
    pub name: String,
    pub position: Position,
}

impl NewCity {
    pub fn new(board_id: BoardId, name: impl Into<String>) -> Self {
        Self {
            board_id,
            name: name.into(),
            position: Position::default(),
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_coordinates_default_to_zero() {
        let position: Position = serde_json::from_str(r#"{"x": 12}"#).expect("position");
        assert_eq!(position, Position::new(12, 0));
    }

    #[test]
    fn spaces_serialize_under_spaces_key() {
        let now = Utc::now();
        let city = City {
            id: CityId::new(),
            board_id: BoardId::new(),
            name: "Lübeck".into(),
            position: Position::new(10, 20),
            spaces: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&city).expect("serialize city");
        assert!(json["spaces"].as_array().is_some());
        assert_eq!(json["position"]["x"], 10);
        assert!(json.get("boardId").is_some());
    }
}
