//! City Route domain: board layout entities, typed ids and the domain error.

pub mod entities;
pub mod error;
pub mod ids;

pub use error::DomainError;

pub use ids::{BoardId, CityId, CitySpaceId};

pub use entities::{
    Board, City, CitySpace, NewBoard, NewCity, NewCitySpace, Position, SpaceType,
    DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH, MAX_BOARD_NAME_LENGTH, MAX_REQUIRED_PRIVILEGE,
    MIN_REQUIRED_PRIVILEGE,
};
