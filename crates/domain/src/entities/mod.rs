//! Domain entities: boards, the cities placed on them and each city's
//! ordered trading post spaces.

mod board;
mod city;
mod city_space;

pub use board::{Board, NewBoard, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH, MAX_BOARD_NAME_LENGTH};
pub use city::{City, NewCity, Position};
pub use city_space::{
    CitySpace, NewCitySpace, SpaceType, MAX_REQUIRED_PRIVILEGE, MIN_REQUIRED_PRIVILEGE,
};
