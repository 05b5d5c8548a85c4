//! Port traits for infrastructure boundaries.
//!
//! Ports exist for:
//! - Board layout storage (SQLite today)
//! - Clock (for testing)

mod error;
mod repos;
mod testing;

pub use error::RepoError;
pub use repos::{BoardCrudRepo, BoardUpdate, CitySpaceUpdate, CityUpdate};
pub use testing::ClockPort;

#[cfg(test)]
pub use repos::MockBoardCrudRepo;
