//! Repository port for board layout storage.

use async_trait::async_trait;
use cityroute_domain::{
    Board, BoardId, City, CityId, CitySpace, CitySpaceId, NewBoard, NewCity, NewCitySpace,
};

use super::error::RepoError;

/// Field changes applied to a loaded board inside the update transaction.
pub type BoardUpdate = Box<dyn FnOnce(&mut Board) + Send>;

/// Field changes applied to a loaded city inside the update transaction.
pub type CityUpdate = Box<dyn FnOnce(&mut City) + Send>;

/// Field changes applied to a loaded city space inside the update transaction.
pub type CitySpaceUpdate = Box<dyn FnOnce(&mut CitySpace) + Send>;

/// Atomic CRUD over boards, their cities and the cities' spaces.
///
/// Every multi-step operation runs in a single transaction: either all of
/// its reads and writes commit, or none do.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BoardCrudRepo: Send + Sync {
    // Boards
    async fn get_board(&self, id: BoardId) -> Result<Board, RepoError>;
    /// Fails with `NameTaken` when any board already uses the name.
    async fn create_board(&self, board: NewBoard) -> Result<Board, RepoError>;
    /// Loads the board, applies `update`, re-checks the name against every
    /// other board and persists.
    async fn update_board(&self, id: BoardId, update: BoardUpdate) -> Result<Board, RepoError>;
    async fn list_boards(&self) -> Result<Vec<Board>, RepoError>;
    /// Removes the board's city spaces, then its cities, then the board.
    async fn delete_board(&self, id: BoardId) -> Result<(), RepoError>;

    // Cities
    /// Fails with `NotFound` when the board does not exist.
    async fn list_cities_by_board(&self, board_id: BoardId) -> Result<Vec<City>, RepoError>;
    async fn get_city(&self, id: CityId) -> Result<City, RepoError>;
    async fn create_city(&self, city: NewCity) -> Result<City, RepoError>;
    async fn update_city(&self, id: CityId, update: CityUpdate) -> Result<City, RepoError>;
    /// Removes the city's spaces, then the city.
    async fn delete_city(&self, id: CityId) -> Result<(), RepoError>;
    /// As `delete_city`, but the city must belong to `board_id`.
    async fn delete_city_on_board(&self, board_id: BoardId, city_id: CityId)
        -> Result<(), RepoError>;

    // City spaces
    async fn create_city_space(&self, space: NewCitySpace) -> Result<CitySpace, RepoError>;
    async fn update_city_space(
        &self,
        id: CitySpaceId,
        update: CitySpaceUpdate,
    ) -> Result<CitySpace, RepoError>;
    async fn list_city_spaces(&self, city_id: CityId) -> Result<Vec<CitySpace>, RepoError>;
    async fn delete_city_space(&self, id: CitySpaceId) -> Result<(), RepoError>;
}
