//! Board editor use case.
//!
//! The single entry point transport code calls to edit boards, the cities
//! on them and the cities' trading post spaces. Input is parsed and
//! validated here; storage, transactions and cascades belong to the
//! repository.

mod forms;

use std::str::FromStr;
use std::sync::Arc;

use cityroute_domain::{Board, BoardId, City, CityId, CitySpace, CitySpaceId, DomainError};

use crate::infrastructure::ports::{BoardCrudRepo, RepoError};
use crate::use_cases::validation::{FieldErrors, ValidationError};

pub use forms::{
    AddCitySpaceForm, BoardDimensionsForm, BoardForm, BoardNameForm, CitySpaceChanges, CityForm,
    CreateBoardForm, UpdateCitySpaceForm, FIELD_CITY_ID, FIELD_HEIGHT, FIELD_NAME, FIELD_ORDER,
    FIELD_REQUIRED_PRIVILEGE, FIELD_SPACE_TYPE, FIELD_WIDTH,
};

/// Errors returned by the board editor.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// Submitted form failed validation; nothing was written.
    #[error("Invalid form: {0}")]
    InvalidForm(FieldErrors),

    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// External identifier is not a well-formed id.
    #[error("Invalid ID string: {0}")]
    InvalidId(String),

    #[error("Repository error: {0}")]
    Repo(RepoError),
}

impl EditorError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Field errors of an invalid form.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::InvalidForm(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<RepoError> for EditorError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            RepoError::NameTaken(_) => {
                Self::InvalidForm(FieldErrors::single(FIELD_NAME, ValidationError::Taken))
            }
            other => Self::Repo(other),
        }
    }
}

impl From<FieldErrors> for EditorError {
    fn from(errors: FieldErrors) -> Self {
        Self::InvalidForm(errors)
    }
}

fn parse_id<T>(raw: &str) -> Result<T, EditorError>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(|_| {
        tracing::debug!(raw_id = %raw, "Rejected malformed id");
        EditorError::InvalidId(raw.to_string())
    })
}

fn repo_error(operation: &'static str) -> impl FnOnce(RepoError) -> EditorError {
    move |err| {
        tracing::warn!(operation, error = %err, "Board editor repository call failed");
        EditorError::from(err)
    }
}

/// Board, city and city space editing.
pub struct BoardEditor {
    repo: Arc<dyn BoardCrudRepo>,
}

impl BoardEditor {
    pub fn new(repo: Arc<dyn BoardCrudRepo>) -> Self {
        Self { repo }
    }

    // =========================================================================
    // Boards
    // =========================================================================

    pub async fn list_boards(&self) -> Result<Vec<Board>, EditorError> {
        let boards = self
            .repo
            .list_boards()
            .await
            .map_err(repo_error("list_boards"))?;
        tracing::debug!(count = boards.len(), "Listed boards");
        Ok(boards)
    }

    pub async fn find_board(&self, raw_id: &str) -> Result<Board, EditorError> {
        let id: BoardId = parse_id(raw_id)?;
        let board = self
            .repo
            .get_board(id)
            .await
            .map_err(repo_error("find_board"))?;
        tracing::debug!(board_id = %id, "Loaded board");
        Ok(board)
    }

    pub async fn create_board(&self, form: &CreateBoardForm) -> Result<Board, EditorError> {
        let new_board = form.validate()?;
        let board = self
            .repo
            .create_board(new_board)
            .await
            .map_err(repo_error("create_board"))?;
        tracing::info!(board_id = %board.id, name = %board.name, "Board created");
        Ok(board)
    }

    /// Replaces name and dimensions.
    pub async fn update_board(&self, raw_id: &str, form: &BoardForm) -> Result<Board, EditorError> {
        let id: BoardId = parse_id(raw_id)?;
        let changes = form.validate()?;
        let board = self
            .repo
            .update_board(
                id,
                Box::new(move |board: &mut Board| {
                    board.name = changes.name;
                    board.width = changes.width;
                    board.height = changes.height;
                }),
            )
            .await
            .map_err(repo_error("update_board"))?;
        tracing::info!(board_id = %id, "Board updated");
        Ok(board)
    }

    pub async fn update_board_name(
        &self,
        raw_id: &str,
        form: &BoardNameForm,
    ) -> Result<Board, EditorError> {
        let id: BoardId = parse_id(raw_id)?;
        let name = form.validate()?;
        let board = self
            .repo
            .update_board(id, Box::new(move |board: &mut Board| board.name = name))
            .await
            .map_err(repo_error("update_board_name"))?;
        tracing::info!(board_id = %id, name = %board.name, "Board renamed");
        Ok(board)
    }

    pub async fn update_board_dimensions(
        &self,
        raw_id: &str,
        form: &BoardDimensionsForm,
    ) -> Result<Board, EditorError> {
        let id: BoardId = parse_id(raw_id)?;
        let dimensions = form.validate()?;
        let board = self
            .repo
            .update_board(
                id,
                Box::new(move |board: &mut Board| {
                    board.width = dimensions.width;
                    board.height = dimensions.height;
                }),
            )
            .await
            .map_err(repo_error("update_board_dimensions"))?;
        tracing::info!(
            board_id = %id,
            width = board.width,
            height = board.height,
            "Board resized"
        );
        Ok(board)
    }

    /// Deletes the board with all of its cities and their spaces.
    pub async fn delete_board(&self, raw_id: &str) -> Result<(), EditorError> {
        let id: BoardId = parse_id(raw_id)?;
        self.repo
            .delete_board(id)
            .await
            .map_err(repo_error("delete_board"))?;
        tracing::info!(board_id = %id, "Board deleted");
        Ok(())
    }

    // =========================================================================
    // Cities
    // =========================================================================

    pub async fn list_cities(&self, raw_board_id: &str) -> Result<Vec<City>, EditorError> {
        let board_id: BoardId = parse_id(raw_board_id)?;
        let cities = self
            .repo
            .list_cities_by_board(board_id)
            .await
            .map_err(repo_error("list_cities"))?;
        tracing::debug!(board_id = %board_id, count = cities.len(), "Listed cities");
        Ok(cities)
    }

    pub async fn find_city(&self, raw_id: &str) -> Result<City, EditorError> {
        let id: CityId = parse_id(raw_id)?;
        let city = self
            .repo
            .get_city(id)
            .await
            .map_err(repo_error("find_city"))?;
        tracing::debug!(city_id = %id, spaces = city.spaces.len(), "Loaded city");
        Ok(city)
    }

    pub async fn create_city(
        &self,
        raw_board_id: &str,
        form: &CityForm,
    ) -> Result<City, EditorError> {
        let board_id: BoardId = parse_id(raw_board_id)?;
        let new_city = form.validate()?.into_new_city(board_id);
        let city = self
            .repo
            .create_city(new_city)
            .await
            .map_err(repo_error("create_city"))?;
        tracing::info!(board_id = %board_id, city_id = %city.id, "City created");
        Ok(city)
    }

    /// Changes name and position only.
    pub async fn update_city(&self, raw_id: &str, form: &CityForm) -> Result<City, EditorError> {
        let id: CityId = parse_id(raw_id)?;
        let changes = form.validate()?;
        let city = self
            .repo
            .update_city(
                id,
                Box::new(move |city: &mut City| {
                    city.name = changes.name;
                    city.position = changes.position;
                }),
            )
            .await
            .map_err(repo_error("update_city"))?;
        tracing::info!(city_id = %id, "City updated");
        Ok(city)
    }

    pub async fn delete_city(&self, raw_id: &str) -> Result<(), EditorError> {
        let id: CityId = parse_id(raw_id)?;
        self.repo
            .delete_city(id)
            .await
            .map_err(repo_error("delete_city"))?;
        tracing::info!(city_id = %id, "City deleted");
        Ok(())
    }

    /// Deletes a city only if it is placed on the given board.
    pub async fn delete_city_on_board(
        &self,
        raw_board_id: &str,
        raw_city_id: &str,
    ) -> Result<(), EditorError> {
        let board_id: BoardId = parse_id(raw_board_id)?;
        let city_id: CityId = parse_id(raw_city_id)?;
        self.repo
            .delete_city_on_board(board_id, city_id)
            .await
            .map_err(repo_error("delete_city_on_board"))?;
        tracing::info!(board_id = %board_id, city_id = %city_id, "City deleted from board");
        Ok(())
    }

    // =========================================================================
    // City spaces
    // =========================================================================

    pub async fn list_city_spaces(&self, raw_city_id: &str) -> Result<Vec<CitySpace>, EditorError> {
        let city_id: CityId = parse_id(raw_city_id)?;
        let spaces = self
            .repo
            .list_city_spaces(city_id)
            .await
            .map_err(repo_error("list_city_spaces"))?;
        tracing::debug!(city_id = %city_id, count = spaces.len(), "Listed city spaces");
        Ok(spaces)
    }

    pub async fn add_city_space(
        &self,
        raw_city_id: &str,
        form: &AddCitySpaceForm,
    ) -> Result<CitySpace, EditorError> {
        let city_id: CityId = parse_id(raw_city_id)?;
        let new_space = form.validate(city_id)?;
        let space = self
            .repo
            .create_city_space(new_space)
            .await
            .map_err(repo_error("add_city_space"))?;
        tracing::info!(
            city_id = %city_id,
            space_id = %space.id,
            order = space.order,
            "City space added"
        );
        Ok(space)
    }

    /// Without an explicit order the space keeps its position.
    pub async fn update_city_space(
        &self,
        raw_id: &str,
        form: &UpdateCitySpaceForm,
    ) -> Result<CitySpace, EditorError> {
        let id: CitySpaceId = parse_id(raw_id)?;
        let changes = form.validate()?;
        let space = self
            .repo
            .update_city_space(
                id,
                Box::new(move |space: &mut CitySpace| {
                    if let Some(order) = changes.order {
                        space.order = order;
                    }
                    space.space_type = changes.space_type;
                    space.required_privilege = changes.required_privilege;
                }),
            )
            .await
            .map_err(repo_error("update_city_space"))?;
        tracing::info!(space_id = %id, "City space updated");
        Ok(space)
    }

    pub async fn delete_city_space(&self, raw_id: &str) -> Result<(), EditorError> {
        let id: CitySpaceId = parse_id(raw_id)?;
        self.repo
            .delete_city_space(id)
            .await
            .map_err(repo_error("delete_city_space"))?;
        tracing::info!(space_id = %id, "City space deleted");
        Ok(())
    }
}
