//! Row conversion helpers shared by the SQLite repositories.

use chrono::{DateTime, SecondsFormat, Utc};
use cityroute_domain::{Board, City, CitySpace, Position, SpaceType};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::infrastructure::ports::RepoError;

/// Fixed-width RFC 3339 so stored timestamps sort lexically.
pub(super) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Extension trait for SQLite rows with standardized error mapping to RepoError.
pub(super) trait RowExt {
    fn get_uuid(&self, column: &str) -> Result<Uuid, RepoError>;
    fn get_i32(&self, column: &str) -> Result<i32, RepoError>;
    fn get_text(&self, column: &str) -> Result<String, RepoError>;
    fn get_timestamp(&self, column: &str) -> Result<DateTime<Utc>, RepoError>;
}

impl RowExt for SqliteRow {
    fn get_uuid(&self, column: &str) -> Result<Uuid, RepoError> {
        let raw = self.get_text(column)?;
        Uuid::parse_str(&raw)
            .map_err(|e| RepoError::serialization(format!("{column}: {e}")))
    }

    fn get_i32(&self, column: &str) -> Result<i32, RepoError> {
        let value = self
            .try_get::<i64, _>(column)
            .map_err(|e| RepoError::serialization(format!("{column}: {e}")))?;
        i32::try_from(value).map_err(|e| RepoError::serialization(format!("{column}: {e}")))
    }

    fn get_text(&self, column: &str) -> Result<String, RepoError> {
        self.try_get::<String, _>(column)
            .map_err(|e| RepoError::serialization(format!("{column}: {e}")))
    }

    fn get_timestamp(&self, column: &str) -> Result<DateTime<Utc>, RepoError> {
        let raw = self.get_text(column)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc))
            .map_err(|e| RepoError::serialization(format!("{column}: {e}")))
    }
}

pub(super) fn row_to_board(row: &SqliteRow) -> Result<Board, RepoError> {
    Ok(Board {
        id: row.get_uuid("id")?.into(),
        name: row.get_text("name")?,
        width: row.get_i32("width")?,
        height: row.get_i32("height")?,
        created_at: row.get_timestamp("created_at")?,
        updated_at: row.get_timestamp("updated_at")?,
    })
}

/// Convert a city row. Spaces are loaded separately.
pub(super) fn row_to_city(row: &SqliteRow) -> Result<City, RepoError> {
    Ok(City {
        id: row.get_uuid("id")?.into(),
        board_id: row.get_uuid("board_id")?.into(),
        name: row.get_text("name")?,
        position: Position::new(row.get_i32("x")?, row.get_i32("y")?),
        spaces: Vec::new(),
        created_at: row.get_timestamp("created_at")?,
        updated_at: row.get_timestamp("updated_at")?,
    })
}

pub(super) fn row_to_city_space(row: &SqliteRow) -> Result<CitySpace, RepoError> {
    let space_type = SpaceType::try_from(row.get_i32("space_type")?)
        .map_err(|e| RepoError::serialization(e.to_string()))?;

    Ok(CitySpace {
        id: row.get_uuid("id")?.into(),
        city_id: row.get_uuid("city_id")?.into(),
        order: row.get_i32("order")?,
        space_type,
        required_privilege: row.get_i32("required_privilege")?,
        created_at: row.get_timestamp("created_at")?,
        updated_at: row.get_timestamp("updated_at")?,
    })
}
