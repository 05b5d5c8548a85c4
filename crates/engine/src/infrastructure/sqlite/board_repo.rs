//! SQLite board repository - boards, cities and city spaces.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use cityroute_domain::{
    Board, BoardId, City, CityId, CitySpace, CitySpaceId, NewBoard, NewCity, NewCitySpace,
};
use sqlx::{SqliteConnection, SqlitePool};

use super::helpers::{format_timestamp, row_to_board, row_to_city, row_to_city_space};
use crate::infrastructure::ports::{
    BoardCrudRepo, BoardUpdate, CitySpaceUpdate, CityUpdate, ClockPort, RepoError,
};

const BOARD_COLUMNS: &str = "id, name, width, height, created_at, updated_at";
const CITY_COLUMNS: &str = "id, board_id, name, x, y, created_at, updated_at";
const CITY_SPACE_COLUMNS: &str =
    r#"id, city_id, "order", space_type, required_privilege, created_at, updated_at"#;

/// SQLite implementation of the board layout repository.
pub struct SqliteBoardCrudRepo {
    pool: SqlitePool,
    clock: Arc<dyn ClockPort>,
}

impl SqliteBoardCrudRepo {
    pub fn new(pool: SqlitePool, clock: Arc<dyn ClockPort>) -> Self {
        Self { pool, clock }
    }

    /// Read-only transaction; takes no write lock.
    async fn begin_read(
        &self,
        operation: &'static str,
    ) -> Result<sqlx::Transaction<'static, sqlx::Sqlite>, RepoError> {
        self.pool
            .begin()
            .await
            .map_err(|e| RepoError::database(operation, e))
    }

    /// Write transaction holding the database write lock from the start, so
    /// checks made inside it stay valid until commit. Competing writers wait
    /// on the connection's busy timeout.
    async fn begin_write(
        &self,
        operation: &'static str,
    ) -> Result<sqlx::Transaction<'static, sqlx::Sqlite>, RepoError> {
        self.pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| RepoError::database(operation, e))
    }
}

/// Map a write on `boards` so that the UNIQUE(name) constraint surfaces as
/// `NameTaken`, whichever transaction won the race.
fn board_write_error(operation: &'static str, name: &str) -> impl FnOnce(sqlx::Error) -> RepoError {
    let name = name.to_string();
    move |err| match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => RepoError::NameTaken(name),
        other => RepoError::from_sqlx(operation, other),
    }
}

async fn commit(
    tx: sqlx::Transaction<'static, sqlx::Sqlite>,
    operation: &'static str,
) -> Result<(), RepoError> {
    tx.commit()
        .await
        .map_err(|e| RepoError::database(operation, e))
}

// =============================================================================
// Connection-level queries (usable inside or outside a transaction)
// =============================================================================

async fn fetch_board(conn: &mut SqliteConnection, id: BoardId) -> Result<Board, RepoError> {
    let row = sqlx::query(&format!("SELECT {BOARD_COLUMNS} FROM boards WHERE id = ?"))
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| RepoError::from_sqlx("get_board", e))?;

    match row {
        Some(row) => row_to_board(&row),
        None => Err(RepoError::not_found("Board", id)),
    }
}

async fn name_in_use(
    conn: &mut SqliteConnection,
    name: &str,
    except: Option<BoardId>,
) -> Result<bool, RepoError> {
    let except = except.map(|id| id.to_string()).unwrap_or_default();
    let taken = sqlx::query_scalar::<_, i64>(
        "SELECT EXISTS(SELECT 1 FROM boards WHERE name = ? AND id <> ?)",
    )
    .bind(name)
    .bind(except)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| RepoError::from_sqlx("board_name_in_use", e))?;

    Ok(taken != 0)
}

async fn fetch_city_row(conn: &mut SqliteConnection, id: CityId) -> Result<City, RepoError> {
    let row = sqlx::query(&format!("SELECT {CITY_COLUMNS} FROM cities WHERE id = ?"))
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| RepoError::from_sqlx("get_city", e))?;

    match row {
        Some(row) => row_to_city(&row),
        None => Err(RepoError::not_found("City", id)),
    }
}

async fn fetch_city_spaces(
    conn: &mut SqliteConnection,
    city_id: CityId,
) -> Result<Vec<CitySpace>, RepoError> {
    let rows = sqlx::query(&format!(
        r#"SELECT {CITY_SPACE_COLUMNS} FROM city_spaces WHERE city_id = ? ORDER BY "order""#
    ))
    .bind(city_id.to_string())
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| RepoError::from_sqlx("list_city_spaces", e))?;

    rows.iter().map(row_to_city_space).collect()
}

async fn fetch_city(conn: &mut SqliteConnection, id: CityId) -> Result<City, RepoError> {
    let mut city = fetch_city_row(conn, id).await?;
    city.spaces = fetch_city_spaces(conn, id).await?;
    Ok(city)
}

async fn fetch_city_space(
    conn: &mut SqliteConnection,
    id: CitySpaceId,
) -> Result<CitySpace, RepoError> {
    let row = sqlx::query(&format!(
        "SELECT {CITY_SPACE_COLUMNS} FROM city_spaces WHERE id = ?"
    ))
    .bind(id.to_string())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| RepoError::from_sqlx("get_city_space", e))?;

    match row {
        Some(row) => row_to_city_space(&row),
        None => Err(RepoError::not_found("CitySpace", id)),
    }
}

/// Delete a city's spaces and then the city. Callers own the transaction.
async fn remove_city(conn: &mut SqliteConnection, id: CityId) -> Result<u64, RepoError> {
    let spaces = sqlx::query("DELETE FROM city_spaces WHERE city_id = ?")
        .bind(id.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| RepoError::from_sqlx("delete_city", e))?
        .rows_affected();

    sqlx::query("DELETE FROM cities WHERE id = ?")
        .bind(id.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| RepoError::from_sqlx("delete_city", e))?;

    Ok(spaces)
}

#[async_trait]
impl BoardCrudRepo for SqliteBoardCrudRepo {
    // =========================================================================
    // Boards
    // =========================================================================

    async fn get_board(&self, id: BoardId) -> Result<Board, RepoError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| RepoError::database("get_board", e))?;
        fetch_board(&mut conn, id).await
    }

    async fn create_board(&self, board: NewBoard) -> Result<Board, RepoError> {
        let mut tx = self.begin_write("create_board").await?;

        if name_in_use(&mut tx, &board.name, None).await? {
            return Err(RepoError::NameTaken(board.name));
        }

        let now = self.clock.now();
        let board = Board {
            id: BoardId::new(),
            name: board.name,
            width: board.width,
            height: board.height,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(&format!(
            "INSERT INTO boards ({BOARD_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?)"
        ))
        .bind(board.id.to_string())
        .bind(&board.name)
        .bind(board.width)
        .bind(board.height)
        .bind(format_timestamp(board.created_at))
        .bind(format_timestamp(board.updated_at))
        .execute(&mut *tx)
        .await
        .map_err(board_write_error("create_board", &board.name))?;

        commit(tx, "create_board").await?;
        tracing::debug!(board_id = %board.id, "Created board: {}", board.name);
        Ok(board)
    }

    async fn update_board(&self, id: BoardId, update: BoardUpdate) -> Result<Board, RepoError> {
        let mut tx = self.begin_write("update_board").await?;

        let original = fetch_board(&mut tx, id).await?;
        let mut board = original.clone();
        update(&mut board);
        board.id = original.id;
        board.created_at = original.created_at;
        board.updated_at = self.clock.now();

        if name_in_use(&mut tx, &board.name, Some(id)).await? {
            return Err(RepoError::NameTaken(board.name));
        }

        sqlx::query("UPDATE boards SET name = ?, width = ?, height = ?, updated_at = ? WHERE id = ?")
            .bind(&board.name)
            .bind(board.width)
            .bind(board.height)
            .bind(format_timestamp(board.updated_at))
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(board_write_error("update_board", &board.name))?;

        commit(tx, "update_board").await?;
        tracing::debug!(board_id = %id, "Updated board: {}", board.name);
        Ok(board)
    }

    async fn list_boards(&self) -> Result<Vec<Board>, RepoError> {
        let rows = sqlx::query(&format!("SELECT {BOARD_COLUMNS} FROM boards ORDER BY name"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::from_sqlx("list_boards", e))?;

        rows.iter().map(row_to_board).collect()
    }

    async fn delete_board(&self, id: BoardId) -> Result<(), RepoError> {
        let mut tx = self.begin_write("delete_board").await?;

        fetch_board(&mut tx, id).await?;

        let spaces = sqlx::query(
            "DELETE FROM city_spaces WHERE city_id IN (SELECT id FROM cities WHERE board_id = ?)",
        )
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepoError::from_sqlx("delete_board", e))?
        .rows_affected();

        let cities = sqlx::query("DELETE FROM cities WHERE board_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::from_sqlx("delete_board", e))?
            .rows_affected();

        sqlx::query("DELETE FROM boards WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::from_sqlx("delete_board", e))?;

        commit(tx, "delete_board").await?;
        tracing::debug!(board_id = %id, cities, spaces, "Deleted board");
        Ok(())
    }

    // =========================================================================
    // Cities
    // =========================================================================

    async fn list_cities_by_board(&self, board_id: BoardId) -> Result<Vec<City>, RepoError> {
        let mut tx = self.begin_read("list_cities_by_board").await?;

        fetch_board(&mut tx, board_id).await?;

        let rows = sqlx::query(&format!(
            "SELECT {CITY_COLUMNS} FROM cities WHERE board_id = ? ORDER BY created_at, id"
        ))
        .bind(board_id.to_string())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| RepoError::from_sqlx("list_cities_by_board", e))?;
        let mut cities = rows.iter().map(row_to_city).collect::<Result<Vec<_>, _>>()?;

        let space_rows = sqlx::query(
            r#"
            SELECT s.id, s.city_id, s."order", s.space_type, s.required_privilege,
                   s.created_at, s.updated_at
            FROM city_spaces s
            JOIN cities c ON c.id = s.city_id
            WHERE c.board_id = ?
            ORDER BY s.city_id, s."order"
            "#,
        )
        .bind(board_id.to_string())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| RepoError::from_sqlx("list_cities_by_board", e))?;

        commit(tx, "list_cities_by_board").await?;

        let mut spaces_by_city: HashMap<CityId, Vec<CitySpace>> = HashMap::new();
        for row in &space_rows {
            let space = row_to_city_space(row)?;
            spaces_by_city.entry(space.city_id).or_default().push(space);
        }
        for city in &mut cities {
            city.spaces = spaces_by_city.remove(&city.id).unwrap_or_default();
        }

        Ok(cities)
    }

    async fn get_city(&self, id: CityId) -> Result<City, RepoError> {
        let mut tx = self.begin_read("get_city").await?;
        let city = fetch_city(&mut tx, id).await?;
        commit(tx, "get_city").await?;
        Ok(city)
    }

    async fn create_city(&self, city: NewCity) -> Result<City, RepoError> {
        let mut tx = self.begin_write("create_city").await?;

        fetch_board(&mut tx, city.board_id).await?;

        let now = self.clock.now();
        let city = City {
            id: CityId::new(),
            board_id: city.board_id,
            name: city.name,
            position: city.position,
            spaces: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(&format!(
            "INSERT INTO cities ({CITY_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(city.id.to_string())
        .bind(city.board_id.to_string())
        .bind(&city.name)
        .bind(city.position.x)
        .bind(city.position.y)
        .bind(format_timestamp(city.created_at))
        .bind(format_timestamp(city.updated_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| RepoError::from_sqlx("create_city", e))?;

        commit(tx, "create_city").await?;
        tracing::debug!(city_id = %city.id, board_id = %city.board_id, "Created city: {}", city.name);
        Ok(city)
    }

    async fn update_city(&self, id: CityId, update: CityUpdate) -> Result<City, RepoError> {
        let mut tx = self.begin_write("update_city").await?;

        let original = fetch_city(&mut tx, id).await?;
        let mut city = original.clone();
        update(&mut city);
        city.id = original.id;
        city.board_id = original.board_id;
        city.spaces = original.spaces;
        city.created_at = original.created_at;
        city.updated_at = self.clock.now();

        sqlx::query("UPDATE cities SET name = ?, x = ?, y = ?, updated_at = ? WHERE id = ?")
            .bind(&city.name)
            .bind(city.position.x)
            .bind(city.position.y)
            .bind(format_timestamp(city.updated_at))
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::from_sqlx("update_city", e))?;

        commit(tx, "update_city").await?;
        tracing::debug!(city_id = %id, "Updated city: {}", city.name);
        Ok(city)
    }

    async fn delete_city(&self, id: CityId) -> Result<(), RepoError> {
        let mut tx = self.begin_write("delete_city").await?;

        fetch_city_row(&mut tx, id).await?;
        let spaces = remove_city(&mut tx, id).await?;

        commit(tx, "delete_city").await?;
        tracing::debug!(city_id = %id, spaces, "Deleted city");
        Ok(())
    }

    async fn delete_city_on_board(
        &self,
        board_id: BoardId,
        city_id: CityId,
    ) -> Result<(), RepoError> {
        let mut tx = self.begin_write("delete_city_on_board").await?;

        fetch_board(&mut tx, board_id).await?;
        let city = fetch_city_row(&mut tx, city_id).await?;
        if city.board_id != board_id {
            return Err(RepoError::not_found("City", city_id));
        }
        let spaces = remove_city(&mut tx, city_id).await?;

        commit(tx, "delete_city_on_board").await?;
        tracing::debug!(city_id = %city_id, board_id = %board_id, spaces, "Deleted city");
        Ok(())
    }

    // =========================================================================
    // City spaces
    // =========================================================================

    async fn create_city_space(&self, space: NewCitySpace) -> Result<CitySpace, RepoError> {
        let mut tx = self.begin_write("create_city_space").await?;

        fetch_city_row(&mut tx, space.city_id).await?;

        let order = match space.order {
            Some(order) => order,
            None => {
                let next = sqlx::query_scalar::<_, i64>(
                    r#"SELECT COALESCE(MAX("order"), 0) + 1 FROM city_spaces WHERE city_id = ?"#,
                )
                .bind(space.city_id.to_string())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| RepoError::from_sqlx("create_city_space", e))?;
                i32::try_from(next).map_err(|e| RepoError::serialization(format!("order: {e}")))?
            }
        };

        let now = self.clock.now();
        let space = CitySpace {
            id: CitySpaceId::new(),
            city_id: space.city_id,
            order,
            space_type: space.space_type,
            required_privilege: space.required_privilege,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(&format!(
            "INSERT INTO city_spaces ({CITY_SPACE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(space.id.to_string())
        .bind(space.city_id.to_string())
        .bind(space.order)
        .bind(space.space_type.code())
        .bind(space.required_privilege)
        .bind(format_timestamp(space.created_at))
        .bind(format_timestamp(space.updated_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| RepoError::from_sqlx("create_city_space", e))?;

        commit(tx, "create_city_space").await?;
        tracing::debug!(
            space_id = %space.id,
            city_id = %space.city_id,
            order = space.order,
            "Created city space"
        );
        Ok(space)
    }

    async fn update_city_space(
        &self,
        id: CitySpaceId,
        update: CitySpaceUpdate,
    ) -> Result<CitySpace, RepoError> {
        let mut tx = self.begin_write("update_city_space").await?;

        let original = fetch_city_space(&mut tx, id).await?;
        let mut space = original.clone();
        update(&mut space);
        space.id = original.id;
        space.city_id = original.city_id;
        space.created_at = original.created_at;
        space.updated_at = self.clock.now();

        sqlx::query(
            r#"UPDATE city_spaces SET "order" = ?, space_type = ?, required_privilege = ?, updated_at = ? WHERE id = ?"#,
        )
        .bind(space.order)
        .bind(space.space_type.code())
        .bind(space.required_privilege)
        .bind(format_timestamp(space.updated_at))
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepoError::from_sqlx("update_city_space", e))?;

        commit(tx, "update_city_space").await?;
        Ok(space)
    }

    async fn list_city_spaces(&self, city_id: CityId) -> Result<Vec<CitySpace>, RepoError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| RepoError::database("list_city_spaces", e))?;
        fetch_city_spaces(&mut conn, city_id).await
    }

    async fn delete_city_space(&self, id: CitySpaceId) -> Result<(), RepoError> {
        let mut tx = self.begin_write("delete_city_space").await?;

        fetch_city_space(&mut tx, id).await?;
        sqlx::query("DELETE FROM city_spaces WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::from_sqlx("delete_city_space", e))?;

        commit(tx, "delete_city_space").await?;
        tracing::debug!(space_id = %id, "Deleted city space");
        Ok(())
    }
}
