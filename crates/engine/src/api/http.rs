//! HTTP routes.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use cityroute_domain::{Board, City, CitySpace};

use crate::app::App;
use crate::use_cases::board_editor::{
    AddCitySpaceForm, BoardDimensionsForm, BoardForm, BoardNameForm, CityForm, CreateBoardForm,
    EditorError, UpdateCitySpaceForm,
};
use crate::use_cases::validation::FieldErrors;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/boards", get(list_boards).post(create_board))
        .route(
            "/boards/{board_id}",
            get(get_board)
                .patch(update_board)
                .put(update_board)
                .post(update_board)
                .delete(delete_board),
        )
        .route(
            "/boards/{board_id}/cities",
            get(list_cities).post(create_city),
        )
        .route(
            "/boards/{board_id}/cities/{city_id}",
            get(get_city).put(update_city).delete(delete_city),
        )
        .route(
            "/cities/{city_id}/spaces",
            get(list_city_spaces).post(add_city_space),
        )
        .route(
            "/spaces/{space_id}",
            put(update_city_space).delete(delete_city_space),
        )
}

async fn index() -> Redirect {
    Redirect::to("/boards")
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Boards
// =============================================================================

async fn list_boards(State(app): State<Arc<App>>) -> Result<Json<Vec<Board>>, ApiError> {
    Ok(Json(app.board_editor.list_boards().await?))
}

async fn create_board(
    State(app): State<Arc<App>>,
    Json(form): Json<CreateBoardForm>,
) -> Result<(StatusCode, Json<Board>), ApiError> {
    let board = app.board_editor.create_board(&form).await?;
    Ok((StatusCode::CREATED, Json(board)))
}

async fn get_board(
    State(app): State<Arc<App>>,
    Path(board_id): Path<String>,
) -> Result<Json<Board>, ApiError> {
    Ok(Json(app.board_editor.find_board(&board_id).await?))
}

/// Board update body. Which fields are present picks the kind of update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoardRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub width: Option<i32>,
    #[serde(default)]
    pub height: Option<i32>,
}

/// One of the three board update shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardUpdateKind {
    Full(BoardForm),
    Dimensions(BoardDimensionsForm),
    Name(BoardNameForm),
}

impl UpdateBoardRequest {
    /// Name and width present means a full update, width without a name a
    /// resize, anything else a rename.
    pub fn into_kind(self) -> BoardUpdateKind {
        match (self.name, self.width) {
            (Some(name), Some(width)) => BoardUpdateKind::Full(BoardForm {
                name,
                width,
                height: self.height.unwrap_or_default(),
            }),
            (None, Some(width)) => BoardUpdateKind::Dimensions(BoardDimensionsForm {
                width,
                height: self.height.unwrap_or_default(),
            }),
            (name, None) => BoardUpdateKind::Name(BoardNameForm {
                name: name.unwrap_or_default(),
            }),
        }
    }
}

async fn update_board(
    State(app): State<Arc<App>>,
    Path(board_id): Path<String>,
    Json(request): Json<UpdateBoardRequest>,
) -> Result<Json<Board>, ApiError> {
    let editor = &app.board_editor;
    let board = match request.into_kind() {
        BoardUpdateKind::Full(form) => editor.update_board(&board_id, &form).await?,
        BoardUpdateKind::Dimensions(form) => {
            editor.update_board_dimensions(&board_id, &form).await?
        }
        BoardUpdateKind::Name(form) => editor.update_board_name(&board_id, &form).await?,
    };
    Ok(Json(board))
}

async fn delete_board(
    State(app): State<Arc<App>>,
    Path(board_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    app.board_editor.delete_board(&board_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Cities
// =============================================================================

async fn list_cities(
    State(app): State<Arc<App>>,
    Path(board_id): Path<String>,
) -> Result<Json<Vec<City>>, ApiError> {
    Ok(Json(app.board_editor.list_cities(&board_id).await?))
}

async fn create_city(
    State(app): State<Arc<App>>,
    Path(board_id): Path<String>,
    Json(form): Json<CityForm>,
) -> Result<(StatusCode, Json<City>), ApiError> {
    let city = app.board_editor.create_city(&board_id, &form).await?;
    Ok((StatusCode::CREATED, Json(city)))
}

async fn get_city(
    State(app): State<Arc<App>>,
    Path((_board_id, city_id)): Path<(String, String)>,
) -> Result<Json<City>, ApiError> {
    Ok(Json(app.board_editor.find_city(&city_id).await?))
}

async fn update_city(
    State(app): State<Arc<App>>,
    Path((_board_id, city_id)): Path<(String, String)>,
    Json(form): Json<CityForm>,
) -> Result<Json<City>, ApiError> {
    Ok(Json(app.board_editor.update_city(&city_id, &form).await?))
}

async fn delete_city(
    State(app): State<Arc<App>>,
    Path((board_id, city_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    app.board_editor
        .delete_city_on_board(&board_id, &city_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// City spaces
// =============================================================================

async fn list_city_spaces(
    State(app): State<Arc<App>>,
    Path(city_id): Path<String>,
) -> Result<Json<Vec<CitySpace>>, ApiError> {
    Ok(Json(app.board_editor.list_city_spaces(&city_id).await?))
}

async fn add_city_space(
    State(app): State<Arc<App>>,
    Path(city_id): Path<String>,
    Json(form): Json<AddCitySpaceForm>,
) -> Result<(StatusCode, Json<CitySpace>), ApiError> {
    let space = app.board_editor.add_city_space(&city_id, &form).await?;
    Ok((StatusCode::CREATED, Json(space)))
}

async fn update_city_space(
    State(app): State<Arc<App>>,
    Path(space_id): Path<String>,
    Json(form): Json<UpdateCitySpaceForm>,
) -> Result<Json<CitySpace>, ApiError> {
    Ok(Json(
        app.board_editor.update_city_space(&space_id, &form).await?,
    ))
}

async fn delete_city_space(
    State(app): State<Arc<App>>,
    Path(space_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    app.board_editor.delete_city_space(&space_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Errors
// =============================================================================

/// API error type.
#[derive(Debug)]
pub enum ApiError {
    InvalidForm(FieldErrors),
    NotFound(String),
    InvalidId(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidForm(errors) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "errors": errors })),
            )
                .into_response(),
            ApiError::NotFound(what) => {
                tracing::debug!(%what, "Responding not found");
                (StatusCode::NOT_FOUND, "Not found").into_response()
            }
            ApiError::InvalidId(raw) => {
                tracing::debug!(raw_id = %raw, "Responding not found for malformed id");
                (StatusCode::NOT_FOUND, "Not found").into_response()
            }
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}

impl From<EditorError> for ApiError {
    fn from(err: EditorError) -> Self {
        match err {
            EditorError::InvalidForm(errors) => ApiError::InvalidForm(errors),
            EditorError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            EditorError::InvalidId(raw) => ApiError::InvalidId(raw),
            EditorError::Repo(e) => ApiError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request as HttpRequest},
    };
    use chrono::{TimeZone, Utc};
    use cityroute_domain::{BoardId, NewBoard};
    use tower::ServiceExt;

    use crate::api::router;
    use crate::infrastructure::config::AppConfig;
    use crate::infrastructure::ports::{MockBoardCrudRepo, RepoError};

    fn stored_board(id: BoardId, draft: NewBoard) -> Board {
        let now = Utc.timestamp_opt(1_700_000_000, 0).single().unwrap();
        Board {
            id,
            name: draft.name,
            width: draft.width,
            height: draft.height,
            created_at: now,
            updated_at: now,
        }
    }

    fn app(repo: MockBoardCrudRepo) -> Router {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        router(Arc::new(App::new(Arc::new(repo))), &config)
    }

    fn json_request(method: Method, uri: &str, body: serde_json::Value) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header("X-Requested-With", "XMLHttpRequest")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn update_dispatch_follows_present_fields() {
        let full = UpdateBoardRequest {
            name: Some("Baltic".into()),
            width: Some(10),
            height: None,
        };
        assert_eq!(
            full.into_kind(),
            BoardUpdateKind::Full(BoardForm {
                name: "Baltic".into(),
                width: 10,
                height: 0,
            })
        );

        let resize = UpdateBoardRequest {
            name: None,
            width: Some(10),
            height: Some(20),
        };
        assert_eq!(
            resize.into_kind(),
            BoardUpdateKind::Dimensions(BoardDimensionsForm {
                width: 10,
                height: 20,
            })
        );

        let rename = UpdateBoardRequest {
            name: Some("Baltic".into()),
            width: None,
            height: Some(20),
        };
        assert_eq!(
            rename.into_kind(),
            BoardUpdateKind::Name(BoardNameForm::new("Baltic"))
        );
    }

    #[tokio::test]
    async fn health_and_index() {
        let app = app(MockBoardCrudRepo::new());

        let response = app
            .clone()
            .oneshot(HttpRequest::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(HttpRequest::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/boards");
    }

    #[tokio::test]
    async fn create_board_returns_created_board() {
        let mut repo = MockBoardCrudRepo::new();
        repo.expect_create_board()
            .times(1)
            .returning(|draft| Ok(stored_board(BoardId::new(), draft)));

        let response = app(repo)
            .oneshot(json_request(
                Method::POST,
                "/boards",
                serde_json::json!({ "name": "Town Map" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["name"], "Town Map");
        assert_eq!(body["width"], 800);
        assert_eq!(body["height"], 500);
    }

    #[tokio::test]
    async fn create_board_without_requested_with_never_reaches_editor() {
        let mut repo = MockBoardCrudRepo::new();
        repo.expect_create_board().times(0);

        let request = HttpRequest::builder()
            .method(Method::POST)
            .uri("/boards")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":"Town Map"}"#))
            .unwrap();
        let response = app(repo).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_form_is_bad_request_with_field_errors() {
        let response = app(MockBoardCrudRepo::new())
            .oneshot(json_request(
                Method::POST,
                "/boards",
                serde_json::json!({ "name": "  " }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "errors": { "Name": ["must not be blank"] } })
        );
    }

    #[tokio::test]
    async fn malformed_and_missing_ids_are_not_found() {
        let mut repo = MockBoardCrudRepo::new();
        repo.expect_get_board()
            .returning(|id| Err(RepoError::not_found("Board", id)));
        let app = app(repo);

        let response = app
            .clone()
            .oneshot(
                HttpRequest::builder()
                    .uri("/boards/not-an-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri(format!("/boards/{}", BoardId::new()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn patch_with_dimensions_only_resizes() {
        let mut repo = MockBoardCrudRepo::new();
        repo.expect_update_board().times(1).returning(|id, update| {
            let mut board = stored_board(id, NewBoard::new("Keep"));
            update(&mut board);
            Ok(board)
        });

        let response = app(repo)
            .oneshot(json_request(
                Method::PATCH,
                &format!("/boards/{}", BoardId::new()),
                serde_json::json!({ "width": 1024, "height": 768 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["name"], "Keep");
        assert_eq!(body["width"], 1024);
        assert_eq!(body["height"], 768);
    }

    #[tokio::test]
    async fn delete_board_is_no_content() {
        let mut repo = MockBoardCrudRepo::new();
        repo.expect_delete_board().times(1).returning(|_| Ok(()));

        let request = HttpRequest::builder()
            .method(Method::DELETE)
            .uri(format!("/boards/{}", BoardId::new()))
            .header("X-Requested-With", "XMLHttpRequest")
            .body(Body::empty())
            .unwrap();
        let response = app(repo).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn storage_failure_is_internal_error_with_generic_body() {
        let mut repo = MockBoardCrudRepo::new();
        repo.expect_list_boards()
            .returning(|| Err(RepoError::database("list_boards", "database is locked")));

        let response = app(repo)
            .oneshot(HttpRequest::builder().uri("/boards").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"Internal error");
    }

    #[tokio::test]
    async fn responses_are_not_cacheable() {
        let mut repo = MockBoardCrudRepo::new();
        repo.expect_list_boards().returning(|| Ok(Vec::new()));

        let response = app(repo)
            .oneshot(HttpRequest::builder().uri("/boards").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(header::PRAGMA).unwrap(), "no-cache");
    }
}
