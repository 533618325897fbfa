//! API REST de la surface de contrôle.
//!
//! Chaque commande rend exactement une réponse succès/échec avec un motif
//! lisible ; les commandes d'état réussies déclenchent en plus une
//! diffusion SSE vers tous les clients.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use rgcplaylist::{ItemProps, PlaylistError};

use crate::session::Session;
use crate::sse::playlist_events_sse;

/// Router `/api/playlist` de la régie.
pub fn router(session: Arc<Session>) -> Router {
    Router::new()
        .route("/api/playlist", get(get_snapshot).post(replace_playlist))
        .route("/api/playlist/items", post(add_item))
        .route(
            "/api/playlist/items/{position}",
            axum::routing::patch(update_item).delete(delete_item),
        )
        .route("/api/playlist/items/{position}/move", post(move_item))
        .route("/api/playlist/items/{position}/pages", post(add_pages))
        .route("/api/playlist/active", post(set_active))
        .route("/api/playlist/navigate", post(navigate))
        .route("/api/playlist/visibility", post(set_visibility))
        .route("/api/playlist/events", get(playlist_events_sse))
        .with_state(session)
}

/// Réponse d'erreur REST générique.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ReplacePlaylistRequest {
    pub caption: String,
    #[serde(default)]
    pub items: Vec<ItemProps>,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    #[serde(flatten)]
    pub props: ItemProps,
    pub index: Option<i64>,
    #[serde(default)]
    pub set_active: bool,
}

#[derive(Debug, Serialize)]
pub struct AddItemResponse {
    pub position: usize,
}

#[derive(Debug, Deserialize)]
pub struct MoveItemRequest {
    pub to: i64,
}

#[derive(Debug, Serialize)]
pub struct MoveItemResponse {
    /// Permutation complète ancien→nouveau, pour remapper les références.
    pub permutation: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct DeleteItemResponse {
    pub active_changed: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub item: i64,
    #[serde(default)]
    pub slide: i64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigateTarget {
    Item,
    Slide,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub target: NavigateTarget,
    /// +1 ou −1.
    pub steps: i64,
}

#[derive(Debug, Serialize)]
pub struct NavigateResponse {
    pub item_changed: bool,
}

#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    pub visible: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddPagesRequest {
    pub pages: usize,
}

async fn get_snapshot(State(session): State<Arc<Session>>) -> Response {
    Json(session.snapshot().await).into_response()
}

async fn replace_playlist(
    State(session): State<Arc<Session>>,
    Json(req): Json<ReplacePlaylistRequest>,
) -> Response {
    session.replace_playlist(req.caption, req.items).await;
    (StatusCode::OK, Json(session.snapshot().await)).into_response()
}

async fn add_item(
    State(session): State<Arc<Session>>,
    Json(req): Json<AddItemRequest>,
) -> Response {
    match session.add_item(req.props, req.index, req.set_active).await {
        Ok(position) => (StatusCode::CREATED, Json(AddItemResponse { position })).into_response(),
        Err(err) => map_error(err),
    }
}

async fn update_item(
    State(session): State<Arc<Session>>,
    Path(position): Path<i64>,
    Json(props): Json<ItemProps>,
) -> Response {
    match session.update_item(position, props).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => map_error(err),
    }
}

async fn delete_item(State(session): State<Arc<Session>>, Path(position): Path<i64>) -> Response {
    match session.delete_item(position).await {
        Ok(active_changed) => {
            (StatusCode::OK, Json(DeleteItemResponse { active_changed })).into_response()
        }
        Err(err) => map_error(err),
    }
}

async fn move_item(
    State(session): State<Arc<Session>>,
    Path(position): Path<i64>,
    Json(req): Json<MoveItemRequest>,
) -> Response {
    match session.move_item(position, req.to).await {
        Ok(permutation) => (StatusCode::OK, Json(MoveItemResponse { permutation })).into_response(),
        Err(err) => map_error(err),
    }
}

async fn add_pages(
    State(session): State<Arc<Session>>,
    Path(position): Path<i64>,
    Json(req): Json<AddPagesRequest>,
) -> Response {
    match session.add_rasterized_pages(position, req.pages).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => map_error(err),
    }
}

async fn set_active(
    State(session): State<Arc<Session>>,
    Json(req): Json<SetActiveRequest>,
) -> Response {
    match session.set_active(req.item, req.slide).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => map_error(err),
    }
}

async fn navigate(
    State(session): State<Arc<Session>>,
    Json(req): Json<NavigateRequest>,
) -> Response {
    if req.steps != 1 && req.steps != -1 {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "invalid_steps".to_string(),
                message: format!("steps must be +1 or -1, got {}", req.steps),
            }),
        )
            .into_response();
    }

    let result = match req.target {
        NavigateTarget::Item => session.navigate_item(req.steps).await.map(|_| true),
        NavigateTarget::Slide => session.navigate_slide(req.steps).await,
    };

    match result {
        Ok(item_changed) => {
            (StatusCode::OK, Json(NavigateResponse { item_changed })).into_response()
        }
        Err(err) => map_error(err),
    }
}

async fn set_visibility(
    State(session): State<Arc<Session>>,
    Json(req): Json<VisibilityRequest>,
) -> Response {
    session.set_visibility(req.visible).await;
    StatusCode::NO_CONTENT.into_response()
}

/// Mappe la taxonomie d'erreurs du moteur vers les codes HTTP.
fn map_error(err: PlaylistError) -> Response {
    let (status, error) = match &err {
        PlaylistError::InvalidItemIndex { .. } => (StatusCode::BAD_REQUEST, "invalid_item_index"),
        PlaylistError::InvalidSlideIndex { .. } => (StatusCode::BAD_REQUEST, "invalid_slide_index"),
        PlaylistError::NoActiveItem => (StatusCode::BAD_REQUEST, "no_active_item"),
        PlaylistError::TypeMismatch { .. } => (StatusCode::CONFLICT, "type_mismatch"),
        PlaylistError::NotDisplayable { .. } => (StatusCode::CONFLICT, "not_displayable"),
        PlaylistError::NoDisplayableItems => (StatusCode::CONFLICT, "no_displayable_items"),
        PlaylistError::Content(_) => (StatusCode::UNPROCESSABLE_ENTITY, "content_error"),
        PlaylistError::Other(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    };

    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            message: err.to_string(),
        }),
    )
        .into_response()
}
