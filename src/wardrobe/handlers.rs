use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{CreateItemRequest, UpdateItemRequest},
    repo_types::WardrobeItem,
    services,
};
use crate::{auth::extractors::CurrentUser, error::AppResult, state::AppState};

pub fn wardrobe_routes() -> Router<AppState> {
    Router::new()
        .route("/wardrobe/", post(add_item).get(list_items))
        .route("/wardrobe/:id", put(update_item).delete(delete_item))
}

#[instrument(skip(state, user, body), fields(user_id = user.id))]
pub async fn add_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateItemRequest>,
) -> AppResult<(StatusCode, Json<WardrobeItem>)> {
    let item = services::add_item(state.wardrobe.as_ref(), user.id, &body.name, &body.metadata).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_items(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<WardrobeItem>>> {
    let items = services::list_items(state.wardrobe.as_ref(), user.id).await?;
    Ok(Json(items))
}

#[instrument(skip(state, user, body), fields(user_id = user.id))]
pub async fn update_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateItemRequest>,
) -> AppResult<Json<WardrobeItem>> {
    let item = services::update_item(state.wardrobe.as_ref(), user.id, id, body.into()).await?;
    Ok(Json(item))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    services::delete_item(state.wardrobe.as_ref(), user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
