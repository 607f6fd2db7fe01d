use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::services::{style_me, Stylist};
use crate::{auth::extractors::CurrentUser, error::AppResult, state::AppState};

#[derive(Debug, Deserialize)]
pub struct StyleRequest {
    pub occasion: String,
    pub weather_context: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StyleResponse {
    pub suggestion: String,
}

pub fn style_routes() -> Router<AppState> {
    Router::new().route("/style-me/", post(get_style_suggestion))
}

#[instrument(skip(state, user, body), fields(user_id = user.id, occasion = %body.occasion))]
pub async fn get_style_suggestion(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<StyleRequest>,
) -> AppResult<Json<StyleResponse>> {
    let stylist = Stylist::from_ref(&state);
    let suggestion = style_me(
        state.wardrobe.as_ref(),
        &stylist,
        user.id,
        &body.occasion,
        &body.weather_context,
    )
    .await?;
    Ok(Json(StyleResponse { suggestion }))
}
