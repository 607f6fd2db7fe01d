//! Outfit recommendations: describe items, index them, retrieve, generate.

pub mod describe;
pub mod embedding;
pub mod handlers;
pub mod index;
pub mod llm;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::style_routes()
}
