use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// GET /search?q=term
pub fn search_routes() -> Router<AppState> {
    Router::new().route("/search", get(handlers::search))
}
