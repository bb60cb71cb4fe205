use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Pages Router Module
///
/// Endpoints every visitor can view, anonymous or signed in. Each renders one view and
/// passes the current identity through under the `user` key.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // Landing page. Renders no post data.
        .route("/", get(handlers::home))
        .route("/about", get(handlers::about))
        .route("/team", get(handlers::team))
        .route("/logo", get(handlers::logo))
        // GET /users
        // Every persisted user, unfiltered and unpaginated.
        .route("/users", get(handlers::list_users))
}
