use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Posts Router Module
///
/// Listing is public. Creation checks the identity slot inside the handler and
/// redirects anonymous visitors to /login.
pub fn post_routes() -> Router<AppState> {
    Router::new().route("/posts", get(handlers::list_posts).post(handlers::create_post))
}
