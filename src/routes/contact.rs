use crate::{AppState, handlers};
use axum::{Router, routing::get};

pub fn contact_routes() -> Router<AppState> {
    Router::new().route(
        "/contact",
        get(handlers::contact_page).post(handlers::submit_contact),
    )
}
