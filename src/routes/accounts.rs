use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Accounts Router Module
///
/// The only routes that write the token cookie. GET serves the forms, POST processes them.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        // GET/POST /register
        // Creates the account and signs the new user in.
        .route(
            "/register",
            get(handlers::register_page).post(handlers::register),
        )
        // GET/POST /login
        .route("/login", get(handlers::login_page).post(handlers::login))
        // GET /logout
        // Clears the cookie. Tokens are not revocable, so this is client-side only.
        .route("/logout", get(handlers::logout))
}
