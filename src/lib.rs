use axum::{Router, extract::FromRef, http::HeaderName};

use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod builder;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod password;
pub mod repository;
pub mod views;

// One router per route group (pages, accounts, posts, contact, search).
pub mod routes;
use routes::{accounts, contact, pages, posts, search};

// --- Public Re-exports ---

pub use auth::{Claims, TokenCodec};
pub use builder::RouterBuilder;
pub use config::AppConfig;
pub use error::AppError;
pub use identity::Identity;
pub use repository::{PostgresRepository, RepositoryState};
pub use views::{RendererState, TemplateRenderer};
#[cfg(any(test, feature = "test-util"))]
pub use views::MockRenderer;

/// AppState
///
/// The server context: built once in `main`, handed to the router builder, and shared
/// read-only with every request. Nothing in it is mutated after startup; the only
/// per-request state is the identity slot.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: abstracts database access.
    pub repo: RepositoryState,
    /// View Layer: abstracts the template engine.
    pub views: RendererState,
    /// Token Codec: signs and verifies identity tokens with the configured secret.
    pub tokens: TokenCodec,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

impl AppState {
    pub fn new(repo: RepositoryState, views: RendererState, config: AppConfig) -> Self {
        let tokens = TokenCodec::new(&config.jwt_secret, config.token_ttl_secs);
        Self {
            repo,
            views,
            tokens,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

// Let handlers and middleware pull just the component they need from AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for RendererState {
    fn from_ref(app_state: &AppState) -> RendererState {
        app_state.views.clone()
    }
}

impl FromRef<AppState> for TokenCodec {
    fn from_ref(app_state: &AppState) -> TokenCodec {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the application: identity middleware, every route group, the not-found
/// fallback, then the observability layers around the whole thing.
pub fn create_router(state: AppState) -> Router {
    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let app = RouterBuilder::new(state)
        .with_identity()
        .routes(pages::page_routes())
        .routes(accounts::account_routes())
        .routes(posts::post_routes())
        .routes(contact::contact_routes())
        .routes(search::search_routes())
        .fallback(handlers::not_found)
        .build();

    app.layer(
        ServiceBuilder::new()
            // Request ID Generation: a UUID for every incoming request.
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            // Request Tracing: one span per request, tagged with the request ID.
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace_span_logger)
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(tower_http::LatencyUnit::Millis),
                    ),
            )
            // Request ID Propagation: echo x-request-id back to the client.
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: method, URI and the `x-request-id` header, so every
/// log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
