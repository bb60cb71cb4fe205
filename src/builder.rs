use std::marker::PhantomData;

use axum::{Router, handler::Handler, middleware};

use crate::{AppState, identity::attach_identity};

// Construction stages. Each one only exposes the step that may legally come next.
pub struct AwaitingIdentity;
pub struct AwaitingRoutes;
pub struct Ready;

/// RouterBuilder
///
/// Assembles the application router with its ordering contract checked at compile time:
///
/// 1. `with_identity` installs the identity middleware,
/// 2. `routes` merges route groups (any number of times),
/// 3. `fallback` registers the not-found handler after every route,
/// 4. `build` produces the finished `Router`.
///
/// Calling these out of order does not type-check.
pub struct RouterBuilder<Stage> {
    state: AppState,
    routes: Router<AppState>,
    _stage: PhantomData<Stage>,
}

impl<Stage> RouterBuilder<Stage> {
    fn advance<Next>(self) -> RouterBuilder<Next> {
        RouterBuilder {
            state: self.state,
            routes: self.routes,
            _stage: PhantomData,
        }
    }
}

impl RouterBuilder<AwaitingIdentity> {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            routes: Router::new(),
            _stage: PhantomData,
        }
    }

    /// Identity stage. The layer itself is applied in `build`, once the fallback exists,
    /// so that unmatched requests are covered too.
    pub fn with_identity(self) -> RouterBuilder<AwaitingRoutes> {
        self.advance()
    }
}

impl RouterBuilder<AwaitingRoutes> {
    /// Route stage: merges one route group.
    pub fn routes(mut self, group: Router<AppState>) -> Self {
        self.routes = self.routes.merge(group);
        self
    }

    /// Fallback stage: `handler` answers every (method, path) pair no route claimed,
    /// including known paths hit with an unregistered method.
    pub fn fallback<H, T>(mut self, handler: H) -> RouterBuilder<Ready>
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        self.routes = self
            .routes
            .method_not_allowed_fallback(handler.clone())
            .fallback(handler);
        self.advance()
    }
}

impl RouterBuilder<Ready> {
    pub fn build(self) -> Router {
        self.routes
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                attach_identity,
            ))
            .with_state(self.state)
    }
}
