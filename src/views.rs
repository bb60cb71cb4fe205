use std::{path::Path, sync::Arc};

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use minijinja::{Environment, path_loader};
use serde::Serialize;
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::identity::Identity;

/// Key under which every view's data bag carries the current identity (or null).
pub const IDENTITY_KEY: &str = "user";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
    #[error("failed to serialize view data: {0}")]
    Data(#[from] serde_json::Error),
    #[error("{0}")]
    Simulated(String),
}

/// View
///
/// A named template plus the data bag it is rendered with, and the status the
/// rendered page is served under. Built only through `View::new`, so the identity
/// key is always present.
#[derive(Debug, Clone)]
pub struct View {
    name: &'static str,
    status: StatusCode,
    data: Map<String, Value>,
}

impl View {
    pub fn new(name: &'static str, identity: &Identity) -> Self {
        let mut data = Map::new();
        data.insert(IDENTITY_KEY.to_string(), json!(identity));
        Self {
            name,
            status: StatusCode::OK,
            data,
        }
    }

    /// Adds `value` to the data bag under `key`.
    pub fn with<T: Serialize>(mut self, key: &str, value: T) -> Result<Self, RenderError> {
        self.data.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }
}

/// Renderer
///
/// Turns a `View` into HTML. The template engine sits behind this trait so handlers can
/// be tested without template files on disk.
pub trait Renderer: Send + Sync {
    fn render(&self, view: &View) -> Result<String, RenderError>;
}

/// RendererState
///
/// The concrete type used to share the renderer across the application state.
pub type RendererState = Arc<dyn Renderer>;

/// respond
///
/// Renders `view` and wraps the HTML in a response carrying the view's status.
pub fn respond(renderer: &dyn Renderer, view: View) -> Result<Response, RenderError> {
    let body = renderer.render(&view)?;
    Ok((view.status, Html(body)).into_response())
}

/// TemplateRenderer
///
/// Production renderer: minijinja templates loaded lazily from a directory, one
/// `<view name>.html` file per view. HTML auto-escaping applies by file extension.
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl TemplateRenderer {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let mut env = Environment::new();
        env.set_loader(path_loader(dir.as_ref().to_path_buf()));
        Self { env }
    }
}

impl Renderer for TemplateRenderer {
    fn render(&self, view: &View) -> Result<String, RenderError> {
        let template = self.env.get_template(&format!("{}.html", view.name))?;
        Ok(template.render(&view.data)?)
    }
}

/// MockRenderer
///
/// Renders a view as the JSON document `{"view": name, "data": bag}` so tests can assert
/// on exactly what a handler passed to the template engine.
#[cfg(any(test, feature = "test-util"))]
#[derive(Clone, Default)]
pub struct MockRenderer {
    /// When true, every render returns a simulated failure.
    pub should_fail: bool,
}

#[cfg(any(test, feature = "test-util"))]
impl MockRenderer {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn new_failing() -> Self {
        Self { should_fail: true }
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Renderer for MockRenderer {
    fn render(&self, view: &View) -> Result<String, RenderError> {
        if self.should_fail {
            return Err(RenderError::Simulated(
                "Mock Renderer Error: Simulation requested".to_string(),
            ));
        }
        Ok(json!({ "view": view.name, "data": view.data }).to_string())
    }
}
