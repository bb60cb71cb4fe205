#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use chrono::Utc;
use portal_web::{
    AppConfig, AppState, MockRenderer, create_router,
    models::{ContactForm, NewPostForm, NewUser, Post, User},
    password,
    repository::{RepoError, Repository},
};
use serde_json::Value;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "hunter2-but-longer";

// --- Mock Repository ---

/// In-memory stand-in for the database. Keeps insertion order, which is the
/// "store order" the listing handlers expose.
#[derive(Default)]
pub struct MockRepo {
    pub users: Mutex<Vec<User>>,
    pub posts: Mutex<Vec<Post>>,
    pub contact_messages: Mutex<Vec<ContactForm>>,
    pub search_calls: AtomicUsize,
    // When true, every call fails like a dropped database connection.
    pub fail: bool,
}

impl MockRepo {
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), RepoError> {
        if self.fail {
            return Err(RepoError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

#[async_trait]
impl Repository for MockRepo {
    async fn list_users(&self) -> Result<Vec<User>, RepoError> {
        self.check()?;
        Ok(self.users.lock().unwrap().clone())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        self.check()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, RepoError> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepoError::Conflict);
        }
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn search_users(&self, term: &str) -> Result<Vec<User>, RepoError> {
        self.check()?;
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let term = term.to_lowercase();
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| {
                u.name.to_lowercase().contains(&term) || u.email.to_lowercase().contains(&term)
            })
            .cloned()
            .collect())
    }

    async fn list_posts(&self) -> Result<Vec<Post>, RepoError> {
        self.check()?;
        Ok(self.posts.lock().unwrap().clone())
    }

    async fn create_post(&self, author_id: Uuid, post: NewPostForm) -> Result<Post, RepoError> {
        self.check()?;
        let created = Post {
            id: Uuid::new_v4(),
            author_id,
            title: post.title,
            body: post.body,
            created_at: Utc::now(),
            author_name: None,
        };
        self.posts.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn create_contact_message(&self, message: ContactForm) -> Result<(), RepoError> {
        self.check()?;
        self.contact_messages.lock().unwrap().push(message);
        Ok(())
    }
}

// --- Fixtures ---

pub fn user(name: &str, email: &str) -> User {
    User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: email.to_string(),
        password_hash: password::hash_password(TEST_PASSWORD).unwrap(),
        created_at: Utc::now(),
    }
}

pub fn test_state(repo: Arc<MockRepo>) -> AppState {
    AppState::new(repo, Arc::new(MockRenderer::new()), AppConfig::default())
}

pub fn test_app(repo: Arc<MockRepo>) -> Router {
    create_router(test_state(repo))
}

// --- Requests ---

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, format!("token={}", token))
        .body(Body::empty())
        .unwrap()
}

pub fn post_form(uri: &str, body: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("token={}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

/// Parses a body produced by `MockRenderer`: `{"view": name, "data": bag}`.
pub async fn rendered(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
