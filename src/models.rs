use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// --- Persisted Entities ---

/// User
///
/// A registered account from the `users` table. Created at registration, read at
/// login, listing and search time; never updated or deleted by this application.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    // Unique across the table.
    pub email: String,
    // Argon2 PHC string. Never handed to a view.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Post
///
/// A record from the `posts` table, augmented with the author's name (a join).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default, PartialEq)]
pub struct Post {
    pub id: Uuid,
    // FK to users.id.
    pub author_id: Uuid,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    #[sqlx(default)]
    pub author_name: Option<String>,
}

// --- Form Payloads (Input Schemas) ---

/// Insert payload for a new user. The password is already hashed by the time
/// this reaches the repository.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// RegisterForm
///
/// `application/x-www-form-urlencoded` body of POST /register.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body of POST /login.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body of POST /posts.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct NewPostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// ContactForm
///
/// Body of POST /contact; stored verbatim in `contact_messages`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

/// SearchQuery
///
/// Query parameters accepted by GET /search.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SearchQuery {
    pub q: Option<String>,
}
