use crate::models::{ContactForm, NewPostForm, NewUser, Post, User};
use async_trait::async_trait;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// RepoError
///
/// Failure of a persistence call. `Conflict` is the only variant callers are expected
/// to recover from; everything else bubbles up into a 500.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("unique constraint violated")]
    Conflict,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Repository Trait
///
/// Abstract contract for all persistence operations, so handlers can be exercised
/// against an in-memory implementation in tests.
///
/// **Send + Sync + async_trait** are required to make the trait object (`Arc<dyn Repository>`)
/// safely shareable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    // Every user, unfiltered and unpaginated, in whatever order the store returns them.
    async fn list_users(&self) -> Result<Vec<User>, RepoError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
    // Fails with `RepoError::Conflict` when the email is already registered.
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError>;
    // Case-insensitive substring match on name or email.
    async fn search_users(&self, term: &str) -> Result<Vec<User>, RepoError>;

    // --- Posts ---
    async fn list_posts(&self) -> Result<Vec<Post>, RepoError>;
    async fn create_post(&self, author_id: Uuid, post: NewPostForm) -> Result<Post, RepoError>;

    // --- Contact ---
    async fn create_contact_message(&self, message: ContactForm) -> Result<(), RepoError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_unique_violation(e: sqlx::Error) -> RepoError {
    match e.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => RepoError::Conflict,
        _ => RepoError::Database(e),
    }
}

/// Wraps `term` in `%…%` for ILIKE, escaping the LIKE metacharacters inside it
/// (backslash is Postgres' default LIKE escape).
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl Repository for PostgresRepository {
    /// list_users
    ///
    /// No ORDER BY: the listing contract makes no ordering promise.
    async fn list_users(&self) -> Result<Vec<User>, RepoError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, created_at FROM users",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// create_user
    ///
    /// The primary key is generated here; `created_at` defaults in the database.
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)
    }

    /// search_users
    ///
    /// Built with QueryBuilder so the pattern is always a bound parameter. The term is
    /// matched literally; its own `%` and `_` are escaped.
    async fn search_users(&self, term: &str) -> Result<Vec<User>, RepoError> {
        let pattern = contains_pattern(term);
        let mut builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT id, name, email, password_hash, created_at FROM users");
        builder.push(" WHERE name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR email ILIKE ");
        builder.push_bind(pattern);
        builder.push(" ORDER BY name ASC");

        let users = builder
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// list_posts
    ///
    /// Newest first, joined with `users` for the author's display name.
    async fn list_posts(&self) -> Result<Vec<Post>, RepoError> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.author_id, p.title, p.body, p.created_at, u.name AS author_name
            FROM posts p
            JOIN users u ON p.author_id = u.id
            ORDER BY p.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    /// create_post
    ///
    /// Insert and join in one round trip via a CTE, returning the enriched `Post`.
    async fn create_post(&self, author_id: Uuid, post: NewPostForm) -> Result<Post, RepoError> {
        let created = sqlx::query_as::<_, Post>(
            r#"
            WITH inserted AS (
                INSERT INTO posts (id, author_id, title, body)
                VALUES ($1, $2, $3, $4)
                RETURNING id, author_id, title, body, created_at
            )
            SELECT i.id, i.author_id, i.title, i.body, i.created_at, u.name AS author_name
            FROM inserted i JOIN users u ON i.author_id = u.id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(author_id)
        .bind(post.title)
        .bind(post.body)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn create_contact_message(&self, message: ContactForm) -> Result<(), RepoError> {
        sqlx::query("INSERT INTO contact_messages (id, name, email, message) VALUES ($1, $2, $3, $4)")
            .bind(Uuid::new_v4())
            .bind(message.name)
            .bind(message.email)
            .bind(message.message)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
