use crate::{
    AppState,
    config::{AppConfig, TOKEN_COOKIE},
    error::AppError,
    identity::Identity,
    models::{ContactForm, LoginForm, NewPostForm, NewUser, RegisterForm, SearchQuery},
    password,
    repository::{RepoError, RepositoryState},
    views::{self, RendererState, View},
};
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};

const INVALID_CREDENTIALS: &str = "Invalid email or password.";

type PageResult = Result<Response, AppError>;

fn render(renderer: &RendererState, view: View) -> PageResult {
    Ok(views::respond(renderer.as_ref(), view)?)
}

// --- Public Pages ---

/// home
///
/// GET /: renders `index` with the identity only. No post data is shown here; post
/// listing lives under /posts.
pub async fn home(identity: Identity, State(views): State<RendererState>) -> PageResult {
    render(&views, View::new("index", &identity))
}

pub async fn about(identity: Identity, State(views): State<RendererState>) -> PageResult {
    render(&views, View::new("about", &identity))
}

pub async fn team(identity: Identity, State(views): State<RendererState>) -> PageResult {
    render(&views, View::new("team", &identity))
}

pub async fn logo(identity: Identity, State(views): State<RendererState>) -> PageResult {
    render(&views, View::new("logo", &identity))
}

pub async fn login_page(identity: Identity, State(views): State<RendererState>) -> PageResult {
    render(&views, View::new("login", &identity))
}

pub async fn register_page(identity: Identity, State(views): State<RendererState>) -> PageResult {
    render(&views, View::new("register", &identity))
}

/// list_users
///
/// GET /users: the full user collection, unfiltered and unpaginated, in store order.
/// A store failure propagates as a 500.
pub async fn list_users(
    identity: Identity,
    State(repo): State<RepositoryState>,
    State(views): State<RendererState>,
) -> PageResult {
    let users = repo.list_users().await?;
    render(&views, View::new("user", &identity).with("users", users)?)
}

/// not_found
///
/// Fallback for every (method, path) pair without a registered handler.
pub async fn not_found(identity: Identity, State(views): State<RendererState>) -> PageResult {
    render(
        &views,
        View::new("404", &identity).with_status(StatusCode::NOT_FOUND),
    )
}

// --- Accounts ---

/// Emails are stored and looked up lowercased, so `Ada@x.com` and `ada@x.com` are one account.
fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn session_cookie(token: String, config: &AppConfig) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies())
        .build()
}

/// register
///
/// POST /register: creates the account, signs the user in and redirects home.
/// Blank fields re-render the form with 400; an already registered email with 409.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    identity: Identity,
    Form(form): Form<RegisterForm>,
) -> PageResult {
    let name = form.name.trim();
    let email = normalize_email(&form.email);

    if name.is_empty() || email.is_empty() || form.password.is_empty() {
        let view = View::new("register", &identity)
            .with("error", "Name, email and password are all required.")?
            .with_status(StatusCode::BAD_REQUEST);
        return render(&state.views, view);
    }

    let new_user = NewUser {
        name: name.to_string(),
        email,
        password_hash: password::hash_password(&form.password)?,
    };

    let user = match state.repo.create_user(new_user).await {
        Ok(user) => user,
        Err(RepoError::Conflict) => {
            let view = View::new("register", &identity)
                .with("error", "An account with that email already exists.")?
                .with_status(StatusCode::CONFLICT);
            return render(&state.views, view);
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %user.id, "registered new user");
    let token = state.tokens.issue(&user)?;
    let jar = jar.add(session_cookie(token, &state.config));
    Ok((jar, Redirect::to("/")).into_response())
}

/// login
///
/// POST /login: on success sets the token cookie and redirects home. An unknown email
/// and a wrong password produce the same 401 page.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    identity: Identity,
    Form(form): Form<LoginForm>,
) -> PageResult {
    let user = state
        .repo
        .find_user_by_email(&normalize_email(&form.email))
        .await?;

    let user = match user {
        Some(user) if password::verify_password(&form.password, &user.password_hash) => user,
        _ => {
            let view = View::new("login", &identity)
                .with("error", INVALID_CREDENTIALS)?
                .with_status(StatusCode::UNAUTHORIZED);
            return render(&state.views, view);
        }
    };

    let token = state.tokens.issue(&user)?;
    let jar = jar.add(session_cookie(token, &state.config));
    Ok((jar, Redirect::to("/")).into_response())
}

/// GET /logout: drops the token cookie. Nothing is revoked server-side.
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build(TOKEN_COOKIE).path("/"));
    (jar, Redirect::to("/"))
}

// --- Posts ---

pub async fn list_posts(
    identity: Identity,
    State(repo): State<RepositoryState>,
    State(views): State<RendererState>,
) -> PageResult {
    let posts = repo.list_posts().await?;
    render(&views, View::new("posts", &identity).with("posts", posts)?)
}

/// create_post
///
/// POST /posts: anonymous callers are sent to the login page.
pub async fn create_post(
    identity: Identity,
    State(repo): State<RepositoryState>,
    Form(form): Form<NewPostForm>,
) -> PageResult {
    let Some(claims) = identity.claims() else {
        return Ok(Redirect::to("/login").into_response());
    };

    let post = repo.create_post(claims.sub, form).await?;
    tracing::debug!(post_id = %post.id, author_id = %claims.sub, "created post");
    Ok(Redirect::to("/posts").into_response())
}

// --- Contact ---

pub async fn contact_page(identity: Identity, State(views): State<RendererState>) -> PageResult {
    render(&views, View::new("contact", &identity))
}

pub async fn submit_contact(
    identity: Identity,
    State(repo): State<RepositoryState>,
    State(views): State<RendererState>,
    Form(form): Form<ContactForm>,
) -> PageResult {
    repo.create_contact_message(form).await?;
    render(&views, View::new("contact", &identity).with("sent", true)?)
}

// --- Search ---

/// search
///
/// GET /search?q=term: users whose name or email contains the term. A blank term
/// renders an empty result set without querying the store.
pub async fn search(
    identity: Identity,
    State(repo): State<RepositoryState>,
    State(views): State<RendererState>,
    Query(query): Query<SearchQuery>,
) -> PageResult {
    let term = query.q.as_deref().map(str::trim).unwrap_or_default();
    let results = if term.is_empty() {
        Vec::new()
    } else {
        repo.search_users(term).await?
    };

    let view = View::new("search", &identity)
        .with("query", term)?
        .with("results", results)?;
    render(&views, view)
}
