use axum::http::StatusCode;
use chrono::Utc;
use portal_web::{
    Identity, TemplateRenderer, TokenCodec,
    models::User,
    views::{self, Renderer, View},
};
use uuid::Uuid;

fn renderer() -> TemplateRenderer {
    TemplateRenderer::new(concat!(env!("CARGO_MANIFEST_DIR"), "/views"))
}

fn ada() -> User {
    User {
        id: Uuid::from_u128(7),
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        password_hash: String::new(),
        created_at: Utc::now(),
    }
}

#[test]
fn test_anonymous_layout_offers_login() {
    let html = renderer()
        .render(&View::new("about", &Identity::anonymous()))
        .unwrap();

    assert!(html.contains("href=\"/login\""));
    assert!(!html.contains("Log out"));
}

#[test]
fn test_signed_in_layout_greets_user() {
    let claims = TokenCodec::new("secret", 60).claims_for(&ada(), 1_700_000_000);
    let html = renderer()
        .render(&View::new("index", &Identity::from(claims)))
        .unwrap();

    assert!(html.contains("Welcome back, Ada"));
    assert!(html.contains("Log out"));
}

#[test]
fn test_user_list_escapes_html() {
    let mut evil = ada();
    evil.name = "<script>alert(1)</script>".to_string();
    let view = View::new("user", &Identity::anonymous())
        .with("users", vec![evil])
        .unwrap();

    let html = renderer().render(&view).unwrap();

    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}

#[test]
fn test_every_view_has_a_template() {
    let renderer = renderer();
    for name in [
        "index", "about", "team", "login", "register", "logo", "user", "posts", "contact",
        "search", "404",
    ] {
        let view = View::new(name, &Identity::anonymous())
            .with("users", Vec::<User>::new())
            .and_then(|v| v.with("posts", Vec::<String>::new()))
            .and_then(|v| v.with("results", Vec::<User>::new()))
            .and_then(|v| v.with("query", ""))
            .unwrap();
        assert!(renderer.render(&view).is_ok(), "template for {} failed", name);
    }
}

#[test]
fn test_missing_template_is_an_error() {
    let result = renderer().render(&View::new("no-such-view", &Identity::anonymous()));
    assert!(result.is_err());
}

#[tokio::test]
async fn test_respond_uses_view_status() {
    let view = View::new("404", &Identity::anonymous()).with_status(StatusCode::NOT_FOUND);

    let response = views::respond(&renderer(), view).unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("Page not found"));
}
