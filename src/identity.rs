use axum::{
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use serde::Serialize;

use crate::{
    auth::{Claims, TokenCodec},
    config::TOKEN_COOKIE,
};

/// Identity
///
/// The per-request identity slot: the verified claim, or nothing. Downstream code can
/// only ask "present or absent?". The reason a token was rejected never reaches
/// this type; `resolve_identity` discards it.
///
/// Serializes as the claim object or `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Identity(Option<Claims>);

impl Identity {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn claims(&self) -> Option<&Claims> {
        self.0.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self(Some(claims))
    }
}

/// resolve_identity
///
/// The whole decision of the identity middleware:
/// - no token cookie -> anonymous
/// - token verifies -> the decoded claim
/// - token fails verification for any reason -> anonymous (reason only logged)
pub fn resolve_identity(tokens: &TokenCodec, jar: &CookieJar) -> Identity {
    let Some(cookie) = jar.get(TOKEN_COOKIE) else {
        return Identity::anonymous();
    };

    match tokens.verify(cookie.value()) {
        Ok(claims) => Identity::from(claims),
        Err(e) => {
            tracing::debug!(error = %e, expired = e.is_expired(), "ignoring unverifiable token cookie");
            Identity::anonymous()
        }
    }
}

/// attach_identity
///
/// Middleware run once per request, ahead of every route and the fallback. Resolves the
/// identity from the cookie store and stores it in the request extensions, where it stays
/// unchanged for the rest of the request.
pub async fn attach_identity(
    State(tokens): State<TokenCodec>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = resolve_identity(&tokens, &jar);
    request.extensions_mut().insert(identity);
    next.run(request).await
}

/// Identity Extractor Implementation
///
/// Reads the slot written by `attach_identity`. The router builder guarantees the
/// middleware is installed, so the rejection only fires on a mis-assembled router.
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Identity>().cloned().ok_or_else(|| {
            tracing::error!("identity slot missing; attach_identity is not installed");
            StatusCode::INTERNAL_SERVER_ERROR
        })
    }
}
