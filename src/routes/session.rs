use std::convert::Infallible;

use axum::{
    Json, Router,
    extract::{FromRequestParts, State},
    http::{HeaderMap, header, request::Parts},
    routing::get,
};

use crate::{
    error::AppError,
    schedule::{loader::SessionContext, model::User},
    services::session_service,
    state::SharedState,
};

/// Cookie carrying the session token for browser clients, including websockets.
pub const AUTH_COOKIE: &str = "auth-token";

/// Session context extracted from the `Authorization: Bearer` header or the
/// [`AUTH_COOKIE`] cookie. Never rejects; unknown sessions fail later.
#[derive(Debug, Clone)]
pub struct Session(pub SessionContext);

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Session(SessionContext::new(token_from_headers(
            &parts.headers,
        ))))
    }
}

fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == AUTH_COOKIE)
        .map(|(_, token)| token.to_string())
        .filter(|token| !token.is_empty())
}

#[utoipa::path(
    get,
    path = "/api/me",
    tag = "session",
    responses(
        (status = 200, description = "Viewer owning the session", body = User),
        (status = 401, description = "Missing or unknown session")
    )
)]
/// Return the viewer identified by the presented session token.
pub async fn me(
    State(state): State<SharedState>,
    Session(ctx): Session,
) -> Result<Json<User>, AppError> {
    Ok(Json(session_service::current_user(&state, &ctx)?))
}

/// Configure the session routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/api/me", get(me))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("auth-token=xyz"));

        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn token_is_read_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; auth-token=xyz; lang=he"),
        );

        assert_eq!(token_from_headers(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn missing_token_is_none() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));

        assert!(token_from_headers(&headers).is_none());
    }
}
