//! # Session Gate
//!
//! Cookie handling and the middleware that keeps anonymous visitors out.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET /products                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  require_session (THIS MODULE)                                          │
//! │       │                                                                 │
//! │       ├── no stockroom_session cookie ─────────► 303 /login            │
//! │       ├── token not in sessions table ─────────► 303 /login            │
//! │       ├── store unavailable ───────────────────► 503 error page        │
//! │       ▼                                                                 │
//! │  request.extensions += CurrentUser(user)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  handler (Extension<CurrentUser>)                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cookie carries only the session id. Name and role are looked up on
//! every request, so a renamed user shows up renamed immediately.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::debug;

use stockroom_core::User;

use crate::error::WebError;
use crate::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "stockroom_session";

/// The signed-in user, inserted into request extensions by [`require_session`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Reads the session token from the request's `Cookie` headers.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|token| !token.is_empty())
}

/// `Set-Cookie` value that establishes a session.
pub fn session_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie from the browser.
pub fn expired_session_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; \
         Expires=Thu, 01 Jan 1970 00:00:00 GMT"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Middleware for every protected route.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = session_token(request.headers()) else {
        debug!(path = %request.uri().path(), "No session cookie, redirecting to login");
        return Redirect::to("/login").into_response();
    };

    match state.db.sessions().find_user(&token).await {
        Ok(Some(user)) => {
            request.extensions_mut().insert(CurrentUser(user));
            next.run(request).await
        }
        Ok(None) => {
            debug!(path = %request.uri().path(), "Unknown session, redirecting to login");
            Redirect::to("/login").into_response()
        }
        Err(e) => WebError::from(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_token_found_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; stockroom_session=abc-123; lang=en"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_token_in_second_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(header::COOKIE, HeaderValue::from_static("stockroom_session=xyz"));
        assert_eq!(session_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_missing_or_empty_token() {
        let mut headers = HeaderMap::new();
        assert!(session_token(&headers).is_none());

        headers.insert(header::COOKIE, HeaderValue::from_static("stockroom_session="));
        assert!(session_token(&headers).is_none());

        headers.insert(header::COOKIE, HeaderValue::from_static("stockroom_sessionx=1"));
        assert!(session_token(&headers).is_none());
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie("tok", false);
        assert!(cookie.starts_with("stockroom_session=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(!cookie.contains("Secure"));

        assert!(session_cookie("tok", true).ends_with("; Secure"));
        assert!(expired_session_cookie(false).contains("Max-Age=0"));
    }
}
