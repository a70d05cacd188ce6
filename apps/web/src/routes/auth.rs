//! # Login / Logout
//!
//! ```text
//! POST /login (username, password)
//!      │
//!      ▼
//! users.authenticate ── bad credentials ──► 401 + login form
//!      │
//!      ▼
//! sessions.create ──► Set-Cookie: stockroom_session=<token> ──► 303 /
//!
//! GET /logout ──► sessions.delete(token) ──► expire cookie ──► 303 /login
//! ```

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use tracing::{info, warn};

use stockroom_core::CoreError;
use stockroom_db::DbError;

use crate::error::{WebError, WebResult};
use crate::session::{expired_session_cookie, session_cookie, session_token};
use crate::views;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// GET /login
pub async fn login_form() -> Html<String> {
    Html(views::login_page(None, ""))
}

/// POST /login
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> WebResult<Response> {
    let user = match state
        .db
        .users()
        .authenticate(&form.username, &form.password)
        .await
    {
        Ok(user) => user,
        Err(DbError::Domain(CoreError::InvalidCredentials)) => {
            warn!(username = %form.username, "Failed login");
            let page = views::login_page(
                Some(&CoreError::InvalidCredentials.to_string()),
                form.username.trim(),
            );
            return Ok((StatusCode::UNAUTHORIZED, Html(page)).into_response());
        }
        Err(e) => return Err(WebError::from(e)),
    };

    let token = state.db.sessions().create(&user.id).await?;
    info!(user_id = %user.id, username = %user.username, "User logged in");

    Ok((
        [(header::SET_COOKIE, session_cookie(&token, state.cookie_secure))],
        Redirect::to("/"),
    )
        .into_response())
}

/// GET /logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> WebResult<Response> {
    if let Some(token) = session_token(&headers) {
        state.db.sessions().delete(&token).await?;
        info!("User logged out");
    }

    Ok((
        [(header::SET_COOKIE, expired_session_cookie(state.cookie_secure))],
        Redirect::to("/login"),
    )
        .into_response())
}
