//! # stockroom-web: HTTP Server for Stockroom
//!
//! Server-rendered inventory and point-of-sale pages on top of
//! `stockroom-db`.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Web Server                             │
//! │                                                                         │
//! │  Browser ──► axum Router                                               │
//! │               │                                                         │
//! │               ├── public: /login, /logout, /health, /api/product/{bc}  │
//! │               │                                                         │
//! │               └── require_session ──► pages and form posts             │
//! │                         │                                               │
//! │                         ▼                                               │
//! │                  Database (SqlitePool) ──► repositories                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Environment-driven configuration
//! - [`error`] - `WebError` / `ApiError` and their HTTP mapping
//! - [`session`] - Session cookie and the login gate
//! - [`routes`] - Route handlers and the router
//! - [`views`] - HTML rendering
//! - [`dto`] - JSON response types

pub mod config;
pub mod dto;
pub mod error;
pub mod routes;
pub mod session;
pub mod views;

use tracing::{info, warn};

use stockroom_core::validation::validate_new_user;
use stockroom_core::UserRole;
use stockroom_db::Database;

use crate::config::AdminBootstrap;

pub use routes::build_router;

/// Shared application state, cloned into every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Database handle (pool + repositories).
    pub db: Database,

    /// Whether session cookies get the `Secure` attribute.
    pub cookie_secure: bool,
}

impl AppState {
    pub fn new(db: Database, cookie_secure: bool) -> Self {
        AppState { db, cookie_secure }
    }
}

/// Creates the first admin account when no users exist yet.
///
/// ## Returns
/// * `Ok(true)` - An admin account was created
/// * `Ok(false)` - Users already exist, or no credentials were configured
pub async fn bootstrap_admin(
    db: &Database,
    admin: Option<&AdminBootstrap>,
) -> anyhow::Result<bool> {
    let existing = db.users().count().await?;
    if existing > 0 {
        return Ok(false);
    }

    let Some(admin) = admin else {
        warn!(
            "No users exist and no STOCKROOM_ADMIN_USERNAME/STOCKROOM_ADMIN_PASSWORD set; \
             nobody can log in until the seed tool creates an account"
        );
        return Ok(false);
    };

    let new_user = validate_new_user(
        "Administrator",
        &admin.username,
        UserRole::Admin.as_str(),
        &admin.password,
    )?;
    let user = db.users().insert(&new_user).await?;

    info!(username = %user.username, "Bootstrap admin account created");
    Ok(true)
}
