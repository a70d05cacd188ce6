//! # Session Repository
//!
//! Server-side login sessions. The browser cookie holds only the session
//! id; the user it belongs to is resolved here on every request.
//!
//! ```text
//! Cookie: stockroom_session=<uuid>
//!             │
//!             ▼
//!   sessions.id ──► sessions.user_id ──► users
//! ```
//!
//! Sessions do not expire; they end on logout or when the user row is
//! deleted (`ON DELETE CASCADE`).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::generate_id;
use stockroom_core::User;

/// Repository for login sessions.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Creates a new SessionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Opens a session for `user_id` and returns its opaque token.
    pub async fn create(&self, user_id: &str) -> DbResult<String> {
        let token = generate_id();

        sqlx::query("INSERT INTO sessions (id, user_id, created_at) VALUES (?1, ?2, ?3)")
            .bind(&token)
            .bind(user_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        debug!(user_id = %user_id, "Session created");
        Ok(token)
    }

    /// Resolves a session token to its user, if the session still exists.
    pub async fn find_user(&self, token: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.name, u.username, u.role, u.created_at
            FROM sessions s
            INNER JOIN users u ON u.id = s.user_id
            WHERE s.id = ?1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Ends a session. Unknown tokens are ignored.
    pub async fn delete(&self, token: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        debug!(removed = result.rows_affected(), "Session deleted");
        Ok(())
    }
}
