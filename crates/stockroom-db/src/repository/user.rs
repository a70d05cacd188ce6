//! # User Repository
//!
//! Staff accounts and credential checks.
//!
//! Passwords are stored as argon2 PHC strings with a random salt per user.
//! The hash is selected only inside this module; [`User`] never carries it.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use stockroom_core::{CoreError, NewUser, User};

/// Repository for staff accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates a staff account, hashing the password first.
    ///
    /// ## Returns
    /// * `Ok(User)` - Created account
    /// * `Err(DbError::UniqueViolation)` - Username taken
    pub async fn insert(&self, new: &NewUser) -> DbResult<User> {
        debug!(username = %new.username, role = %new.role, "Inserting user");

        let password_hash = hash_password(&new.password)?;
        let user = User {
            id: generate_id(),
            name: new.name.clone(),
            username: new.username.clone(),
            role: new.role,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, name, username, role, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.username)
        .bind(user.role)
        .bind(&password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value("username", &new.username))?;

        info!(user_id = %user.id, username = %user.username, "User created");
        Ok(user)
    }

    /// Checks a username/password pair.
    ///
    /// ## Returns
    /// * `Ok(User)` - Credentials match
    /// * `Err(DbError::Domain(CoreError::InvalidCredentials))` - Unknown user
    ///   or wrong password (indistinguishable on purpose)
    pub async fn authenticate(&self, username: &str, password: &str) -> DbResult<User> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT id, password_hash FROM users WHERE username = ?1")
                .bind(username.trim())
                .fetch_optional(&self.pool)
                .await?;

        let Some((id, password_hash)) = row else {
            debug!(username = %username, "Login for unknown username");
            return Err(CoreError::InvalidCredentials.into());
        };

        if !verify_password(password, &password_hash) {
            debug!(username = %username, "Login with wrong password");
            return Err(CoreError::InvalidCredentials.into());
        }

        let user = self.get_by_id(&id).await?;
        user.ok_or_else(|| DbError::not_found("User", id))
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, username, role, created_at FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Lists users ordered by username.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, username, role, created_at FROM users ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Counts users. Zero means the admin bootstrap should run.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Hashes a password for storage (argon2id, random salt).
pub fn hash_password(password: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::PasswordHash(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verifies a password against a stored PHC string. A malformed hash
/// never verifies.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================
