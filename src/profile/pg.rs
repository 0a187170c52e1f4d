//! Postgres implementation of the [`ProfileStore`] collaborator.
//!
//! Each operation acquires a scoped connection or transaction from the pool
//! and releases it before returning. Unique-constraint violations are
//! classified here, once, into [`ConflictKind`] so upper layers never parse
//! driver error text.

use async_trait::async_trait;
use axum::http::StatusCode;
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::warn;

use super::models::{Credential, PatchOp, UserProfile};
use super::store::{ConflictKind, ProfileStore, StoreError};

#[derive(Debug, Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_profile(row: &PgRow) -> UserProfile {
    let additional_data = row
        .get::<Option<String>, _>("additional_data")
        .and_then(|raw| serde_json::from_str(&raw).ok());

    UserProfile {
        id: Some(row.get("id")),
        username: row.get("username"),
        email: row.get("email"),
        password: String::new(),
        additional_data,
    }
}

fn encode_additional_data(profile: &UserProfile) -> Option<String> {
    profile
        .additional_data
        .as_ref()
        .and_then(|data| serde_json::to_string(data).ok())
}

fn classify(error: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            // Prefer the constraint name; some drivers only carry the column
            // in the message text
            let constraint = db_error
                .constraint()
                .map_or_else(|| db_error.message().to_lowercase(), str::to_lowercase);

            let kind = if constraint.contains("email") {
                ConflictKind::Email
            } else if constraint.contains("username") {
                ConflictKind::Username
            } else {
                ConflictKind::Unknown
            };

            return StoreError::Duplicate(kind);
        }
    }

    StoreError::Database(error)
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get(&self) -> Result<Vec<UserProfile>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, username, email, additional_data FROM user_profiles ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_profile).collect())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<UserProfile>, StoreError> {
        let row = sqlx::query(
            "SELECT id, username, email, additional_data FROM user_profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_profile))
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<UserProfile>, StoreError> {
        let row = sqlx::query(
            "SELECT id, username, email, additional_data FROM user_profiles WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_profile))
    }

    async fn add(
        &self,
        profile: &UserProfile,
        credential: &Credential,
    ) -> Result<UserProfile, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "INSERT INTO user_profiles (username, email, additional_data)
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&profile.username)
        .bind(&profile.email)
        .bind(encode_additional_data(profile))
        .fetch_one(&mut *tx)
        .await
        .map_err(classify)?;

        let id: i32 = row.get("id");

        sqlx::query(
            "INSERT INTO user_authentication (user_id, password_salt, password_hash)
             VALUES ($1, $2, $3)",
        )
        .bind(id)
        .bind(&credential.password_salt)
        .bind(&credential.password_hash)
        .execute(&mut *tx)
        .await
        .map_err(classify)?;

        tx.commit().await?;

        // Fresh read after commit, matching what a follow-up get_by_id sees
        match self.get_by_id(id).await? {
            Some(stored) => Ok(stored),
            None => Err(StoreError::Database(sqlx::Error::RowNotFound)),
        }
    }

    async fn update(&self, profile: &UserProfile) -> Result<u64, StoreError> {
        let Some(id) = profile.id else {
            return Ok(0);
        };

        let result = sqlx::query(
            "UPDATE user_profiles SET username = $1, email = $2, additional_data = $3
             WHERE id = $4",
        )
        .bind(&profile.username)
        .bind(&profile.email)
        .bind(encode_additional_data(profile))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(classify)?;

        Ok(result.rows_affected())
    }

    async fn patch(&self, id: i32, ops: &[PatchOp]) -> Result<StatusCode, StoreError> {
        let mut tx = self.pool.begin().await?;

        let Some(row) = sqlx::query(
            "SELECT id, username, email, additional_data FROM user_profiles
             WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(StatusCode::BAD_REQUEST);
        };

        let mut profile = row_to_profile(&row);

        for op in ops {
            if let Err(error) = op.apply(&mut profile) {
                warn!("Rejecting patch for profile {id}: {error}");
                return Ok(StatusCode::BAD_REQUEST);
            }
        }

        sqlx::query(
            "UPDATE user_profiles SET username = $1, email = $2, additional_data = $3
             WHERE id = $4",
        )
        .bind(&profile.username)
        .bind(&profile.email)
        .bind(encode_additional_data(&profile))
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(classify)?;

        tx.commit().await?;

        Ok(StatusCode::OK)
    }

    async fn delete_by_id(&self, id: i32) -> Result<StatusCode, StoreError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT id FROM user_profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        if existing.is_none() {
            return Ok(StatusCode::BAD_REQUEST);
        }

        // The credential row goes with the profile via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM user_profiles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() != 1 {
            return Ok(StatusCode::INTERNAL_SERVER_ERROR);
        }

        tx.commit().await?;

        Ok(StatusCode::OK)
    }

    async fn get_authentication(&self, user_id: i32) -> Result<Option<Credential>, StoreError> {
        let row = sqlx::query(
            "SELECT id, user_id, password_salt, password_hash FROM user_authentication
             WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Credential {
            id: Some(row.get("id")),
            user_id: Some(row.get("user_id")),
            password_salt: row.get("password_salt"),
            password_hash: row.get("password_hash"),
        }))
    }
}
