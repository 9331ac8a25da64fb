//! User identity persistence.

use serde::Serialize;
use sqlx::{FromRow, QueryBuilder, SqlitePool};

use super::{DbError, Patch};

/// A registered identity. The password hash never serializes to JSON.
#[derive(Debug, Clone, FromRow, Serialize, PartialEq)]
pub struct User {
    #[sqlx(rename = "id")]
    pub user_id: i64,
    pub email_address: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// Presence-aware partial update for a user.
#[derive(Debug, Default)]
pub struct UserUpdate {
    pub email_address: Patch<String>,
}

/// Credential-store operations required by the auth pipeline.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new identity with an already-hashed password.
    pub async fn create(&self, email_address: &str, password_hash: &str) -> Result<User, DbError> {
        let user_id: i64 = sqlx::query_scalar(
            "INSERT INTO users (email_address, password_hash) VALUES (?, ?) RETURNING id",
        )
        .bind(email_address)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DbError::EmailTaken(email_address.to_string())
            }
            _ => DbError::from(e),
        })?;

        Ok(User {
            user_id,
            email_address: email_address.to_string(),
            password_hash: password_hash.to_string(),
        })
    }

    pub async fn get(&self, user_id: i64) -> Result<User, DbError> {
        sqlx::query_as::<_, User>(
            "SELECT id, email_address, password_hash FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(DbError::UserNotFound(user_id))
    }

    pub async fn find_by_email(&self, email_address: &str) -> Result<User, DbError> {
        sqlx::query_as::<_, User>(
            "SELECT id, email_address, password_hash FROM users WHERE email_address = ?",
        )
        .bind(email_address)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::EmailNotFound(email_address.to_string()))
    }

    /// Apply a partial update. With no present fields this issues no write
    /// and returns the current row.
    pub async fn update(&self, user_id: i64, update: UserUpdate) -> Result<User, DbError> {
        if update.email_address.is_absent() {
            return self.get(user_id).await;
        }

        let mut query = QueryBuilder::new("UPDATE users SET ");
        query.push("email_address = ");
        query.push_bind(update.email_address.into_column_value());
        query.push(" WHERE id = ");
        query.push_bind(user_id);

        let result = query.build().execute(self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(DbError::UserNotFound(user_id));
        }

        self.get(user_id).await
    }

    pub async fn delete(&self, user_id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::UserNotFound(user_id));
        }
        Ok(())
    }
}
