//! Postgres-backed user store.
//!
//! Runtime sqlx queries against the `users`, `groups`, `roles` and
//! `group_roles` tables (schema in `migrations/`). The credential swap is
//! a single conditional `UPDATE`, so rotation races resolve inside the
//! database with no extra locking.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{NewUser, StoreError, UserRecord, UserStore};
use crate::token::{GroupRoles, RoleGrant};

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT user_id, email, username, password_hash, group_name, refresh_token
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to fetch user by email: {e}")))
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT user_id, email, username, password_hash, group_name, refresh_token
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to fetch user by id: {e}")))
    }

    async fn find_by_refresh_token(
        &self,
        value: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT user_id, email, username, password_hash, group_name, refresh_token
            FROM users
            WHERE refresh_token = $1
            "#,
        )
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            StoreError::Database(format!("Failed to fetch user by refresh token: {e}"))
        })
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserRecord, StoreError> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (email, username, password_hash, group_name)
            VALUES ($1, $2, $3, $4)
            RETURNING user_id, email, username, password_hash, group_name, refresh_token
            "#,
        )
        .bind(&new_user.email)
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .bind(&new_user.group_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Named unique constraint on users.email
            if e.to_string().contains("users_email_unique") {
                StoreError::DuplicateEmail
            } else {
                StoreError::Database(format!("Failed to create user: {e}"))
            }
        })
    }

    async fn set_refresh_token(&self, email: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE users
            SET refresh_token = $2, updated_at = NOW()
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to set refresh token: {e}")))?;

        Ok(())
    }

    async fn swap_refresh_token(
        &self,
        email: &str,
        expected: &str,
        next: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET refresh_token = $3, updated_at = NOW()
            WHERE email = $1 AND refresh_token = $2
            "#,
        )
        .bind(email)
        .bind(expected)
        .bind(next)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to swap refresh token: {e}")))?;

        Ok(result.rows_affected() == 1)
    }

    async fn clear_refresh_token(&self, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE users
            SET refresh_token = NULL, updated_at = NOW()
            WHERE refresh_token = $1
            "#,
        )
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to clear refresh token: {e}")))?;

        Ok(())
    }

    async fn roles_for(&self, user: &UserRecord) -> Result<GroupRoles, StoreError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT r.url, r.description
            FROM group_roles gr
            JOIN roles r ON r.role_id = gr.role_id
            WHERE gr.group_name = $1
            ORDER BY gr.position
            "#,
        )
        .bind(&user.group_name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to fetch group roles: {e}")))?;

        Ok(GroupRoles {
            name: user.group_name.clone(),
            roles: rows
                .into_iter()
                .map(|(url, description)| RoleGrant { url, description })
                .collect(),
        })
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, StoreError> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT user_id, email, username, password_hash, group_name, refresh_token
            FROM users
            ORDER BY email
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to list users: {e}")))
    }
}
