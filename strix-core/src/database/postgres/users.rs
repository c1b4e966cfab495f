use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::database::ports::users::UserStore;
use crate::{
    error::{Error, Result},
    user::User,
};

/// PostgreSQL-backed implementation of the `UserStore` port.
#[derive(Clone, Debug)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn row_to_user(row: &PgRow) -> sqlx::Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn create_user(&self, user: &User, password_hash: &str) -> Result<()> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| Error::Internal(format!("Failed to start transaction: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.constraint() == Some("users_username_key") {
                    return Error::Conflict("Username already exists".to_string());
                }
                if db_err.constraint() == Some("users_email_key") {
                    return Error::Conflict("Email already registered".to_string());
                }
            }
            Error::Internal(format!("Failed to create user: {}", e))
        })?;

        sqlx::query(
            r#"
            INSERT INTO user_credentials (user_id, password_hash)
            VALUES ($1, $2)
            "#,
        )
        .bind(user.id)
        .bind(password_hash)
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::Internal(format!("Failed to store password: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| Error::Internal(format!("Failed to commit transaction: {}", e)))?;

        info!("Created user: {} ({})", user.username, user.id);
        Ok(())
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| Error::Internal(format!("Failed to get user by id: {}", e)))?;

        row.as_ref()
            .map(row_to_user)
            .transpose()
            .map_err(|e| Error::Internal(format!("Failed to decode user row: {}", e)))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| Error::Internal(format!("Failed to get user by email: {}", e)))?;

        row.as_ref()
            .map(row_to_user)
            .transpose()
            .map_err(|e| Error::Internal(format!("Failed to decode user row: {}", e)))
    }

    async fn get_password_hash(&self, user_id: Uuid) -> Result<Option<String>> {
        let row = sqlx::query(
            "SELECT password_hash FROM user_credentials WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| Error::Internal(format!("Failed to get password hash: {}", e)))?;

        row.map(|r| r.try_get("password_hash"))
            .transpose()
            .map_err(|e| Error::Internal(format!("Failed to decode credentials row: {}", e)))
    }
}
