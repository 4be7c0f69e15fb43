//! PostgreSQL-backed user repository.

use async_trait::async_trait;
use sqlx::PgPool;

use congregate_application::{UserRecord, UserRepository};
use congregate_core::{AppError, AppResult};
use congregate_domain::UserId;

/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: uuid::Uuid,
    email: String,
    display_name: String,
    password_hash: Option<String>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            email: row.email,
            display_name: row.display_name,
            password_hash: row.password_hash,
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, display_name, password_hash
            FROM users
            WHERE email = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load user by email: {error}")))?;

        Ok(row.map(UserRecord::from))
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, display_name, password_hash
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load user by id: {error}")))?;

        Ok(row.map(UserRecord::from))
    }

    async fn create(
        &self,
        email: &str,
        display_name: &str,
        password_hash: Option<&str>,
    ) -> AppResult<UserId> {
        let user_id = UserId::new();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, display_name, password_hash)
            VALUES ($1, LOWER($2), $3, $4)
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(email)
        .bind(display_name)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|error| match error {
            sqlx::Error::Database(database_error) if database_error.is_unique_violation() => {
                AppError::Conflict(format!("a user with email '{email}' already exists"))
            }
            other => AppError::Internal(format!("failed to create user: {other}")),
        })?;

        Ok(user_id)
    }
}
