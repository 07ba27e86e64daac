use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;

use super::{TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{NewUser, Task, User};

/// Deadline for reads and writes.
const QUERY_TIMEOUT: Duration = Duration::from_secs(5);
/// Deadline for `EXISTS` probes.
const EXISTS_TIMEOUT: Duration = Duration::from_secs(3);

const USER_COLUMNS: &str = "id, email, username, password_hash, name, provider, provider_id, \
                            avatar_url, role, created_at";

const TASK_COLUMNS: &str = "id, user_id, title, description, status, priority, due_date, \
                            created_at, updated_at";

/// Runs one statement under `limit`. Overrunning the deadline is a database error.
async fn with_deadline<T, F>(limit: Duration, what: &str, query: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, query).await {
        Ok(result) => result.map_err(AppError::from),
        Err(_) => Err(AppError::Database(format!(
            "{} timed out after {}s",
            what,
            limit.as_secs()
        ))),
    }
}

fn require_row(rows_affected: u64) -> Result<(), AppError> {
    if rows_affected == 0 {
        return Err(AppError::NotFound("user not found".into()));
    }
    Ok(())
}

/// `UserStore` over the `users` table.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, column);
        with_deadline(
            QUERY_TIMEOUT,
            "find user",
            sqlx::query_as::<_, User>(&sql)
                .bind(value)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn exists(&self, column: &str, value: &str) -> Result<bool, AppError> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM users WHERE {} = $1)", column);
        with_deadline(
            EXISTS_TIMEOUT,
            "existence check",
            sqlx::query_scalar::<_, bool>(&sql)
                .bind(value)
                .fetch_one(&self.pool),
        )
        .await
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (email, username, password_hash, name, provider, provider_id, \
             avatar_url, role) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            USER_COLUMNS
        );
        with_deadline(
            QUERY_TIMEOUT,
            "insert user",
            sqlx::query_as::<_, User>(&sql)
                .bind(&user.email)
                .bind(&user.username)
                .bind(&user.password_hash)
                .bind(&user.name)
                .bind(&user.provider)
                .bind(&user.provider_id)
                .bind(&user.avatar_url)
                .bind(&user.role)
                .fetch_one(&self.pool),
        )
        .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.find_one("email", email).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.find_one("username", username).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        with_deadline(
            QUERY_TIMEOUT,
            "find user",
            sqlx::query_as::<_, User>(&sql)
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn update_credentials(
        &self,
        id: i64,
        username: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<User, AppError> {
        let sql = format!(
            "UPDATE users SET username = $1, password_hash = $2, name = $3 WHERE id = $4 \
             RETURNING {}",
            USER_COLUMNS
        );
        with_deadline(
            QUERY_TIMEOUT,
            "update user",
            sqlx::query_as::<_, User>(&sql)
                .bind(username)
                .bind(password_hash)
                .bind(name)
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".into()))
    }

    async fn update_name(&self, id: i64, name: &str) -> Result<(), AppError> {
        let result = with_deadline(
            QUERY_TIMEOUT,
            "update name",
            sqlx::query("UPDATE users SET name = $1 WHERE id = $2")
                .bind(name)
                .bind(id)
                .execute(&self.pool),
        )
        .await?;
        require_row(result.rows_affected())
    }

    async fn update_username(&self, id: i64, username: &str) -> Result<(), AppError> {
        let result = with_deadline(
            QUERY_TIMEOUT,
            "update username",
            sqlx::query("UPDATE users SET username = $1 WHERE id = $2")
                .bind(username)
                .bind(id)
                .execute(&self.pool),
        )
        .await?;
        require_row(result.rows_affected())
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), AppError> {
        let result = with_deadline(
            QUERY_TIMEOUT,
            "update password",
            sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
                .bind(password_hash)
                .bind(id)
                .execute(&self.pool),
        )
        .await?;
        require_row(result.rows_affected())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        self.exists("email", email).await
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        self.exists("username", username).await
    }
}

/// `TaskStore` over the `tasks` table.
#[derive(Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn list_for_user(&self, user_id: i64, limit: i64) -> Result<Vec<Task>, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE user_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2",
            TASK_COLUMNS
        );
        with_deadline(
            QUERY_TIMEOUT,
            "list tasks",
            sqlx::query_as::<_, Task>(&sql)
                .bind(user_id)
                .bind(limit)
                .fetch_all(&self.pool),
        )
        .await
    }
}
