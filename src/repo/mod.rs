//! Persistence seams.
//!
//! Services depend on [`UserStore`] and [`TaskStore`] and never on a concrete backend.
//! [`postgres`] is the production implementation; [`memory`] keeps everything in process
//! and is what the tests run against.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{NewUser, Task, User};

pub use memory::{MemoryTaskStore, MemoryUserStore};
pub use postgres::{PgTaskStore, PgUserStore};

/// Account storage. Email is unique, and so is username when set.
///
/// Writes that would break uniqueness fail with `AppError::EmailExists` or
/// `AppError::UsernameExists`. Updates on a missing id fail with `AppError::NotFound`.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persists a new account and returns it with its assigned id and timestamp.
    async fn insert(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Sets username, password hash and name in one write and returns the updated record.
    async fn update_credentials(
        &self,
        id: i64,
        username: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<User, AppError>;

    async fn update_name(&self, id: i64, name: &str) -> Result<(), AppError>;

    async fn update_username(&self, id: i64, username: &str) -> Result<(), AppError>;

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), AppError>;

    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;

    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;
}

/// Read access to persisted tasks.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// At most `limit` tasks owned by `user_id`, newest first.
    async fn list_for_user(&self, user_id: i64, limit: i64) -> Result<Vec<Task>, AppError>;
}
