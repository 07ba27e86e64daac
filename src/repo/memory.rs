use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::{TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{NewUser, Task, User};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, AppError> {
    mutex
        .lock()
        .map_err(|_| AppError::Internal("in-memory store lock poisoned".into()))
}

fn user_not_found() -> AppError {
    AppError::NotFound("user not found".into())
}

#[derive(Default)]
struct Users {
    rows: Vec<User>,
    next_id: i64,
}

impl Users {
    fn username_taken(&self, username: &str, except_id: Option<i64>) -> bool {
        self.rows
            .iter()
            .any(|u| u.username.as_deref() == Some(username) && Some(u.id) != except_id)
    }

    fn get_mut(&mut self, id: i64) -> Result<&mut User, AppError> {
        self.rows
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(user_not_found)
    }
}

/// `UserStore` held in process memory, with the same uniqueness rules as the
/// `users` table.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Users>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&self, pred: impl Fn(&User) -> bool) -> Result<Option<User>, AppError> {
        Ok(lock(&self.users)?.rows.iter().find(|u| pred(u)).cloned())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let mut users = lock(&self.users)?;
        if users.rows.iter().any(|u| u.email == user.email) {
            return Err(AppError::EmailExists);
        }
        if let Some(username) = &user.username {
            if users.username_taken(username, None) {
                return Err(AppError::UsernameExists);
            }
        }

        users.next_id += 1;
        let stored = User {
            id: users.next_id,
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            name: user.name,
            provider: user.provider,
            provider_id: user.provider_id,
            avatar_url: user.avatar_url,
            role: user.role,
            created_at: Utc::now(),
        };
        users.rows.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.find(|u| u.email == email)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.find(|u| u.username.as_deref() == Some(username))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        self.find(|u| u.id == id)
    }

    async fn update_credentials(
        &self,
        id: i64,
        username: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<User, AppError> {
        let mut users = lock(&self.users)?;
        if users.username_taken(username, Some(id)) {
            return Err(AppError::UsernameExists);
        }
        let user = users.get_mut(id)?;
        user.username = Some(username.to_string());
        user.password_hash = Some(password_hash.to_string());
        user.name = Some(name.to_string());
        Ok(user.clone())
    }

    async fn update_name(&self, id: i64, name: &str) -> Result<(), AppError> {
        lock(&self.users)?.get_mut(id)?.name = Some(name.to_string());
        Ok(())
    }

    async fn update_username(&self, id: i64, username: &str) -> Result<(), AppError> {
        let mut users = lock(&self.users)?;
        if users.username_taken(username, Some(id)) {
            return Err(AppError::UsernameExists);
        }
        users.get_mut(id)?.username = Some(username.to_string());
        Ok(())
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), AppError> {
        lock(&self.users)?.get_mut(id)?.password_hash = Some(password_hash.to_string());
        Ok(())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.find(|u| u.email == email)?.is_some())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        Ok(lock(&self.users)?.username_taken(username, None))
    }
}

/// `TaskStore` over a fixed set of tasks.
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: Mutex<Vec<Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
        }
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn list_for_user(&self, user_id: i64, limit: i64) -> Result<Vec<Task>, AppError> {
        let mut owned: Vec<Task> = lock(&self.tasks)?
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        owned.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(owned)
    }
}
