use std::sync::Arc;

use log::info;

use crate::auth::PasswordHasher;
use crate::error::AppError;
use crate::models::{ProfileUpdate, User};
use crate::repo::UserStore;

/// Current-user lookups and profile edits.
pub struct UserService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }

    pub async fn get(&self, id: i64) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".into()))
    }

    /// Applies a profile update: the name always, username and password when given.
    pub async fn update_profile(&self, id: i64, update: ProfileUpdate) -> Result<(), AppError> {
        if let Some(username) = &update.username {
            if let Some(holder) = self.users.find_by_username(username).await? {
                if holder.id != id {
                    return Err(AppError::UsernameExists);
                }
            }
        }

        // username first: it is the write that can still conflict
        if let Some(username) = &update.username {
            self.users.update_username(id, username).await?;
        }
        self.users.update_name(id, &update.name).await?;

        if let Some(password) = &update.password {
            let password_hash = self.hasher.hash(password)?;
            self.users.update_password(id, &password_hash).await?;
        }

        info!("user {} updated profile", id);
        Ok(())
    }
}
