use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Role assigned to every account created through this service.
pub const DEFAULT_ROLE: &str = "user";
/// Provider name stored on accounts created through Google sign-in.
pub const PROVIDER_GOOGLE: &str = "google";

/// A user record as stored in the `users` table.
///
/// `username` and `password_hash` are absent for accounts created through Google
/// until the completion step supplies them. The OAuth fields are only present on
/// provider-linked accounts.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub name: Option<String>,
    pub provider: Option<String>,
    pub provider_id: Option<String>,
    pub avatar_url: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether the account can sign in with a username/email and password.
    pub fn has_local_credentials(&self) -> bool {
        let present = |field: &Option<String>| field.as_deref().is_some_and(|v| !v.is_empty());
        present(&self.username) && present(&self.password_hash)
    }
}

/// Fields for inserting a user. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub name: Option<String>,
    pub provider: Option<String>,
    pub provider_id: Option<String>,
    pub avatar_url: Option<String>,
    pub role: String,
}

/// Public view of a user returned by the auth and profile endpoints.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

/// Changes requested through `PUT /api/users/profile`, already normalized.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub name: String,
    pub username: Option<String>,
    pub password: Option<String>,
}
