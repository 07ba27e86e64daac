//! Account lifecycle: local login and registration, Google sign-in and the step that
//! gives a Google-created account a local username and password.

use std::sync::Arc;

use log::{info, warn};

use crate::auth::{ExternalIdentity, PasswordHasher, TokenIssuer, USERNAME_REGEX};
use crate::error::AppError;
use crate::models::{NewUser, User, DEFAULT_ROLE, PROVIDER_GOOGLE};
use crate::repo::UserStore;

/// Outcome of a Google sign-in.
#[derive(Debug)]
pub struct GoogleLogin {
    pub user: User,
    pub token: String,
    /// `true` when this sign-in created the account.
    pub created: bool,
}

/// Normalized registration fields.
struct AccountFields {
    email: String,
    username: String,
    name: String,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn account_fields(
    email: &str,
    username: &str,
    password: &str,
    name: &str,
) -> Result<AccountFields, AppError> {
    let fields = AccountFields {
        email: normalize_email(email),
        username: username.trim().to_string(),
        name: name.trim().to_string(),
    };

    if fields.email.is_empty()
        || fields.username.is_empty()
        || password.is_empty()
        || fields.name.is_empty()
    {
        return Err(AppError::InvalidInput(
            "email, username, password and name are required".into(),
        ));
    }
    if !USERNAME_REGEX.is_match(&fields.username) {
        return Err(AppError::InvalidInput(
            "username must be at most 32 letters, digits, '_', '.' or '-'".into(),
        ));
    }
    Ok(fields)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: Arc<TokenIssuer>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher, tokens: Arc<TokenIssuer>) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// Authenticates by email (when `identifier` contains `@`) or by username.
    ///
    /// An unknown account, an account without a password and a wrong password all
    /// fail with the same `InvalidCredentials`.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<User, AppError> {
        let identifier = identifier.trim();
        if identifier.is_empty() || password.is_empty() {
            return Err(AppError::InvalidInput(
                "username/email and password are required".into(),
            ));
        }

        let found = if identifier.contains('@') {
            self.users.find_by_email(&identifier.to_lowercase()).await?
        } else {
            self.users.find_by_username(identifier).await?
        };

        let user = found.ok_or(AppError::InvalidCredentials)?;
        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AppError::InvalidCredentials)?;
        if !self.hasher.verify(hash, password) {
            return Err(AppError::InvalidCredentials);
        }
        Ok(user)
    }

    /// Creates a local account.
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
        name: &str,
    ) -> Result<User, AppError> {
        let fields = account_fields(email, username, password, name)?;

        if self.users.email_exists(&fields.email).await? {
            return Err(AppError::EmailExists);
        }
        if self.users.username_exists(&fields.username).await? {
            return Err(AppError::UsernameExists);
        }

        let password_hash = self.hasher.hash(password)?;
        // a concurrent registration can still win here; the store reports it as a conflict
        let user = self
            .users
            .insert(NewUser {
                email: fields.email,
                username: Some(fields.username),
                password_hash: Some(password_hash),
                name: Some(fields.name),
                role: DEFAULT_ROLE.to_string(),
                ..NewUser::default()
            })
            .await?;

        info!("user {} registered", user.id);
        Ok(user)
    }

    /// Signs in with a Google identity, creating a provider-linked account on first use.
    ///
    /// An existing account with the same email is reused whatever way it was created.
    pub async fn login_or_signup_google(
        &self,
        identity: &ExternalIdentity,
    ) -> Result<GoogleLogin, AppError> {
        let email = normalize_email(&identity.email);
        if email.is_empty() {
            return Err(AppError::OAuth("identity has no email".into()));
        }

        let (user, created) = match self.users.find_by_email(&email).await? {
            Some(user) => (user, false),
            None => {
                let new_user = NewUser {
                    email: email.clone(),
                    name: non_empty(identity.name.as_deref()),
                    provider: Some(PROVIDER_GOOGLE.to_string()),
                    provider_id: Some(identity.subject.clone()),
                    avatar_url: non_empty(identity.picture.as_deref()),
                    role: DEFAULT_ROLE.to_string(),
                    ..NewUser::default()
                };
                match self.users.insert(new_user).await {
                    Ok(user) => {
                        info!("user {} created from google sign-in", user.id);
                        (user, true)
                    }
                    Err(AppError::EmailExists) => {
                        warn!("concurrent google sign-in for the same email, reusing account");
                        let user = self
                            .users
                            .find_by_email(&email)
                            .await?
                            .ok_or_else(|| AppError::Internal("account vanished after conflict".into()))?;
                        (user, false)
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        let (token, _) = self.tokens.issue_access(user.id, &user.role)?;
        Ok(GoogleLogin {
            user,
            token,
            created,
        })
    }

    /// Gives the account behind `email` a username and password, or registers it if absent.
    pub async fn complete_google_registration(
        &self,
        email: &str,
        username: &str,
        password: &str,
        name: &str,
    ) -> Result<User, AppError> {
        let fields = account_fields(email, username, password, name)?;

        let existing = match self.users.find_by_email(&fields.email).await? {
            Some(user) => user,
            None => return self.register(email, username, password, name).await,
        };

        if let Some(holder) = self.users.find_by_username(&fields.username).await? {
            if holder.id != existing.id {
                return Err(AppError::UsernameExists);
            }
        }

        let password_hash = self.hasher.hash(password)?;
        let user = self
            .users
            .update_credentials(existing.id, &fields.username, &password_hash, &fields.name)
            .await?;

        info!("user {} completed registration", user.id);
        Ok(user)
    }

    /// Access token for `user_id`. Always carries the default role.
    pub fn generate_token(&self, user_id: i64) -> Result<String, AppError> {
        let (token, _) = self.tokens.issue_access(user_id, DEFAULT_ROLE)?;
        Ok(token)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        self.users.email_exists(&normalize_email(email)).await
    }
}
