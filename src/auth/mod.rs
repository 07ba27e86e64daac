pub mod extractors;
pub mod google;
pub mod middleware;
pub mod password;
pub mod token;

use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{ProfileUpdate, UserSummary};

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use google::{ExternalIdentity, GoogleEndpoints, GoogleOAuth, OAuthProvider};
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use token::{Claims, TokenIssuer};

/// Name of the cookie carrying the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, dots, hyphens
    pub(crate) static ref USERNAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-zA-Z0-9_.-]{1,32}$").unwrap();
}

/// Payload of `POST /api/auth/check-email`.
#[derive(Debug, Deserialize)]
pub struct CheckEmailRequest {
    #[serde(default)]
    pub email: String,
}

/// Payload of `POST /api/auth/login`. `email` holds either an email or a username.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Payload of `POST /api/auth/register` and `POST /api/auth/complete-google-registration`.
///
/// Fields are normalized and checked by the auth service, so missing fields
/// deserialize to empty strings and are reported as invalid input there.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

/// Payload of `PUT /api/users/profile`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, message = "name must be at least 2 characters"))]
    pub name: String,
    #[validate(regex(
        path = "USERNAME_REGEX",
        message = "Username must be alphanumeric, underscores, dots or hyphens"
    ))]
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl UpdateProfileRequest {
    /// Trims the name and treats empty optional fields as not provided.
    pub fn normalized(self) -> Self {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        Self {
            name: self.name.trim().to_string(),
            username: non_empty(self.username).map(|u| u.trim().to_string()),
            password: non_empty(self.password),
        }
    }
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            name: req.name,
            username: req.username,
            password: req.password,
        }
    }
}

/// Query of `GET /api/auth/google/login`.
#[derive(Debug, Default, Deserialize)]
pub struct GoogleLoginQuery {
    pub next: Option<String>,
    #[serde(rename = "onboardIfNew")]
    pub onboard_if_new: Option<String>,
}

/// Query of `GET /api/auth/google/callback`.
#[derive(Debug, Default, Deserialize)]
pub struct GoogleCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// Post-login routing intent carried through Google in the `state` parameter.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthState {
    #[serde(default)]
    pub next: String,
    #[serde(default, rename = "onboardIfNew")]
    pub onboard_if_new: String,
}

impl OAuthState {
    /// `base64url(JSON)`, padded.
    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE.encode(json)
    }

    /// Lenient inverse of [`OAuthState::encode`]: anything undecodable yields the default.
    pub fn decode(raw: &str) -> Self {
        URL_SAFE
            .decode(raw)
            .or_else(|_| URL_SAFE_NO_PAD.decode(raw))
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .unwrap_or_default()
    }
}

/// Response after a successful login or registration.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: UserSummary,
}

/// Response for operations that only report success.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}
