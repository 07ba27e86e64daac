//!
//! # Custom Error Handling
//!
//! This module defines the error type `AppError` shared by the stores, the services
//! and the HTTP handlers. Services return typed failures (invalid input, invalid
//! credentials, conflicts, ...) and the `actix_web::error::ResponseError` implementation
//! maps each of them to a status code and a `{"error": "..."}` JSON body.
//!
//! Internal detail (database messages, OAuth provider responses, hashing failures) is
//! logged and never sent to the client.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Unique constraint on `users.email`, see `migrations/`.
pub const EMAIL_CONSTRAINT: &str = "users_email_key";
/// Unique constraint on `users.username`, see `migrations/`.
pub const USERNAME_CONSTRAINT: &str = "users_username_key";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Missing or malformed request fields (HTTP 400).
    InvalidInput(String),
    /// Login failure. Deliberately says nothing about which part was wrong (HTTP 401).
    InvalidCredentials,
    /// Access token with a bad signature, past its expiry, or malformed (HTTP 401).
    InvalidToken,
    /// Missing or unusable credentials on a protected route (HTTP 401).
    Unauthorized(String),
    /// Another account already uses this email (HTTP 409).
    EmailExists,
    /// Another account already uses this username (HTTP 409).
    UsernameExists,
    /// A requested record does not exist (HTTP 404).
    NotFound(String),
    /// The external identity provider rejected or failed the exchange (HTTP 400).
    OAuth(String),
    /// Unclassified storage failure, including per-call deadline overruns (HTTP 500).
    Database(String),
    /// Any other unexpected server-side failure (HTTP 500).
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::InvalidToken => write!(f, "Invalid token"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::EmailExists => write!(f, "Email already exists"),
            AppError::UsernameExists => write!(f, "Username already exists"),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::OAuth(msg) => write!(f, "OAuth Error: {}", msg),
            AppError::Database(msg) => write!(f, "Database Error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// The message exposed to clients.
    fn public_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) | AppError::Unauthorized(msg) | AppError::NotFound(msg) => {
                msg.clone()
            }
            AppError::InvalidCredentials => "invalid credentials".into(),
            AppError::InvalidToken => "invalid token".into(),
            AppError::EmailExists => "email already registered".into(),
            AppError::UsernameExists => "username already taken".into(),
            AppError::OAuth(_) => "oauth error".into(),
            AppError::Database(_) | AppError::Internal(_) => "internal server error".into(),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::OAuth(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken | AppError::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::EmailExists | AppError::UsernameExists => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Database(_) | AppError::Internal(_) => log::error!("{}", self),
            AppError::OAuth(_) => log::warn!("{}", self),
            _ => {}
        }
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.public_message()
        }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`. A unique violation on one of the `users` constraints
/// becomes the matching conflict, so a registration that lost the check-then-insert race
/// still reports "already exists" instead of a generic failure.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => match db.constraint() {
                Some(EMAIL_CONSTRAINT) => AppError::EmailExists,
                Some(USERNAME_CONSTRAINT) => AppError::UsernameExists,
                _ => AppError::Database(error.to_string()),
            },
            _ => AppError::Database(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::InvalidInput`.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::InvalidInput(error.to_string())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::Internal`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(format!("password hashing failed: {}", error))
    }
}

/// Converts transport failures talking to the identity provider into `AppError::OAuth`.
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> AppError {
        AppError::OAuth(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.error_response();
        let status = response.status();
        let bytes = actix_web::body::to_bytes(response.into_body())
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(AppError::InvalidInput("x".into()).error_response().status(), 400);
        assert_eq!(AppError::InvalidCredentials.error_response().status(), 401);
        assert_eq!(AppError::InvalidToken.error_response().status(), 401);
        assert_eq!(AppError::Unauthorized("x".into()).error_response().status(), 401);
        assert_eq!(AppError::EmailExists.error_response().status(), 409);
        assert_eq!(AppError::UsernameExists.error_response().status(), 409);
        assert_eq!(AppError::NotFound("x".into()).error_response().status(), 404);
        assert_eq!(AppError::OAuth("x".into()).error_response().status(), 400);
        assert_eq!(AppError::Database("x".into()).error_response().status(), 500);
        assert_eq!(AppError::Internal("x".into()).error_response().status(), 500);
    }

    #[actix_rt::test]
    async fn test_internal_detail_is_not_leaked() {
        let (status, body) =
            body_json(AppError::Database("relation \"users\" does not exist".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal server error");

        let (_, body) = body_json(AppError::OAuth("invalid_grant: code expired".into())).await;
        assert_eq!(body["error"], "oauth error");
    }

    #[actix_rt::test]
    async fn test_conflict_messages() {
        let (_, body) = body_json(AppError::EmailExists).await;
        assert_eq!(body["error"], "email already registered");
        let (_, body) = body_json(AppError::UsernameExists).await;
        assert_eq!(body["error"], "username already taken");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert!(matches!(
            AppError::from(sqlx::Error::RowNotFound),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(sqlx::Error::PoolTimedOut),
            AppError::Database(_)
        ));
    }
}
