//! Google sign-in over the OAuth 2.0 authorization code flow.
//!
//! [`GoogleOAuth::login_url`] builds the redirect to Google's consent page and
//! [`GoogleOAuth::exchange_and_fetch`] turns the code Google sends back into an
//! [`ExternalIdentity`]. The `state` parameter is opaque here; the HTTP layer decides
//! what goes in it.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::GoogleConfig;
use crate::error::AppError;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";
const SCOPES: &str = "openid email profile";
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Identity reported by the provider's userinfo endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExternalIdentity {
    #[serde(rename = "sub")]
    pub subject: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// An external identity provider the auth flow can redirect to.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Authorization URL the browser is redirected to, carrying `state` untouched.
    fn login_url(&self, state: &str) -> String;

    /// Exchanges an authorization code for an access token and fetches the identity.
    async fn exchange_and_fetch(&self, code: &str) -> Result<ExternalIdentity, AppError>;
}

/// Provider endpoints. Defaults to Google's production URLs.
#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            auth_url: AUTH_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            userinfo_url: USERINFO_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub struct GoogleOAuth {
    config: GoogleConfig,
    endpoints: GoogleEndpoints,
    http: reqwest::Client,
}

impl GoogleOAuth {
    pub fn new(config: GoogleConfig) -> Result<Self, AppError> {
        Self::with_endpoints(config, GoogleEndpoints::default())
    }

    pub fn with_endpoints(config: GoogleConfig, endpoints: GoogleEndpoints) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build http client: {}", e)))?;
        Ok(Self {
            config,
            endpoints,
            http,
        })
    }

    async fn exchange_code(&self, code: &str) -> Result<String, AppError> {
        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_url.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http
            .post(&self.endpoints.token_url)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::OAuth(format!(
                "token exchange rejected ({}): {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::OAuth(format!("token response: {}", e)))?;
        Ok(token.access_token)
    }

    async fn fetch_identity(&self, access_token: &str) -> Result<ExternalIdentity, AppError> {
        let response = self
            .http
            .get(&self.endpoints.userinfo_url)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::OAuth(format!(
                "google userinfo: bad status {}",
                response.status()
            )));
        }

        response
            .json::<ExternalIdentity>()
            .await
            .map_err(|e| AppError::OAuth(format!("userinfo response: {}", e)))
    }
}

#[async_trait]
impl OAuthProvider for GoogleOAuth {
    fn login_url(&self, state: &str) -> String {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.redirect_url.as_str()),
            ("response_type", "code"),
            ("scope", SCOPES),
            ("access_type", "offline"),
            ("state", state),
        ];

        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", self.endpoints.auth_url, query)
    }

    async fn exchange_and_fetch(&self, code: &str) -> Result<ExternalIdentity, AppError> {
        if code.is_empty() {
            return Err(AppError::OAuth("empty code".into()));
        }
        let access_token = self.exchange_code(code).await?;
        self.fetch_identity(&access_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GoogleOAuth {
        GoogleOAuth::new(GoogleConfig {
            client_id: "client-123.apps.googleusercontent.com".into(),
            client_secret: "shh".into(),
            redirect_url: "http://localhost:8080/api/auth/google/callback".into(),
        })
        .unwrap()
    }

    #[test]
    fn test_login_url_carries_client_and_state() {
        let url = client().login_url("eyJuZXh0IjoiIn0=");

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/auth?"));
        assert!(url.contains("client_id=client-123.apps.googleusercontent.com"));
        assert!(url.contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fapi%2Fauth%2Fgoogle%2Fcallback"
        ));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=openid%20email%20profile"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("state=eyJuZXh0IjoiIn0%3D"));
    }

    #[actix_rt::test]
    async fn test_empty_code_is_rejected_without_network() {
        match client().exchange_and_fetch("").await {
            Err(AppError::OAuth(msg)) => assert_eq!(msg, "empty code"),
            other => panic!("expected OAuth error, got {:?}", other),
        }
    }

    #[test]
    fn test_identity_decoding_tolerates_missing_profile_fields() {
        let identity: ExternalIdentity =
            serde_json::from_str(r#"{"sub":"1234","email":"g@example.com"}"#).unwrap();
        assert_eq!(identity.subject, "1234");
        assert_eq!(identity.name, None);
        assert_eq!(identity.picture, None);
    }
}
