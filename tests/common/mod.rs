#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use async_trait::async_trait;
use serde_json::{json, Value};

use task_manager::auth::{ExternalIdentity, OAuthProvider, PasswordHasher, TokenIssuer};
use task_manager::config::JwtConfig;
use task_manager::repo::{MemoryTaskStore, MemoryUserStore};
use task_manager::{routes, security, AppError, AppState};

pub const FRONTEND: &str = "http://frontend.test";
pub const FAKE_AUTH_URL: &str = "https://accounts.test/o/oauth2/auth";

/// Identity provider that knows a fixed set of authorization codes.
#[derive(Default)]
pub struct FakeOAuth {
    identities: HashMap<String, ExternalIdentity>,
}

impl FakeOAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, code: &str, email: &str, name: &str) -> Self {
        self.identities.insert(
            code.to_string(),
            ExternalIdentity {
                subject: format!("sub-{}", code),
                email: email.to_string(),
                name: Some(name.to_string()),
                picture: Some(format!("https://avatars.test/{}.png", code)),
            },
        );
        self
    }
}

#[async_trait]
impl OAuthProvider for FakeOAuth {
    fn login_url(&self, state: &str) -> String {
        format!("{}?state={}", FAKE_AUTH_URL, urlencoding::encode(state))
    }

    async fn exchange_and_fetch(&self, code: &str) -> Result<ExternalIdentity, AppError> {
        self.identities
            .get(code)
            .cloned()
            .ok_or_else(|| AppError::OAuth(format!("unknown code {:?}", code)))
    }
}

pub struct TestContext {
    pub state: AppState,
    pub users: Arc<MemoryUserStore>,
    pub tokens: Arc<TokenIssuer>,
}

pub fn tokens() -> Arc<TokenIssuer> {
    Arc::new(TokenIssuer::new(&JwtConfig {
        access_secret: "integration_access_secret".into(),
        refresh_secret: "integration_refresh_secret".into(),
        access_ttl_minutes: 15,
        refresh_ttl_hours: 168,
    }))
}

pub fn context_with(oauth: FakeOAuth, tasks: MemoryTaskStore) -> TestContext {
    let users = Arc::new(MemoryUserStore::new());
    let tokens = tokens();
    let state = AppState::new(
        users.clone(),
        Arc::new(tasks),
        Arc::new(oauth),
        tokens.clone(),
        PasswordHasher::new(4),
        FRONTEND,
    );
    TestContext {
        state,
        users,
        tokens,
    }
}

pub fn context() -> TestContext {
    context_with(FakeOAuth::new(), MemoryTaskStore::new())
}

/// The application as `main` assembles it, minus CORS and the access log.
pub fn app(
    state: &AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state.clone()))
        .wrap(security::secure_headers())
        .configure(routes::config(state.tokens.clone()))
}

/// Sends `req` and returns the status with the JSON body (`Null` when empty).
///
/// Errors raised by middleware are rendered the way the server would render them.
pub async fn call_json<S, B>(app: &S, req: actix_http::Request) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    match test::try_call_service(app, req).await {
        Ok(resp) => {
            let status = resp.status();
            let body = test::read_body(resp).await;
            (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
        }
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status();
            let body = actix_web::body::to_bytes(resp.into_body())
                .await
                .unwrap_or_default();
            (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
        }
    }
}

/// Registers an account over HTTP and returns its access token.
pub async fn register<S, B>(app: &S, email: &str, username: &str, password: &str, name: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "email": email,
            "username": username,
            "password": password,
            "name": name
        }))
        .to_request();
    let (status, body) = call_json(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);
    body["token"]
        .as_str()
        .expect("registration response carries a token")
        .to_string()
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
