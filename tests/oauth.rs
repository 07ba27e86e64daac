use std::collections::HashMap;
use std::net::TcpListener;

use actix_web::{dev::ServerHandle, http::header, web, App, HttpRequest, HttpResponse, HttpServer};
use pretty_assertions::assert_eq;
use serde_json::json;

use task_manager::auth::{GoogleEndpoints, GoogleOAuth, OAuthProvider};
use task_manager::config::GoogleConfig;
use task_manager::AppError;

const CLIENT_ID: &str = "client-123";
const ACCESS_TOKEN: &str = "ya29.good-token";
const BROKEN_TOKEN: &str = "ya29.broken-token";

/// Token endpoint: `good` and `broken-userinfo` are valid codes, anything else is rejected.
async fn token(form: web::Form<HashMap<String, String>>) -> HttpResponse {
    let form = form.into_inner();
    let field = |key: &str| form.get(key).map(String::as_str).unwrap_or_default();

    if field("grant_type") != "authorization_code" || field("client_id") != CLIENT_ID {
        return HttpResponse::BadRequest().json(json!({ "error": "invalid_client" }));
    }
    match field("code") {
        "good" => HttpResponse::Ok().json(json!({
            "access_token": ACCESS_TOKEN,
            "token_type": "Bearer",
            "expires_in": 3599
        })),
        "broken-userinfo" => HttpResponse::Ok().json(json!({
            "access_token": BROKEN_TOKEN,
            "token_type": "Bearer"
        })),
        _ => HttpResponse::BadRequest().json(json!({ "error": "invalid_grant" })),
    }
}

async fn userinfo(req: HttpRequest) -> HttpResponse {
    let auth = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if auth == format!("Bearer {}", ACCESS_TOKEN) {
        HttpResponse::Ok().json(json!({
            "sub": "1098765",
            "email": "Gia@Example.com",
            "email_verified": true,
            "name": "Gia",
            "picture": "https://lh3.googleusercontent.test/a/photo"
        }))
    } else if auth == format!("Bearer {}", BROKEN_TOKEN) {
        HttpResponse::InternalServerError().finish()
    } else {
        HttpResponse::Unauthorized().finish()
    }
}

/// Starts a fake provider on a random local port and returns a client pointed at it.
fn start_provider() -> (GoogleOAuth, ServerHandle) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server = HttpServer::new(|| {
        App::new()
            .route("/token", web::post().to(token))
            .route("/userinfo", web::get().to(userinfo))
    })
    .workers(1)
    .listen(listener)
    .expect("Failed to listen")
    .run();
    let handle = server.handle();
    actix_web::rt::spawn(server);

    let base = format!("http://127.0.0.1:{}", port);
    let client = GoogleOAuth::with_endpoints(
        GoogleConfig {
            client_id: CLIENT_ID.into(),
            client_secret: "secret".into(),
            redirect_url: "http://localhost:8080/api/auth/google/callback".into(),
        },
        GoogleEndpoints {
            auth_url: format!("{}/auth", base),
            token_url: format!("{}/token", base),
            userinfo_url: format!("{}/userinfo", base),
        },
    )
    .unwrap();
    (client, handle)
}

#[actix_rt::test]
async fn test_exchange_and_fetch_against_conforming_provider() {
    let (client, handle) = start_provider();

    let identity = client.exchange_and_fetch("good").await.unwrap();
    assert_eq!(identity.subject, "1098765");
    assert_eq!(identity.email, "Gia@Example.com");
    assert_eq!(identity.name.as_deref(), Some("Gia"));
    assert_eq!(
        identity.picture.as_deref(),
        Some("https://lh3.googleusercontent.test/a/photo")
    );

    handle.stop(false).await;
}

#[actix_rt::test]
async fn test_rejected_exchange_is_an_oauth_error() {
    let (client, handle) = start_provider();

    match client.exchange_and_fetch("expired-code").await {
        Err(AppError::OAuth(msg)) => assert!(msg.contains("token exchange rejected"), "{}", msg),
        other => panic!("expected OAuth error, got {:?}", other),
    }

    handle.stop(false).await;
}

#[actix_rt::test]
async fn test_bad_userinfo_status_is_an_oauth_error() {
    let (client, handle) = start_provider();

    match client.exchange_and_fetch("broken-userinfo").await {
        Err(AppError::OAuth(msg)) => assert!(msg.contains("google userinfo: bad status"), "{}", msg),
        other => panic!("expected OAuth error, got {:?}", other),
    }

    handle.stop(false).await;
}

#[actix_rt::test]
async fn test_unreachable_provider_is_an_oauth_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let base = format!("http://127.0.0.1:{}", port);
    let client = GoogleOAuth::with_endpoints(
        GoogleConfig {
            client_id: CLIENT_ID.into(),
            client_secret: "secret".into(),
            redirect_url: "http://localhost/cb".into(),
        },
        GoogleEndpoints {
            auth_url: format!("{}/auth", base),
            token_url: format!("{}/token", base),
            userinfo_url: format!("{}/userinfo", base),
        },
    )
    .unwrap();

    assert!(matches!(
        client.exchange_and_fetch("good").await,
        Err(AppError::OAuth(_))
    ));
    assert!(client
        .login_url("s")
        .starts_with(&format!("{}/auth?client_id=client-123", base)));
}
