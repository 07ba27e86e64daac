use crate::{
    auth::{
        AuthResponse, CheckEmailRequest, GoogleCallbackQuery, GoogleLoginQuery, LoginRequest,
        OAuthState, RegisterRequest, ACCESS_TOKEN_COOKIE,
    },
    error::AppError,
    models::{User, UserSummary},
    state::AppState,
};
use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie},
    get,
    http::{header, StatusCode},
    post, web, HttpResponse, HttpResponseBuilder,
};
use log::{debug, info};
use serde_json::json;

/// Builds the HTTP-only cookie carrying the access token for browser clients.
pub fn access_token_cookie(token: &str) -> Cookie<'static> {
    Cookie::build(ACCESS_TOKEN_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .secure(false)
        .max_age(CookieDuration::hours(24))
        .finish()
}

fn token_response(
    status: StatusCode,
    message: &str,
    token: String,
    user: &User,
) -> HttpResponse {
    HttpResponseBuilder::new(status)
        .cookie(access_token_cookie(&token))
        .json(AuthResponse {
            success: true,
            message: message.to_string(),
            token,
            user: UserSummary::from(user),
        })
}

fn redirect(location: &str) -> HttpResponseBuilder {
    let mut builder = HttpResponse::Found();
    builder.insert_header((header::LOCATION, location.to_string()));
    builder
}

/// Check whether an email is registered
///
/// Backs the first step of the sign-in page, which decides between the login and the
/// registration form.
#[post("/check-email")]
pub async fn check_email(
    state: web::Data<AppState>,
    payload: web::Json<CheckEmailRequest>,
) -> Result<HttpResponse, AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::InvalidInput("invalid email".into()));
    }
    let exists = state.auth.email_exists(&payload.email).await?;
    Ok(HttpResponse::Ok().json(json!({ "exists": exists })))
}

/// Login user
///
/// `email` may hold either the email or the username. Returns the token in the body
/// and in the `access_token` cookie.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let user = state.auth.login(&payload.email, &payload.password).await?;
    let token = state.auth.generate_token(user.id)?;
    Ok(token_response(StatusCode::OK, "login successful", token, &user))
}

/// Register a new user
///
/// Creates a local account and signs it in.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let user = state
        .auth
        .register(
            &payload.email,
            &payload.username,
            &payload.password,
            &payload.name,
        )
        .await?;
    let token = state.auth.generate_token(user.id)?;
    Ok(token_response(
        StatusCode::CREATED,
        "registration successful",
        token,
        &user,
    ))
}

/// Finish a Google sign-up by choosing a username and password.
#[post("/complete-google-registration")]
pub async fn complete_google_registration(
    state: web::Data<AppState>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let user = state
        .auth
        .complete_google_registration(
            &payload.email,
            &payload.username,
            &payload.password,
            &payload.name,
        )
        .await?;
    let token = state.auth.generate_token(user.id)?;
    Ok(token_response(
        StatusCode::OK,
        "registration completed successfully",
        token,
        &user,
    ))
}

/// Start Google sign-in
///
/// Redirects to the provider. `next` and `onboardIfNew` travel through the `state`
/// parameter and come back to the callback.
#[get("/google/login")]
pub async fn google_login(
    state: web::Data<AppState>,
    query: web::Query<GoogleLoginQuery>,
) -> HttpResponse {
    let query = query.into_inner();
    let oauth_state = OAuthState {
        next: query.next.unwrap_or_default(),
        onboard_if_new: query.onboard_if_new.unwrap_or_default(),
    };
    debug!(
        "google login: next={:?} onboardIfNew={:?}",
        oauth_state.next, oauth_state.onboard_if_new
    );

    let url = state.oauth.login_url(&oauth_state.encode());
    redirect(&url).finish()
}

/// Google sign-in callback
///
/// Signs the user in (creating the account on first use), sets the cookie and redirects:
/// to account completion when the account has no local credentials yet, otherwise to
/// `next` or the dashboard.
#[get("/google/callback")]
pub async fn google_callback(
    state: web::Data<AppState>,
    query: web::Query<GoogleCallbackQuery>,
) -> Result<HttpResponse, AppError> {
    let oauth_state = query
        .state
        .as_deref()
        .map(OAuthState::decode)
        .unwrap_or_default();

    let identity = state
        .oauth
        .exchange_and_fetch(query.code.as_deref().unwrap_or_default())
        .await?;
    let signin = state.auth.login_or_signup_google(&identity).await?;

    let location = if signin.created || !signin.user.has_local_credentials() {
        info!("user {} sent to account completion", signin.user.id);
        format!(
            "{}/create_account.html?email={}",
            state.frontend_url,
            urlencoding::encode(&signin.user.email)
        )
    } else if !oauth_state.next.is_empty() {
        oauth_state.next
    } else {
        format!("{}/dashboard/index.html", state.frontend_url)
    };

    Ok(redirect(&location)
        .cookie(access_token_cookie(&signin.token))
        .finish())
}
