pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use std::sync::Arc;

use actix_web::web;

use crate::auth::{AuthMiddleware, TokenIssuer};
use crate::error::AppError;

/// JSON extractor settings: malformed bodies become `400 {"error": ...}`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::InvalidInput(format!("invalid input: {}", err)).into())
}

/// Registers `/healthz` and everything under `/api`. Users and tasks require a bearer token.
pub fn config(tokens: Arc<TokenIssuer>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(json_config())
            .service(health::healthz)
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/auth")
                            .service(auth::check_email)
                            .service(auth::login)
                            .service(auth::register)
                            .service(auth::complete_google_registration)
                            .service(auth::google_login)
                            .service(auth::google_callback),
                    )
                    .service(
                        web::scope("/users")
                            .wrap(AuthMiddleware::new(tokens.clone()))
                            .service(users::me)
                            .service(users::update_profile),
                    )
                    .service(
                        web::scope("/tasks")
                            .wrap(AuthMiddleware::new(tokens))
                            .service(tasks::get_tasks)
                            .service(tasks::create_task)
                            .service(tasks::update_task)
                            .service(tasks::delete_task),
                    ),
            );
    }
}
