use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info};

use task_manager::auth::{GoogleOAuth, OAuthProvider, PasswordHasher, TokenIssuer};
use task_manager::repo::{PgTaskStore, PgUserStore, TaskStore, UserStore};
use task_manager::{db, routes, security, AppState, Config};

fn startup_error<E: std::fmt::Display>(context: &str, err: E) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| startup_error("configuration", e))?;

    let pool = db::connect(&config.database_url)
        .await
        .map_err(|e| startup_error("database connection", e))?;
    db::run_migrations(&pool)
        .await
        .map_err(|e| startup_error("database migrations", e))?;

    let tokens = Arc::new(TokenIssuer::new(&config.jwt));
    let oauth: Arc<dyn OAuthProvider> = Arc::new(
        GoogleOAuth::new(config.google.clone()).map_err(|e| startup_error("google client", e))?,
    );
    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
    let tasks: Arc<dyn TaskStore> = Arc::new(PgTaskStore::new(pool));

    let state = AppState::new(
        users,
        tasks,
        oauth,
        tokens.clone(),
        PasswordHasher::default(),
        &config.frontend_url,
    );

    info!("Starting task manager server at {}", config.server_url());
    let cors_origins = config.cors_allowed_origins.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(security::secure_headers())
            .wrap(security::cors(&cors_origins))
            .wrap(Logger::default())
            .configure(routes::config(tokens.clone()))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
