#![doc = "The `task_manager` library crate."]
#![doc = ""]
#![doc = "This crate contains the account and session logic, domain models, storage seams,"]
#![doc = "routing configuration and error handling of the task manager backend."]
#![doc = "It is used by the main binary (`main.rs`) to construct and run the application."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repo;
pub mod routes;
pub mod security;
pub mod services;
pub mod state;

pub use crate::config::Config;
pub use crate::error::AppError;
pub use crate::state::AppState;
