use crate::{auth::AuthenticatedUser, error::AppError, models::TaskQuery, state::AppState};
use actix_web::{delete, get, post, put, web, HttpResponse};
use serde_json::json;

fn not_implemented() -> HttpResponse {
    HttpResponse::NotImplemented().json(json!({ "error": "not implemented" }))
}

/// Retrieves the tasks of the authenticated user.
///
/// Tasks are ordered by creation date in descending order.
///
/// ## Query Parameters:
/// - `limit` (optional): maximum number of tasks, 200 when absent or not a positive number.
///
/// ## Responses:
/// - `200 OK`: `{"tasks": [...]}`.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `500 Internal Server Error`: For database errors.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<TaskQuery>,
) -> Result<HttpResponse, AppError> {
    let tasks = state.tasks.list_for_user(user.id, query.limit()).await?;
    Ok(HttpResponse::Ok().json(json!({ "tasks": tasks })))
}

/// Task creation is not available yet; always `501 Not Implemented`.
#[post("")]
pub async fn create_task(_user: AuthenticatedUser) -> HttpResponse {
    not_implemented()
}

/// Always `501 Not Implemented`.
#[put("/{task_id}")]
pub async fn update_task(_user: AuthenticatedUser, _task_id: web::Path<i64>) -> HttpResponse {
    not_implemented()
}

/// Always `501 Not Implemented`.
#[delete("/{task_id}")]
pub async fn delete_task(_user: AuthenticatedUser, _task_id: web::Path<i64>) -> HttpResponse {
    not_implemented()
}
