use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Number of tasks returned when the caller does not ask for a limit.
pub const DEFAULT_TASK_LIMIT: i64 = 200;

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i64,
    /// Owner of the task.
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    /// One of `pending`, `in_progress`, `completed`.
    pub status: String,
    /// One of `low`, `medium`, `high`.
    pub priority: String,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query parameters accepted by `GET /api/tasks`.
///
/// `limit` is kept as a raw string so that an unparsable value falls back to the
/// default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    pub limit: Option<String>,
}

impl TaskQuery {
    pub fn limit(&self) -> i64 {
        self.limit
            .as_deref()
            .and_then(|raw| raw.trim().parse().ok())
            .filter(|limit: &i64| *limit > 0)
            .unwrap_or(DEFAULT_TASK_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_query_limit() {
        assert_eq!(TaskQuery::default().limit(), 200);
        assert_eq!(TaskQuery { limit: Some("25".into()) }.limit(), 25);
        assert_eq!(TaskQuery { limit: Some("lots".into()) }.limit(), 200);
        assert_eq!(TaskQuery { limit: Some("-5".into()) }.limit(), 200);
    }
}
