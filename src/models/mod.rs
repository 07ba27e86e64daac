pub mod task;
pub mod user;

pub use task::{Task, TaskQuery, DEFAULT_TASK_LIMIT};
pub use user::{NewUser, ProfileUpdate, User, UserSummary, DEFAULT_ROLE, PROVIDER_GOOGLE};
