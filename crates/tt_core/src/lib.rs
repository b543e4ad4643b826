pub mod clock;
mod codec;
pub mod config;
pub mod error;
pub mod model;
pub mod render;
pub mod storage;
pub mod task_api;

pub use error::AppError;
pub use model::{Task, TaskId, TaskList, Timestamp};
