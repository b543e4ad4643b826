mod task;
mod task_list;

pub use task::{Task, TaskId, Timestamp};
pub use task_list::TaskList;
