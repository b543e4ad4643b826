use crate::error::AppError;
use crate::model::{Task, TaskId, TaskList};
use crate::storage::text_store;
use std::path::Path;
use tracing::debug;

/// Loads the store, applies `change`, and saves only if it succeeded.
fn update<T>(
    path: &Path,
    change: impl FnOnce(&mut TaskList) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let mut list = text_store::load_list(path)?;
    let outcome = change(&mut list)?;
    text_store::save_list(path, &list)?;
    Ok(outcome)
}

pub fn add_task(path: &Path, name: &str) -> Result<Task, AppError> {
    update(path, |list| list.create(name).cloned())
}

pub fn list_tasks(path: &Path) -> Result<TaskList, AppError> {
    text_store::load_list(path)
}

pub fn get_task(path: &Path, id: TaskId) -> Result<Task, AppError> {
    text_store::load_list(path)?.get(id).cloned()
}

pub fn start_task(path: &Path, id: TaskId) -> Result<Task, AppError> {
    update(path, |list| {
        let previous = list.active_id();
        list.activate(id)?;
        if let Some(previous) = previous.filter(|previous| *previous != id) {
            debug!(previous, id, "switched active task");
        }
        list.get(id).cloned()
    })
}

/// Deactivates the current task and returns it.
pub fn stop_task(path: &Path) -> Result<Task, AppError> {
    update(path, |list| {
        let id = list
            .deactivate()
            .ok_or_else(|| AppError::invalid_input("no active task"))?;
        list.get(id).cloned()
    })
}

pub fn finish_task(path: &Path, id: TaskId) -> Result<Task, AppError> {
    update(path, |list| {
        if list.get(id)?.is_finished() {
            return Err(AppError::invalid_input("task already finished"));
        }
        list.finish(id).cloned()
    })
}

pub fn reopen_task(path: &Path, id: TaskId) -> Result<Task, AppError> {
    update(path, |list| {
        if !list.get(id)?.is_finished() {
            return Err(AppError::invalid_input("task is not finished"));
        }
        list.reopen(id).cloned()
    })
}

pub fn delete_task(path: &Path, id: TaskId) -> Result<Task, AppError> {
    update(path, |list| list.destroy(id))
}
