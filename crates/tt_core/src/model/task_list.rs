use super::task::{Task, TaskId, Timestamp};
use crate::clock;
use crate::codec;
use crate::error::AppError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// An id-keyed collection of tasks with at most one active task.
///
/// Tasks iterate in ascending id order, which is also creation order. The
/// active task is tracked by id only; the map is the single owner of every
/// task.
#[derive(Debug, Clone, Default)]
pub struct TaskList {
    tasks: BTreeMap<TaskId, Task>,
    active: Option<TaskId>,
    last_id: TaskId,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from already-validated parts, as produced by the parser.
    pub(crate) fn from_parts(
        tasks: BTreeMap<TaskId, Task>,
        active: Option<TaskId>,
    ) -> Result<Self, AppError> {
        let last_id = tasks.keys().next_back().copied().unwrap_or(0);
        let list = Self {
            tasks,
            active,
            last_id,
        };
        list.check_invariants()?;
        Ok(list)
    }

    pub fn create(&mut self, name: &str) -> Result<&Task, AppError> {
        self.create_at(name, clock::now())
    }

    /// Creates a task with an explicit start time. Names are trimmed and must
    /// not be empty.
    pub fn create_at(&mut self, name: &str, start: Timestamp) -> Result<&Task, AppError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("name is required"));
        }
        ensure_representable("start time", start)?;

        let id = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| AppError::invariant("task ids exhausted"))?;
        self.last_id = id;
        debug!(id, name = trimmed, start, "created task");

        let task = self.tasks.entry(id).or_insert(Task::new(id, trimmed, start));
        Ok(&*task)
    }

    /// Removes a task, deactivating it first when it is the active one.
    pub fn destroy(&mut self, id: TaskId) -> Result<Task, AppError> {
        if !self.tasks.contains_key(&id) {
            return Err(AppError::NotFound(id));
        }

        if self.active == Some(id) {
            self.deactivate();
        }

        debug!(id, "destroyed task");
        self.tasks.remove(&id).ok_or(AppError::NotFound(id))
    }

    /// Makes `id` the active task. Whatever was active before is deactivated.
    pub fn activate(&mut self, id: TaskId) -> Result<(), AppError> {
        if !self.tasks.contains_key(&id) {
            return Err(AppError::NotFound(id));
        }

        self.deactivate();
        let task = self.tasks.get_mut(&id).ok_or(AppError::NotFound(id))?;
        task.is_active = true;
        self.active = Some(id);
        debug!(id, "activated task");

        Ok(())
    }

    /// Clears the active task and returns its id, if there was one.
    pub fn deactivate(&mut self) -> Option<TaskId> {
        let id = self.active.take()?;
        if let Some(task) = self.tasks.get_mut(&id) {
            task.is_active = false;
        }
        debug!(id, "deactivated task");
        Some(id)
    }

    pub fn finish(&mut self, id: TaskId) -> Result<&Task, AppError> {
        self.finish_at(id, clock::now())
    }

    /// Sets the end time. The active flag is left alone.
    pub fn finish_at(&mut self, id: TaskId, end: Timestamp) -> Result<&Task, AppError> {
        ensure_representable("end time", end)?;
        let task = self.tasks.get_mut(&id).ok_or(AppError::NotFound(id))?;
        task.end = Some(end);
        debug!(id, end, "finished task");
        Ok(&*task)
    }

    pub fn reopen(&mut self, id: TaskId) -> Result<&Task, AppError> {
        let task = self.tasks.get_mut(&id).ok_or(AppError::NotFound(id))?;
        task.end = None;
        debug!(id, "reopened task");
        Ok(&*task)
    }

    pub fn get(&self, id: TaskId) -> Result<&Task, AppError> {
        self.tasks.get(&id).ok_or(AppError::NotFound(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn active_id(&self) -> Option<TaskId> {
        self.active
    }

    pub fn active(&self) -> Option<&Task> {
        self.active.and_then(|id| self.tasks.get(&id))
    }

    /// Serializes the list into the line format.
    pub fn format(&self) -> String {
        codec::format_list(self)
    }

    /// Parses the line format. Any malformed line rejects the whole input.
    pub fn parse(input: &str) -> Result<Self, AppError> {
        codec::parse_list(input)
    }

    /// Verifies the single-active rule and id bookkeeping.
    pub fn check_invariants(&self) -> Result<(), AppError> {
        if let Some(id) = self.active {
            match self.tasks.get(&id) {
                Some(task) if task.is_active => {}
                Some(_) => {
                    return Err(AppError::invariant(format!(
                        "active task {id} is not flagged active"
                    )));
                }
                None => {
                    return Err(AppError::invariant(format!(
                        "active task {id} is not in the list"
                    )));
                }
            }
        }

        for (key, task) in &self.tasks {
            if *key != task.id {
                return Err(AppError::invariant(format!(
                    "task {} stored under id {key}",
                    task.id
                )));
            }
            if task.is_active && self.active != Some(task.id) {
                return Err(AppError::invariant(format!(
                    "task {} is flagged active but is not the active task",
                    task.id
                )));
            }
            if task.id > self.last_id {
                return Err(AppError::invariant(format!(
                    "task {} is above the last issued id {}",
                    task.id, self.last_id
                )));
            }
        }

        Ok(())
    }
}

fn ensure_representable(what: &str, timestamp: Timestamp) -> Result<(), AppError> {
    if clock::is_representable(timestamp) {
        Ok(())
    } else {
        Err(AppError::invalid_input(format!(
            "{what} {timestamp} is out of range"
        )))
    }
}

/// Lists compare by content: the tasks and which one is active. The id
/// counter is bookkeeping and does not survive a reload.
impl PartialEq for TaskList {
    fn eq(&self, other: &Self) -> bool {
        self.tasks == other.tasks && self.active == other.active
    }
}

impl Eq for TaskList {}

impl fmt::Display for TaskList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl FromStr for TaskList {
    type Err = AppError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input)
    }
}
