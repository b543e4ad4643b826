use serde::Serialize;
use std::fmt;

pub type TaskId = u64;

/// Seconds since the Unix epoch.
pub type Timestamp = i64;

/// A single tracked task.
///
/// Fields are only writable inside the crate; every transition goes through
/// [`TaskList`](super::TaskList) so the single-active rule cannot be bypassed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub(crate) id: TaskId,
    pub(crate) name: String,
    pub(crate) start: Timestamp,
    pub(crate) end: Option<Timestamp>,
    pub(crate) is_active: bool,
}

impl Task {
    pub(crate) fn new(id: TaskId, name: &str, start: Timestamp) -> Self {
        Self {
            id,
            name: name.to_string(),
            start,
            end: None,
            is_active: false,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Option<Timestamp> {
        self.end
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_finished(&self) -> bool {
        self.end.is_some()
    }
}

/// Renders the task as one line of the persistence format, without the
/// trailing line break.
impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::codec::write_task(f, self)
    }
}
