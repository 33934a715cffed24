use serde::{Deserialize, Serialize};

/// Stable identifier of a task, unique across the collection
pub type TaskId = u64;

/// Identifier of a subtask, unique only within its parent task
pub type SubtaskId = u64;

/// Composite key addressing one subtask. Subtask ids repeat across tasks,
/// so every lookup goes through the owning task id as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubtaskKey {
    pub task_id: TaskId,
    pub subtask_id: SubtaskId,
}

impl SubtaskKey {
    pub fn new(task_id: TaskId, subtask_id: SubtaskId) -> Self {
        SubtaskKey {
            task_id,
            subtask_id,
        }
    }
}

impl std::fmt::Display for SubtaskKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.task_id, self.subtask_id)
    }
}

/// A timed leaf item inside a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: SubtaskId,
    pub title: String,
    /// Accumulated time in milliseconds. Older stores wrote this as `time`.
    #[serde(default, alias = "time")]
    pub elapsed_ms: u64,
}

impl Subtask {
    pub fn new(id: SubtaskId, title: impl Into<String>) -> Self {
        Subtask {
            id,
            title: title.into(),
            elapsed_ms: 0,
        }
    }
}

/// A top-level card holding an ordered list of subtasks.
/// Position in the subtask list is display and persistence order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl Task {
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        Task {
            id,
            title: title.into(),
            subtasks: Vec::new(),
        }
    }

    /// Builder-style helper for seeding and tests
    pub fn with_subtask(mut self, id: SubtaskId, title: impl Into<String>) -> Self {
        self.subtasks.push(Subtask::new(id, title));
        self
    }

    pub fn key(&self, subtask: &Subtask) -> SubtaskKey {
        SubtaskKey::new(self.id, subtask.id)
    }
}
