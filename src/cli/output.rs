use serde::Serialize;

use crate::model::task::{Subtask, Task};
use crate::util::time_fmt::format_elapsed;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct SubtaskJson {
    pub id: u64,
    pub title: String,
    pub elapsed_ms: u64,
    /// `MM:SS`
    pub elapsed: String,
}

#[derive(Serialize)]
pub struct TaskJson {
    pub id: u64,
    pub title: String,
    pub subtasks: Vec<SubtaskJson>,
}

#[derive(Serialize)]
pub struct PathsJson {
    pub config: String,
    pub data_dir: String,
    pub store: String,
    pub log_dir: String,
}

pub fn subtask_to_json(st: &Subtask) -> SubtaskJson {
    SubtaskJson {
        id: st.id,
        title: st.title.clone(),
        elapsed_ms: st.elapsed_ms,
        elapsed: format_elapsed(st.elapsed_ms),
    }
}

pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        id: task.id,
        title: task.title.clone(),
        subtasks: task.subtasks.iter().map(subtask_to_json).collect(),
    }
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

/// One block per task: the title, then one indented `MM:SS  title` line per
/// subtask
pub fn format_task_list(tasks: &[Task]) -> String {
    let mut out = String::new();
    for task in tasks {
        out.push_str(&format!("{} (#{})\n", task.title, task.id));
        if task.subtasks.is_empty() {
            out.push_str("  (no subtasks)\n");
        }
        for st in &task.subtasks {
            out.push_str(&format!("  {}  {}\n", format_elapsed(st.elapsed_ms), st.title));
        }
    }
    out
}
