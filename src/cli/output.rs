use serde::Serialize;

use crate::model::category::Category;
use crate::model::task::{Priority, Task};
use crate::ops::search::SearchHit;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    /// 1-based, as accepted by the task commands
    pub number: usize,
    pub text: String,
    pub completed: bool,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder: Option<String>,
    pub created: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<SubtaskJson>,
}

#[derive(Serialize)]
pub struct SubtaskJson {
    pub text: String,
    pub completed: bool,
}

#[derive(Serialize)]
pub struct CategoryJson {
    pub id: i64,
    pub name: String,
    pub current: bool,
    pub total: usize,
    pub completed: usize,
}

#[derive(Serialize)]
pub struct TaskListJson {
    pub category_id: i64,
    pub category: String,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct SearchHitJson {
    pub category_id: i64,
    pub category: String,
    pub number: usize,
    pub text: String,
    pub completed: bool,
    pub match_type: &'static str,
}

#[derive(Serialize)]
pub struct HistoryJson {
    pub undo: usize,
    pub redo: usize,
    pub max_history: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_undo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_redo: Option<String>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(index: usize, task: &Task) -> TaskJson {
    TaskJson {
        number: index + 1,
        text: task.text.clone(),
        completed: task.completed,
        priority: task.priority,
        due_date: task.due_date.map(|d| d.to_string()),
        reminder: task.reminder.map(|r| r.format("%Y-%m-%dT%H:%M:%S").to_string()),
        created: task.created.format("%Y-%m-%dT%H:%M:%S").to_string(),
        notes: task.notes.clone(),
        subtasks: task
            .subtasks
            .iter()
            .map(|s| SubtaskJson {
                text: s.text.clone(),
                completed: s.completed,
            })
            .collect(),
    }
}

pub fn category_to_json(category: &Category, current: bool) -> CategoryJson {
    CategoryJson {
        id: category.id,
        name: category.name.clone(),
        current,
        total: category.task_count(),
        completed: category.completed_count(),
    }
}

pub fn hit_to_json(hit: &SearchHit<'_>) -> SearchHitJson {
    SearchHitJson {
        category_id: hit.category_id,
        category: hit.category_name.to_string(),
        number: hit.task_index + 1,
        text: hit.task.text.clone(),
        completed: hit.task.completed,
        match_type: hit.match_type.as_str(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn checkbox(done: bool) -> char {
    if done { 'x' } else { ' ' }
}

/// One-line summary: `3. [x] Text !high (due 2025-05-01)`
pub fn format_task_line(index: usize, task: &Task) -> String {
    let mut line = format!("{}. [{}] {}", index + 1, checkbox(task.completed), task.text);
    if task.priority != Priority::Medium {
        line.push_str(&format!(" !{}", task.priority));
    }
    if let Some(due) = task.due_date {
        line.push_str(&format!(" (due {})", due));
    }
    if let Some(reminder) = task.reminder {
        line.push_str(&format!(" (remind {})", reminder.format("%Y-%m-%d %H:%M")));
    }
    line
}

/// Task line followed by its subtasks and notes, indented
pub fn format_task_tree(index: usize, task: &Task) -> Vec<String> {
    let mut lines = vec![format_task_line(index, task)];
    for (i, sub) in task.subtasks.iter().enumerate() {
        lines.push(format!("    {}. [{}] {}", i + 1, checkbox(sub.completed), sub.text));
    }
    for (i, note) in task.notes.iter().enumerate() {
        lines.push(format!("    > {}. {}", i + 1, note));
    }
    lines
}

pub fn format_category_header(category: &Category) -> String {
    format!(
        "== {} (#{}) {}/{} ==",
        category.name,
        category.id,
        category.completed_count(),
        category.task_count()
    )
}

pub fn format_category_line(category: &Category, current: bool) -> String {
    format!(
        "{} {:>3}  {} ({}/{}, {:.0}%)",
        if current { '*' } else { ' ' },
        category.id,
        category.name,
        category.completed_count(),
        category.task_count(),
        category.completion_percentage()
    )
}

pub fn format_search_hit(hit: &SearchHit<'_>) -> String {
    format!(
        "[{}] {} ({})",
        hit.category_name,
        format_task_line(hit.task_index, hit.task),
        hit.match_type.as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{Subtask, parse_date, parse_datetime};

    #[test]
    fn task_line_plain() {
        let task = Task::new("Buy milk");
        assert_eq!(format_task_line(0, &task), "1. [ ] Buy milk");
    }

    #[test]
    fn task_line_with_schedule() {
        let mut task = Task::new("Pay rent");
        task.completed = true;
        task.priority = Priority::High;
        task.due_date = parse_date("2025-05-01");
        task.reminder = parse_datetime("2025-04-30T09:00:00");
        assert_eq!(
            format_task_line(2, &task),
            "3. [x] Pay rent !high (due 2025-05-01) (remind 2025-04-30 09:00)"
        );
    }

    #[test]
    fn task_tree_lists_subtasks_then_notes() {
        let mut task = Task::new("Trip");
        task.add_subtask(Subtask::new("Book hotel"));
        task.add_note("window seat");
        assert_eq!(
            format_task_tree(0, &task),
            vec!["1. [ ] Trip", "    1. [ ] Book hotel", "    > 1. window seat"]
        );
    }

    #[test]
    fn category_line_marks_current() {
        let mut cat = Category::new(4, "Work");
        cat.add_task(Task::new("a"));
        assert_eq!(format_category_line(&cat, true), "*   4  Work (0/1, 0%)");
        assert_eq!(format_category_header(&cat), "== Work (#4) 0/1 ==");
    }
}
