use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Sort rank: high sorts first
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    /// Parse a priority name. Unknown names yield `None`.
    pub fn parse_priority(s: &str) -> Option<Priority> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }

    pub fn is_medium(&self) -> bool {
        *self == Priority::Medium
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

/// A checkbox item nested under a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl Subtask {
    pub fn new(text: impl Into<String>) -> Self {
        Subtask {
            text: text.into(),
            completed: false,
        }
    }

    pub fn toggle_completion(&mut self) {
        self.completed = !self.completed;
    }
}

/// A task with its notes, subtasks and scheduling fields.
///
/// Deserialization goes through [`TaskRecord`] so that every default and
/// coercion for documents written by older versions lives in one place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TaskRecord")]
pub struct Task {
    pub text: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<Subtask>,
    pub created: NaiveDateTime,
    #[serde(skip_serializing_if = "Priority::is_medium")]
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder: Option<NaiveDateTime>,
}

impl Task {
    /// Create a new incomplete task stamped with the current local time
    pub fn new(text: impl Into<String>) -> Self {
        Task {
            text: text.into(),
            completed: false,
            notes: Vec::new(),
            subtasks: Vec::new(),
            created: now(),
            priority: Priority::Medium,
            due_date: None,
            reminder: None,
        }
    }

    /// Build a task from free-form input: the first non-blank line is the
    /// task text, every following non-blank line becomes a note.
    pub fn from_input(input: &str) -> Option<Self> {
        let mut lines = input.lines().map(str::trim).filter(|l| !l.is_empty());
        let mut task = Task::new(lines.next()?);
        task.notes = lines.map(str::to_string).collect();
        Some(task)
    }

    pub fn toggle_completion(&mut self) {
        self.completed = !self.completed;
    }

    pub fn add_subtask(&mut self, subtask: Subtask) {
        self.subtasks.push(subtask);
    }

    /// Remove a subtask by index. Out-of-range indices return `None`.
    pub fn remove_subtask(&mut self, index: usize) -> Option<Subtask> {
        if index < self.subtasks.len() {
            Some(self.subtasks.remove(index))
        } else {
            None
        }
    }

    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn subtask_count(&self) -> usize {
        self.subtasks.len()
    }

    pub fn completed_subtask_count(&self) -> usize {
        self.subtasks.iter().filter(|s| s.completed).count()
    }

    /// True when the task and every one of its subtasks are done
    pub fn is_fully_completed(&self) -> bool {
        self.completed && self.subtasks.iter().all(|s| s.completed)
    }
}

/// Current local time without offset, the way `created` is stored
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

// ---------------------------------------------------------------------------
// Lenient on-disk representation
// ---------------------------------------------------------------------------

/// Loosely-typed task as found on disk. Every field is optional and any
/// JSON value is accepted; values of the wrong type fall back to defaults.
#[derive(Debug, Default, Deserialize)]
struct TaskRecord {
    #[serde(default)]
    text: Option<Value>,
    #[serde(default)]
    completed: Option<Value>,
    #[serde(default)]
    notes: Option<Value>,
    #[serde(default)]
    subtasks: Option<Vec<Subtask>>,
    #[serde(default)]
    created: Option<Value>,
    #[serde(default)]
    priority: Option<Value>,
    #[serde(default)]
    due_date: Option<Value>,
    #[serde(default)]
    reminder: Option<Value>,
}

fn as_str(value: &Option<Value>) -> Option<&str> {
    value.as_ref().and_then(Value::as_str)
}

impl From<TaskRecord> for Task {
    fn from(rec: TaskRecord) -> Self {
        let notes = match rec.notes {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|n| n.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };
        Task {
            text: as_str(&rec.text).unwrap_or_default().to_string(),
            completed: rec.completed.as_ref().and_then(Value::as_bool).unwrap_or(false),
            notes,
            subtasks: rec.subtasks.unwrap_or_default(),
            created: as_str(&rec.created).and_then(parse_datetime).unwrap_or_else(now),
            priority: as_str(&rec.priority)
                .and_then(Priority::parse_priority)
                .unwrap_or_default(),
            due_date: as_str(&rec.due_date).and_then(parse_date),
            reminder: as_str(&rec.reminder).and_then(parse_datetime),
        }
    }
}

/// Parse an ISO-8601 date (`2025-05-14`). A full datetime is accepted and
/// truncated to its date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(s).map(|dt| dt.date()))
}

/// Parse an ISO-8601 datetime, with or without fractional seconds or a UTC
/// offset. Offsets are converted to local wall-clock time.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = s.parse::<NaiveDateTime>() {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        return Some(dt);
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Local).naive_local())
}
