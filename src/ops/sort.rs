use std::cmp::Ordering;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::model::task::Task;

/// Key for [`sort_tasks`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Creation time, oldest first
    Created,
    /// Due date, earliest first, undated last
    DueDate,
    /// High → medium → low
    Priority,
    /// Incomplete before complete
    Completion,
    /// Case-insensitive by text
    Alphabetical,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Created => "created",
            SortKey::DueDate => "due_date",
            SortKey::Priority => "priority",
            SortKey::Completion => "completion",
            SortKey::Alphabetical => "a-z",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created" => Ok(SortKey::Created),
            "due_date" | "due-date" | "due" => Ok(SortKey::DueDate),
            "priority" => Ok(SortKey::Priority),
            "completion" | "status" => Ok(SortKey::Completion),
            "a-z" | "alpha" | "alphabetical" => Ok(SortKey::Alphabetical),
            other => Err(format!(
                "unknown sort key '{}' (expected created, due_date, priority, completion, a-z)",
                other
            )),
        }
    }
}

/// Undated tasks compare greater than any dated task
fn due_key(task: &Task) -> (bool, Option<NaiveDate>) {
    (task.due_date.is_none(), task.due_date)
}

fn compare(key: SortKey, a: &Task, b: &Task) -> Ordering {
    match key {
        SortKey::Created => a.created.cmp(&b.created),
        SortKey::DueDate => due_key(a).cmp(&due_key(b)),
        SortKey::Priority => a.priority.rank().cmp(&b.priority.rank()),
        SortKey::Completion => a.completed.cmp(&b.completed),
        SortKey::Alphabetical => a.text.to_lowercase().cmp(&b.text.to_lowercase()),
    }
}

/// Stable in-place sort by one key. `reverse` inverts the comparison, so
/// tasks that compare equal keep their relative order either way.
pub fn sort_tasks(tasks: &mut [Task], key: SortKey, reverse: bool) {
    if reverse {
        tasks.sort_by(|a, b| compare(key, b, a));
    } else {
        tasks.sort_by(|a, b| compare(key, a, b));
    }
}

/// Incomplete first, then by priority, then by due date (undated last),
/// as a single stable sort on the combined key.
pub fn sort_smart(tasks: &mut [Task]) {
    tasks.sort_by_key(|t| {
        let (undated, due) = due_key(t);
        (t.completed, t.priority.rank(), undated, due)
    });
}
