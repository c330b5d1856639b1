use chrono::NaiveDateTime;
use serde::Serialize;

use crate::model::checklist::Checklist;

/// An incomplete task whose reminder time has passed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderHit {
    pub category_id: i64,
    pub category_name: String,
    pub task_index: usize,
    pub text: String,
    pub reminder: NaiveDateTime,
}

/// Incomplete tasks with a reminder at or before `now`, in category then
/// task order.
pub fn due_reminders(checklist: &Checklist, now: NaiveDateTime) -> Vec<ReminderHit> {
    let mut hits = Vec::new();
    for category in &checklist.categories {
        for (task_index, task) in category.tasks.iter().enumerate() {
            if task.completed {
                continue;
            }
            if let Some(reminder) = task.reminder
                && reminder <= now
            {
                hits.push(ReminderHit {
                    category_id: category.id,
                    category_name: category.name.clone(),
                    task_index,
                    text: task.text.clone(),
                    reminder,
                });
            }
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::category::Category;
    use crate::model::task::{Task, parse_datetime};

    fn reminder_task(text: &str, at: &str, completed: bool) -> Task {
        let mut task = Task::new(text);
        task.reminder = parse_datetime(at);
        task.completed = completed;
        task
    }

    #[test]
    fn only_past_incomplete_reminders() {
        let mut work = Category::new(1, "Work");
        work.add_task(reminder_task("past", "2025-04-01T08:00:00", false));
        work.add_task(reminder_task("future", "2025-04-02T08:00:00", false));
        work.add_task(reminder_task("done", "2025-03-01T08:00:00", true));
        work.add_task(Task::new("no reminder"));
        let mut home = Category::new(2, "Home");
        home.add_task(reminder_task("exact", "2025-04-01T12:00:00", false));

        let mut checklist = Checklist::new();
        checklist.add_category(work);
        checklist.add_category(home);

        let now = parse_datetime("2025-04-01T12:00:00").unwrap();
        let hits = due_reminders(&checklist, now);
        let found: Vec<(i64, usize, &str)> = hits
            .iter()
            .map(|h| (h.category_id, h.task_index, h.text.as_str()))
            .collect();
        assert_eq!(found, vec![(1, 0, "past"), (2, 0, "exact")]);
    }

    #[test]
    fn empty_checklist_has_no_reminders() {
        let checklist = Checklist::with_default_categories();
        let now = parse_datetime("2025-04-01T12:00:00").unwrap();
        assert!(due_reminders(&checklist, now).is_empty());
    }
}
