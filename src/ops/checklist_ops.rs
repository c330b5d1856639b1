use chrono::{NaiveDate, NaiveDateTime};

use crate::model::category::Category;
use crate::model::checklist::Checklist;
use crate::model::task::{Priority, Subtask, Task};

/// Error type for checklist mutations
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChecklistError {
    #[error("category not found: {0}")]
    CategoryNotFound(i64),
    #[error("no category selected")]
    NoCurrentCategory,
    #[error("task {index} not found in category {category}")]
    TaskNotFound { category: i64, index: usize },
    #[error("subtask {index} not found")]
    SubtaskNotFound { index: usize },
    #[error("note {index} not found")]
    NoteNotFound { index: usize },
    #[error("cannot delete the last category")]
    LastCategory,
    #[error("text must not be empty")]
    EmptyText,
    #[error("invalid position: {0}")]
    InvalidPosition(String),
    #[error("no category ids left")]
    IdsExhausted,
}

fn non_empty(text: &str) -> Result<String, ChecklistError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(ChecklistError::EmptyText)
    } else {
        Ok(trimmed.to_string())
    }
}

/// An explicit category id, or the current selection
pub fn resolve_category(checklist: &Checklist, id: Option<i64>) -> Result<i64, ChecklistError> {
    match id {
        Some(id) => checklist
            .category(id)
            .map(|c| c.id)
            .ok_or(ChecklistError::CategoryNotFound(id)),
        None => checklist
            .current_category()
            .map(|c| c.id)
            .ok_or(ChecklistError::NoCurrentCategory),
    }
}

fn category_mut(checklist: &mut Checklist, id: i64) -> Result<&mut Category, ChecklistError> {
    checklist
        .category_mut(id)
        .ok_or(ChecklistError::CategoryNotFound(id))
}

fn task_mut(
    checklist: &mut Checklist,
    category: i64,
    index: usize,
) -> Result<&mut Task, ChecklistError> {
    category_mut(checklist, category)?
        .task_mut(index)
        .ok_or(ChecklistError::TaskNotFound { category, index })
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Append a new category and return its id. Selects it when nothing is selected.
pub fn add_category(checklist: &mut Checklist, name: &str) -> Result<i64, ChecklistError> {
    let name = non_empty(name)?;
    let id = checklist.next_category_id().ok_or(ChecklistError::IdsExhausted)?;
    checklist.add_category(Category::new(id, name));
    if checklist.current_category().is_none() {
        checklist.current_category_id = Some(id);
    }
    Ok(id)
}

pub fn rename_category(
    checklist: &mut Checklist,
    id: i64,
    name: &str,
) -> Result<(), ChecklistError> {
    let name = non_empty(name)?;
    category_mut(checklist, id)?.name = name;
    Ok(())
}

/// Delete a category and its tasks. The last remaining category cannot be
/// deleted; deleting the selected one selects the first remaining category.
pub fn delete_category(checklist: &mut Checklist, id: i64) -> Result<Category, ChecklistError> {
    if checklist.category(id).is_none() {
        return Err(ChecklistError::CategoryNotFound(id));
    }
    if checklist.category_count() <= 1 {
        return Err(ChecklistError::LastCategory);
    }
    let removed = checklist
        .remove_category(id)
        .ok_or(ChecklistError::CategoryNotFound(id))?;
    if checklist.current_category_id.is_none() {
        checklist.current_category_id = checklist.categories.first().map(|c| c.id);
    }
    Ok(removed)
}

pub fn select_category(checklist: &mut Checklist, id: i64) -> Result<(), ChecklistError> {
    if checklist.set_current_category(id) {
        Ok(())
    } else {
        Err(ChecklistError::CategoryNotFound(id))
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Add a task parsed from free-form input (first line text, other lines
/// notes). Returns the new task's index.
pub fn add_task(
    checklist: &mut Checklist,
    category: i64,
    input: &str,
) -> Result<usize, ChecklistError> {
    let task = Task::from_input(input).ok_or(ChecklistError::EmptyText)?;
    let cat = category_mut(checklist, category)?;
    cat.add_task(task);
    Ok(cat.task_count() - 1)
}

/// Flip completion; returns the new state
pub fn toggle_task(
    checklist: &mut Checklist,
    category: i64,
    index: usize,
) -> Result<bool, ChecklistError> {
    let task = task_mut(checklist, category, index)?;
    task.toggle_completion();
    Ok(task.completed)
}

pub fn edit_task_text(
    checklist: &mut Checklist,
    category: i64,
    index: usize,
    text: &str,
) -> Result<(), ChecklistError> {
    let text = non_empty(text)?;
    task_mut(checklist, category, index)?.text = text;
    Ok(())
}

pub fn delete_task(
    checklist: &mut Checklist,
    category: i64,
    index: usize,
) -> Result<Task, ChecklistError> {
    category_mut(checklist, category)?
        .remove_task(index)
        .ok_or(ChecklistError::TaskNotFound { category, index })
}

/// Move a task within its category (post-removal target index)
pub fn move_task(
    checklist: &mut Checklist,
    category: i64,
    from: usize,
    to: usize,
) -> Result<(), ChecklistError> {
    let cat = category_mut(checklist, category)?;
    let len = cat.task_count();
    if from >= len {
        return Err(ChecklistError::TaskNotFound { category, index: from });
    }
    if to >= len {
        return Err(ChecklistError::InvalidPosition(format!(
            "position {} out of range (0..{})",
            to, len
        )));
    }
    let task = cat.tasks.remove(from);
    cat.tasks.insert(to, task);
    Ok(())
}

pub fn set_priority(
    checklist: &mut Checklist,
    category: i64,
    index: usize,
    priority: Priority,
) -> Result<(), ChecklistError> {
    task_mut(checklist, category, index)?.priority = priority;
    Ok(())
}

pub fn set_due_date(
    checklist: &mut Checklist,
    category: i64,
    index: usize,
    due: Option<NaiveDate>,
) -> Result<(), ChecklistError> {
    task_mut(checklist, category, index)?.due_date = due;
    Ok(())
}

pub fn set_reminder(
    checklist: &mut Checklist,
    category: i64,
    index: usize,
    reminder: Option<NaiveDateTime>,
) -> Result<(), ChecklistError> {
    task_mut(checklist, category, index)?.reminder = reminder;
    Ok(())
}

/// Remove completed tasks from a category; returns how many were removed
pub fn clear_completed(checklist: &mut Checklist, category: i64) -> Result<usize, ChecklistError> {
    Ok(category_mut(checklist, category)?.clear_completed())
}

// ---------------------------------------------------------------------------
// Subtasks and notes
// ---------------------------------------------------------------------------

pub fn add_subtask(
    checklist: &mut Checklist,
    category: i64,
    index: usize,
    text: &str,
) -> Result<usize, ChecklistError> {
    let text = non_empty(text)?;
    let task = task_mut(checklist, category, index)?;
    task.add_subtask(Subtask::new(text));
    Ok(task.subtask_count() - 1)
}

pub fn toggle_subtask(
    checklist: &mut Checklist,
    category: i64,
    index: usize,
    subtask: usize,
) -> Result<bool, ChecklistError> {
    let sub = task_mut(checklist, category, index)?
        .subtasks
        .get_mut(subtask)
        .ok_or(ChecklistError::SubtaskNotFound { index: subtask })?;
    sub.toggle_completion();
    Ok(sub.completed)
}

pub fn delete_subtask(
    checklist: &mut Checklist,
    category: i64,
    index: usize,
    subtask: usize,
) -> Result<Subtask, ChecklistError> {
    task_mut(checklist, category, index)?
        .remove_subtask(subtask)
        .ok_or(ChecklistError::SubtaskNotFound { index: subtask })
}

pub fn add_note(
    checklist: &mut Checklist,
    category: i64,
    index: usize,
    note: &str,
) -> Result<(), ChecklistError> {
    let note = non_empty(note)?;
    task_mut(checklist, category, index)?.add_note(note);
    Ok(())
}

pub fn delete_note(
    checklist: &mut Checklist,
    category: i64,
    index: usize,
    note: usize,
) -> Result<String, ChecklistError> {
    let task = task_mut(checklist, category, index)?;
    if note >= task.notes.len() {
        return Err(ChecklistError::NoteNotFound { index: note });
    }
    Ok(task.notes.remove(note))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{parse_date, parse_datetime};

    fn sample() -> Checklist {
        let mut checklist = Checklist::with_default_categories();
        add_task(&mut checklist, 1, "First\nnote a").unwrap();
        add_task(&mut checklist, 1, "Second").unwrap();
        add_task(&mut checklist, 1, "Third").unwrap();
        checklist
    }

    fn texts(checklist: &Checklist, category: i64) -> Vec<&str> {
        checklist
            .category(category)
            .unwrap()
            .tasks
            .iter()
            .map(|t| t.text.as_str())
            .collect()
    }

    #[test]
    fn add_category_assigns_next_id() {
        let mut checklist = sample();
        let id = add_category(&mut checklist, "  Email ").unwrap();
        assert_eq!(id, 6);
        assert_eq!(checklist.category(6).unwrap().name, "Email");
        // Existing selection is kept
        assert_eq!(checklist.current_category_id, Some(1));
    }

    #[test]
    fn add_category_selects_when_none_selected() {
        let mut checklist = Checklist::new();
        let id = add_category(&mut checklist, "Only").unwrap();
        assert_eq!(checklist.current_category_id, Some(id));
    }

    #[test]
    fn add_category_rejects_blank() {
        let mut checklist = sample();
        assert_eq!(add_category(&mut checklist, "  "), Err(ChecklistError::EmptyText));
    }

    #[test]
    fn add_category_after_max_id() {
        let mut checklist = Checklist::new();
        checklist.add_category(Category::new(i64::MAX, "Last"));
        assert_eq!(add_category(&mut checklist, "More"), Err(ChecklistError::IdsExhausted));
        assert_eq!(checklist.category_count(), 1);
    }

    #[test]
    fn rename_category() {
        let mut checklist = sample();
        super::rename_category(&mut checklist, 2, "Chat").unwrap();
        assert_eq!(checklist.category(2).unwrap().name, "Chat");
        assert_eq!(
            super::rename_category(&mut checklist, 42, "x"),
            Err(ChecklistError::CategoryNotFound(42))
        );
    }

    #[test]
    fn delete_selected_category_reselects_first() {
        let mut checklist = sample();
        let removed = delete_category(&mut checklist, 1).unwrap();
        assert_eq!(removed.task_count(), 3);
        assert_eq!(checklist.current_category_id, Some(2));
    }

    #[test]
    fn delete_last_category_refused() {
        let mut checklist = Checklist::new();
        let id = add_category(&mut checklist, "Only").unwrap();
        assert_eq!(delete_category(&mut checklist, id), Err(ChecklistError::LastCategory));
        assert_eq!(checklist.category_count(), 1);
    }

    #[test]
    fn resolve_category_explicit_and_current() {
        let mut checklist = sample();
        assert_eq!(resolve_category(&checklist, Some(3)), Ok(3));
        assert_eq!(resolve_category(&checklist, None), Ok(1));
        assert_eq!(
            resolve_category(&checklist, Some(99)),
            Err(ChecklistError::CategoryNotFound(99))
        );
        checklist.current_category_id = None;
        assert_eq!(resolve_category(&checklist, None), Err(ChecklistError::NoCurrentCategory));
    }

    #[test]
    fn add_task_splits_notes() {
        let checklist = sample();
        let task = checklist.category(1).unwrap().task(0).unwrap();
        assert_eq!(task.text, "First");
        assert_eq!(task.notes, vec!["note a"]);
    }

    #[test]
    fn add_task_blank_input() {
        let mut checklist = sample();
        assert_eq!(add_task(&mut checklist, 1, "\n \n"), Err(ChecklistError::EmptyText));
    }

    #[test]
    fn toggle_and_clear_completed() {
        let mut checklist = sample();
        assert!(toggle_task(&mut checklist, 1, 0).unwrap());
        assert!(toggle_task(&mut checklist, 1, 2).unwrap());
        assert_eq!(clear_completed(&mut checklist, 1).unwrap(), 2);
        assert_eq!(texts(&checklist, 1), vec!["Second"]);
    }

    #[test]
    fn missing_task_is_reported() {
        let mut checklist = sample();
        assert_eq!(
            toggle_task(&mut checklist, 1, 9),
            Err(ChecklistError::TaskNotFound { category: 1, index: 9 })
        );
        assert!(delete_task(&mut checklist, 1, 3).is_err());
        assert!(edit_task_text(&mut checklist, 7, 0, "x").is_err());
    }

    #[test]
    fn edit_and_delete_task() {
        let mut checklist = sample();
        edit_task_text(&mut checklist, 1, 1, "Second (edited)").unwrap();
        let removed = delete_task(&mut checklist, 1, 0).unwrap();
        assert_eq!(removed.text, "First");
        assert_eq!(texts(&checklist, 1), vec!["Second (edited)", "Third"]);
    }

    #[test]
    fn move_task_within_category() {
        let mut checklist = sample();
        move_task(&mut checklist, 1, 0, 2).unwrap();
        assert_eq!(texts(&checklist, 1), vec!["Second", "Third", "First"]);
        assert!(matches!(
            move_task(&mut checklist, 1, 0, 3),
            Err(ChecklistError::InvalidPosition(_))
        ));
    }

    #[test]
    fn scheduling_fields() {
        let mut checklist = sample();
        set_priority(&mut checklist, 1, 0, Priority::High).unwrap();
        set_due_date(&mut checklist, 1, 0, parse_date("2025-07-04")).unwrap();
        set_reminder(&mut checklist, 1, 0, parse_datetime("2025-07-03T09:00:00")).unwrap();
        let task = checklist.category(1).unwrap().task(0).unwrap();
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.due_date, parse_date("2025-07-04"));
        assert!(task.reminder.is_some());

        set_reminder(&mut checklist, 1, 0, None).unwrap();
        assert!(checklist.category(1).unwrap().task(0).unwrap().reminder.is_none());
    }

    #[test]
    fn subtasks() {
        let mut checklist = sample();
        assert_eq!(add_subtask(&mut checklist, 1, 1, "step one").unwrap(), 0);
        assert_eq!(add_subtask(&mut checklist, 1, 1, "step two").unwrap(), 1);
        assert!(toggle_subtask(&mut checklist, 1, 1, 1).unwrap());
        assert_eq!(
            toggle_subtask(&mut checklist, 1, 1, 5),
            Err(ChecklistError::SubtaskNotFound { index: 5 })
        );
        let removed = delete_subtask(&mut checklist, 1, 1, 0).unwrap();
        assert_eq!(removed.text, "step one");
        let task = checklist.category(1).unwrap().task(1).unwrap();
        assert_eq!(task.subtask_count(), 1);
        assert_eq!(task.completed_subtask_count(), 1);
    }

    #[test]
    fn notes() {
        let mut checklist = sample();
        add_note(&mut checklist, 1, 0, "note b").unwrap();
        assert_eq!(delete_note(&mut checklist, 1, 0, 0).unwrap(), "note a");
        assert_eq!(
            delete_note(&mut checklist, 1, 0, 4),
            Err(ChecklistError::NoteNotFound { index: 4 })
        );
        assert_eq!(checklist.category(1).unwrap().task(0).unwrap().notes, vec!["note b"]);
    }
}
