use regex::{Regex, RegexBuilder};

use crate::model::category::Category;
use crate::model::task::Task;

/// Which part of a task matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    Task,
    Subtask,
    Note,
}

impl MatchType {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchType::Task => "task",
            MatchType::Subtask => "subtask",
            MatchType::Note => "note",
        }
    }
}

/// A search hit: one per task and match type
#[derive(Debug, Clone)]
pub struct SearchHit<'a> {
    pub category_id: i64,
    pub category_name: &'a str,
    /// Index of the task within its category's full task list
    pub task_index: usize,
    pub task: &'a Task,
    pub match_type: MatchType,
}

/// Case-insensitive substring search over task text, subtask text and notes.
///
/// An empty (or all-whitespace) query matches nothing. `category_id`
/// restricts the search to one category; completed tasks are skipped unless
/// `include_completed` is set.
pub fn search_tasks<'a>(
    categories: &'a [Category],
    query: &str,
    category_id: Option<i64>,
    include_completed: bool,
) -> Vec<SearchHit<'a>> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }
    match literal_matcher(query) {
        Some(re) => search_tasks_regex(categories, &re, category_id, include_completed),
        None => Vec::new(),
    }
}

/// Same walk as [`search_tasks`] with a caller-supplied pattern
pub fn search_tasks_regex<'a>(
    categories: &'a [Category],
    re: &Regex,
    category_id: Option<i64>,
    include_completed: bool,
) -> Vec<SearchHit<'a>> {
    let mut hits = Vec::new();

    for category in categories {
        if let Some(filter) = category_id
            && category.id != filter
        {
            continue;
        }

        for (task_index, task) in category.tasks.iter().enumerate() {
            if !include_completed && task.completed {
                continue;
            }
            for match_type in match_types(re, task) {
                hits.push(SearchHit {
                    category_id: category.id,
                    category_name: &category.name,
                    task_index,
                    task,
                    match_type,
                });
            }
        }
    }

    hits
}

/// The distinct fields of `task` that match, in task → subtask → note order
fn match_types(re: &Regex, task: &Task) -> Vec<MatchType> {
    let mut types = Vec::new();
    if re.is_match(&task.text) {
        types.push(MatchType::Task);
    }
    if task.subtasks.iter().any(|s| re.is_match(&s.text)) {
        types.push(MatchType::Subtask);
    }
    if task.notes.iter().any(|n| re.is_match(n)) {
        types.push(MatchType::Note);
    }
    types
}

/// Build a case-insensitive matcher for a literal query
fn literal_matcher(query: &str) -> Option<Regex> {
    RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Keep tasks whose completion matches `completed`; `None` keeps everything
pub fn filter_by_status(tasks: &[Task], completed: Option<bool>) -> Vec<&Task> {
    match completed {
        None => tasks.iter().collect(),
        Some(done) => tasks.iter().filter(|t| t.completed == done).collect(),
    }
}

/// Keep tasks that have (or lack) a reminder
pub fn filter_by_reminder(tasks: &[Task], has_reminder: bool) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|t| t.reminder.is_some() == has_reminder)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{Subtask, parse_datetime};

    fn task(text: &str) -> Task {
        Task::new(text)
    }

    fn sample_categories() -> Vec<Category> {
        let mut shopping = Category::new(1, "Shopping");
        let mut groceries = task("Groceries");
        groceries.add_subtask(Subtask::new("Milk"));
        groceries.add_subtask(Subtask::new("Oat milk"));
        groceries.add_note("Check the milk aisle first");
        shopping.add_task(groceries);
        let mut hardware = task("Hardware store");
        hardware.completed = true;
        hardware.add_note("bring receipt");
        shopping.add_task(hardware);

        let mut work = Category::new(2, "Work");
        work.add_task(task("Milk the release notes"));
        let mut review = task("Review PR");
        review.add_note("ask about receipt parsing");
        work.add_task(review);

        vec![shopping, work]
    }

    #[test]
    fn finds_subtask_case_insensitive() {
        let cats = sample_categories();
        let hits = search_tasks(&cats, "milk", Some(1), true);
        let sub: Vec<_> = hits
            .iter()
            .filter(|h| h.match_type == MatchType::Subtask)
            .collect();
        assert_eq!(sub.len(), 1);
        assert_eq!(sub[0].task.text, "Groceries");
        assert_eq!(sub[0].category_name, "Shopping");
        assert_eq!(sub[0].task_index, 0);
    }

    #[test]
    fn one_hit_per_distinct_match_type() {
        let cats = sample_categories();
        let hits = search_tasks(&cats, "MILK", None, true);
        let kinds: Vec<(i64, usize, MatchType)> = hits
            .iter()
            .map(|h| (h.category_id, h.task_index, h.match_type))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (1, 0, MatchType::Subtask),
                (1, 0, MatchType::Note),
                (2, 0, MatchType::Task),
            ]
        );
    }

    #[test]
    fn empty_query_matches_nothing() {
        let cats = sample_categories();
        assert!(search_tasks(&cats, "", None, true).is_empty());
        assert!(search_tasks(&cats, "   ", None, true).is_empty());
    }

    #[test]
    fn query_is_trimmed() {
        let cats = sample_categories();
        let hits = search_tasks(&cats, "  review ", None, true);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].match_type, MatchType::Task);
    }

    #[test]
    fn excludes_completed_when_asked() {
        let cats = sample_categories();
        let all = search_tasks(&cats, "receipt", None, true);
        assert_eq!(all.len(), 2);
        let pending = search_tasks(&cats, "receipt", None, false);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].task.text, "Review PR");
        assert_eq!(pending[0].task_index, 1);
    }

    #[test]
    fn category_filter() {
        let cats = sample_categories();
        let hits = search_tasks(&cats, "receipt", Some(2), true);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].category_id, 2);
        assert!(search_tasks(&cats, "receipt", Some(99), true).is_empty());
    }

    #[test]
    fn special_characters_are_literal() {
        let mut cat = Category::new(1, "c");
        cat.add_task(task("Fix (a+b)*c"));
        cat.add_task(task("Fix abc"));
        let cats = vec![cat];
        let hits = search_tasks(&cats, "(a+b)", None, true);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].task_index, 0);
    }

    #[test]
    fn regex_search() {
        let cats = sample_categories();
        let re = Regex::new("^(Review|Hardware)").unwrap();
        let hits = search_tasks_regex(&cats, &re, None, true);
        let texts: Vec<&str> = hits.iter().map(|h| h.task.text.as_str()).collect();
        assert_eq!(texts, vec!["Hardware store", "Review PR"]);
    }

    #[test]
    fn status_filter() {
        let cats = sample_categories();
        let tasks = &cats[0].tasks;
        assert_eq!(filter_by_status(tasks, None).len(), 2);
        assert_eq!(filter_by_status(tasks, Some(true))[0].text, "Hardware store");
        assert_eq!(filter_by_status(tasks, Some(false))[0].text, "Groceries");
    }

    #[test]
    fn reminder_filter() {
        let mut tasks = vec![task("a"), task("b")];
        tasks[1].reminder = parse_datetime("2025-01-01T08:00:00");
        let with: Vec<&str> = filter_by_reminder(&tasks, true)
            .iter()
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(with, vec!["b"]);
        assert_eq!(filter_by_reminder(&tasks, false)[0].text, "a");
    }
}
