use std::path::Path;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::model::category::Category;
use crate::model::checklist::Checklist;
use crate::model::task::Task;

/// Timestamp format used in export headers
pub const EXPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Which tasks an export includes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl ExportFilter {
    fn title(self) -> &'static str {
        match self {
            ExportFilter::All => "Checklist Export",
            ExportFilter::Completed => "Completed Tasks",
            ExportFilter::Pending => "Pending Tasks",
        }
    }

    fn keeps(self, task: &Task) -> bool {
        match self {
            ExportFilter::All => true,
            ExportFilter::Completed => task.completed,
            ExportFilter::Pending => !task.completed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub include_metadata: bool,
    /// Checklist file the export came from; only its file name is shown
    pub source_file: Option<String>,
    pub filter: ExportFilter,
    pub exported_at: NaiveDateTime,
}

impl ExportOptions {
    pub fn new(exported_at: NaiveDateTime) -> Self {
        ExportOptions {
            include_metadata: true,
            source_file: None,
            filter: ExportFilter::All,
            exported_at,
        }
    }
}

/// Counts reported by `chk stats` and the export header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportStatistics {
    pub categories: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
    pub completion_percentage: f64,
    pub total_subtasks: usize,
    pub completed_subtasks: usize,
}

pub fn statistics(checklist: &Checklist) -> ExportStatistics {
    let total_tasks = checklist.total_task_count();
    let completed_tasks = checklist.total_completed_count();
    let tasks = checklist.categories.iter().flat_map(|c| c.tasks.iter());
    let (total_subtasks, completed_subtasks) = tasks.fold((0, 0), |(total, done), t| {
        (total + t.subtask_count(), done + t.completed_subtask_count())
    });
    ExportStatistics {
        categories: checklist.category_count(),
        total_tasks,
        completed_tasks,
        pending_tasks: total_tasks - completed_tasks,
        completion_percentage: percentage(completed_tasks, total_tasks),
        total_subtasks,
        completed_subtasks,
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Render the checklist as Markdown
pub fn export_markdown(checklist: &Checklist, options: &ExportOptions) -> String {
    let mut lines = Vec::new();

    if options.include_metadata {
        header_lines(checklist, options, &mut lines);
    } else if options.filter != ExportFilter::All {
        lines.push(format!("# {}", options.filter.title()));
        lines.push(String::new());
    }

    for category in &checklist.categories {
        match options.filter {
            ExportFilter::All => category_lines(category, &mut lines),
            filter => {
                let tasks: Vec<&Task> = category.tasks.iter().filter(|t| filter.keeps(t)).collect();
                if tasks.is_empty() {
                    continue;
                }
                lines.push(format!("## {}", category.name));
                lines.push(String::new());
                for task in tasks {
                    task_lines(task, &mut lines);
                }
                lines.push(String::new());
            }
        }
    }

    lines.join("\n")
}

/// Render a single category under its own title. `None` if the id is unknown.
pub fn export_category(checklist: &Checklist, category_id: i64) -> Option<String> {
    let category = checklist.category(category_id)?;
    let mut lines = vec![format!("# {}", category.name), String::new()];
    category_lines(category, &mut lines);
    Some(lines.join("\n"))
}

/// The first `max_lines` lines of the export, followed by a count of what
/// was cut.
pub fn export_preview(checklist: &Checklist, options: &ExportOptions, max_lines: usize) -> String {
    let full = export_markdown(checklist, options);
    let lines: Vec<&str> = full.split('\n').collect();
    if lines.len() <= max_lines {
        return full;
    }
    let mut preview = lines[..max_lines].join("\n");
    preview.push_str(&format!("\n\n... ({} more lines)", lines.len() - max_lines));
    preview
}

fn header_lines(checklist: &Checklist, options: &ExportOptions, lines: &mut Vec<String>) {
    lines.push(format!("# {}", options.filter.title()));
    lines.push(String::new());
    lines.push(format!(
        "**Exported:** {}",
        options.exported_at.format(EXPORT_TIMESTAMP_FORMAT)
    ));
    if let Some(source) = &options.source_file {
        let name = Path::new(source)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.clone());
        lines.push(format!("**File:** {}", name));
    }
    if options.filter == ExportFilter::All {
        let stats = statistics(checklist);
        lines.push(format!("**Total Tasks:** {}", stats.total_tasks));
        lines.push(format!(
            "**Completed:** {} ({:.1}%)",
            stats.completed_tasks, stats.completion_percentage
        ));
        lines.push(format!("**Categories:** {}", stats.categories));
    }
    lines.push(String::new());
    lines.push("---".to_string());
    lines.push(String::new());
}

fn category_lines(category: &Category, lines: &mut Vec<String>) {
    lines.push(format!("## {}", category.name));
    lines.push(String::new());
    if category.tasks.is_empty() {
        lines.push("_No tasks_".to_string());
    } else {
        lines.push(format!(
            "**Progress:** {}/{} tasks ({:.1}% complete)",
            category.completed_count(),
            category.task_count(),
            category.completion_percentage()
        ));
        lines.push(String::new());
        for task in &category.tasks {
            task_lines(task, lines);
        }
    }
    lines.push(String::new());
}

fn checkbox(done: bool) -> &'static str {
    if done { "[x]" } else { "[ ]" }
}

fn task_lines(task: &Task, lines: &mut Vec<String>) {
    lines.push(format!("- {} {}", checkbox(task.completed), task.text));
    for sub in &task.subtasks {
        lines.push(format!("  - {} {}", checkbox(sub.completed), sub.text));
    }
    for note in &task.notes {
        lines.push(format!("    - {}", note));
    }
}
