use std::path::{Path, PathBuf};
use std::str::FromStr;

use regex::Regex;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::history_io;
use crate::io::paths;
use crate::io::settings_io::SettingsStore;
use crate::io::storage::Storage;
use crate::model::task::{self, Priority, Task};
use crate::ops::checklist_ops::{self, ChecklistError};
use crate::ops::export::{self, ExportFilter, ExportOptions};
use crate::ops::reminders;
use crate::ops::search;
use crate::ops::sort::{self, SortKey};
use crate::session::Session;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Resolved global options
struct Context {
    file: PathBuf,
    settings: PathBuf,
    json: bool,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let ctx = Context {
        file: paths::resolve(cli.file, paths::default_checklist_path),
        settings: paths::resolve(cli.settings, paths::default_settings_path),
        json: cli.json,
    };
    tracing::debug!(
        file = %ctx.file.display(),
        settings = %ctx.settings.display(),
        "resolved paths"
    );

    match cli.command {
        Commands::Init(args) => cmd_init(&ctx, args),

        // Read commands
        Commands::List(args) => cmd_list(&ctx, args),
        Commands::Categories => cmd_categories(&ctx),
        Commands::Search(args) => cmd_search(&ctx, args),
        Commands::History(args) => cmd_history(&ctx, args),
        Commands::Export(args) => cmd_export(&ctx, args),
        Commands::Stats => cmd_stats(&ctx),
        Commands::Reminders(args) => cmd_reminders(&ctx, args),

        // Write commands
        Commands::Category(args) => cmd_category(&ctx, args),
        Commands::Add(args) => cmd_add(&ctx, args),
        Commands::Done(args) => cmd_done(&ctx, args),
        Commands::Edit(args) => cmd_edit(&ctx, args),
        Commands::Rm(args) => cmd_rm(&ctx, args),
        Commands::Mv(args) => cmd_mv(&ctx, args),
        Commands::Sub(args) => cmd_sub(&ctx, args),
        Commands::Subdone(args) => cmd_subdone(&ctx, args),
        Commands::Subrm(args) => cmd_subrm(&ctx, args),
        Commands::Note(args) => cmd_note(&ctx, args),
        Commands::Noterm(args) => cmd_noterm(&ctx, args),
        Commands::Priority(args) => cmd_priority(&ctx, args),
        Commands::Due(args) => cmd_due(&ctx, args),
        Commands::Remind(args) => cmd_remind(&ctx, args),
        Commands::Sort(args) => cmd_sort(&ctx, args),
        Commands::Clear(args) => cmd_clear(&ctx, args),
        Commands::Undo => cmd_undo(&ctx),
        Commands::Redo => cmd_redo(&ctx),

        // Files and settings
        Commands::Backup(args) => cmd_backup(&ctx, args),
        Commands::Recent(args) => cmd_recent(&ctx, args),
        Commands::Settings(args) => cmd_settings(&ctx, args),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Open the checklist named by the context and note it as recently used
fn open_session(ctx: &Context) -> Result<Session, Box<dyn std::error::Error>> {
    let mut store = SettingsStore::load(&ctx.settings);
    let session = Session::open(Storage::new(&ctx.file), store.settings.max_history)?;
    remember_recent(&mut store, &ctx.file);
    Ok(session)
}

fn remember_recent(store: &mut SettingsStore, file: &Path) {
    let path = std::fs::canonicalize(file)
        .unwrap_or_else(|_| file.to_path_buf())
        .to_string_lossy()
        .into_owned();
    if store.settings.recent_files.first() == Some(&path) {
        return;
    }
    store.settings.add_recent_file(&path);
    if let Err(e) = store.save() {
        tracing::warn!(error = %e, "could not update recent files");
    }
}

/// Convert a 1-based number from the command line to an index
fn to_index(number: usize) -> Result<usize, ChecklistError> {
    number
        .checked_sub(1)
        .ok_or_else(|| ChecklistError::InvalidPosition("numbers start at 1".to_string()))
}

fn category_id(session: &Session, arg: &CategoryArg) -> Result<i64, ChecklistError> {
    checklist_ops::resolve_category(session.checklist(), arg.category)
}

fn category_name(session: &Session, id: i64) -> String {
    session
        .checklist()
        .category(id)
        .map(|c| c.name.clone())
        .unwrap_or_default()
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::parse_priority(s)
        .ok_or_else(|| format!("unknown priority '{}' (expected low, medium, high)", s))
}

fn parse_date_arg(s: &str) -> Result<chrono::NaiveDate, String> {
    task::parse_date(s).ok_or_else(|| format!("invalid date '{}' (expected YYYY-MM-DD)", s))
}

fn parse_datetime_arg(s: &str) -> Result<chrono::NaiveDateTime, String> {
    task::parse_datetime(s)
        .ok_or_else(|| format!("invalid time '{}' (expected YYYY-MM-DDTHH:MM)", s))
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

fn cmd_init(ctx: &Context, args: InitArgs) -> CmdResult {
    let storage = Storage::new(&ctx.file);
    if storage.file_exists() && !args.force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            ctx.file.display()
        )
        .into());
    }
    storage.save(&Storage::default_checklist())?;
    history_io::remove_history(&ctx.file)?;
    println!("Created {}", ctx.file.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(ctx: &Context, args: ListArgs) -> CmdResult {
    let session = open_session(ctx)?;
    let checklist = session.checklist();
    let status = if args.pending {
        Some(false)
    } else if args.completed {
        Some(true)
    } else {
        None
    };

    let categories: Vec<_> = if args.all {
        checklist.categories.iter().collect()
    } else {
        let id = category_id(&session, &args.category)?;
        checklist.category(id).into_iter().collect()
    };

    if ctx.json {
        let lists: Vec<TaskListJson> = categories
            .iter()
            .map(|c| TaskListJson {
                category_id: c.id,
                category: c.name.clone(),
                tasks: filter_tasks(&c.tasks, status)
                    .into_iter()
                    .map(|(i, t)| task_to_json(i, t))
                    .collect(),
            })
            .collect();
        return print_json(&lists);
    }

    for (n, category) in categories.iter().enumerate() {
        if n > 0 {
            println!();
        }
        println!("{}", format_category_header(category));
        let tasks = filter_tasks(&category.tasks, status);
        if tasks.is_empty() {
            println!("  (no tasks)");
        }
        for (i, t) in tasks {
            for line in format_task_tree(i, t) {
                println!("  {}", line);
            }
        }
    }
    Ok(())
}

/// Tasks with their indices, optionally restricted to one completion state
fn filter_tasks(tasks: &[Task], status: Option<bool>) -> Vec<(usize, &Task)> {
    tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| status.is_none_or(|done| t.completed == done))
        .collect()
}

fn cmd_categories(ctx: &Context) -> CmdResult {
    let session = open_session(ctx)?;
    let checklist = session.checklist();
    let current = checklist.current_category_id;
    if ctx.json {
        let cats: Vec<CategoryJson> = checklist
            .categories
            .iter()
            .map(|c| category_to_json(c, current == Some(c.id)))
            .collect();
        return print_json(&cats);
    }
    for category in &checklist.categories {
        println!("{}", format_category_line(category, current == Some(category.id)));
    }
    Ok(())
}

fn cmd_search(ctx: &Context, args: SearchArgs) -> CmdResult {
    let session = open_session(ctx)?;
    let checklist = session.checklist();
    let category = match args.category.category {
        Some(id) => Some(checklist_ops::resolve_category(checklist, Some(id))?),
        None => None,
    };
    let include_completed = !args.pending;
    let hits = if args.regex {
        let re = Regex::new(&args.query)?;
        search::search_tasks_regex(&checklist.categories, &re, category, include_completed)
    } else {
        search::search_tasks(&checklist.categories, &args.query, category, include_completed)
    };

    if ctx.json {
        let hits: Vec<SearchHitJson> = hits.iter().map(hit_to_json).collect();
        return print_json(&hits);
    }
    if hits.is_empty() {
        println!("No matches");
    }
    for hit in &hits {
        println!("{}", format_search_hit(hit));
    }
    Ok(())
}

fn cmd_history(ctx: &Context, args: HistoryArgs) -> CmdResult {
    let mut session = open_session(ctx)?;
    if args.clear {
        session.clear_history()?;
        println!("History cleared");
        return Ok(());
    }
    let history = session.history();
    let summary = HistoryJson {
        undo: history.undo_len(),
        redo: history.redo_len(),
        max_history: history.max_history(),
        next_undo: history.undo_description().map(str::to_string),
        next_redo: history.redo_description().map(str::to_string),
    };
    if ctx.json {
        return print_json(&summary);
    }
    println!(
        "{} undo / {} redo (max {})",
        summary.undo, summary.redo, summary.max_history
    );
    if let Some(desc) = &summary.next_undo {
        println!("undo: {}", desc);
    }
    if let Some(desc) = &summary.next_redo {
        println!("redo: {}", desc);
    }
    Ok(())
}

fn cmd_export(ctx: &Context, args: ExportArgs) -> CmdResult {
    let session = open_session(ctx)?;
    let checklist = session.checklist();

    let mut options = ExportOptions::new(task::now());
    options.include_metadata = !args.no_metadata;
    options.source_file = Some(ctx.file.to_string_lossy().into_owned());
    options.filter = if args.completed {
        ExportFilter::Completed
    } else if args.pending {
        ExportFilter::Pending
    } else {
        ExportFilter::All
    };

    if let (None, None, Some(dest)) = (args.category, args.preview, &args.output) {
        session.storage().export_markdown(checklist, dest, &options)?;
        println!("Exported to {}", dest.display());
        return Ok(());
    }

    let content = match (args.category, args.preview) {
        (Some(id), _) => export::export_category(checklist, id)
            .ok_or(ChecklistError::CategoryNotFound(id))?,
        (None, Some(lines)) => export::export_preview(checklist, &options, lines),
        (None, None) => export::export_markdown(checklist, &options),
    };
    match &args.output {
        Some(dest) => {
            std::fs::write(dest, content)
                .map_err(|e| format!("could not write {}: {}", dest.display(), e))?;
            println!("Exported to {}", dest.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn cmd_stats(ctx: &Context) -> CmdResult {
    let session = open_session(ctx)?;
    let stats = export::statistics(session.checklist());
    if ctx.json {
        return print_json(&stats);
    }
    println!("Categories: {}", stats.categories);
    println!(
        "Tasks:      {} ({} done, {} pending, {:.1}% complete)",
        stats.total_tasks, stats.completed_tasks, stats.pending_tasks, stats.completion_percentage
    );
    println!(
        "Subtasks:   {} ({} done)",
        stats.total_subtasks, stats.completed_subtasks
    );
    Ok(())
}

fn cmd_reminders(ctx: &Context, args: RemindersArgs) -> CmdResult {
    let session = open_session(ctx)?;
    let now = match args.at.as_deref() {
        Some(s) => parse_datetime_arg(s)?,
        None => task::now(),
    };
    let hits = reminders::due_reminders(session.checklist(), now);
    if ctx.json {
        return print_json(&hits);
    }
    if hits.is_empty() {
        println!("No reminders due");
    }
    for hit in &hits {
        println!(
            "[{}] {}. {} (reminder {})",
            hit.category_name,
            hit.task_index + 1,
            hit.text,
            hit.reminder.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Category management
// ---------------------------------------------------------------------------

fn cmd_category(ctx: &Context, args: CategoryCmd) -> CmdResult {
    let mut session = open_session(ctx)?;
    match args.action {
        CategoryAction::Add(a) => {
            let id = session.perform("Add category", |c| checklist_ops::add_category(c, &a.name))?;
            println!("Added category {} ({})", id, a.name.trim());
        }
        CategoryAction::Rename(a) => {
            session.perform("Rename category", |c| {
                checklist_ops::rename_category(c, a.id, &a.name)
            })?;
            println!("Renamed category {}", a.id);
        }
        CategoryAction::Rm(a) => {
            let removed = session.perform("Delete category", |c| {
                checklist_ops::delete_category(c, a.id)
            })?;
            println!(
                "Deleted category {} ({} tasks)",
                removed.name,
                removed.task_count()
            );
        }
        CategoryAction::Mv(a) => {
            if !session.drag_category(a.from, a.to)? {
                return Err(ChecklistError::InvalidPosition(format!(
                    "cannot move category {} to {}",
                    a.from, a.to
                ))
                .into());
            }
            println!("Moved category {} to {}", a.from, a.to);
        }
        CategoryAction::Use(a) => {
            session.select_category(a.id)?;
            println!("Current category: {}", category_name(&session, a.id));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Task write commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &Context, args: AddArgs) -> CmdResult {
    let priority = args.priority.as_deref().map(parse_priority).transpose()?;
    let due = args.due.as_deref().map(parse_date_arg).transpose()?;

    let mut session = open_session(ctx)?;
    let cat = category_id(&session, &args.category)?;
    let index = session.perform("Add task", |c| {
        let index = checklist_ops::add_task(c, cat, &args.text)?;
        for note in &args.notes {
            checklist_ops::add_note(c, cat, index, note)?;
        }
        if let Some(p) = priority {
            checklist_ops::set_priority(c, cat, index, p)?;
        }
        if due.is_some() {
            checklist_ops::set_due_date(c, cat, index, due)?;
        }
        Ok(index)
    })?;
    println!("Added task {} to {}", index + 1, category_name(&session, cat));
    Ok(())
}

fn cmd_done(ctx: &Context, args: TaskRef) -> CmdResult {
    let mut session = open_session(ctx)?;
    let cat = category_id(&session, &args.category)?;
    let index = to_index(args.task)?;
    let done = session.perform("Toggle task", |c| checklist_ops::toggle_task(c, cat, index))?;
    if let Some(t) = session.checklist().category(cat).and_then(|c| c.task(index)) {
        println!("{}", format_task_line(index, t));
    }
    tracing::debug!(done, "toggled task");
    Ok(())
}

fn cmd_edit(ctx: &Context, args: EditArgs) -> CmdResult {
    let mut session = open_session(ctx)?;
    let cat = category_id(&session, &args.category)?;
    let index = to_index(args.task)?;
    session.perform("Edit task", |c| {
        checklist_ops::edit_task_text(c, cat, index, &args.text)
    })?;
    println!("Updated task {}", args.task);
    Ok(())
}

fn cmd_rm(ctx: &Context, args: TaskRef) -> CmdResult {
    let mut session = open_session(ctx)?;
    let cat = category_id(&session, &args.category)?;
    let index = to_index(args.task)?;
    let removed = session.perform("Delete task", |c| checklist_ops::delete_task(c, cat, index))?;
    println!("Deleted: {}", removed.text);
    Ok(())
}

fn cmd_mv(ctx: &Context, args: MvArgs) -> CmdResult {
    let mut session = open_session(ctx)?;
    let cat = category_id(&session, &args.category)?;
    let from = to_index(args.task)?;
    let to = to_index(args.position)?;
    session.perform("Move task", |c| checklist_ops::move_task(c, cat, from, to))?;
    println!("Moved task {} to {}", args.task, args.position);
    Ok(())
}

fn cmd_sub(ctx: &Context, args: TextArgs) -> CmdResult {
    let mut session = open_session(ctx)?;
    let cat = category_id(&session, &args.category)?;
    let index = to_index(args.task)?;
    let sub = session.perform("Add subtask", |c| {
        checklist_ops::add_subtask(c, cat, index, &args.text)
    })?;
    println!("Added subtask {}.{}", args.task, sub + 1);
    Ok(())
}

fn cmd_subdone(ctx: &Context, args: ItemRef) -> CmdResult {
    let mut session = open_session(ctx)?;
    let cat = category_id(&session, &args.category)?;
    let index = to_index(args.task)?;
    let sub = to_index(args.item)?;
    let done = session.perform("Toggle subtask", |c| {
        checklist_ops::toggle_subtask(c, cat, index, sub)
    })?;
    println!(
        "Subtask {}.{} {}",
        args.task,
        args.item,
        if done { "done" } else { "not done" }
    );
    Ok(())
}

fn cmd_subrm(ctx: &Context, args: ItemRef) -> CmdResult {
    let mut session = open_session(ctx)?;
    let cat = category_id(&session, &args.category)?;
    let index = to_index(args.task)?;
    let sub = to_index(args.item)?;
    let removed = session.perform("Delete subtask", |c| {
        checklist_ops::delete_subtask(c, cat, index, sub)
    })?;
    println!("Deleted subtask: {}", removed.text);
    Ok(())
}

fn cmd_note(ctx: &Context, args: TextArgs) -> CmdResult {
    let mut session = open_session(ctx)?;
    let cat = category_id(&session, &args.category)?;
    let index = to_index(args.task)?;
    session.perform("Add note", |c| checklist_ops::add_note(c, cat, index, &args.text))?;
    println!("Added note to task {}", args.task);
    Ok(())
}

fn cmd_noterm(ctx: &Context, args: ItemRef) -> CmdResult {
    let mut session = open_session(ctx)?;
    let cat = category_id(&session, &args.category)?;
    let index = to_index(args.task)?;
    let note = to_index(args.item)?;
    let removed = session.perform("Delete note", |c| {
        checklist_ops::delete_note(c, cat, index, note)
    })?;
    println!("Deleted note: {}", removed);
    Ok(())
}

fn cmd_priority(ctx: &Context, args: PriorityArgs) -> CmdResult {
    let priority = parse_priority(&args.level)?;
    let mut session = open_session(ctx)?;
    let cat = category_id(&session, &args.category)?;
    let index = to_index(args.task)?;
    session.perform("Set priority", |c| {
        checklist_ops::set_priority(c, cat, index, priority)
    })?;
    println!("Task {} priority: {}", args.task, priority);
    Ok(())
}

fn cmd_due(ctx: &Context, args: DueArgs) -> CmdResult {
    let due = match (&args.date, args.clear) {
        (_, true) | (None, _) => None,
        (Some(s), false) => Some(parse_date_arg(s)?),
    };
    let mut session = open_session(ctx)?;
    let cat = category_id(&session, &args.category)?;
    let index = to_index(args.task)?;
    session.perform("Set due date", |c| checklist_ops::set_due_date(c, cat, index, due))?;
    match due {
        Some(d) => println!("Task {} due {}", args.task, d),
        None => println!("Task {} due date cleared", args.task),
    }
    Ok(())
}

fn cmd_remind(ctx: &Context, args: RemindArgs) -> CmdResult {
    let at = match (&args.at, args.clear) {
        (_, true) | (None, _) => None,
        (Some(s), false) => Some(parse_datetime_arg(s)?),
    };
    let mut session = open_session(ctx)?;
    let cat = category_id(&session, &args.category)?;
    let index = to_index(args.task)?;
    session.perform("Set reminder", |c| checklist_ops::set_reminder(c, cat, index, at))?;
    match at {
        Some(t) => println!("Task {} reminder at {}", args.task, t.format("%Y-%m-%d %H:%M")),
        None => println!("Task {} reminder cleared", args.task),
    }
    Ok(())
}

fn cmd_sort(ctx: &Context, args: SortArgs) -> CmdResult {
    let key = if args.key.trim().eq_ignore_ascii_case("smart") {
        None
    } else {
        Some(SortKey::from_str(&args.key)?)
    };
    let mut session = open_session(ctx)?;
    let cat = category_id(&session, &args.category)?;
    session.perform("Sort tasks", |c| {
        let category = c
            .category_mut(cat)
            .ok_or(ChecklistError::CategoryNotFound(cat))?;
        match key {
            Some(key) => sort::sort_tasks(&mut category.tasks, key, args.reverse),
            None => sort::sort_smart(&mut category.tasks),
        }
        Ok(())
    })?;
    println!(
        "Sorted {} by {}",
        category_name(&session, cat),
        key.map_or("smart", SortKey::as_str)
    );
    Ok(())
}

fn cmd_clear(ctx: &Context, args: CategoryArg) -> CmdResult {
    let mut session = open_session(ctx)?;
    let cat = category_id(&session, &args)?;
    let removed = session.perform("Clear completed", |c| checklist_ops::clear_completed(c, cat))?;
    println!("Removed {} completed task(s)", removed);
    Ok(())
}

fn cmd_undo(ctx: &Context) -> CmdResult {
    let mut session = open_session(ctx)?;
    let desc = session.history().undo_description().map(str::to_string);
    if session.undo()? {
        println!("Undid: {}", desc.unwrap_or_default());
    } else {
        println!("Nothing to undo");
    }
    Ok(())
}

fn cmd_redo(ctx: &Context) -> CmdResult {
    let mut session = open_session(ctx)?;
    let desc = session.history().redo_description().map(str::to_string);
    if session.redo()? {
        println!("Redid: {}", desc.unwrap_or_default());
    } else {
        println!("Nothing to redo");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Files and settings
// ---------------------------------------------------------------------------

fn cmd_backup(ctx: &Context, args: BackupArgs) -> CmdResult {
    let storage = Storage::new(&ctx.file);
    let path = storage.backup(args.suffix.as_deref())?;
    println!("Backed up to {}", path.display());
    Ok(())
}

fn cmd_recent(ctx: &Context, args: RecentArgs) -> CmdResult {
    let mut store = SettingsStore::load(&ctx.settings);
    if args.clear {
        store.settings.clear_recent_files();
        store.save()?;
        println!("Recent files cleared");
        return Ok(());
    }
    if args.cleanup {
        let removed = store.cleanup_recent_files();
        store.save()?;
        println!("Removed {} missing file(s)", removed);
        return Ok(());
    }
    if ctx.json {
        return print_json(&store.settings.recent_files);
    }
    for (i, path) in store.settings.recent_files.iter().enumerate() {
        println!("{}. {}", i + 1, path);
    }
    Ok(())
}

fn cmd_settings(ctx: &Context, args: SettingsCmd) -> CmdResult {
    let mut store = SettingsStore::load(&ctx.settings);
    match args.action {
        SettingsAction::Get(a) => match a.key {
            Some(key) => {
                let value = store
                    .get(&key)
                    .ok_or_else(|| format!("unknown setting: {}", key))?;
                match value.as_str() {
                    Some(s) if !ctx.json => println!("{}", s),
                    _ => println!("{}", serde_json::to_string_pretty(&value)?),
                }
            }
            None => print_json(&store.export())?,
        },
        SettingsAction::Set(a) => {
            store.set_from_str(&a.key, &a.value)?;
            store.save()?;
            println!("{} updated", a.key);
        }
        SettingsAction::Reset => {
            store.reset_to_defaults();
            store.save()?;
            println!("Settings reset to defaults");
        }
    }
    Ok(())
}
