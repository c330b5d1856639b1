use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chk", about = concat!("[x] checklist v", env!("CARGO_PKG_VERSION"), " - categories, tasks and nothing else"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Checklist file (default: ~/.simple_checklist.json)
    #[arg(short = 'f', long = "file", env = "CHECKLIST_FILE", global = true)]
    pub file: Option<PathBuf>,

    /// Settings file (default: ~/.simple_checklist_settings.json)
    #[arg(long = "settings", env = "CHECKLIST_SETTINGS", global = true)]
    pub settings: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a checklist file with the default categories
    Init(InitArgs),
    /// List tasks in a category
    List(ListArgs),
    /// List categories with progress
    Categories,
    /// Category management
    Category(CategoryCmd),
    /// Add a task (extra lines become notes)
    Add(AddArgs),
    /// Toggle a task between done and not done
    Done(TaskRef),
    /// Change task text
    Edit(EditArgs),
    /// Delete a task
    Rm(TaskRef),
    /// Move a task within its category
    Mv(MvArgs),
    /// Add a subtask
    Sub(TextArgs),
    /// Toggle a subtask
    Subdone(ItemRef),
    /// Delete a subtask
    Subrm(ItemRef),
    /// Add a note to a task
    Note(TextArgs),
    /// Delete a note
    Noterm(ItemRef),
    /// Set task priority (low, medium, high)
    Priority(PriorityArgs),
    /// Set or clear a due date
    Due(DueArgs),
    /// Set or clear a reminder
    Remind(RemindArgs),
    /// Sort the tasks of a category
    Sort(SortArgs),
    /// Search task text, subtasks and notes
    Search(SearchArgs),
    /// Remove completed tasks from a category
    Clear(CategoryArg),
    /// Undo the last change
    Undo,
    /// Redo the last undone change
    Redo,
    /// Show undo/redo state
    History(HistoryArgs),
    /// Export as Markdown
    Export(ExportArgs),
    /// Show task statistics
    Stats,
    /// Show reminders that are due
    Reminders(RemindersArgs),
    /// Copy the checklist file aside
    Backup(BackupArgs),
    /// Show or manage recently used files
    Recent(RecentArgs),
    /// View or change settings
    Settings(SettingsCmd),
}

// ---------------------------------------------------------------------------
// Shared args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct CategoryArg {
    /// Category id (default: current category)
    #[arg(short = 'c', long = "category")]
    pub category: Option<i64>,
}

#[derive(Args)]
pub struct TaskRef {
    /// Task number as shown by `chk list` (1-based)
    pub task: usize,
    #[command(flatten)]
    pub category: CategoryArg,
}

#[derive(Args)]
pub struct ItemRef {
    /// Task number (1-based)
    pub task: usize,
    /// Subtask or note number (1-based)
    pub item: usize,
    #[command(flatten)]
    pub category: CategoryArg,
}

#[derive(Args)]
pub struct TextArgs {
    /// Task number (1-based)
    pub task: usize,
    pub text: String,
    #[command(flatten)]
    pub category: CategoryArg,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub category: CategoryArg,
    /// List every category
    #[arg(long, conflicts_with = "category")]
    pub all: bool,
    /// Only incomplete tasks
    #[arg(long, conflicts_with = "completed")]
    pub pending: bool,
    /// Only completed tasks
    #[arg(long)]
    pub completed: bool,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Text to look for (case-insensitive)
    pub query: String,
    /// Treat the query as a regular expression
    #[arg(long)]
    pub regex: bool,
    /// Skip completed tasks
    #[arg(long)]
    pub pending: bool,
    #[command(flatten)]
    pub category: CategoryArg,
}

#[derive(Args)]
pub struct HistoryArgs {
    /// Forget all undo and redo steps
    #[arg(long)]
    pub clear: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Write to this file instead of stdout
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
    /// Leave out the header with date and totals
    #[arg(long)]
    pub no_metadata: bool,
    /// Only completed tasks
    #[arg(long, conflicts_with = "pending")]
    pub completed: bool,
    /// Only incomplete tasks
    #[arg(long)]
    pub pending: bool,
    /// Export a single category
    #[arg(short = 'c', long = "category", conflicts_with_all = ["completed", "pending"])]
    pub category: Option<i64>,
    /// Print only the first N lines
    #[arg(long, value_name = "LINES")]
    pub preview: Option<usize>,
}

#[derive(Args)]
pub struct RemindersArgs {
    /// Check as of this time instead of now (YYYY-MM-DDTHH:MM)
    #[arg(long)]
    pub at: Option<String>,
}

#[derive(Args)]
pub struct BackupArgs {
    /// Backup file suffix (default: backup_<timestamp>)
    pub suffix: Option<String>,
}

#[derive(Args)]
pub struct RecentArgs {
    /// Empty the list
    #[arg(long)]
    pub clear: bool,
    /// Drop entries whose file no longer exists
    #[arg(long, conflicts_with = "clear")]
    pub cleanup: bool,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task text; lines after the first become notes
    pub text: String,
    #[command(flatten)]
    pub category: CategoryArg,
    /// Priority (low, medium, high)
    #[arg(short = 'p', long)]
    pub priority: Option<String>,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,
    /// Extra note (repeatable)
    #[arg(long = "note", action = clap::ArgAction::Append)]
    pub notes: Vec<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task number (1-based)
    pub task: usize,
    /// New text
    pub text: String,
    #[command(flatten)]
    pub category: CategoryArg,
}

#[derive(Args)]
pub struct MvArgs {
    /// Task number (1-based)
    pub task: usize,
    /// New position (1-based)
    pub position: usize,
    #[command(flatten)]
    pub category: CategoryArg,
}

#[derive(Args)]
pub struct PriorityArgs {
    /// Task number (1-based)
    pub task: usize,
    /// low, medium or high
    pub level: String,
    #[command(flatten)]
    pub category: CategoryArg,
}

#[derive(Args)]
pub struct DueArgs {
    /// Task number (1-based)
    pub task: usize,
    /// Due date (YYYY-MM-DD); omit with --clear
    #[arg(required_unless_present = "clear")]
    pub date: Option<String>,
    #[arg(long, conflicts_with = "date")]
    pub clear: bool,
    #[command(flatten)]
    pub category: CategoryArg,
}

#[derive(Args)]
pub struct RemindArgs {
    /// Task number (1-based)
    pub task: usize,
    /// Reminder time (YYYY-MM-DDTHH:MM); omit with --clear
    #[arg(required_unless_present = "clear")]
    pub at: Option<String>,
    #[arg(long, conflicts_with = "at")]
    pub clear: bool,
    #[command(flatten)]
    pub category: CategoryArg,
}

#[derive(Args)]
pub struct SortArgs {
    /// created, due_date, priority, completion, a-z or smart
    pub key: String,
    /// Reverse the order
    #[arg(long)]
    pub reverse: bool,
    #[command(flatten)]
    pub category: CategoryArg,
}

// ---------------------------------------------------------------------------
// Category management
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct CategoryCmd {
    #[command(subcommand)]
    pub action: CategoryAction,
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// Create a category
    Add(CategoryNameArg),
    /// Rename a category
    Rename(CategoryRenameArgs),
    /// Delete a category and its tasks
    Rm(CategoryIdArg),
    /// Move (reorder) a category
    Mv(CategoryMvArgs),
    /// Make a category the current one
    Use(CategoryIdArg),
}

#[derive(Args)]
pub struct CategoryNameArg {
    pub name: String,
}

#[derive(Args)]
pub struct CategoryIdArg {
    /// Category id
    pub id: i64,
}

#[derive(Args)]
pub struct CategoryRenameArgs {
    /// Category id
    pub id: i64,
    /// New name
    pub name: String,
}

#[derive(Args)]
pub struct CategoryMvArgs {
    /// Current position (0-indexed)
    pub from: usize,
    /// New position (0-indexed, after removal)
    pub to: usize,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SettingsCmd {
    #[command(subcommand)]
    pub action: SettingsAction,
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print one setting, or all of them
    Get(SettingsGetArgs),
    /// Change a setting (values are parsed as JSON when possible)
    Set(SettingsSetArgs),
    /// Restore the defaults
    Reset,
}

#[derive(Args)]
pub struct SettingsGetArgs {
    pub key: Option<String>,
}

#[derive(Args)]
pub struct SettingsSetArgs {
    pub key: String,
    pub value: String,
}
