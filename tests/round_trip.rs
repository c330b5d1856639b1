use checklist::io::storage::Storage;
use checklist::model::checklist::Checklist;
use checklist::model::task::{Priority, parse_date, parse_datetime};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Helper: load a fixture through `Storage`
fn load_fixture(name: &str) -> Checklist {
    Storage::new(fixture_path(name))
        .load()
        .unwrap_or_else(|e| panic!("Could not load fixture {}: {}", name, e))
}

// ============================================================================
// Lenient loading
// ============================================================================

#[test]
fn legacy_document_gets_defaults() {
    let checklist = load_fixture("legacy_checklist.json");

    assert_eq!(checklist.categories.len(), 2);
    let first = checklist.categories[0].task(0).unwrap();
    assert_eq!(first.text, "Reply to design thread");
    assert_eq!(first.priority, Priority::Medium);
    assert!(first.notes.is_empty());
    assert!(first.subtasks.is_empty());
    assert!(first.due_date.is_none());
    assert!(first.reminder.is_none());
    assert_eq!(first.created, parse_datetime("2024-11-02T09:15:00").unwrap());

    let archived = checklist.categories[0].task(1).unwrap();
    assert!(archived.completed);
    assert_eq!(archived.notes, vec!["ask admins first"]);

    let renew = checklist.category(4).unwrap().task(0).unwrap();
    assert!(!renew.completed);
    assert_eq!(renew.priority, Priority::High);
    assert_eq!(renew.due_date, parse_date("2024-12-01"));
    assert_eq!(renew.subtask_count(), 2);
    assert_eq!(renew.completed_subtask_count(), 1);
}

#[test]
fn wrongly_typed_optional_fields_fall_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("typed.json");
    fs::write(
        &path,
        r#"{
  "categories": [
    {
      "id": 1,
      "name": "Home",
      "tasks": [
        {"text": "Water plants", "priority": 3, "due_date": 20250101, "reminder": 7, "created": 0},
        {"text": "Call mom", "priority": "low", "due_date": "2025-01-01"}
      ]
    }
  ],
  "current_category": 1
}"#,
    )
    .unwrap();

    let checklist = Storage::new(&path).load().unwrap();
    let tasks = &checklist.categories[0].tasks;
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].text, "Water plants");
    assert_eq!(tasks[0].priority, Priority::Medium);
    assert!(tasks[0].due_date.is_none());
    assert!(tasks[0].reminder.is_none());
    assert_eq!(tasks[1].priority, Priority::Low);
    assert_eq!(tasks[1].due_date, parse_date("2025-01-01"));
}

#[test]
fn dangling_selection_is_dropped() {
    let checklist = load_fixture("legacy_checklist.json");
    assert_eq!(checklist.current_category_id, None);
}

#[test]
fn malformed_document_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "[1, 2").unwrap();
    let err = Storage::new(&path).load().unwrap_err();
    assert!(err.to_string().starts_with("could not parse"));
}

// ============================================================================
// Save / load round trips
// ============================================================================

#[test]
fn save_then_load_is_identity() {
    let original = load_fixture("legacy_checklist.json");
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path().join("nested/list.json"));

    storage.save(&original).unwrap();
    let reloaded = storage.load().unwrap();
    assert_eq!(reloaded, original);

    // A second save produces the same bytes
    let first = fs::read_to_string(storage.path()).unwrap();
    storage.save(&reloaded).unwrap();
    let second = fs::read_to_string(storage.path()).unwrap();
    assert_eq!(second, first);
    assert!(first.ends_with('\n'));
}

#[test]
fn default_checklist_round_trips() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path().join("list.json"));
    assert!(!storage.file_exists());

    let checklist = storage.load_or_default().unwrap();
    storage.save(&checklist).unwrap();
    assert_eq!(storage.load().unwrap(), Checklist::with_default_categories());
}

#[test]
fn document_omits_default_fields() {
    let checklist = load_fixture("legacy_checklist.json");
    let doc = checklist.to_document();

    let plain = &doc["categories"][0]["tasks"][0];
    assert!(plain.get("priority").is_none());
    assert!(plain.get("notes").is_none());
    assert!(plain.get("subtasks").is_none());
    assert!(plain.get("due_date").is_none());
    assert!(plain.get("reminder").is_none());
    assert_eq!(plain["completed"], false);

    let renew = &doc["categories"][1]["tasks"][0];
    assert_eq!(renew["priority"], "high");
    assert_eq!(renew["due_date"], "2024-12-01");
    assert_eq!(renew["subtasks"][1]["completed"], false);

    assert!(doc["current_category"].is_null());
    assert_eq!(Checklist::from_document(doc).unwrap(), checklist);
}
