use serde::{Deserialize, Serialize};

use super::category::Category;

/// Category names created for a brand-new checklist, in display order.
/// Ids are assigned from 1.
pub const DEFAULT_CATEGORIES: [&str; 5] = ["Slack", "Discord", "Twitter", "Telegram", "General"];

/// The root document: an ordered list of categories and the selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ChecklistRecord")]
pub struct Checklist {
    pub categories: Vec<Category>,
    /// Selected category. Always refers to an existing category when set.
    #[serde(rename = "current_category")]
    pub current_category_id: Option<i64>,
}

impl Checklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// A checklist seeded with [`DEFAULT_CATEGORIES`], the first selected
    pub fn with_default_categories() -> Self {
        let categories: Vec<Category> = DEFAULT_CATEGORIES
            .iter()
            .zip(1..)
            .map(|(name, id)| Category::new(id, *name))
            .collect();
        let current_category_id = categories.first().map(|c| c.id);
        Checklist {
            categories,
            current_category_id,
        }
    }

    pub fn add_category(&mut self, category: Category) {
        self.categories.push(category);
    }

    /// Remove a category by id. Clears the selection if it pointed there.
    pub fn remove_category(&mut self, id: i64) -> Option<Category> {
        let idx = self.categories.iter().position(|c| c.id == id)?;
        if self.current_category_id == Some(id) {
            self.current_category_id = None;
        }
        Some(self.categories.remove(idx))
    }

    pub fn category(&self, id: i64) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn category_mut(&mut self, id: i64) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.id == id)
    }

    pub fn current_category(&self) -> Option<&Category> {
        self.current_category_id.and_then(|id| self.category(id))
    }

    /// Select a category. Returns false (selection unchanged) if the id is unknown.
    pub fn set_current_category(&mut self, id: i64) -> bool {
        if self.category(id).is_some() {
            self.current_category_id = Some(id);
            true
        } else {
            false
        }
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Next unused id: one past the largest existing id, or 1 when empty.
    /// `None` once the largest id is `i64::MAX`.
    pub fn next_category_id(&self) -> Option<i64> {
        match self.categories.iter().map(|c| c.id).max() {
            Some(max) => max.checked_add(1),
            None => Some(1),
        }
    }

    /// Move the category at `from` so that it ends up at index `to` of the
    /// resulting list (the index is interpreted after removal).
    pub fn reorder_categories(&mut self, from: usize, to: usize) -> bool {
        let len = self.categories.len();
        if from >= len || to >= len || from == to {
            return false;
        }
        let category = self.categories.remove(from);
        self.categories.insert(to, category);
        true
    }

    pub fn category_by_index(&self, index: usize) -> Option<&Category> {
        self.categories.get(index)
    }

    pub fn total_task_count(&self) -> usize {
        self.categories.iter().map(|c| c.task_count()).sum()
    }

    pub fn total_completed_count(&self) -> usize {
        self.categories.iter().map(|c| c.completed_count()).sum()
    }

    /// Serialize to the JSON document shape written to disk
    pub fn to_document(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Build a checklist from a JSON document, applying all field defaults
    pub fn from_document(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// On-disk checklist shape before the selection is validated
#[derive(Deserialize)]
struct ChecklistRecord {
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    current_category: Option<i64>,
}

impl From<ChecklistRecord> for Checklist {
    fn from(rec: ChecklistRecord) -> Self {
        let current_category_id = rec
            .current_category
            .filter(|id| rec.categories.iter().any(|c| c.id == *id));
        Checklist {
            categories: rec.categories,
            current_category_id,
        }
    }
}
