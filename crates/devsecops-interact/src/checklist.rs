//! Persistent security checklist

use crate::error::{InteractError, InteractResult};
use crate::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One checklist entry, owned by a stage or section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub owner: String,
    pub label: String,
    #[serde(default)]
    pub checked: bool,
}

impl ChecklistItem {
    pub fn new(owner: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            label: label.into(),
            checked: false,
        }
    }

    /// Persistence key, `{owner}::{label}`
    pub fn key(&self) -> String {
        item_key(&self.owner, &self.label)
    }
}

pub fn item_key(owner: &str, label: &str) -> String {
    format!("{}::{}", owner, label)
}

/// Checklist whose checked state lives in a [`KeyValueStore`].
///
/// Store failures never surface: reads fall back to unchecked and writes
/// are logged while the in-memory state still changes.
#[derive(Debug)]
pub struct Checklist<S> {
    items: Vec<ChecklistItem>,
    store: S,
}

impl<S: KeyValueStore> Checklist<S> {
    pub fn new(store: S) -> Self {
        Self {
            items: Vec::new(),
            store,
        }
    }

    /// Build a checklist and restore every item's saved state
    pub fn with_items<O, L>(store: S, items: impl IntoIterator<Item = (O, L)>) -> Self
    where
        O: Into<String>,
        L: Into<String>,
    {
        let mut checklist = Self::new(store);
        for (owner, label) in items {
            checklist.register(owner, label);
        }
        checklist
    }

    /// Add an item, restoring its saved state; returns whether it is checked.
    ///
    /// Registering an existing item only re-reads its state.
    pub fn register(&mut self, owner: impl Into<String>, label: impl Into<String>) -> bool {
        let mut item = ChecklistItem::new(owner, label);
        item.checked = match self.store.get(&item.key()) {
            Ok(saved) => saved.unwrap_or(false),
            Err(e) => {
                warn!("Could not restore checklist item {}: {}", item.key(), e);
                false
            }
        };

        let checked = item.checked;
        match self.position(&item.owner, &item.label) {
            Some(index) => self.items[index] = item,
            None => self.items.push(item),
        }
        checked
    }

    fn position(&self, owner: &str, label: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.owner == owner && item.label == label)
    }

    /// Flip an item; returns the new state
    pub fn toggle(&mut self, owner: &str, label: &str) -> InteractResult<bool> {
        let index = self
            .position(owner, label)
            .ok_or_else(|| InteractError::UnknownItem(item_key(owner, label)))?;
        let checked = !self.items[index].checked;
        self.write(index, checked);
        Ok(checked)
    }

    pub fn set_checked(&mut self, owner: &str, label: &str, checked: bool) -> InteractResult<()> {
        let index = self
            .position(owner, label)
            .ok_or_else(|| InteractError::UnknownItem(item_key(owner, label)))?;
        self.write(index, checked);
        Ok(())
    }

    fn write(&mut self, index: usize, checked: bool) {
        let item = &mut self.items[index];
        item.checked = checked;
        if let Err(e) = self.store.set(&item.key(), checked) {
            warn!("Could not save checklist item {}: {}", item.key(), e);
        }
        info!("Checklist item {} set to {}", item.key(), checked);
    }

    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    pub fn items_for<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'a ChecklistItem> {
        self.items.iter().filter(move |item| item.owner == owner)
    }

    pub fn checked_count(&self) -> usize {
        self.items.iter().filter(|item| item.checked).count()
    }

    /// Percentage of checked items; `None` for an empty checklist
    pub fn progress(&self) -> Option<f64> {
        percentage(self.items.iter())
    }

    /// Percentage of checked items of one owner
    pub fn progress_for(&self, owner: &str) -> Option<f64> {
        percentage(self.items_for(owner))
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

fn percentage<'a>(items: impl Iterator<Item = &'a ChecklistItem>) -> Option<f64> {
    let (checked, total) = items.fold((0usize, 0usize), |(checked, total), item| {
        (checked + usize::from(item.checked), total + 1)
    });
    (total > 0).then(|| checked as f64 / total as f64 * 100.0)
}
