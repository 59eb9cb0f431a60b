//! Brecha extraction and id assignment
//!
//! Ids are the 1-based rank of each distinct name in ascending order. They
//! are deterministic for a given input but shift when a new name sorts
//! before existing ones; the tables are a one-shot import, not a stable schema.

use std::collections::{HashMap, HashSet};

use super::types::{Category, CleanRow};

/// Distinct categories with their ids, plus a name lookup
#[derive(Debug, Clone, Default)]
pub struct CategoryTable {
    categories: Vec<Category>,
    ids: HashMap<String, u32>,
}

impl CategoryTable {
    /// Collect distinct category names (exact string equality) and number them alphabetically
    pub fn extract(rows: &[CleanRow]) -> Self {
        let mut seen = HashSet::new();
        let mut names: Vec<&str> = rows
            .iter()
            .map(|r| r.category.as_str())
            .filter(|name| seen.insert(*name))
            .collect();

        names.sort_unstable();

        let categories: Vec<Category> = names
            .into_iter()
            .zip(1u32..)
            .map(|(name, id)| Category {
                id,
                name: name.to_string(),
            })
            .collect();

        let ids = categories
            .iter()
            .map(|c| (c.name.clone(), c.id))
            .collect();

        for category in &categories {
            log::debug!("Brecha {}", category);
        }

        Self { categories, ids }
    }

    /// Categories in id order
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Id for a category name
    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    /// Name for a category id
    pub fn name_of(&self, id: u32) -> Option<&str> {
        let idx = usize::try_from(id).ok()?.checked_sub(1)?;
        self.categories.get(idx).map(|c| c.name.as_str())
    }
}
