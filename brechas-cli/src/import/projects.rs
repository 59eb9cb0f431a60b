//! Map cleaned rows to project records referencing brechas by id

use anyhow::{Result, anyhow};

use super::categories::CategoryTable;
use super::types::{CleanRow, Project};

/// Number rows in order and replace category names with their ids.
///
/// The description falls back to the title when missing.
pub fn map_projects(rows: &[CleanRow], categories: &CategoryTable) -> Result<Vec<Project>> {
    rows.iter()
        .zip(1u32..)
        .map(|(row, project_id)| -> Result<Project> {
            let category_id = categories.id_of(&row.category).ok_or_else(|| {
                anyhow!(
                    "Row {}: brecha '{}' missing from category table",
                    project_id,
                    row.category
                )
            })?;

            Ok(Project {
                project_id,
                title: row.title.clone(),
                description: row.description.clone().unwrap_or_else(|| row.title.clone()),
                brecha_ids: vec![category_id],
            })
        })
        .collect()
}
