//! Drop rows missing a title or a brecha

use super::types::{CleanRow, ResolvedColumns, Sheet};

/// Keep rows whose title and category cells are both present, in sheet order.
///
/// Ids are assigned over this output, so it must be computed once per run.
pub fn clean_rows(sheet: &Sheet, columns: &ResolvedColumns) -> Vec<CleanRow> {
    let cleaned: Vec<CleanRow> = (0..sheet.rows.len())
        .filter_map(|row| {
            let title = sheet.cell(row, columns.title.index).as_text()?;
            let category = sheet.cell(row, columns.category.index).as_text()?;
            let description = columns
                .description
                .as_ref()
                .and_then(|col| sheet.cell(row, col.index).as_text());

            Some(CleanRow {
                title,
                category,
                description,
            })
        })
        .collect();

    log::info!(
        "Cleaning kept {} of {} rows",
        cleaned.len(),
        sheet.rows.len()
    );

    cleaned
}
