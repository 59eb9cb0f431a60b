//! Read the first worksheet of a spreadsheet into a [`Sheet`]

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::Result;
use calamine::{Data, Reader, open_workbook_auto};

use super::ImportError;
use super::types::{Cell, Sheet};

/// Date cells render like the spreadsheet reader's timestamps
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Load the first sheet of the workbook at `path`, first row as headers
pub fn load_sheet(path: &Path) -> Result<Sheet> {
    if !path.exists() {
        return Err(ImportError::MissingInputFile {
            path: path.to_path_buf(),
        }
        .into());
    }

    let mut workbook = open_workbook_auto(path).map_err(|e| ImportError::UnreadableInput {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ImportError::EmptyWorkbook {
            path: path.to_path_buf(),
        })?;

    log::debug!("Reading sheet '{}' from {}", sheet_name, path.display());

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportError::UnreadableInput {
            path: path.to_path_buf(),
            reason: format!("sheet '{}': {}", sheet_name, e),
        })?;

    Ok(sheet_from_rows(range.rows()))
}

/// Split raw rows into header and data.
///
/// Every data row is kept, blank ones included, so the row count matches the
/// sheet; the cleaner is what drops rows without a title or brecha.
pub fn sheet_from_rows<'a>(mut rows: impl Iterator<Item = &'a [Data]>) -> Sheet {
    let Some(header) = rows.next() else {
        return Sheet::default();
    };

    let columns = dedupe_headers(
        header
            .iter()
            .enumerate()
            .map(|(idx, cell)| header_text(cell).unwrap_or_else(|| format!("Unnamed: {}", idx)))
            .collect(),
    );

    let data: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(to_cell).collect())
        .collect();

    let blank = data
        .iter()
        .filter(|row| row.iter().all(Cell::is_null))
        .count();
    if blank > 0 {
        log::debug!("{} of {} rows are entirely blank", blank, data.len());
    }

    Sheet {
        columns,
        rows: data,
    }
}

/// Convert a raw cell, applying the NA marker rules to text
fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Null,
        Data::String(s) => Cell::text(s.as_str()),
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        other => Cell::text(display_text(other)),
    }
}

/// Text for dates and other non-scalar cells
fn display_text(data: &Data) -> String {
    match data {
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format(DATETIME_FORMAT).to_string())
            .unwrap_or_else(|| data.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Header text for a cell; `None` for blank header cells
fn header_text(data: &Data) -> Option<String> {
    match data {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Cell::Int(*i).as_text(),
        Data::Float(f) => Cell::Float(*f).as_text(),
        Data::Bool(b) => Cell::Bool(*b).as_text(),
        other => Some(display_text(other)),
    }
}

/// Make header names unique: repeats become `name.1`, `name.2`, ...
fn dedupe_headers(names: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(names.len());

    for name in names {
        let mut candidate = name.clone();
        let mut n = counts.get(&name).copied().unwrap_or(0);
        while taken.contains(&candidate) {
            n += 1;
            candidate = format!("{}.{}", name, n);
        }
        counts.insert(name, n);
        taken.insert(candidate.clone());
        unique.push(candidate);
    }

    unique
}
