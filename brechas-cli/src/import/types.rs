//! Value and record types shared by the import pipeline

use std::fmt;

/// Strings the spreadsheet reader treats as missing values
pub const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A single cell value as read from the spreadsheet
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Empty, error or NA-marker cell
    Null,
    /// Text value, kept verbatim (no trimming)
    String(String),
    /// Whole number
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Boolean
    Bool(bool),
}

impl Cell {
    /// Build a text cell, mapping NA markers to [`Cell::Null`]
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if NA_MARKERS.contains(&s.as_str()) {
            Cell::Null
        } else {
            Cell::String(s)
        }
    }

    /// Check if this cell is missing
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Render the cell as text, `None` when null
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::String(s) => Some(s.clone()),
            Cell::Int(i) => Some(i.to_string()),
            Cell::Float(f) => Some(format_float(*f)),
            Cell::Bool(true) => Some("True".to_string()),
            Cell::Bool(false) => Some("False".to_string()),
        }
    }
}

/// Whole floats print without a fractional part (Excel stores most numbers as floats)
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        (f as i64).to_string()
    } else {
        f.to_string()
    }
}

static NULL_CELL: Cell = Cell::Null;

/// First worksheet of the input, header row split from the data rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    /// Unique column names in sheet order
    pub columns: Vec<String>,
    /// Data rows in sheet order, each aligned with `columns`
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Cell at (row, column); short rows read as null
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&NULL_CELL)
    }
}

/// A column picked by the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub index: usize,
}

/// Columns resolved for the three logical fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub title: Column,
    pub category: Column,
    /// `None` when no description column was selected or it did not resolve
    pub description: Option<Column>,
}

/// A row that survived null filtering, reduced to the fields the tables need
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanRow {
    pub title: String,
    pub category: String,
    /// Description cell text, `None` when the cell is null or no column is selected
    pub description: Option<String>,
}

/// A distinct brecha with its alphabetical-rank id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: u32,
    pub name: String,
}

/// One output project row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub project_id: u32,
    pub title: String,
    pub description: String,
    /// Referenced category ids; the current mapping always produces exactly one
    pub brecha_ids: Vec<u32>,
}

impl Project {
    /// The `brecha_ids` column value ("1" or "1,3")
    pub fn brecha_ids_field(&self) -> String {
        self.brecha_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
