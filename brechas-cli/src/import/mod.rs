//! Spreadsheet to relational CSV import
//!
//! One linear run: load the first sheet, resolve the title/brecha/description
//! columns, drop rows without title or brecha, number the distinct brechas
//! alphabetically, map each remaining row to a project, write both tables
//! and print a summary. Any failure before the write aborts with no output.

pub mod categories;
pub mod clean;
pub mod columns;
pub mod loader;
pub mod output;
pub mod projects;
pub mod report;
pub mod types;

use std::path::PathBuf;

use anyhow::Result;
use colored::*;

use crate::config::ImportConfig;

pub use categories::CategoryTable;
pub use columns::{ColumnAnswers, ColumnField, LinePrompter, Prompter, TerminalPrompter};
pub use output::OutputPaths;
pub use types::Project;

/// Fatal conditions of an import run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// Input spreadsheet does not exist
    MissingInputFile { path: PathBuf },
    /// Input exists but the reader cannot parse it
    UnreadableInput { path: PathBuf, reason: String },
    /// Workbook contains no sheets
    EmptyWorkbook { path: PathBuf },
    /// Title or brecha selector matches no column
    UnresolvedRequiredColumn { field: ColumnField, selector: String },
    /// Config file missing or malformed
    InvalidConfig { path: PathBuf, reason: String },
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::MissingInputFile { path } => {
                write!(
                    f,
                    "input file not found: {} (make sure the file exists at this path)",
                    path.display()
                )
            }
            ImportError::UnreadableInput { path, reason } => {
                write!(f, "failed to read spreadsheet {}: {}", path.display(), reason)
            }
            ImportError::EmptyWorkbook { path } => {
                write!(f, "spreadsheet has no sheets: {}", path.display())
            }
            ImportError::UnresolvedRequiredColumn { field, selector } => {
                write!(
                    f,
                    "column '{}' does not exist in the spreadsheet ({} column)",
                    selector,
                    field.label()
                )
            }
            ImportError::InvalidConfig { path, reason } => {
                write!(f, "invalid config file {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for ImportError {}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub rows_read: usize,
    pub categories: CategoryTable,
    pub projects: Vec<Project>,
    pub paths: OutputPaths,
}

/// Run the whole import with the given config and answer source
pub fn run_import(config: &ImportConfig, prompter: &mut dyn Prompter) -> Result<ImportOutcome> {
    println!("Reading file: {}", config.input.display().to_string().cyan());
    let sheet = loader::load_sheet(&config.input)?;

    println!("File loaded: {} rows found", sheet.rows.len());
    println!();
    println!("Columns found in the spreadsheet:");
    for (i, column) in sheet.columns.iter().enumerate() {
        println!("   {}. {}", i + 1, column);
    }

    let columns = columns::select_columns(&sheet, &config.columns, prompter)?;

    println!();
    println!("{}", "=".repeat(80));
    println!("{}", "PROCESSING DATA...".bold());
    println!("{}", "=".repeat(80));

    let rows = clean::clean_rows(&sheet, &columns);
    println!("Rows after removing missing values: {}", rows.len());

    let categories = CategoryTable::extract(&rows);
    let projects = projects::map_projects(&rows, &categories)?;

    let categories_csv = output::render_categories(categories.categories())?;
    let projects_csv = output::render_projects(&projects)?;
    let paths = output::write_tables(&config.output_dir, &categories_csv, &projects_csv)?;

    println!();
    println!("Generated: {}", paths.categories.display());
    println!("   Unique brechas: {}", categories.len());
    println!("Generated: {}", paths.projects.display());
    println!("   Projects: {}", projects.len());

    report::print_summary(sheet.rows.len(), &categories, &projects, &paths);

    Ok(ImportOutcome {
        rows_read: sheet.rows.len(),
        categories,
        projects,
        paths,
    })
}
