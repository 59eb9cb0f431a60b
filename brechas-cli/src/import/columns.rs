//! Column selection: map operator answers to sheet columns
//!
//! Each logical field accepts either an exact column header or a 1-based
//! position into the column list. Answers can come from configuration or
//! from a [`Prompter`]; only fields without a preset answer are asked.

use std::io::BufRead;

use anyhow::{Context, Result};
use colored::*;
use dialoguer::Input;

use super::ImportError;
use super::types::{Column, ResolvedColumns, Sheet};

/// The three logical fields the operator maps to columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnField {
    Title,
    Category,
    Description,
}

impl ColumnField {
    /// Get display label
    pub fn label(&self) -> &'static str {
        match self {
            ColumnField::Title => "project title",
            ColumnField::Category => "brecha name",
            ColumnField::Description => "project description",
        }
    }

    /// Question shown before reading the answer
    pub fn question(&self) -> &'static str {
        match self {
            ColumnField::Title => "Which column holds the PROJECT TITLE?",
            ColumnField::Category => "Which column holds the BRECHA NAME?",
            ColumnField::Description => {
                "Is there a column with the project DESCRIPTION? (optional, Enter to skip)"
            }
        }
    }

    /// Short input hint
    pub fn hint(&self) -> &'static str {
        match self {
            ColumnField::Description => "Exact name, number, or Enter to skip",
            _ => "Exact name (or number)",
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, ColumnField::Description)
    }
}

/// Source of operator answers for column selection
pub trait Prompter {
    /// Ask for the column of `field`, returning the raw answer
    fn ask(&mut self, field: ColumnField) -> Result<String>;
}

/// Interactive prompts on a terminal
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, field: ColumnField) -> Result<String> {
        println!();
        println!("{}", field.question().bold());
        Input::<String>::new()
            .with_prompt(field.hint())
            .allow_empty(true)
            .interact_text()
            .with_context(|| format!("Failed to read {} column", field.label()))
    }
}

/// Reads one answer per line, for piped stdin and tests. EOF reads as an empty answer.
pub struct LinePrompter<R> {
    reader: R,
}

impl<R: BufRead> LinePrompter<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> Prompter for LinePrompter<R> {
    fn ask(&mut self, field: ColumnField) -> Result<String> {
        println!();
        println!("{}", field.question());
        println!("{}:", field.hint());

        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .with_context(|| format!("Failed to read {} column", field.label()))?;
        Ok(line)
    }
}

/// Preset answers, e.g. from CLI flags or the config file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnAnswers {
    pub title: Option<String>,
    pub category: Option<String>,
    /// `Some("")` skips the description without asking
    pub description: Option<String>,
}

impl ColumnAnswers {
    fn preset(&self, field: ColumnField) -> Option<&str> {
        match field {
            ColumnField::Title => self.title.as_deref(),
            ColumnField::Category => self.category.as_deref(),
            ColumnField::Description => self.description.as_deref(),
        }
    }
}

/// Resolve a selector to a column index.
///
/// All-digit selectors are 1-based positions, even when a header with that
/// exact text exists; anything else must match a header exactly.
pub fn resolve_selector(columns: &[String], selector: &str) -> Option<usize> {
    let selector = selector.trim();

    if !selector.is_empty() && selector.bytes().all(|b| b.is_ascii_digit()) {
        return selector
            .parse::<usize>()
            .ok()
            .filter(|pos| (1..=columns.len()).contains(pos))
            .map(|pos| pos - 1);
    }

    columns.iter().position(|c| c == selector)
}

/// Resolve title, category and description columns for `sheet`
pub fn select_columns(
    sheet: &Sheet,
    answers: &ColumnAnswers,
    prompter: &mut dyn Prompter,
) -> Result<ResolvedColumns> {
    println!();
    println!("{}", "=".repeat(80));
    println!("{}", "COLUMN SETUP".bold());
    println!("{}", "=".repeat(80));

    let title = resolve_required(sheet, answers, prompter, ColumnField::Title)?;
    let category = resolve_required(sheet, answers, prompter, ColumnField::Category)?;

    let description_answer = answer_for(answers, prompter, ColumnField::Description)?;
    let description = if description_answer.is_empty() {
        None
    } else {
        match resolve_selector(&sheet.columns, &description_answer) {
            Some(index) => Some(column_at(sheet, index)),
            None => {
                println!(
                    "{} Column '{}' does not exist. The title will be used as description.",
                    "Warning:".yellow().bold(),
                    description_answer
                );
                log::warn!(
                    "Description column '{}' not found, falling back to title",
                    description_answer
                );
                None
            }
        }
    };

    log::info!(
        "Columns: title='{}', category='{}', description={:?}",
        title.name,
        category.name,
        description.as_ref().map(|c| c.name.as_str())
    );

    Ok(ResolvedColumns {
        title,
        category,
        description,
    })
}

fn answer_for(
    answers: &ColumnAnswers,
    prompter: &mut dyn Prompter,
    field: ColumnField,
) -> Result<String> {
    let answer = match answers.preset(field) {
        Some(preset) => {
            log::debug!("Using preset {} column '{}'", field.label(), preset);
            preset.to_string()
        }
        None => prompter.ask(field)?,
    };
    Ok(answer.trim().to_string())
}

fn resolve_required(
    sheet: &Sheet,
    answers: &ColumnAnswers,
    prompter: &mut dyn Prompter,
    field: ColumnField,
) -> Result<Column> {
    debug_assert!(field.is_required());
    let answer = answer_for(answers, prompter, field)?;

    let index = resolve_selector(&sheet.columns, &answer).ok_or_else(|| {
        ImportError::UnresolvedRequiredColumn {
            field,
            selector: answer.clone(),
        }
    })?;

    Ok(column_at(sheet, index))
}

fn column_at(sheet: &Sheet, index: usize) -> Column {
    Column {
        name: sheet.columns[index].clone(),
        index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sheet(columns: &[&str]) -> Sheet {
        Sheet {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn scripted(input: &str) -> LinePrompter<Cursor<Vec<u8>>> {
        LinePrompter::new(Cursor::new(input.as_bytes().to_vec()))
    }

    #[test]
    fn test_resolve_by_name_and_position() {
        let cols = sheet(&["title", "category", "notes"]).columns;

        assert_eq!(resolve_selector(&cols, "title"), Some(0));
        assert_eq!(resolve_selector(&cols, "1"), Some(0));
        assert_eq!(resolve_selector(&cols, " 3 "), Some(2));
        assert_eq!(resolve_selector(&cols, "Title"), None);
        assert_eq!(resolve_selector(&cols, "0"), None);
        assert_eq!(resolve_selector(&cols, "4"), None);
        assert_eq!(resolve_selector(&cols, ""), None);
    }

    #[test]
    fn test_digit_selector_is_always_positional() {
        let cols = sheet(&["2", "year"]).columns;

        assert_eq!(resolve_selector(&cols, "2"), Some(1));
    }

    #[test]
    fn test_select_from_prompts() {
        let sheet = sheet(&["title", "category", "notes"]);
        let mut prompter = scripted("1\ncategory\nnotes\n");

        let cols = select_columns(&sheet, &ColumnAnswers::default(), &mut prompter).unwrap();

        assert_eq!(cols.title.name, "title");
        assert_eq!(cols.category.index, 1);
        assert_eq!(cols.description.map(|c| c.name), Some("notes".to_string()));
    }

    #[test]
    fn test_presets_skip_prompts() {
        let sheet = sheet(&["title", "category"]);
        let answers = ColumnAnswers {
            title: Some("title".to_string()),
            category: Some("2".to_string()),
            description: Some(String::new()),
        };
        // Nothing to read: any prompt would get an empty answer and fail
        let mut prompter = scripted("");

        let cols = select_columns(&sheet, &answers, &mut prompter).unwrap();

        assert_eq!(cols.category.name, "category");
        assert!(cols.description.is_none());
    }

    #[test]
    fn test_unknown_required_column_fails() {
        let sheet = sheet(&["title", "category"]);
        let mut prompter = scripted("title\nbrecha\n\n");

        let err = select_columns(&sheet, &ColumnAnswers::default(), &mut prompter).unwrap_err();

        match err.downcast_ref::<ImportError>() {
            Some(ImportError::UnresolvedRequiredColumn { field, selector }) => {
                assert_eq!(*field, ColumnField::Category);
                assert_eq!(selector, "brecha");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_position_fails_for_title() {
        let sheet = sheet(&["title", "category"]);
        let mut prompter = scripted("9\n");

        let err = select_columns(&sheet, &ColumnAnswers::default(), &mut prompter).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ImportError>(),
            Some(ImportError::UnresolvedRequiredColumn { field: ColumnField::Title, .. })
        ));
    }

    #[test]
    fn test_unknown_description_degrades() {
        let sheet = sheet(&["title", "category"]);
        let mut prompter = scripted("title\ncategory\nsummary\n");

        let cols = select_columns(&sheet, &ColumnAnswers::default(), &mut prompter).unwrap();

        assert!(cols.description.is_none());
    }

    #[test]
    fn test_eof_skips_description() {
        let sheet = sheet(&["title", "category"]);
        let mut prompter = scripted("title\ncategory");

        let cols = select_columns(&sheet, &ColumnAnswers::default(), &mut prompter).unwrap();

        assert!(cols.description.is_none());
    }
}
