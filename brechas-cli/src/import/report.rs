//! Console summary of an import run

use std::collections::BTreeMap;

use colored::*;

use super::categories::CategoryTable;
use super::output::OutputPaths;
use super::types::Project;

const NAME_PREVIEW_CHARS: usize = 60;

/// Number of projects per category id, ascending by id
pub fn category_distribution(projects: &[Project]) -> Vec<(u32, usize)> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for id in projects.iter().flat_map(|p| p.brecha_ids.iter()) {
        *counts.entry(*id).or_default() += 1;
    }
    counts.into_iter().collect()
}

/// First `max` characters of `name`
pub fn preview(name: &str, max: usize) -> &str {
    match name.char_indices().nth(max) {
        Some((end, _)) => &name[..end],
        None => name,
    }
}

fn rule() {
    println!("{}", "=".repeat(80));
}

/// Print counts, output paths, the per-brecha distribution and the next step
pub fn print_summary(
    rows_read: usize,
    categories: &CategoryTable,
    projects: &[Project],
    paths: &OutputPaths,
) {
    let dropped = rows_read.saturating_sub(projects.len());

    println!();
    rule();
    println!("{}", "PROCESSING SUMMARY".bold());
    rule();
    println!("Rows read: {}", rows_read);
    if dropped > 0 {
        println!(
            "Rows dropped (missing title or brecha): {}",
            dropped.to_string().yellow()
        );
    }
    println!("Unique brechas: {}", categories.len().to_string().green());
    println!("Projects processed: {}", projects.len().to_string().green());
    println!();
    println!("Generated files:");
    println!("   - {}", paths.categories.display().to_string().cyan());
    println!("   - {}", paths.projects.display().to_string().cyan());

    println!();
    println!("{}", "Projects per brecha:".bold());
    if categories.is_empty() {
        println!("   (no rows had both a title and a brecha)");
    }
    for (id, count) in category_distribution(projects) {
        if let Some(name) = categories.name_of(id) {
            println!(
                "   Brecha {}: {} proyectos - {}...",
                id,
                count,
                preview(name, NAME_PREVIEW_CHARS)
            );
        }
    }

    println!();
    rule();
    println!("{}", "PROCESSING COMPLETED SUCCESSFULLY".green().bold());
    rule();
    println!();
    println!("Next step: copy the generated files into 'data/':");
    println!("   - {} -> data/brechas.csv", paths.categories.display());
    println!("   - {} -> data/proyectos.csv", paths.projects.display());
    rule();
}
