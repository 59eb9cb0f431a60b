//! brechas-cli: turn a spreadsheet of projects tagged with a brecha into
//! `brechas.csv` (id, brecha) and `proyectos.csv` (project_id, title,
//! description, brecha_ids) ready for loading.

mod cli;
mod config;
mod import;

use anyhow::Result;
use clap::Parser;
use colored::*;
use is_terminal::IsTerminal;

use cli::Cli;
use config::ImportConfig;
use import::{LinePrompter, Prompter, TerminalPrompter};

fn main() {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(err) = run(&cli) {
        log::error!("Import failed: {:#}", err);
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = ImportConfig::resolve(cli)?;
    log::debug!("Resolved config: {:?}", config);

    let stdin = std::io::stdin();
    let mut prompter: Box<dyn Prompter> = if stdin.is_terminal() {
        Box::new(TerminalPrompter)
    } else {
        log::debug!("stdin is not a terminal, reading column answers line by line");
        Box::new(LinePrompter::new(stdin.lock()))
    };

    let outcome = import::run_import(&config, prompter.as_mut())?;
    log::info!(
        "Imported {} of {} rows into {} brechas ({}, {})",
        outcome.projects.len(),
        outcome.rows_read,
        outcome.categories.len(),
        outcome.paths.categories.display(),
        outcome.paths.projects.display()
    );
    Ok(())
}
