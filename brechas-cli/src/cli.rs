//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;

/// Convert a project/brecha spreadsheet into brechas.csv and proyectos.csv
#[derive(Debug, Clone, Parser)]
#[command(name = "brechas-cli", version, about)]
pub struct Cli {
    /// Spreadsheet to read (first sheet, first row as headers)
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Directory for the generated CSV files (created if missing)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Project title column: exact header or 1-based position
    #[arg(long, value_name = "SELECTOR")]
    pub title: Option<String>,

    /// Brecha column: exact header or 1-based position
    #[arg(long, value_name = "SELECTOR")]
    pub category: Option<String>,

    /// Description column: exact header or 1-based position (empty for none)
    #[arg(long, value_name = "SELECTOR", conflicts_with = "no_description")]
    pub description: Option<String>,

    /// Use the title as description without asking
    #[arg(long)]
    pub no_description: bool,

    /// Config file (defaults to ./brechas.toml, then the user config directory)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
