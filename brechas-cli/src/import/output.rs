//! CSV output for the brecha and project tables
//!
//! Both files are UTF-8 with a byte-order mark and `\n` line endings. The
//! tables are serialized in memory and swapped into place together, so a
//! failed run leaves neither file half-written.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use csv::{Terminator, Writer, WriterBuilder};

use super::types::{Category, Project};

pub const CATEGORIES_FILE: &str = "brechas.csv";
pub const PROJECTS_FILE: &str = "proyectos.csv";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Where the two tables were written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub categories: PathBuf,
    pub projects: PathBuf,
}

impl OutputPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            categories: dir.join(CATEGORIES_FILE),
            projects: dir.join(PROJECTS_FILE),
        }
    }
}

fn bom_writer() -> Writer<Vec<u8>> {
    WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(UTF8_BOM.to_vec())
}

fn finish(wtr: Writer<Vec<u8>>) -> Result<Vec<u8>> {
    wtr.into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV buffer: {}", e.error()))
}

/// Serialize the category table: `id,brecha`
pub fn render_categories(categories: &[Category]) -> Result<Vec<u8>> {
    let mut wtr = bom_writer();

    wtr.write_record(["id", "brecha"])
        .context("Failed to write CSV header")?;

    for category in categories {
        wtr.write_record([category.id.to_string().as_str(), category.name.as_str()])
            .with_context(|| format!("Failed to write brecha: {}", category.name))?;
    }

    finish(wtr)
}

/// Serialize the project table: `project_id,title,description,brecha_ids`
pub fn render_projects(projects: &[Project]) -> Result<Vec<u8>> {
    let mut wtr = bom_writer();

    wtr.write_record(["project_id", "title", "description", "brecha_ids"])
        .context("Failed to write CSV header")?;

    for project in projects {
        wtr.write_record([
            project.project_id.to_string().as_str(),
            project.title.as_str(),
            project.description.as_str(),
            project.brecha_ids_field().as_str(),
        ])
        .with_context(|| format!("Failed to write project {}", project.project_id))?;
    }

    finish(wtr)
}

/// Write both tables into `dir`, creating it if needed.
///
/// Each file goes to a temporary sibling first. Existing outputs are moved to
/// backups before the temporaries are renamed into place, and any failure
/// restores the backups, so the directory ends up with both new files or both
/// old ones.
pub fn write_tables(dir: &Path, categories: &[u8], projects: &[u8]) -> Result<OutputPaths> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let paths = OutputPaths::in_dir(dir);
    for target in [&paths.categories, &paths.projects] {
        if let Ok(meta) = fs::metadata(target) {
            if !meta.is_file() {
                bail!("Output path is not a regular file: {}", target.display());
            }
        }
    }

    let staged = [
        Staged::new(&paths.categories, categories),
        Staged::new(&paths.projects, projects),
    ];
    commit(&staged, |from, to| fs::rename(from, to))?;

    for table in &staged {
        log::info!("CSV file exported to: {}", table.target.display());
    }

    Ok(paths)
}

/// One table on its way into place
struct Staged<'a> {
    target: &'a Path,
    tmp: PathBuf,
    backup: PathBuf,
    bytes: &'a [u8],
}

impl<'a> Staged<'a> {
    fn new(target: &'a Path, bytes: &'a [u8]) -> Self {
        Self {
            target,
            tmp: sibling(target, "tmp"),
            backup: sibling(target, "bak"),
            bytes,
        }
    }
}

/// Write the temporaries and swap them in, rolling back on any failure
fn commit<R>(staged: &[Staged<'_>], mut rename: R) -> Result<()>
where
    R: FnMut(&Path, &Path) -> io::Result<()>,
{
    for table in staged {
        if let Err(e) = fs::write(&table.tmp, table.bytes) {
            discard(staged);
            return Err(e).with_context(|| format!("Failed to write {}", table.tmp.display()));
        }
    }

    let mut backed_up = Vec::new();
    let mut installed = Vec::new();
    if let Err(e) = swap_in(staged, &mut rename, &mut backed_up, &mut installed) {
        roll_back(&installed, &backed_up);
        discard(staged);
        return Err(e);
    }

    for table in backed_up {
        if let Err(e) = fs::remove_file(&table.backup) {
            log::warn!("Failed to remove {}: {}", table.backup.display(), e);
        }
    }

    Ok(())
}

fn swap_in<'s, 'a, R>(
    staged: &'s [Staged<'a>],
    rename: &mut R,
    backed_up: &mut Vec<&'s Staged<'a>>,
    installed: &mut Vec<&'s Staged<'a>>,
) -> Result<()>
where
    R: FnMut(&Path, &Path) -> io::Result<()>,
{
    for table in staged {
        if table.target.exists() {
            rename(table.target, &table.backup)
                .with_context(|| format!("Failed to back up {}", table.target.display()))?;
            backed_up.push(table);
        }
    }

    for table in staged {
        rename(&table.tmp, table.target)
            .with_context(|| format!("Failed to write {}", table.target.display()))?;
        installed.push(table);
    }

    Ok(())
}

/// Remove what was installed and put the previous files back
fn roll_back(installed: &[&Staged<'_>], backed_up: &[&Staged<'_>]) {
    for table in installed {
        if let Err(e) = fs::remove_file(table.target) {
            log::warn!("Failed to remove {}: {}", table.target.display(), e);
        }
    }

    for table in backed_up {
        if let Err(e) = fs::rename(&table.backup, table.target) {
            log::warn!(
                "Failed to restore {} from {}: {}",
                table.target.display(),
                table.backup.display(),
                e
            );
        }
    }
}

/// Hidden sibling of `target`: `.name.<suffix>`
fn sibling(target: &Path, suffix: &str) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{}.{}", name, suffix))
}

fn discard(staged: &[Staged<'_>]) {
    for table in staged {
        if table.tmp.exists() {
            if let Err(e) = fs::remove_file(&table.tmp) {
                log::warn!("Failed to remove {}: {}", table.tmp.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(bytes: &[u8]) -> &str {
        std::str::from_utf8(bytes).unwrap()
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Rename that fails when installing into `blocked`
    fn failing_at(blocked: PathBuf) -> impl FnMut(&Path, &Path) -> io::Result<()> {
        move |from, to| {
            if to == blocked.as_path() {
                Err(io::Error::other("disk full"))
            } else {
                fs::rename(from, to)
            }
        }
    }

    #[test]
    fn test_categories_csv_has_bom_and_header() {
        let categories = vec![
            Category {
                id: 1,
                name: "Transport".to_string(),
            },
            Category {
                id: 2,
                name: "Water access".to_string(),
            },
        ];

        let bytes = render_categories(&categories).unwrap();

        assert!(bytes.starts_with(UTF8_BOM));
        assert_eq!(
            text(&bytes[UTF8_BOM.len()..]),
            "id,brecha\n1,Transport\n2,Water access\n"
        );
    }

    #[test]
    fn test_projects_csv_quotes_when_needed() {
        let projects = vec![Project {
            project_id: 1,
            title: "Roads, bridges".to_string(),
            description: "Says \"hi\"".to_string(),
            brecha_ids: vec![1, 3],
        }];

        let bytes = render_projects(&projects).unwrap();

        assert_eq!(
            text(&bytes[UTF8_BOM.len()..]),
            "project_id,title,description,brecha_ids\n1,\"Roads, bridges\",\"Says \"\"hi\"\"\",\"1,3\"\n"
        );
    }

    #[test]
    fn test_write_tables_creates_dir_and_leaves_no_temporaries() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("output");

        let paths = write_tables(&out, b"a", b"b").unwrap();

        assert_eq!(fs::read(&paths.categories).unwrap(), b"a");
        assert_eq!(fs::read(&paths.projects).unwrap(), b"b");
        let names: Vec<_> = fs::read_dir(&out)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2, "unexpected files: {:?}", names);
    }

    #[test]
    fn test_write_tables_overwrites_previous_output() {
        let dir = tempfile::tempdir().unwrap();

        write_tables(dir.path(), b"old", b"old").unwrap();
        let paths = write_tables(dir.path(), b"new", b"newer").unwrap();

        assert_eq!(fs::read(&paths.categories).unwrap(), b"new");
        assert_eq!(fs::read(&paths.projects).unwrap(), b"newer");
    }

    #[test]
    fn test_directory_in_place_of_output_leaves_old_pair() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::in_dir(dir.path());
        fs::create_dir(&paths.projects).unwrap();
        fs::write(paths.projects.join("keep.txt"), b"x").unwrap();
        fs::write(&paths.categories, b"old").unwrap();

        let err = write_tables(dir.path(), b"new", b"new").unwrap_err();

        assert!(err.to_string().contains("not a regular file"), "{:#}", err);
        assert_eq!(fs::read(&paths.categories).unwrap(), b"old");
        assert!(paths.projects.join("keep.txt").is_file());
        assert_eq!(entries(dir.path()), vec![CATEGORIES_FILE, PROJECTS_FILE]);
    }

    #[test]
    fn test_failed_second_rename_restores_previous_pair() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_tables(dir.path(), b"old", b"old").unwrap();
        let staged = [
            Staged::new(&paths.categories, b"new"),
            Staged::new(&paths.projects, b"new"),
        ];

        let result = commit(&staged, failing_at(paths.projects.clone()));

        assert!(result.is_err());
        assert_eq!(fs::read(&paths.categories).unwrap(), b"old");
        assert_eq!(fs::read(&paths.projects).unwrap(), b"old");
        assert_eq!(entries(dir.path()), vec![CATEGORIES_FILE, PROJECTS_FILE]);
    }

    #[test]
    fn test_failed_second_rename_without_previous_output_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::in_dir(dir.path());
        let staged = [
            Staged::new(&paths.categories, b"new"),
            Staged::new(&paths.projects, b"new"),
        ];

        let result = commit(&staged, failing_at(paths.projects.clone()));

        assert!(result.is_err());
        assert!(entries(dir.path()).is_empty());
    }

    #[test]
    fn test_failed_backup_restores_earlier_backup() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_tables(dir.path(), b"old", b"old").unwrap();
        let staged = [
            Staged::new(&paths.categories, b"new"),
            Staged::new(&paths.projects, b"new"),
        ];

        let result = commit(&staged, failing_at(staged[1].backup.clone()));

        assert!(result.is_err());
        assert_eq!(fs::read(&paths.categories).unwrap(), b"old");
        assert_eq!(fs::read(&paths.projects).unwrap(), b"old");
        assert_eq!(entries(dir.path()), vec![CATEGORIES_FILE, PROJECTS_FILE]);
    }
}
