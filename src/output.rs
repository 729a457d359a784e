// 📝 Report output
// Every report writes a CSV and a companion .txt next to it. The .txt links
// to the code that produced the CSV and lists a checksum for each input, so
// any published number can be traced back to the exact extracts.

use anyhow::{Context, Result};
use git2::Repository;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where in this crate a report is implemented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
}

/// Location of the macro call site, for `Provenance::new`
#[macro_export]
macro_rules! source_location {
    () => {
        $crate::output::SourceLocation {
            file: file!(),
            line: line!(),
        }
    };
}

// ============================================================================
// CSV WRITERS
// ============================================================================

/// Serialize rows with a header. Returns the number of rows written.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;

    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write row to {}", path.display()))?;
    }
    writer.flush()?;

    if rows.is_empty() {
        warn!("{}: report has no rows", path.display());
    }
    Ok(rows.len())
}

/// Write a table whose columns are only known at run time
pub fn write_table(path: &Path, headers: &[String], rows: &[Vec<String>]) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;

    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(rows.len())
}

// ============================================================================
// PROVENANCE
// ============================================================================

/// Source link plus input checksums for one report run
#[derive(Debug, Clone)]
pub struct Provenance {
    location: SourceLocation,
    inputs: Vec<PathBuf>,
}

impl Provenance {
    pub fn new(location: SourceLocation) -> Self {
        Self {
            location,
            inputs: Vec::new(),
        }
    }

    pub fn input(mut self, path: &Path) -> Self {
        self.inputs.push(path.to_path_buf());
        self
    }

    pub fn optional_input(self, path: Option<&Path>) -> Self {
        match path {
            Some(path) => self.input(path),
            None => self,
        }
    }

    /// Companion file path: the output path with a .txt extension
    pub fn companion_path(out: &Path) -> PathBuf {
        out.with_extension("txt")
    }

    /// Write the companion file for `out`
    pub fn write(&self, out: &Path) -> Result<PathBuf> {
        let mut content = permalink(self.location);
        content.push('\n');

        for input in &self.inputs {
            let digest = sha256_file(input)?;
            content.push_str(&format!("{}  {}\n", digest, input.display()));
        }

        let path = Self::companion_path(out);
        fs::write(&path, content)
            .with_context(|| format!("Failed to write provenance file: {}", path.display()))?;
        debug!("Wrote provenance to {}", path.display());
        Ok(path)
    }
}

/// Write a report's rows and its companion file
pub fn write_report<T: Serialize>(out: &Path, rows: &[T], provenance: &Provenance) -> Result<usize> {
    let count = write_csv(out, rows)?;
    provenance.write(out)?;
    info!("Wrote {} rows to {}", count, out.display());
    Ok(count)
}

pub fn sha256_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read input for checksum: {}", path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// SOURCE LINKS
// ============================================================================

/// "git@github.com:owner/repo.git" -> "https://github.com/owner/repo"
pub fn remote_to_web_url(remote: &str) -> String {
    let remote = remote.strip_suffix(".git").unwrap_or(remote);
    match remote.strip_prefix("git@github.com:") {
        Some(path) => format!("https://github.com/{}", path),
        None => remote.to_string(),
    }
}

/// Permalink to `location` at the current commit, or a file:// link when
/// this isn't a git checkout with a remote.
pub fn permalink(location: SourceLocation) -> String {
    permalink_in(Path::new(env!("CARGO_MANIFEST_DIR")), location)
}

/// Permalink for a file under `crate_root`
pub fn permalink_in(crate_root: &Path, location: SourceLocation) -> String {
    let source_file = crate_root.join(location.file);
    match repo_link(crate_root, &source_file, location.line) {
        Ok(link) => link,
        Err(e) => {
            debug!("No repository link for {}: {}", source_file.display(), e);
            format!("file://{}#L{}", source_file.display(), location.line)
        }
    }
}

fn repo_link(crate_root: &Path, source_file: &Path, line: u32) -> Result<String> {
    let repo = Repository::discover(crate_root)?;
    let commit = repo.head()?.peel_to_commit()?.id();
    let remote = repo.find_remote("origin")?;
    let url = remote.url().context("origin remote has no UTF-8 url")?;
    let workdir = repo.workdir().context("bare repository")?;

    let workdir = workdir.canonicalize().unwrap_or_else(|_| workdir.to_path_buf());
    let source_file = source_file
        .canonicalize()
        .unwrap_or_else(|_| source_file.to_path_buf());
    let relative = source_file.strip_prefix(&workdir)?;

    Ok(format!(
        "{}/blob/{}/{}#L{}",
        remote_to_web_url(url),
        commit,
        relative.display(),
        line
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use tempfile::TempDir;

    #[derive(Serialize)]
    struct Row {
        region: String,
        year: i64,
        pct: Option<f64>,
    }

    #[test]
    fn test_remote_to_web_url() {
        assert_eq!(
            remote_to_web_url("git@github.com:someone/maui-housing.git"),
            "https://github.com/someone/maui-housing"
        );
        assert_eq!(
            remote_to_web_url("https://github.com/someone/maui-housing.git"),
            "https://github.com/someone/maui-housing"
        );
        assert_eq!(remote_to_web_url("https://example.org/repo"), "https://example.org/repo");
    }

    #[test]
    fn test_permalink_outside_repository() {
        let dir = TempDir::new().unwrap();
        let location = SourceLocation { file: "src/sales.rs", line: 42 };

        let link = permalink_in(dir.path(), location);

        assert_eq!(
            link,
            format!("file://{}#L42", dir.path().join("src/sales.rs").display())
        );
    }

    #[test]
    fn test_permalink_at_head_commit() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        repo.remote("origin", "git@github.com:someone/maui-housing.git").unwrap();

        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/sales.rs"), "// sales\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("src/sales.rs")).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let signature = git2::Signature::now("Maui Housing", "reports@example.org").unwrap();
        let commit = repo
            .commit(Some("HEAD"), &signature, &signature, "Add sales", &tree, &[])
            .unwrap();

        let location = SourceLocation { file: "src/sales.rs", line: 7 };
        let link = permalink_in(dir.path(), location);

        assert_eq!(
            link,
            format!("https://github.com/someone/maui-housing/blob/{}/src/sales.rs#L7", commit)
        );

        println!("✅ Permalink test PASSED");
    }

    #[test]
    fn test_write_report_with_provenance() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input.csv");
        fs::write(&input, "abc").unwrap();
        let out = dir.path().join("report.csv");

        let rows = vec![
            Row { region: "West Maui".to_string(), year: 2020, pct: Some(12.5) },
            Row { region: "Maui County".to_string(), year: 2020, pct: None },
        ];
        let provenance = Provenance::new(crate::source_location!()).input(&input);
        let count = write_report(&out, &rows, &provenance).unwrap();
        assert_eq!(count, 2);

        let csv_text = fs::read_to_string(&out).unwrap();
        assert_eq!(
            csv_text,
            "region,year,pct\nWest Maui,2020,12.5\nMaui County,2020,\n",
            "None is an empty cell"
        );

        let txt = fs::read_to_string(dir.path().join("report.txt")).unwrap();
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("output.rs#L"), "link points at this file: {}", lines[0]);
        assert!(lines[1].starts_with(
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad  "
        ));

        println!("✅ Report output test PASSED");
    }
}
