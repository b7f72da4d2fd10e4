use crate::config::staging_dir;
use crate::error::{ChangeflowError, Result};
use crate::git::Repository;
use crate::version::Severity;
use std::fs;
use std::path::{Path, PathBuf};

/// One pending change awaiting release.
///
/// Created by the "add" workflow as a Markdown file in the staging
/// directory; consumed and deleted by the release orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord {
    pub severity: Severity,
    /// Normalized description: LF line endings, first line unindented,
    /// continuation lines indented by two spaces for nested list rendering.
    pub description: String,
    /// Path of the record file, relative to the project root
    pub source_path: PathBuf,
    /// Full hash of the last commit touching the record file
    pub revision: String,
    /// First 7 characters of the revision, for display
    pub short_revision: String,
}

/// List all pending change record files under the staging directory.
///
/// Returns `*.md` paths relative to the project root, sorted by file name
/// so records load in a deterministic insertion order.
pub fn pending_record_paths(root: &Path) -> Result<Vec<PathBuf>> {
    let dir = staging_dir(root);
    if !dir.is_dir() {
        return Err(ChangeflowError::config(format!(
            "Staging directory not found: {}. Run `changeflow --init` first",
            dir.display()
        )));
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            // Store relative to root so provenance lookup and deletion both
            // work from the project root.
            let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
            paths.push(relative);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Load one `ChangeRecord` per pending file, or fail with the offending
/// path and parse error.
///
/// Any failure (missing file, unparsable header, unknown severity token,
/// provenance lookup) aborts the whole load; no partial record set is
/// returned.
pub fn load_records(
    root: &Path,
    paths: &[PathBuf],
    repo: &dyn Repository,
) -> Result<Vec<ChangeRecord>> {
    let mut records = Vec::with_capacity(paths.len());
    for path in paths {
        records.push(load_record(root, path, repo)?);
    }
    Ok(records)
}

fn load_record(root: &Path, path: &Path, repo: &dyn Repository) -> Result<ChangeRecord> {
    let full_path = root.join(path);
    let contents = fs::read_to_string(&full_path).map_err(|e| {
        ChangeflowError::record(format!("Failed to read {}: {}", full_path.display(), e))
    })?;

    let (header, body) = split_front_matter(&contents).ok_or_else(|| {
        ChangeflowError::record(format!(
            "Missing front matter header in {}. Expected a `change: patch|minor|major` field \
             between `---` delimiters",
            path.display()
        ))
    })?;

    let token = header_field(header, "change").ok_or_else(|| {
        ChangeflowError::record(format!(
            "Missing `change` field in front matter of {}",
            path.display()
        ))
    })?;

    let severity = Severity::from_token(token).ok_or_else(|| {
        ChangeflowError::record(format!(
            "Unrecognized change severity '{}' in {}. Expected patch|minor|major",
            token.trim(),
            path.display()
        ))
    })?;

    let revision = repo.last_commit_for_path(path)?;
    let short_revision = revision.chars().take(7).collect();

    Ok(ChangeRecord {
        severity,
        description: normalize_description(body),
        source_path: path.to_path_buf(),
        revision,
        short_revision,
    })
}

/// Split a record file into its front matter header and description body.
///
/// The header is delimited by `---` lines at the top of the file.
fn split_front_matter(contents: &str) -> Option<(&str, &str)> {
    let trimmed = contents.trim_start_matches('\u{feff}').trim_start();
    let rest = trimmed.strip_prefix("---")?;
    let rest = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))?;

    // Find the closing delimiter on its own line.
    for (offset, line) in line_offsets(rest) {
        if line.trim_end_matches('\r').trim() == "---" {
            let header = &rest[..offset];
            let body = &rest[offset + line.len()..];
            let body = body
                .strip_prefix("\r\n")
                .or_else(|| body.strip_prefix('\n'))
                .unwrap_or(body);
            return Some((header, body));
        }
    }
    None
}

fn line_offsets(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0;
    text.split_inclusive('\n').map(move |line| {
        let start = offset;
        offset += line.len();
        (start, line)
    })
}

/// Extract a `key: value` field from the front matter header.
fn header_field<'a>(header: &'a str, key: &str) -> Option<&'a str> {
    for line in header.lines() {
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case(key) {
                return Some(value.trim());
            }
        }
    }
    None
}

/// Normalize a description for nested list rendering.
///
/// CRLF becomes LF, the surrounding blank cushion is trimmed, blank
/// continuation lines are dropped and every remaining continuation line is
/// indented by two spaces, so a multi-line description renders as a single
/// list item.
fn normalize_description(body: &str) -> String {
    let description = body.replace("\r\n", "\n");
    let description = description.trim();

    let mut lines = description.lines();
    let mut normalized: Vec<String> = Vec::new();
    if let Some(first) = lines.next() {
        normalized.push(first.to_string());
    }
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        normalized.push(format!("  {}", line));
    }
    normalized.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;
    use tempfile::TempDir;

    const SHA: &str = "f0e1d2c3b4a5968778695a4b3c2d1e0f01234567";

    fn write_record(root: &Path, name: &str, contents: &str) -> PathBuf {
        let dir = staging_dir(root);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), contents).unwrap();
        PathBuf::from(crate::config::STAGING_DIR).join(name)
    }

    #[test]
    fn test_normalize_description_single_line() {
        assert_eq!(normalize_description("Fix the thing\n"), "Fix the thing");
    }

    #[test]
    fn test_normalize_description_multiline() {
        let body = "First line\nsecond line\n\nthird line\n";
        assert_eq!(
            normalize_description(body),
            "First line\n  second line\n  third line"
        );
    }

    #[test]
    fn test_normalize_description_crlf() {
        let body = "First\r\nsecond\r\n";
        assert_eq!(normalize_description(body), "First\n  second");
    }

    #[test]
    fn test_split_front_matter() {
        let contents = "---\nchange: minor\n---\nAdded a feature\n";
        let (header, body) = split_front_matter(contents).unwrap();
        assert_eq!(header_field(header, "change"), Some("minor"));
        assert_eq!(body, "Added a feature\n");
    }

    #[test]
    fn test_split_front_matter_missing_close() {
        assert!(split_front_matter("---\nchange: minor\nno close").is_none());
        assert!(split_front_matter("just text").is_none());
    }

    #[test]
    fn test_load_record_case_insensitive_severity() {
        let dir = TempDir::new().unwrap();
        let path = write_record(dir.path(), "a.md", "---\nchange: MAJOR\n---\nBig change\n");

        let mut repo = MockRepository::new();
        repo.set_revision(path.clone(), SHA);

        let records = load_records(dir.path(), &[path], &repo).unwrap();
        assert_eq!(records[0].severity, Severity::Major);
        assert_eq!(records[0].description, "Big change");
        assert_eq!(records[0].revision, SHA);
        assert_eq!(records[0].short_revision, "f0e1d2c");
    }

    #[test]
    fn test_load_record_rejects_unknown_severity() {
        let dir = TempDir::new().unwrap();
        let path = write_record(dir.path(), "a.md", "---\nchange: huge\n---\nNope\n");

        let mut repo = MockRepository::new();
        repo.set_revision(path.clone(), SHA);

        let err = load_records(dir.path(), &[path], &repo).unwrap_err();
        assert!(err.to_string().contains("huge"));
        assert!(err.to_string().contains("a.md"));
    }

    #[test]
    fn test_load_record_missing_header_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write_record(dir.path(), "a.md", "no front matter here\n");

        let repo = MockRepository::new();
        let err = load_records(dir.path(), &[path], &repo).unwrap_err();
        assert!(err.to_string().contains("front matter"));
    }

    #[test]
    fn test_load_records_provenance_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write_record(dir.path(), "a.md", "---\nchange: patch\n---\nFix\n");

        // Mock has no revision registered for the path
        let repo = MockRepository::new();
        assert!(load_records(dir.path(), &[path], &repo).is_err());
    }

    #[test]
    fn test_pending_record_paths_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        write_record(dir.path(), "b.md", "x");
        write_record(dir.path(), "a.md", "x");
        fs::write(staging_dir(dir.path()).join("config.toml"), "").unwrap();

        let paths = pending_record_paths(dir.path()).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.md", "b.md"]);
    }

    #[test]
    fn test_pending_record_paths_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert!(pending_record_paths(dir.path()).is_err());
    }
}
