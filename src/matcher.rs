use crate::config::VersionFileConfig;
use crate::error::{ChangeflowError, Result};
use regex::Regex;
use std::fs;
use std::path::Path;

/// One located occurrence of an embedded version string.
///
/// Offsets refer to the **capture group only**, not the whole match, and
/// are byte offsets into the scanned content. They are computed at scan
/// time and replayed unmodified at rewrite time; they are only valid while
/// the file is not mutated in between. That precondition is documented,
/// not defended against.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionMatch {
    /// The captured version text
    pub text: String,
    /// Byte offset of the capture group start
    pub start: usize,
    /// Byte offset one past the capture group end
    pub end: usize,
    /// 1-based line number of the match
    pub line: usize,
    /// Byte offset of the capture start from the preceding newline
    pub column: usize,
}

/// Compile a version pattern, requiring exactly one capture group.
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    let regex = Regex::new(pattern)
        .map_err(|e| ChangeflowError::pattern(format!("Invalid version pattern: {}", e)))?;

    // captures_len counts the implicit whole-match group
    if regex.captures_len() != 2 {
        return Err(ChangeflowError::pattern(format!(
            "Version pattern must contain exactly one capture group: {}",
            pattern
        )));
    }
    Ok(regex)
}

/// Locate every non-overlapping occurrence of the pattern's capture group,
/// earliest offset first.
///
/// Pure scan: no side effects, no mutation. An occurrence whose capture
/// group did not participate in the match is skipped.
pub fn locate(regex: &Regex, content: &str) -> Vec<VersionMatch> {
    let mut matches = Vec::new();
    for captures in regex.captures_iter(content) {
        let (Some(whole), Some(group)) = (captures.get(0), captures.get(1)) else {
            continue;
        };

        let line = content[..whole.start()].matches('\n').count() + 1;
        let last_newline = content[..whole.start()]
            .rfind('\n')
            .map(|i| i as isize)
            .unwrap_or(-1);
        let column = (group.start() as isize - last_newline) as usize;

        matches.push(VersionMatch {
            text: group.as_str().to_string(),
            start: group.start(),
            end: group.end(),
            line,
            column,
        });
    }
    matches
}

/// Reconstruct file content with only the captured spans replaced.
///
/// Walks matches in ascending offset order, copying the bytes between
/// capture spans verbatim and splicing `new_version` into each span. Every
/// byte outside the captured spans is preserved exactly; the content is
/// never re-scanned, because re-scanning after a prior replacement would
/// shift offsets and corrupt later matches.
pub fn apply(content: &str, matches: &[VersionMatch], new_version: &str) -> String {
    let mut segments: Vec<&str> = Vec::with_capacity(matches.len() * 2 + 1);
    let mut cursor = 0;

    for m in matches {
        segments.push(&content[cursor..m.start]);
        segments.push(new_version);
        cursor = m.end;
    }
    segments.push(&content[cursor..]);
    segments.concat()
}

/// The matches located in one configured version file, cached between the
/// read-only scan phase and the rewrite phase.
#[derive(Debug, Clone)]
pub struct FileMatches {
    pub file: VersionFileConfig,
    pub matches: Vec<VersionMatch>,
}

impl FileMatches {
    /// Scan one configured version file.
    ///
    /// Fatal errors: file missing under the project root, pattern fails to
    /// compile or lacks a single capture group, or the pattern matches zero
    /// times. A configured-but-absent pattern is always an authoring error,
    /// never silently skipped.
    pub fn scan(root: &Path, file: &VersionFileConfig) -> Result<Self> {
        let regex = compile_pattern(&file.pattern)?;

        let full_path = root.join(&file.path);
        if !full_path.is_file() {
            return Err(ChangeflowError::pattern(format!(
                "Version file {} does not exist within {}",
                file.path,
                root.display()
            )));
        }

        let content = fs::read_to_string(&full_path)?;
        let matches = locate(&regex, &content);
        if matches.is_empty() {
            return Err(ChangeflowError::pattern(format!(
                "Version pattern '{}' not found in file {}",
                file.pattern, file.path
            )));
        }

        Ok(FileMatches {
            file: file.clone(),
            matches,
        })
    }

    /// Rewrite the file, replacing every cached capture span with the new
    /// version.
    ///
    /// Precondition: the file has not been mutated since [FileMatches::scan].
    pub fn rewrite(&self, root: &Path, new_version: &str) -> Result<()> {
        let full_path = root.join(&self.file.path);
        let content = fs::read_to_string(&full_path).map_err(|e| {
            ChangeflowError::pattern(format!(
                "Failed to read version file {}: {}",
                self.file.path, e
            ))
        })?;

        let updated = apply(&content, &self.matches, new_version);
        fs::write(&full_path, updated).map_err(|e| {
            ChangeflowError::pattern(format!(
                "Failed to write version file {}: {}",
                self.file.path, e
            ))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_compile_rejects_zero_capture_groups() {
        assert!(compile_pattern(r"\d+\.\d+\.\d+").is_err());
    }

    #[test]
    fn test_compile_rejects_two_capture_groups() {
        assert!(compile_pattern(r"(\d+)\.(\d+)").is_err());
    }

    #[test]
    fn test_compile_rejects_invalid_regex() {
        assert!(compile_pattern(r"(\d+").is_err());
    }

    #[test]
    fn test_locate_single_match() {
        let regex = compile_pattern(r#"version = "(\d+\.\d+\.\d+)""#).unwrap();
        let content = "name = \"demo\"\nversion = \"1.2.3\"\n";

        let matches = locate(&regex, content);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text, "1.2.3");
        assert_eq!(matches[0].line, 2);
        assert_eq!(&content[matches[0].start..matches[0].end], "1.2.3");
    }

    #[test]
    fn test_locate_column_is_offset_from_newline() {
        let regex = compile_pattern(r"v(\d+\.\d+\.\d+)").unwrap();
        let content = "line one\nsay v1.2.3 here\n";

        let matches = locate(&regex, content);
        // capture starts one byte past the 'v' at offset 13
        assert_eq!(matches[0].start, 14);
        assert_eq!(matches[0].column, matches[0].start - 8);
    }

    #[test]
    fn test_locate_multiple_matches_ascending() {
        let regex = compile_pattern(r"(\d+\.\d+\.\d+)").unwrap();
        let content = "a 1.0.0 b 1.0.0 c";

        let matches = locate(&regex, content);
        assert_eq!(matches.len(), 2);
        assert!(matches[0].start < matches[1].start);
    }

    #[test]
    fn test_apply_replaces_only_capture_spans() {
        let regex = compile_pattern(r#""(\d+\.\d+\.\d+)""#).unwrap();
        let content = "before \"1.2.3\" middle \"1.2.3\" after";

        let matches = locate(&regex, content);
        let updated = apply(content, &matches, "1.3.0");
        assert_eq!(updated, "before \"1.3.0\" middle \"1.3.0\" after");
    }

    #[test]
    fn test_apply_preserves_bytes_outside_spans() {
        let regex = compile_pattern(r"version: (\d+\.\d+\.\d+)").unwrap();
        let content = "# comment \t\nversion: 0.9.1\r\ntrailing  \n";

        let matches = locate(&regex, content);
        let updated = apply(content, &matches, "0.9.2");
        assert_eq!(updated, "# comment \t\nversion: 0.9.2\r\ntrailing  \n");
    }

    #[test]
    fn test_apply_is_idempotent_when_spans_equal_target() {
        let regex = compile_pattern(r"(\d+\.\d+\.\d+)").unwrap();
        let content = "v 2.0.0 and 2.0.0 again";

        let matches = locate(&regex, content);
        let updated = apply(content, &matches, "2.0.0");
        assert_eq!(updated, content);
    }

    #[test]
    fn test_apply_handles_match_at_start_and_end() {
        let regex = compile_pattern(r"(\d+\.\d+\.\d+)").unwrap();
        let content = "1.0.0 middle 1.0.0";

        let matches = locate(&regex, content);
        let updated = apply(content, &matches, "10.20.30");
        assert_eq!(updated, "10.20.30 middle 10.20.30");
    }

    #[test]
    fn test_scan_missing_file() {
        let dir = TempDir::new().unwrap();
        let file = VersionFileConfig {
            path: "missing.toml".to_string(),
            pattern: r"(\d+\.\d+\.\d+)".to_string(),
        };
        let err = FileMatches::scan(dir.path(), &file).unwrap_err();
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn test_scan_zero_matches_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "no version here").unwrap();
        let file = VersionFileConfig {
            path: "notes.txt".to_string(),
            pattern: r"(\d+\.\d+\.\d+)".to_string(),
        };
        let err = FileMatches::scan(dir.path(), &file).unwrap_err();
        assert!(err.to_string().contains("not found in file"));
    }

    #[test]
    fn test_scan_then_rewrite() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"demo\"\nversion = \"1.2.3\"\n",
        )
        .unwrap();
        let file = VersionFileConfig {
            path: "Cargo.toml".to_string(),
            pattern: r#"version = "(\d+\.\d+\.\d+)""#.to_string(),
        };

        let scanned = FileMatches::scan(dir.path(), &file).unwrap();
        scanned.rewrite(dir.path(), "1.3.0").unwrap();

        let updated = fs::read_to_string(dir.path().join("Cargo.toml")).unwrap();
        assert_eq!(updated, "[package]\nname = \"demo\"\nversion = \"1.3.0\"\n");
    }
}
