use crate::aggregate::ReleasePlan;
use crate::error::{ChangeflowError, Result};
use crate::record::ChangeRecord;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Render the release entry for one plan as Markdown.
///
/// One `##` heading for the new version, one section per non-empty
/// severity bucket (major first), one list item per record in insertion
/// order. Multi-line descriptions are already indented for nested list
/// rendering by the record loader.
pub fn render_entry(plan: &ReleasePlan) -> String {
    let mut entry = String::new();
    let _ = writeln!(entry, "## {}", plan.new_version);

    render_section(&mut entry, "Major changes", &plan.major_changes);
    render_section(&mut entry, "Minor changes", &plan.minor_changes);
    render_section(&mut entry, "Patch changes", &plan.patch_changes);

    entry.trim_end().to_string()
}

fn render_section(entry: &mut String, title: &str, records: &[ChangeRecord]) {
    if records.is_empty() {
        return;
    }
    let _ = writeln!(entry, "\n### {} ({})\n", title, records.len());
    for record in records {
        let _ = writeln!(entry, "- {} ({})", record.description, record.short_revision);
    }
}

/// Prepend a rendered release entry to the persisted changelog.
///
/// The document becomes: entry (trimmed of trailing whitespace), exactly
/// one blank line, then the previous changelog text (empty if the file does
/// not yet exist). Persisted by full overwrite. This runs before any
/// version-file rewrite or record deletion so a failure here leaves the
/// working tree untouched.
pub fn update_changelog(root: &Path, changelog_path: &str, plan: &ReleasePlan) -> Result<()> {
    let full_path = root.join(changelog_path);

    let previous = match fs::read_to_string(&full_path) {
        Ok(contents) => contents.trim().to_string(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(ChangeflowError::config(format!(
                "Failed to read changelog {}: {}",
                full_path.display(),
                e
            )))
        }
    };

    let entry = render_entry(plan);
    let document = format!("{}\n\n{}", entry, previous);

    fs::write(&full_path, document).map_err(|e| {
        ChangeflowError::config(format!(
            "Failed to write changelog {}: {}",
            full_path.display(),
            e
        ))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::{Severity, Version};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn record(desc: &str, severity: Severity) -> ChangeRecord {
        ChangeRecord {
            severity,
            description: desc.to_string(),
            source_path: PathBuf::from(".changeflow/x.md"),
            revision: "b".repeat(40),
            short_revision: "bbbbbbb".to_string(),
        }
    }

    fn plan(major: Vec<ChangeRecord>, minor: Vec<ChangeRecord>, patch: Vec<ChangeRecord>) -> ReleasePlan {
        ReleasePlan {
            old_version: Version::new(1, 2, 3),
            new_version: Version::new(1, 3, 0),
            severity: Severity::Minor,
            major_changes: major,
            minor_changes: minor,
            patch_changes: patch,
        }
    }

    #[test]
    fn test_render_entry_skips_empty_buckets() {
        let plan = plan(vec![], vec![record("Added things", Severity::Minor)], vec![]);
        let entry = render_entry(&plan);

        assert!(entry.starts_with("## 1.3.0"));
        assert!(entry.contains("### Minor changes (1)"));
        assert!(!entry.contains("Major changes"));
        assert!(!entry.contains("Patch changes"));
        assert!(entry.contains("- Added things (bbbbbbb)"));
    }

    #[test]
    fn test_render_entry_orders_sections_major_first() {
        let plan = plan(
            vec![record("Big", Severity::Major)],
            vec![record("Mid", Severity::Minor)],
            vec![record("Small", Severity::Patch)],
        );
        let entry = render_entry(&plan);

        let major = entry.find("Major changes").unwrap();
        let minor = entry.find("Minor changes").unwrap();
        let patch = entry.find("Patch changes").unwrap();
        assert!(major < minor && minor < patch);
    }

    #[test]
    fn test_render_entry_has_no_trailing_whitespace() {
        let plan = plan(vec![], vec![record("x", Severity::Minor)], vec![]);
        let entry = render_entry(&plan);
        assert_eq!(entry, entry.trim_end());
    }

    #[test]
    fn test_update_changelog_creates_file() {
        let dir = TempDir::new().unwrap();
        let plan = plan(vec![], vec![record("New feature", Severity::Minor)], vec![]);

        update_changelog(dir.path(), "CHANGELOG.md", &plan).unwrap();

        let contents = fs::read_to_string(dir.path().join("CHANGELOG.md")).unwrap();
        assert!(contents.starts_with("## 1.3.0"));
        assert!(contents.ends_with("\n\n"));
    }

    #[test]
    fn test_update_changelog_prepends_to_existing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("CHANGELOG.md"), "## 1.2.3\n\n- old entry\n").unwrap();
        let plan = plan(vec![], vec![record("New feature", Severity::Minor)], vec![]);

        update_changelog(dir.path(), "CHANGELOG.md", &plan).unwrap();

        let contents = fs::read_to_string(dir.path().join("CHANGELOG.md")).unwrap();
        let new_pos = contents.find("## 1.3.0").unwrap();
        let old_pos = contents.find("## 1.2.3").unwrap();
        assert!(new_pos < old_pos);
        assert!(contents.contains("- old entry"));
    }
}
