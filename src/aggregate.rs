use crate::error::Result;
use crate::record::ChangeRecord;
use crate::version::{Severity, Version};

/// The computed shape of one release: old and next version, overall
/// severity, and the consumed records partitioned by severity.
///
/// Buckets preserve the order in which records were loaded; they are never
/// re-sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleasePlan {
    pub old_version: Version,
    pub new_version: Version,
    pub severity: Severity,
    pub major_changes: Vec<ChangeRecord>,
    pub minor_changes: Vec<ChangeRecord>,
    pub patch_changes: Vec<ChangeRecord>,
}

impl ReleasePlan {
    /// Total number of records consumed by this release
    pub fn record_count(&self) -> usize {
        self.major_changes.len() + self.minor_changes.len() + self.patch_changes.len()
    }

    /// Paths of every consumed record, bucket by bucket
    pub fn record_paths(&self) -> Vec<&std::path::Path> {
        self.major_changes
            .iter()
            .chain(self.minor_changes.iter())
            .chain(self.patch_changes.iter())
            .map(|r| r.source_path.as_path())
            .collect()
    }
}

/// Reduce a set of loaded change records to the overall severity and next
/// version.
///
/// Overall severity is the maximum over all record severities under
/// `patch < minor < major`. An empty record set yields `Ok(None)`: no
/// release, not an error. The current version string must parse as a
/// canonical `X.Y.Z` or aggregation fails; it never guesses a default.
pub fn aggregate(current_version: &str, records: Vec<ChangeRecord>) -> Result<Option<ReleasePlan>> {
    if records.is_empty() {
        return Ok(None);
    }

    let old_version = Version::parse(current_version)?;

    let mut severity = Severity::Patch;
    let mut major_changes = Vec::new();
    let mut minor_changes = Vec::new();
    let mut patch_changes = Vec::new();

    for record in records {
        severity = severity.max(record.severity);
        match record.severity {
            Severity::Major => major_changes.push(record),
            Severity::Minor => minor_changes.push(record),
            Severity::Patch => patch_changes.push(record),
        }
    }

    let new_version = old_version.bump(severity);

    Ok(Some(ReleasePlan {
        old_version,
        new_version,
        severity,
        major_changes,
        minor_changes,
        patch_changes,
    }))
}
