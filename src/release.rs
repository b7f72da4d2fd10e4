use crate::aggregate::{aggregate, ReleasePlan};
use crate::changelog::update_changelog;
use crate::commands::{continue_after_command_failure, run_commands, CommandObserver};
use crate::config::Config;
use crate::error::{ChangeflowError, Result};
use crate::git::Repository;
use crate::matcher::FileMatches;
use crate::record::{load_records, pending_record_paths};
use std::fs;
use std::path::Path;

/// Result of one release run.
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseOutcome {
    /// No pending change records; nothing was mutated.
    NoChanges,
    /// The release was applied.
    Released {
        old_version: String,
        new_version: String,
        /// Tag created for the release commit, if tagging is enabled
        tag: Option<String>,
        /// Message of the post-bump command that failed, if any. The
        /// release still completed; see
        /// [crate::commands::continue_after_command_failure].
        command_failure: Option<String>,
    },
}

/// Sequences one release over a project root.
///
/// Owns the configuration for the duration of the run and borrows the
/// version-control collaborator. Single-threaded and synchronous: every
/// step blocks, and a run owns exclusive access to its target files.
pub struct Orchestrator<'a> {
    root: &'a Path,
    config: Config,
    repo: &'a dyn Repository,
}

impl<'a> Orchestrator<'a> {
    pub fn new(root: &'a Path, config: Config, repo: &'a dyn Repository) -> Self {
        Orchestrator { root, config, repo }
    }

    /// Compute the release plan and scan every configured version file
    /// without mutating anything.
    ///
    /// Returns `None` when there are no pending records. All scans complete
    /// before this returns, so a configured-but-absent pattern aborts here,
    /// before any write. The cached matches support dry-run preview and are
    /// replayed verbatim by the rewrite phase.
    pub fn plan(&self) -> Result<Option<(ReleasePlan, Vec<FileMatches>)>> {
        let paths = pending_record_paths(self.root)?;
        let records = load_records(self.root, &paths, self.repo)?;

        let Some(plan) = aggregate(&self.config.version, records)? else {
            return Ok(None);
        };

        let mut scans = Vec::with_capacity(self.config.version_files.len());
        for file in &self.config.version_files {
            scans.push(FileMatches::scan(self.root, file)?);
        }

        Ok(Some((plan, scans)))
    }

    /// Run one release end to end.
    ///
    /// Order is fixed: changelog update, per-file version rewrites (each
    /// file's matches in offset order), deletion of consumed records,
    /// persisting the new version, post-bump commands, then commit and tag.
    /// There is no rollback across already-rewritten files: a failure
    /// partway through the rewrite phase leaves earlier files updated. The
    /// changelog update runs first so that a failure before it leaves the
    /// working tree byte-identical.
    ///
    /// The rewrite phase replays byte offsets recorded during the scan, so
    /// every file in `version_files` must stay untouched between the two.
    /// Listing the changelog file itself in `version_files` breaks that:
    /// the prepended entry shifts its offsets before they are replayed.
    /// Keep the changelog out of `version_files`.
    pub fn release(mut self, observer: &mut dyn CommandObserver) -> Result<ReleaseOutcome> {
        let Some((plan, scans)) = self.plan()? else {
            return Ok(ReleaseOutcome::NoChanges);
        };

        update_changelog(self.root, &self.config.changelog, &plan)?;

        for scanned in &scans {
            scanned.rewrite(self.root, &plan.new_version.to_string())?;
        }

        for path in plan.record_paths() {
            let full_path = self.root.join(path);
            fs::remove_file(&full_path).map_err(|e| {
                ChangeflowError::record(format!(
                    "Failed to delete consumed record {}: {}",
                    full_path.display(),
                    e
                ))
            })?;
        }

        self.config.version = plan.new_version.to_string();
        self.config.save(self.root)?;

        let mut command_failure = None;
        if !self.config.on_apply.commands.is_empty() {
            if let Err(e) = run_commands(self.root, &self.config.on_apply.commands, observer) {
                if !continue_after_command_failure() {
                    return Err(e);
                }
                command_failure = Some(e.to_string());
            }
        }

        let mut tag = None;
        if self.config.on_apply.commit_files {
            self.repo
                .commit_all(&format!("chore: release {}", plan.new_version))?;

            let tag_format = self.config.on_apply.tag_format.trim();
            if self.config.on_apply.tag_commit && !tag_format.is_empty() {
                let tag_name = render_tag(tag_format, &plan.new_version.to_string());
                self.repo.create_tag(&tag_name)?;
                tag = Some(tag_name);
            }
        }

        Ok(ReleaseOutcome::Released {
            old_version: plan.old_version.to_string(),
            new_version: plan.new_version.to_string(),
            tag,
            command_failure,
        })
    }
}

/// Render a tag name from the configured format.
/// Example: format="v{version}", version="1.2.3" -> "v1.2.3"
fn render_tag(format: &str, version: &str) -> String {
    format.replace("{version}", version)
}
