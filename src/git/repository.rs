use crate::error::{ChangeflowError, Result};
use crate::git::Repository;
use git2::{ErrorClass, ErrorCode, Oid};
use std::path::Path;

/// Wrapper around a git2 Repository for the operations the release engine
/// needs: provenance lookup, whole-tree commits, and tagging.
pub struct Git2Repository {
    repo: git2::Repository,
}

impl Git2Repository {
    /// Discover the git repository containing the given directory.
    ///
    /// # Returns
    /// * `Ok(Git2Repository)` - Successfully discovered repository
    /// * `Err` - A `Git` error with remediation hint if no repository exists
    pub fn discover(root: &Path) -> Result<Self> {
        let repo = git2::Repository::discover(root).map_err(|_| {
            ChangeflowError::Git(git2::Error::new(
                ErrorCode::NotFound,
                ErrorClass::Repository,
                format!(
                    "no git repository found at {}. Initialize one with `git init`",
                    root.display()
                ),
            ))
        })?;
        Ok(Git2Repository { repo })
    }

    /// Look up the id of a tree entry at `path`, or `None` if absent.
    fn entry_id(tree: &git2::Tree<'_>, path: &Path) -> Option<Oid> {
        tree.get_path(path).ok().map(|entry| entry.id())
    }

    /// Commit at the tip of the main branch, trying `main` then `master`,
    /// falling back to HEAD when neither local branch exists.
    fn main_branch_commit(&self) -> Result<git2::Commit<'_>> {
        for name in ["main", "master"] {
            if let Ok(branch) = self.repo.find_branch(name, git2::BranchType::Local) {
                return Ok(branch.into_reference().peel_to_commit()?);
            }
        }
        Ok(self.repo.head()?.peel_to_commit()?)
    }

    /// Whether any delta in the diff lands a `*.md` file under `dir`.
    fn diff_touches_record(diff: &git2::Diff<'_>, dir: &Path) -> bool {
        diff.deltas().any(|delta| {
            delta.new_file().path().is_some_and(|path| {
                path.starts_with(dir) && path.extension().is_some_and(|ext| ext == "md")
            })
        })
    }
}

impl Repository for Git2Repository {
    fn last_commit_for_path(&self, path: &Path) -> Result<String> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.push_head()?;
        revwalk.set_sorting(git2::Sort::TIME)?;

        // Walk from HEAD backwards; the first commit whose tree entry for
        // the path differs from all of its parents is the one that last
        // touched it.
        for oid in revwalk {
            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;
            let tree = commit.tree()?;
            let current = Self::entry_id(&tree, path);

            if current.is_none() {
                continue;
            }

            let mut changed = true;
            for parent in commit.parents() {
                let parent_tree = parent.tree()?;
                if Self::entry_id(&parent_tree, path) == current {
                    changed = false;
                    break;
                }
            }

            if changed {
                return Ok(oid.to_string());
            }
        }

        Err(ChangeflowError::record(format!(
            "No commit found for {}. Commit the change record before releasing",
            path.display()
        )))
    }

    fn commit_all(&self, message: &str) -> Result<String> {
        let mut index = self.repo.index()?;
        index.add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let signature = self.repo.signature()?;

        // First commit in an empty repository has no parent
        let head = self.repo.head().ok();
        let parent_commit = match head {
            Some(reference) => Some(reference.peel_to_commit()?),
            None => None,
        };
        let parents: Vec<&git2::Commit<'_>> = parent_commit.iter().collect();

        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;
        Ok(oid.to_string())
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        Ok(self
            .repo
            .find_reference(&format!("refs/tags/{}", name))
            .is_ok())
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        if self.tag_exists(name)? {
            return Err(ChangeflowError::tag(format!(
                "Tag '{}' already exists",
                name
            )));
        }

        let head = self.repo.head()?.peel_to_commit()?;
        self.repo.tag_lightweight(name, head.as_object(), false)?;
        Ok(())
    }

    fn last_commit_adds_record(&self, dir: &Path) -> Result<bool> {
        let head = self.repo.head()?.peel_to_commit()?;
        let mut base = self.main_branch_commit()?;

        // On the main branch itself the interesting diff is HEAD against
        // its own parent. A root commit has none; diff it against the
        // empty tree instead so its whole content counts as added.
        if base.id() == head.id() {
            match head.parent(0) {
                Ok(parent) => base = parent,
                Err(_) => {
                    let diff = self
                        .repo
                        .diff_tree_to_tree(None, Some(&head.tree()?), None)?;
                    return Ok(Self::diff_touches_record(&diff, dir));
                }
            }
        }

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&base.tree()?), Some(&head.tree()?), None)?;
        Ok(Self::diff_touches_record(&diff, dir))
    }
}
