//! Version-control abstraction layer
//!
//! This module provides a trait-based abstraction over the git operations
//! the release engine consumes, allowing for a real implementation backed
//! by the `git2` crate and a mock implementation for testing.
//!
//! The engine is a pure consumer of these operations: it never implements
//! version-control storage itself.

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use std::path::Path;

/// Version-control operations consumed by the release engine.
///
/// All implementors must be `Send` to allow safe transfer across
/// threads. Implementations map underlying errors (like `git2::Error`) to
/// the appropriate [crate::error::ChangeflowError] variants.
///
/// ## Implementations
///
/// - [Git2Repository](repository::Git2Repository): Real implementation using the `git2` crate
/// - [MockRepository](mock::MockRepository): Test implementation
pub trait Repository: Send {
    /// Resolve the most recent commit touching a path.
    ///
    /// The path is relative to the repository work directory. Returns the
    /// full hex object id of the newest commit in which the path was added
    /// or modified.
    ///
    /// # Returns
    /// * `Ok(String)` - Full commit hash
    /// * `Err` - If the path has never been committed or lookup fails
    fn last_commit_for_path(&self, path: &Path) -> Result<String>;

    /// Stage the entire worktree and create a commit.
    ///
    /// # Arguments
    /// * `message` - Commit message
    ///
    /// # Returns
    /// * `Ok(String)` - Hash of the created commit
    /// * `Err` - If staging or committing fails
    fn commit_all(&self, message: &str) -> Result<String>;

    /// Check whether a tag with the given name exists.
    fn tag_exists(&self, name: &str) -> Result<bool>;

    /// Create a lightweight tag on the current HEAD commit.
    ///
    /// # Returns
    /// * `Ok(())` - Tag created
    /// * `Err` - A [crate::error::ChangeflowError::Tag] if the tag already
    ///   exists, or a git error otherwise
    fn create_tag(&self, name: &str) -> Result<()>;

    /// Whether the last commit adds or updates a Markdown file under `dir`.
    ///
    /// Compares HEAD against the main branch head (or against HEAD's own
    /// parent when HEAD is the main branch) and reports whether that diff
    /// touches a `*.md` file under the given directory. Backs the CI
    /// check that every change lands with a pending change record.
    ///
    /// # Returns
    /// * `Ok(true)` - The diff contains a record file under `dir`
    /// * `Ok(false)` - It does not
    /// * `Err` - If the repository has no commits or lookup fails
    fn last_commit_adds_record(&self, dir: &Path) -> Result<bool>;
}
