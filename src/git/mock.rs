use crate::error::{ChangeflowError, Result};
use crate::git::Repository;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Mock repository for testing without actual git operations
pub struct MockRepository {
    revisions: HashMap<PathBuf, String>,
    tags: Mutex<Vec<String>>,
    commits: Mutex<Vec<String>>,
    head_adds_record: bool,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            revisions: HashMap::new(),
            tags: Mutex::new(Vec::new()),
            commits: Mutex::new(Vec::new()),
            head_adds_record: false,
        }
    }

    /// Register the last commit hash for a path
    pub fn set_revision(&mut self, path: impl Into<PathBuf>, revision: impl Into<String>) {
        self.revisions.insert(path.into(), revision.into());
    }

    /// Register a pre-existing tag
    pub fn add_tag(&mut self, name: impl Into<String>) {
        self.tags.lock().unwrap().push(name.into());
    }

    /// Set the answer for the last-commit record check
    pub fn set_head_adds_record(&mut self, value: bool) {
        self.head_adds_record = value;
    }

    /// Messages of the commits created through this mock
    pub fn commit_messages(&self) -> Vec<String> {
        self.commits.lock().unwrap().clone()
    }

    /// Names of the tags created or registered through this mock
    pub fn tag_names(&self) -> Vec<String> {
        self.tags.lock().unwrap().clone()
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn last_commit_for_path(&self, path: &Path) -> Result<String> {
        self.revisions.get(path).cloned().ok_or_else(|| {
            ChangeflowError::record(format!("No commit found for {}", path.display()))
        })
    }

    fn commit_all(&self, message: &str) -> Result<String> {
        self.commits.lock().unwrap().push(message.to_string());
        Ok("0123456789abcdef0123456789abcdef01234567".to_string())
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        Ok(self.tags.lock().unwrap().iter().any(|t| t == name))
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        if self.tag_exists(name)? {
            return Err(ChangeflowError::tag(format!(
                "Tag '{}' already exists",
                name
            )));
        }
        self.tags.lock().unwrap().push(name.to_string());
        Ok(())
    }

    fn last_commit_adds_record(&self, _dir: &Path) -> Result<bool> {
        Ok(self.head_adds_record)
    }
}
