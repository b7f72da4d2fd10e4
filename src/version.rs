use crate::error::{ChangeflowError, Result};
use std::fmt;

/// Severity of a pending change, totally ordered for aggregation.
///
/// The derived `Ord` relies on variant declaration order:
/// `Patch < Minor < Major`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Patch,
    Minor,
    Major,
}

impl Severity {
    /// Parse a severity token (case-insensitive).
    ///
    /// Returns `None` for anything other than `patch`, `minor` or `major`;
    /// callers attach the offending file path to the error they raise.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "patch" => Some(Severity::Patch),
            "minor" => Some(Severity::Minor),
            "major" => Some(Severity::Major),
            _ => None,
        }
    }

    /// Get the severity token as a string
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Patch => "patch",
            Severity::Minor => "minor",
            Severity::Major => "major",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Semantic version representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse a canonical `X.Y.Z` version string.
    ///
    /// Uses the `semver` crate for parsing but rejects pre-release and
    /// build metadata: the persisted project version is always a plain
    /// three-segment version.
    pub fn parse(input: &str) -> Result<Self> {
        let parsed = semver::Version::parse(input.trim()).map_err(|e| {
            ChangeflowError::version(format!(
                "Expected X.Y.Z but got '{}': {}",
                input.trim(),
                e
            ))
        })?;

        if !parsed.pre.is_empty() || !parsed.build.is_empty() {
            return Err(ChangeflowError::version(format!(
                "Expected plain X.Y.Z but got '{}'",
                input.trim()
            )));
        }

        Ok(Version {
            major: parsed.major,
            minor: parsed.minor,
            patch: parsed.patch,
        })
    }

    /// Bump version according to change severity.
    ///
    /// Increments the component matching the severity and resets every
    /// lower component to 0:
    /// - **Major**: major += 1, minor = 0, patch = 0
    /// - **Minor**: minor += 1, patch = 0
    /// - **Patch**: patch += 1
    pub fn bump(&self, severity: Severity) -> Self {
        match severity {
            Severity::Major => Version {
                major: self.major + 1,
                minor: 0,
                patch: 0,
            },
            Severity::Minor => Version {
                major: self.major,
                minor: self.minor + 1,
                patch: 0,
            },
            Severity::Patch => Version {
                major: self.major,
                minor: self.minor,
                patch: self.patch + 1,
            },
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
