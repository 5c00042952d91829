//! Path containment checks for the directory being organized.
//!
//! Two paths matter for a run: the [`AllowedRoot`], an outer boundary set once
//! from configuration, and the [`TargetDirectory`], which must be an existing
//! directory equal to or nested under that boundary. Both are resolved to
//! absolute, symlink-free paths before comparison and never change afterward.

use crate::error::ConfigError;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Outermost boundary the organizer may ever touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedRoot(PathBuf);

impl AllowedRoot {
    /// Resolve the configured boundary (`~` expands to the home directory).
    pub fn resolve(raw: &str) -> Result<Self, ConfigError> {
        let expanded = expand_path(raw).map_err(|e| {
            ConfigError::Invalid(format!("cannot resolve allowed root `{raw}`: {e}"))
        })?;
        // A missing boundary still works as a (never satisfied) prefix.
        Ok(Self(fs::canonicalize(&expanded).unwrap_or(expanded)))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// A validated directory to organize. Only [`validate`] constructs one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDirectory(PathBuf);

impl TargetDirectory {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for TargetDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Why a candidate directory was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The path could not be turned into an absolute path at all.
    Unresolvable { input: String, reason: String },
    NotFound(PathBuf),
    NotADirectory(PathBuf),
    OutsideRoot { path: PathBuf, root: PathBuf },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolvable { input, reason } => {
                write!(f, "cannot resolve `{input}`: {reason}")
            }
            Self::NotFound(path) => write!(f, "'{}' does not exist", path.display()),
            Self::NotADirectory(path) => write!(f, "'{}' is not a directory", path.display()),
            Self::OutsideRoot { path, root } => write!(
                f,
                "'{}' is outside the allowed top-level path '{}'",
                path.display(),
                root.display()
            ),
        }
    }
}

impl std::error::Error for Rejection {}

/// Check that `candidate` is an existing directory inside `root`.
///
/// Pure with respect to the filesystem: it only reads metadata. Callers that
/// take input interactively re-prompt on `Err`.
pub fn validate(candidate: &str, root: &AllowedRoot) -> Result<TargetDirectory, Rejection> {
    let expanded = expand_path(candidate).map_err(|e| Rejection::Unresolvable {
        input: candidate.to_string(),
        reason: e.to_string(),
    })?;

    let metadata = match fs::metadata(&expanded) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Rejection::NotFound(expanded));
        }
        Err(e) => {
            return Err(Rejection::Unresolvable {
                input: candidate.to_string(),
                reason: e.to_string(),
            });
        }
    };
    if !metadata.is_dir() {
        return Err(Rejection::NotADirectory(expanded));
    }

    let resolved = fs::canonicalize(&expanded).map_err(|e| Rejection::Unresolvable {
        input: candidate.to_string(),
        reason: e.to_string(),
    })?;
    // Component-wise: `/home/al` is not a prefix of `/home/alice`.
    if !resolved.starts_with(root.path()) {
        return Err(Rejection::OutsideRoot {
            path: resolved,
            root: root.path().to_path_buf(),
        });
    }
    Ok(TargetDirectory(resolved))
}

/// Expand a leading `~` and make the path absolute against the working
/// directory. Does not touch the filesystem beyond reading the cwd.
pub fn expand_path(raw: &str) -> io::Result<PathBuf> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty path"));
    }

    let expanded = if trimmed == "~" {
        home_dir()?
    } else if let Some(rest) = trimmed
        .strip_prefix("~/")
        .or_else(|| trimmed.strip_prefix("~\\"))
    {
        home_dir()?.join(rest)
    } else {
        PathBuf::from(trimmed)
    };

    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(std::env::current_dir()?.join(expanded))
    }
}

fn home_dir() -> io::Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "home directory is unknown"))
}
