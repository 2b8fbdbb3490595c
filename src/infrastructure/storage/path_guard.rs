use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::errors::PathGuardError;

/// Confines file paths to a base directory.
///
/// Both the base and the candidate are resolved to canonical absolute form,
/// following symlinks, before the containment check. Lexical checks alone
/// miss symlinks that point outside the base.
#[derive(Debug, Clone)]
pub struct PathGuard {
    base: PathBuf,
}

impl PathGuard {
    /// The base directory must exist
    pub fn new(base: impl AsRef<Path>) -> Result<Self, PathGuardError> {
        let base = base
            .as_ref()
            .canonicalize()
            .map_err(PathGuardError::InvalidBase)?;
        Ok(Self { base })
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Resolve `candidate` (relative to the base, or absolute) and return it
    /// only if it is a strict descendant of the base.
    ///
    /// A candidate that does not exist yet is resolved through its parent
    /// directory, which must exist. A dangling symlink is followed to where
    /// a write through it would land.
    pub fn resolve(&self, candidate: impl AsRef<Path>) -> Result<PathBuf, PathGuardError> {
        let resolved = resolve_path(&self.base.join(candidate.as_ref()), 0)?;

        if resolved == self.base || !resolved.starts_with(&self.base) {
            tracing::warn!(
                base = %self.base.display(),
                "Rejected path outside its base directory"
            );
            return Err(PathGuardError::OutsideBase);
        }

        Ok(resolved)
    }
}

/// Links followed before giving up, as with the kernel's `ELOOP`
const MAX_SYMLINK_HOPS: usize = 40;

fn resolve_path(path: &Path, hops: usize) -> Result<PathBuf, PathGuardError> {
    match path.canonicalize() {
        Ok(resolved) => Ok(resolved),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let file_name = path.file_name().ok_or(PathGuardError::InvalidComponent)?;
            let parent = path
                .parent()
                .ok_or(PathGuardError::InvalidComponent)?
                .canonicalize()
                .map_err(PathGuardError::Unresolvable)?;
            let candidate = parent.join(file_name);

            // `canonicalize` reports a dangling symlink as NotFound
            match fs::symlink_metadata(&candidate) {
                Ok(metadata) if metadata.file_type().is_symlink() => {
                    if hops >= MAX_SYMLINK_HOPS {
                        return Err(PathGuardError::Unresolvable(io::Error::other(
                            "too many levels of symbolic links",
                        )));
                    }
                    let target = fs::read_link(&candidate).map_err(PathGuardError::Unresolvable)?;
                    resolve_path(&parent.join(target), hops + 1)
                }
                _ => Ok(candidate),
            }
        }
        Err(e) => Err(PathGuardError::Unresolvable(e)),
    }
}

/// One-shot form of [`PathGuard::resolve`]
pub fn resolve_within_base(
    base: impl AsRef<Path>,
    candidate: impl AsRef<Path>,
) -> Result<PathBuf, PathGuardError> {
    PathGuard::new(base)?.resolve(candidate)
}
