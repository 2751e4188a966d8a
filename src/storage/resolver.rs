//! Translation between relative storage references, absolute filesystem
//! paths under the storage root, and public media URLs.
use crate::error::{PathNotFoundSnafu, PathOutsideRootSnafu, Result};
use crate::storage::StorageConfig;
use crate::storage::utils::path::{join_lexical, normalize_relative};
use snafu::ensure;
use std::path::{Component, Path, PathBuf};

/// Resolves relative storage paths against a fixed root.
///
/// Path math is total: [`PathResolver::to_absolute`] always returns a path,
/// even one outside the root. Anything about to touch the disk on behalf of
/// a caller-supplied path goes through [`PathResolver::confine`] first.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    media_prefix: String,
}

impl PathResolver {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: config.root().to_path_buf(),
            media_prefix: config.media_prefix().to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn media_prefix(&self) -> &str {
        &self.media_prefix
    }

    /// Normalize a reference into a forward-slash path relative to the root.
    pub fn normalize(&self, input: &str) -> String {
        normalize_relative(input)
    }

    /// Absolute location of `input` under the root, with `.`/`..` collapsed and
    /// symlinks resolved when the target exists.
    pub fn to_absolute(&self, input: &str) -> PathBuf {
        let joined = join_lexical(&self.root, &normalize_relative(input));
        joined.canonicalize().unwrap_or(joined)
    }

    /// Public URL path of `input`, e.g. `/media/rapport-final.pdf`.
    pub fn to_public_url(&self, input: &str) -> String {
        format!("{}/{}", self.media_prefix, normalize_relative(input))
    }

    /// Whether `path` is the root or lies beneath it.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root) || path.starts_with(self.canonical_root())
    }

    /// Relative storage path of an absolute path under the root.
    pub fn relative_of(&self, absolute: &Path) -> Option<String> {
        let stripped = absolute
            .strip_prefix(&self.root)
            .ok()
            .map(Path::to_path_buf)
            .or_else(|| {
                absolute
                    .strip_prefix(self.canonical_root())
                    .ok()
                    .map(Path::to_path_buf)
            })?;

        let mut segments = Vec::new();
        for component in stripped.components() {
            match component {
                Component::Normal(segment) => {
                    segments.push(segment.to_string_lossy().into_owned())
                }
                _ => return None,
            }
        }
        Some(segments.join("/"))
    }

    /// Resolve `input` and enforce that it stays under the root and exists.
    ///
    /// Escapes are reported as [`crate::error::Error::PathOutsideRoot`],
    /// missing targets as [`crate::error::Error::PathNotFound`].
    pub fn confine(&self, input: &str) -> Result<PathBuf> {
        let absolute = self.to_absolute(input);
        if !self.contains(&absolute) {
            log::warn!(
                "rejected path outside storage root input={:?} resolved={}",
                input,
                absolute.display()
            );
            return PathOutsideRootSnafu {
                path: input.to_string(),
            }
            .fail();
        }
        ensure!(absolute.exists(), PathNotFoundSnafu { path: absolute });
        Ok(absolute)
    }

    /// The root with symlinks resolved, or the configured root if it is missing.
    pub fn canonical_root(&self) -> PathBuf {
        self.root
            .canonicalize()
            .unwrap_or_else(|_| self.root.clone())
    }
}
