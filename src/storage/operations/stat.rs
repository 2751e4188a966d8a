use crate::error::{PathOutsideRootSnafu, Result};
use crate::storage::resolver::PathResolver;
use crate::storage::utils::path::ensure_trailing_slash;
use crate::wrap_err;
use opendal::{EntryMode, Operator};
use serde::Serialize;
use snafu::OptionExt;

/// Object metadata used by `stat` command output.
///
/// - `path`: Normalized path relative to the storage root
/// - `entry_type`: One of `file`, `dir`, or `other`
/// - `size`: Content length in bytes
/// - `last_modified`: Timestamp string if available
/// - `url`: Public media URL of the object
#[derive(Debug, Clone, Serialize)]
pub struct ObjectMeta {
    pub path: String,
    pub entry_type: String, // file | dir | other
    pub size: u64,
    pub last_modified: Option<String>,
    pub url: String,
}

/// Trait for fetching object metadata from storage.
pub trait Stater {
    /// Fetch metadata for a single stored file or directory.
    ///
    /// # Arguments
    /// * `path` - Stored reference to query, checked against the storage root.
    ///
    /// # Returns
    /// * `Result<ObjectMeta>` - Collected metadata for the provided path
    async fn stat<P: AsRef<str>>(&self, path: P) -> Result<ObjectMeta>;
}

/// Implementation of `Stater` for OpenDAL `Operator`.
#[derive(Clone)]
pub struct OpenDalStater {
    operator: Operator,
    resolver: PathResolver,
}

impl OpenDalStater {
    pub fn new(operator: Operator, resolver: PathResolver) -> Self {
        Self { operator, resolver }
    }
}

impl Stater for OpenDalStater {
    /// Fetch object metadata via OpenDAL's `stat` API, and normalize fields to printable types.
    async fn stat<P: AsRef<str>>(&self, path: P) -> Result<ObjectMeta> {
        let input = path.as_ref();
        let absolute = self.resolver.confine(input)?;
        let relative = self
            .resolver
            .relative_of(&absolute)
            .context(PathOutsideRootSnafu {
                path: input.to_string(),
            })?;

        let query = if absolute.is_dir() {
            if relative.is_empty() {
                "/".to_string()
            } else {
                ensure_trailing_slash(&relative)
            }
        } else {
            relative.clone()
        };
        let meta = wrap_err!(
            self.operator.stat(&query).await,
            StatFailed {
                path: input.to_string()
            }
        )?;

        let entry_type = match meta.mode() {
            EntryMode::FILE => "file".to_string(),
            EntryMode::DIR => "dir".to_string(),
            _ => "other".to_string(),
        };

        Ok(ObjectMeta {
            url: self.resolver.to_public_url(&relative),
            path: relative,
            entry_type,
            size: meta.content_length(),
            last_modified: meta.last_modified().map(|t| t.to_string()),
        })
    }
}
