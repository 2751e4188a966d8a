use crate::error::{PathOutsideRootSnafu, Result};
use crate::storage::resolver::PathResolver;
use crate::storage::utils::error::IntoDocstoreError;
use crate::storage::utils::path::ensure_trailing_slash;
use crate::wrap_err;
use futures::stream::TryStreamExt;
use opendal::Operator;
use snafu::OptionExt;
use std::fmt;

/// Trait for listing the files kept under the storage root.
pub trait Lister {
    /// List contents of a stored directory.
    ///
    /// # Arguments
    /// * `path` - Directory path to list, relative to the storage root
    /// * `long` - Whether to show detailed information
    /// * `recursive` - Whether to list recursively
    ///
    /// # Returns
    /// * `Result<()>` - Success or detailed error information
    async fn list(&self, path: &str, long: bool, recursive: bool) -> Result<()>;
}

/// Implementation of Lister for OpenDAL Operator.
pub struct OpenDalLister {
    operator: Operator,
    resolver: PathResolver,
}

impl OpenDalLister {
    /// Create a new lister with the given OpenDAL operator.
    pub fn new(operator: Operator, resolver: PathResolver) -> Self {
        Self { operator, resolver }
    }

    /// Print a single entry with optional detailed formatting.
    async fn print_entry(&self, entry: &opendal::Entry, long: bool) -> Result<()> {
        if !long {
            println!("{}", entry.path());
            return Ok(());
        }

        let file_info = if entry.metadata().mode().is_dir() {
            FileInfo::from_entry(entry, None)
        } else {
            let meta = self.operator.stat(entry.path()).await?;
            FileInfo::from_entry(entry, Some(&meta))
        };
        println!("{file_info}");
        Ok(())
    }
}

impl Lister for OpenDalLister {
    async fn list(&self, path: &str, long: bool, recursive: bool) -> Result<()> {
        let absolute = self.resolver.confine(path)?;
        let relative = self
            .resolver
            .relative_of(&absolute)
            .context(PathOutsideRootSnafu {
                path: path.to_string(),
            })?;

        if absolute.is_file() {
            let entry_path = relative.clone();
            let meta = wrap_err!(
                self.operator.stat(&entry_path).await,
                ListDirectoryFailed { path: relative }
            )?;
            if long {
                println!("{}", FileInfo::from_meta(entry_path, &meta));
            } else {
                println!("{entry_path}");
            }
            return Ok(());
        }

        let dir = if relative.is_empty() {
            "/".to_string()
        } else {
            ensure_trailing_slash(&relative)
        };
        let lister = wrap_err!(
            self.operator.lister_with(&dir).recursive(recursive).await,
            ListDirectoryFailed { path: dir.clone() }
        )?;

        lister
            .map_err(|e| crate::error::Error::ListDirectoryFailed {
                path: dir.clone(),
                source: Box::new(e.into_error()),
            })
            .try_for_each(|entry| {
                let dir = dir.as_str();
                async move {
                    // The listed directory reports itself first.
                    if entry.path() == dir || entry.path() == dir.trim_start_matches('/') {
                        return Ok(());
                    }
                    self.print_entry(&entry, long).await
                }
            })
            .await
    }
}

/// File information for detailed listing output.
struct FileInfo {
    path: String,
    size: u64,
    modified: Option<String>,
    is_dir: bool,
}

impl FileInfo {
    fn from_entry(entry: &opendal::Entry, stat: Option<&opendal::Metadata>) -> Self {
        let meta = stat.unwrap_or_else(|| entry.metadata());
        Self::from_meta(entry.path().to_string(), meta)
    }

    fn from_meta(path: String, meta: &opendal::Metadata) -> Self {
        Self {
            path,
            size: meta.content_length(),
            modified: meta.last_modified().map(|t| t.to_string()),
            is_dir: meta.mode().is_dir(),
        }
    }
}

impl fmt::Display for FileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file_type = if self.is_dir { "DIR" } else { "FILE" };
        let size_str = if self.is_dir {
            "-".to_string()
        } else {
            crate::storage::utils::size::format_size(self.size)
        };
        let modified = self.modified.as_deref().unwrap_or("Unknown");
        write!(f, "{file_type:<6} {size_str:>10} {modified} {}", self.path)
    }
}
