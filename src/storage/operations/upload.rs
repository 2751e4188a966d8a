use crate::error::{DirectoryUploadNotSupportedSnafu, PathNotFoundSnafu, Result};
use crate::storage::allocator::{Allocation, NameAllocator};
use crate::storage::constants::{DEFAULT_BUFFER_SIZE, PROGRESS_UPDATE_INTERVAL};
use crate::storage::resolver::PathResolver;
use crate::storage::utils::progress::ConsoleProgressReporter;
use serde::Serialize;
use snafu::ensure;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};

/// Outcome of a stored upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadReceipt {
    pub local_path: String,
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub url: String,
    pub size: u64,
}

/// Trait for storing local files under a freshly allocated name.
pub trait Uploader {
    /// Upload a single local file into storage.
    ///
    /// # Arguments
    /// * `local_path` - Source file on the local filesystem
    /// * `name` - File name to allocate from, defaults to the source file name
    /// * `subdir` - Optional logical subdirectory label
    /// * `show_progress` - Whether to print progress while copying
    ///
    /// # Returns
    /// * `Result<UploadReceipt>` - Where the file landed, or detailed error information
    async fn upload(
        &self,
        local_path: &str,
        name: Option<&str>,
        subdir: Option<&str>,
        show_progress: bool,
    ) -> Result<UploadReceipt>;
}

/// Uploader writing straight into the reserved file under the storage root.
pub struct FsUploader {
    allocator: NameAllocator,
    resolver: PathResolver,
}

impl FsUploader {
    pub fn new(allocator: NameAllocator, resolver: PathResolver) -> Self {
        Self {
            allocator,
            resolver,
        }
    }

    /// Reserve a name for `original_name` and stream `reader` into it.
    ///
    /// The reserved file is removed again when the copy fails.
    async fn store<R>(
        &self,
        reader: R,
        original_name: &str,
        subdir: Option<&str>,
        reporter: &ConsoleProgressReporter,
    ) -> Result<(Allocation, u64)>
    where
        R: AsyncRead + Unpin,
    {
        let (allocation, file) = self.allocator.reserve(original_name, subdir)?.into_parts();
        match copy_streaming(reader, file, reporter).await {
            Ok(size) => Ok((allocation, size)),
            Err(e) => {
                self.discard(&allocation).await;
                Err(e)
            }
        }
    }

    async fn discard(&self, allocation: &Allocation) {
        if let Err(e) = fs::remove_file(&allocation.absolute_path).await {
            log::warn!(
                "failed to remove partial upload path={} error={}",
                allocation.absolute_path.display(),
                e
            );
        }
    }
}

impl Uploader for FsUploader {
    async fn upload(
        &self,
        local_path: &str,
        name: Option<&str>,
        subdir: Option<&str>,
        show_progress: bool,
    ) -> Result<UploadReceipt> {
        let path = Path::new(local_path);
        ensure!(
            path.exists(),
            PathNotFoundSnafu {
                path: path.to_path_buf()
            }
        );
        ensure!(
            !path.is_dir(),
            DirectoryUploadNotSupportedSnafu {
                path: path.to_path_buf()
            }
        );

        let original_name = match name {
            Some(name) => name.to_string(),
            None => path
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        let source = fs::File::open(path).await?;
        let file_size = source.metadata().await?.len();
        let reporter = if show_progress {
            ConsoleProgressReporter::new(
                format!("Uploading {local_path}"),
                Some(file_size),
                DEFAULT_BUFFER_SIZE as u64 * PROGRESS_UPDATE_INTERVAL,
            )
        } else {
            ConsoleProgressReporter::silent()
        };

        let (allocation, size) = self
            .store(BufReader::new(source), &original_name, subdir, &reporter)
            .await?;

        log::info!(
            "stored upload local_path={} relative_path={} size={}",
            local_path,
            allocation.relative_path,
            size
        );
        Ok(UploadReceipt {
            local_path: local_path.to_string(),
            url: self.resolver.to_public_url(&allocation.relative_path),
            relative_path: allocation.relative_path,
            absolute_path: allocation.absolute_path,
            size,
        })
    }
}

async fn copy_streaming<R>(
    mut reader: R,
    destination: std::fs::File,
    reporter: &ConsoleProgressReporter,
) -> Result<u64>
where
    R: AsyncRead + Unpin,
{
    let mut writer = fs::File::from_std(destination);
    let mut buffer = vec![0u8; DEFAULT_BUFFER_SIZE];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = reader.read(&mut buffer).await?;
        if bytes_read == 0 {
            break;
        }
        writer.write_all(&buffer[..bytes_read]).await?;
        total_bytes += bytes_read as u64;
        reporter.maybe_report(total_bytes);
    }
    writer.flush().await?;
    reporter.finish(total_bytes);
    Ok(total_bytes)
}
