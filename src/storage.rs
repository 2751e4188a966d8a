use crate::error::{Result, StorageRootNotDirectorySnafu};
use opendal::Operator;
use snafu::ensure;
use std::path::{Path, PathBuf};

pub mod allocator;
pub mod constants;
mod operations;
pub mod resolver;
pub mod utils;

use self::allocator::{Allocation, NameAllocator};
use self::operations::cat::OpenDalFileReader;
use self::operations::list::OpenDalLister;
use self::operations::stat::OpenDalStater;
use self::operations::upload::FsUploader;
use self::operations::{FileReader, Lister, Stater, Uploader};
use self::resolver::PathResolver;
use self::utils::path::{clean_path, sanitize_media_prefix};
use crate::wrap_err;

pub use self::operations::stat::ObjectMeta;
pub use self::operations::upload::UploadReceipt;

/// Immutable storage settings shared by the resolver and the allocator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    root: PathBuf,
    media_prefix: String,
}

impl StorageConfig {
    /// Build a configuration from a root directory and a raw media URL prefix.
    ///
    /// The root is made absolute (and canonical when it already exists); the
    /// prefix goes through [`sanitize_media_prefix`].
    pub fn new(root: impl AsRef<Path>, media_prefix: &str) -> Result<Self> {
        let root = clean_path(&std::path::absolute(root.as_ref())?);
        ensure!(
            !root.exists() || root.is_dir(),
            StorageRootNotDirectorySnafu { path: root.clone() }
        );
        let root = root.canonicalize().unwrap_or(root);

        Ok(Self {
            root,
            media_prefix: sanitize_media_prefix(media_prefix),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn media_prefix(&self) -> &str {
        &self.media_prefix
    }
}

/// Storage client bundling path resolution, name allocation and an OpenDAL
/// filesystem operator rooted at the storage root.
#[derive(Clone)]
pub struct StorageClient {
    operator: Operator,
    resolver: PathResolver,
    allocator: NameAllocator,
}

impl StorageClient {
    pub fn new(config: StorageConfig) -> Result<Self> {
        let operator = Self::build_operator(&config)?;
        let resolver = PathResolver::new(&config);
        let allocator = NameAllocator::new(resolver.clone());
        Ok(Self {
            operator,
            resolver,
            allocator,
        })
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn allocator(&self) -> &NameAllocator {
        &self.allocator
    }

    fn build_operator(config: &StorageConfig) -> Result<Operator> {
        let root = config.root().to_string_lossy();
        let builder = opendal::services::Fs::default().root(&root);
        Ok(Operator::new(builder)?.finish())
    }

    /// Absolute path for a stored reference, optionally enforcing the root boundary.
    pub fn resolve(&self, path: &str, check: bool) -> Result<PathBuf> {
        log::debug!("resolve path={} check={}", path, check);
        if check {
            self.resolver.confine(path)
        } else {
            Ok(self.resolver.to_absolute(path))
        }
    }

    pub fn public_url(&self, path: &str) -> String {
        log::debug!("public_url path={}", path);
        self.resolver.to_public_url(path)
    }

    /// Preview the destination an upload of `file_name` would get.
    pub fn allocate(&self, file_name: &str, subdir: Option<&str>) -> Result<Allocation> {
        log::debug!("allocate file_name={} subdir={:?}", file_name, subdir);
        self.allocator.next_available(file_name, subdir)
    }

    pub async fn upload_file(
        &self,
        local_path: &str,
        name: Option<&str>,
        subdir: Option<&str>,
        show_progress: bool,
    ) -> Result<UploadReceipt> {
        log::debug!(
            "upload_file local_path={} name={:?} subdir={:?}",
            local_path,
            name,
            subdir
        );
        let uploader = FsUploader::new(self.allocator.clone(), self.resolver.clone());
        wrap_err!(
            uploader.upload(local_path, name, subdir, show_progress).await,
            UploadFailed {
                local_path: local_path.to_string(),
                destination: subdir.unwrap_or("/").to_string()
            }
        )
    }

    pub async fn cat_file(&self, path: &str, size_limit_mb: u64, force: bool) -> Result<()> {
        log::debug!(
            "cat_file path={} size_limit_mb={} force={}",
            path,
            size_limit_mb,
            force
        );
        let reader = OpenDalFileReader::new(self.operator.clone(), self.resolver.clone());
        reader.read_and_display(path, size_limit_mb, force).await
    }

    pub async fn stat(&self, path: &str) -> Result<ObjectMeta> {
        log::debug!("stat path={}", path);
        let stater = OpenDalStater::new(self.operator.clone(), self.resolver.clone());
        stater.stat(path).await
    }

    pub async fn list_directory(&self, path: &str, long: bool, recursive: bool) -> Result<()> {
        log::debug!(
            "list_directory path={} long={} recursive={}",
            path,
            long,
            recursive
        );
        let lister = OpenDalLister::new(self.operator.clone(), self.resolver.clone());
        lister.list(path, long, recursive).await
    }
}
