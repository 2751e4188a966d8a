use crate::error::Result;
use crate::storage::StorageConfig;
use crate::storage::constants::{DEFAULT_FS_ROOT, DEFAULT_MEDIA_PREFIX};
use std::env;
use std::path::PathBuf;

// Read the first of two environment variables that is set.
fn get_env_var(primary_key: &str, secondary_key: &str) -> Option<String> {
    env::var(primary_key)
        .or_else(|_| env::var(secondary_key))
        .ok()
}

/// Load storage configuration from environment variables.
///
/// - `STORAGE_ROOT` (or `STORAGE_ROOT_PATH`): storage root, default `./storage`
/// - `MEDIA_URL_PREFIX`: public URL prefix, default `/media`
///
/// Explicit overrides (command-line flags) win over the environment.
pub fn load_storage_config(
    root_override: Option<PathBuf>,
    media_prefix_override: Option<String>,
) -> Result<StorageConfig> {
    let root = root_override.unwrap_or_else(|| {
        get_env_var("STORAGE_ROOT", "STORAGE_ROOT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FS_ROOT))
    });

    let media_prefix = media_prefix_override
        .or_else(|| env::var("MEDIA_URL_PREFIX").ok())
        .unwrap_or_else(|| DEFAULT_MEDIA_PREFIX.to_string());

    let config = StorageConfig::new(&root, &media_prefix)?;
    log::debug!(
        "storage config root={} media_prefix={:?} (configured {:?})",
        config.root().display(),
        config.media_prefix(),
        media_prefix
    );
    Ok(config)
}
