// Path helper utilities shared by the resolver, the allocator and the operations
use crate::storage::constants::{DEFAULT_MEDIA_PREFIX, RESERVED_PREFIX};
use std::path::{Component, Path, PathBuf};
use url::Url;

/// Normalize a caller-supplied reference into a relative storage path.
///
/// Surrounding whitespace is trimmed, backslashes become forward slashes,
/// leading slashes are dropped and one leading `storage/` segment is removed.
pub fn normalize_relative(input: &str) -> String {
    let unified = input.trim().replace('\\', "/");
    let relative = unified.trim_start_matches('/');
    let relative = relative.strip_prefix(RESERVED_PREFIX).unwrap_or(relative);
    relative.trim_start_matches('/').to_string()
}

/// Join `relative` (forward-slash separated) onto `base`, collapsing `.` and `..`
/// without touching the filesystem. `..` may climb above `base`.
pub fn join_lexical(base: &Path, relative: &str) -> PathBuf {
    let mut path = base.to_path_buf();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                path.pop();
            }
            other => path.push(other),
        }
    }
    path
}

/// Collapse `.` and `..` components of an absolute path lexically.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

/// Build a relative storage path by joining a directory and a file name with `/`.
pub fn build_relative_path(dir: &str, file_name: &str) -> String {
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        file_name.to_string()
    } else {
        format!("{dir}/{file_name}")
    }
}

/// Return a new String that guarantees a trailing '/'.
pub fn ensure_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

/// Derive the public URL prefix from a configured value.
///
/// Drive-letter filesystem paths (`C:/...`, `C:\...`) fall back to `/media`,
/// full URLs keep only their path (`/media` when they have none), and the
/// result always has one leading slash and no trailing slash. A bare `/`,
/// or a URL whose path is just `/`, yields the empty prefix.
pub fn sanitize_media_prefix(raw: &str) -> String {
    let value = raw.trim();
    if value.is_empty() || looks_like_drive_path(value) {
        return DEFAULT_MEDIA_PREFIX.to_string();
    }

    let path = if value.contains("://") {
        match Url::parse(value) {
            Ok(url) if has_explicit_path(value) => url.path().to_string(),
            _ => return DEFAULT_MEDIA_PREFIX.to_string(),
        }
    } else {
        value.to_string()
    };

    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

// The url crate reports `/` for `https://host` too, so look at the raw text.
fn has_explicit_path(value: &str) -> bool {
    value.split_once("://").is_some_and(|(_, rest)| {
        rest.find(['/', '?', '#'])
            .is_some_and(|index| rest[index..].starts_with('/'))
    })
}

fn looks_like_drive_path(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && matches!(bytes[2], b'/' | b'\\')
}
