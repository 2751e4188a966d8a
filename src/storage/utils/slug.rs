//! Filename slugging used when allocating upload destinations.
use crate::storage::constants::FALLBACK_STEM;
use unicode_normalization::UnicodeNormalization;

/// Turn an arbitrary name into a lower-case ASCII slug.
///
/// Only the last path segment is used and its trailing `.suffix` is dropped,
/// so `"Rapport Final 2025.pdf"` becomes `"rapport-final-2025"` and
/// `"2025/reports"` becomes `"reports"`. Returns `"fichier"` when nothing
/// survives.
pub fn slugify(name: &str) -> String {
    let ascii: String = strip_last_suffix(name)
        .nfkd()
        .filter(char::is_ascii)
        .collect();

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_hyphen = false;
    for ch in ascii.chars().map(|c| c.to_ascii_lowercase()) {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        slug
    }
}

/// Slugify a logical subdirectory label; every hyphen of the slug becomes a
/// directory separator. Slashes in the label do not nest, only the last
/// segment counts.
pub fn slugify_subdir(subdir: &str) -> String {
    slugify(subdir).replace('-', "/")
}

/// Keep only the final component of a client-supplied file name.
pub fn file_name_component(original: &str) -> &str {
    original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original)
}

/// Split a file name into its base and the full chain of trailing extensions.
///
/// The extension starts at the first dot, so `"archive.tar.gz"` yields
/// `("archive", ".tar.gz")` and `".gitignore"` yields `("", ".gitignore")`.
/// Empty dot-groups are dropped.
pub fn split_extension(file_name: &str) -> (&str, String) {
    match file_name.find('.') {
        None => (file_name, String::new()),
        Some(index) => {
            let extension = file_name[index..]
                .split('.')
                .filter(|group| !group.is_empty())
                .map(|group| {
                    let group: String = group.chars().filter(|c| !c.is_control()).collect();
                    format!(".{group}")
                })
                .filter(|group| group.len() > 1)
                .collect();
            (&file_name[..index], extension)
        }
    }
}

// Last path segment with its final `.suffix` removed, unless that dot leads
// the segment or ends it. Trailing separators are ignored.
fn strip_last_suffix(name: &str) -> &str {
    let trimmed = name.trim_end_matches(['/', '\\']);
    let segment = trimmed
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(trimmed);
    match segment.rfind('.') {
        Some(index) if index > 0 && index + 1 < segment.len() => &segment[..index],
        _ => segment,
    }
}
