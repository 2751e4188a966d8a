// Utilities for storage module
pub mod error;
pub mod path;
pub mod progress;
pub mod size;
pub mod slug;

/// Output format for CLI commands that can render machine-readable results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human friendly multi-line output
    Human,
    /// Key-value lines, one `key=value` per line
    Raw,
    /// Single-line JSON output
    Json,
}

impl OutputFormat {
    pub fn from_flags(json: bool, raw: bool) -> Self {
        if json {
            Self::Json
        } else if raw {
            Self::Raw
        } else {
            Self::Human
        }
    }
}
