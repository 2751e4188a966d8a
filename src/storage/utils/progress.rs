use std::io::{self, Write};

/// A minimal progress reporter that prints percentage updates to stderr,
/// leaving stdout free for the command result.
pub struct ConsoleProgressReporter {
    label: String,
    total_bytes: Option<u64>,
    step_bytes: u64,
    enabled: bool,
}

impl ConsoleProgressReporter {
    pub fn new(label: impl Into<String>, total_bytes: Option<u64>, step_bytes: u64) -> Self {
        Self {
            label: label.into(),
            total_bytes,
            step_bytes: step_bytes.max(1),
            enabled: true,
        }
    }

    /// A reporter that never prints, for machine-readable output modes.
    pub fn silent() -> Self {
        Self {
            label: String::new(),
            total_bytes: None,
            step_bytes: 1,
            enabled: false,
        }
    }

    /// Print progress if a reporting threshold has been reached.
    pub fn maybe_report(&self, processed_bytes: u64) {
        if !self.enabled {
            return;
        }
        if let Some(total) = self.total_bytes {
            if total == 0 {
                return;
            }
            if processed_bytes.is_multiple_of(self.step_bytes) {
                let progress = ((processed_bytes as f64 / total as f64) * 100.0) as u32;
                eprint!("\r {}: {}%", self.label, progress);
                let _ = io::stderr().flush();
            }
        }
    }

    /// Terminate the progress line once the transfer is over.
    pub fn finish(&self, processed_bytes: u64) {
        if self.enabled && processed_bytes >= self.step_bytes {
            eprintln!("\r {}: 100%", self.label);
        }
    }
}
