//! Collision-free destination names for uploaded files.
//!
//! A file name such as `"Rapport Final.pdf"` becomes `rapport-final.pdf`,
//! then `rapport-final-2.pdf`, `rapport-final-3.pdf`, ... while earlier
//! candidates are taken.
use crate::error::{AllocationExhaustedSnafu, PathOutsideRootSnafu, Result};
use crate::storage::constants::MAX_ALLOCATION_ATTEMPTS;
use crate::storage::resolver::PathResolver;
use crate::storage::utils::path::build_relative_path;
use crate::storage::utils::slug::{
    file_name_component, slugify, slugify_subdir, split_extension,
};
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::PathBuf;

/// A destination chosen for an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// Forward-slash path relative to the storage root; what callers persist.
    pub relative_path: String,
    pub absolute_path: PathBuf,
}

/// An allocation whose file has already been created, empty, on disk.
#[derive(Debug)]
pub struct Reservation {
    pub allocation: Allocation,
    pub file: File,
}

impl Reservation {
    pub fn into_parts(self) -> (Allocation, File) {
        (self.allocation, self.file)
    }
}

/// Sanitized pieces of a destination name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePlan {
    pub dir: String,
    pub stem: String,
    pub extension: String,
}

impl NamePlan {
    pub fn new(original_filename: &str, subdir: Option<&str>) -> Self {
        let (base, extension) = split_extension(file_name_component(original_filename));
        let dir = match subdir {
            Some(label) if !label.is_empty() => slugify_subdir(label),
            _ => String::new(),
        };
        Self {
            dir,
            stem: slugify(base),
            extension,
        }
    }

    /// File name tried on the given attempt (1-based).
    pub fn candidate_file_name(&self, attempt: u32) -> String {
        if attempt <= 1 {
            format!("{}{}", self.stem, self.extension)
        } else {
            format!("{}-{}{}", self.stem, attempt, self.extension)
        }
    }

    /// Relative path tried on the given attempt (1-based).
    pub fn candidate(&self, attempt: u32) -> String {
        build_relative_path(&self.dir, &self.candidate_file_name(attempt))
    }
}

#[derive(Debug, Clone)]
pub struct NameAllocator {
    resolver: PathResolver,
    max_attempts: u32,
}

impl NameAllocator {
    pub fn new(resolver: PathResolver) -> Self {
        Self {
            resolver,
            max_attempts: MAX_ALLOCATION_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Pick the first candidate whose absolute path does not exist yet.
    ///
    /// Only existence checks are performed; nothing is created. Two callers
    /// racing on the same name can both receive the same allocation, use
    /// [`NameAllocator::reserve`] when the file is written right away.
    pub fn next_available(
        &self,
        original_filename: &str,
        subdir: Option<&str>,
    ) -> Result<Allocation> {
        let plan = NamePlan::new(original_filename, subdir);
        for attempt in 1..=self.max_attempts {
            let relative_path = plan.candidate(attempt);
            let absolute_path = self.resolver.to_absolute(&relative_path);
            if !absolute_path.exists() {
                log::debug!("allocated relative_path={relative_path} attempt={attempt}");
                return Ok(Allocation {
                    relative_path,
                    absolute_path,
                });
            }
        }
        self.exhausted(original_filename)
    }

    /// Like [`NameAllocator::next_available`], but claims the winning name by
    /// creating the file exclusively. Parent directories are created as needed.
    pub fn reserve(&self, original_filename: &str, subdir: Option<&str>) -> Result<Reservation> {
        let plan = NamePlan::new(original_filename, subdir);
        let parent = self.prepare_dir(&plan.dir)?;

        for attempt in 1..=self.max_attempts {
            let relative_path = plan.candidate(attempt);
            let absolute_path = parent.join(plan.candidate_file_name(attempt));
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&absolute_path)
            {
                Ok(file) => {
                    log::debug!("reserved relative_path={relative_path} attempt={attempt}");
                    return Ok(Reservation {
                        allocation: Allocation {
                            relative_path,
                            absolute_path,
                        },
                        file,
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.exhausted(original_filename)
    }

    /// Create `dir` under the root one segment at a time.
    ///
    /// Each segment is resolved and checked against the root before the next
    /// one is created, so a symlinked ancestor never gets anything created
    /// beneath it.
    fn prepare_dir(&self, dir: &str) -> Result<PathBuf> {
        fs::create_dir_all(self.resolver.root())?;
        let root = self.resolver.canonical_root();
        let mut current = root.clone();
        for segment in dir.split('/').filter(|segment| !segment.is_empty()) {
            let next = current.join(segment);
            match fs::create_dir(&next) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => return Err(e.into()),
            }
            let resolved = next.canonicalize()?;
            if !resolved.starts_with(&root) {
                log::warn!(
                    "rejected subdirectory outside storage root dir={dir} resolved={}",
                    resolved.display()
                );
                return PathOutsideRootSnafu {
                    path: dir.to_string(),
                }
                .fail();
            }
            current = resolved;
        }
        Ok(current)
    }

    fn exhausted<T>(&self, original_filename: &str) -> Result<T> {
        AllocationExhaustedSnafu {
            name: original_filename.to_string(),
            attempts: self.max_attempts,
        }
        .fail()
    }
}
