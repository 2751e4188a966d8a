use crate::error::{Error, NotAFileSnafu, PathOutsideRootSnafu, Result};
use crate::storage::resolver::PathResolver;
use crate::storage::utils::size::{format_size, megabytes};
use crate::wrap_err;
use opendal::Operator;
use snafu::{OptionExt, ensure};
use std::io::{self, IsTerminal, Write};

pub trait FileReader {
    /// Print a stored file to stdout once it has passed the root boundary check.
    async fn read_and_display(&self, path: &str, size_limit_mb: u64, force: bool) -> Result<()>;
}

/// OpenDAL implementation of file reading
pub struct OpenDalFileReader {
    operator: Operator,
    resolver: PathResolver,
}

impl OpenDalFileReader {
    pub fn new(operator: Operator, resolver: PathResolver) -> Self {
        Self { operator, resolver }
    }

    /// Confine `path` to the storage root and return its normalized relative form.
    fn locate(&self, path: &str) -> Result<String> {
        let absolute = self.resolver.confine(path)?;
        ensure!(
            absolute.is_file(),
            NotAFileSnafu {
                path: path.to_string()
            }
        );
        self.resolver
            .relative_of(&absolute)
            .context(PathOutsideRootSnafu {
                path: path.to_string(),
            })
    }

    async fn validate_cat_argument(
        &self,
        relative: &str,
        size_limit_mb: u64,
        force: bool,
    ) -> Result<bool> {
        let metadata = wrap_err!(
            self.operator.stat(relative).await,
            CatFailed {
                path: relative.to_string()
            }
        )?;

        let content_length = metadata.content_length();
        if force || content_length <= megabytes(size_limit_mb) {
            return Ok(true);
        }
        self.prompt_large_file_confirmation(content_length, size_limit_mb)
    }

    fn prompt_large_file_confirmation(&self, file_size: u64, size_limit_mb: u64) -> Result<bool> {
        if !io::stdin().is_terminal() {
            eprintln!(
                "File too large ({} > {size_limit_mb}M). Use --force to print it anyway.",
                format_size(file_size)
            );
            return Ok(false);
        }

        eprint!(
            "File is large ({}). Do you want to display it? (y/N) ",
            format_size(file_size)
        );
        io::stderr().flush()?;

        let mut input = String::new();
        io::stdin()
            .read_line(&mut input)
            .map_err(|e| Error::CatFailed {
                path: "stdin".to_string(),
                source: Box::new(e.into()),
            })?;

        match input.trim().to_lowercase().as_str() {
            "y" | "yes" => Ok(true),
            _ => {
                eprintln!("Display cancelled.");
                Ok(false)
            }
        }
    }
}

impl FileReader for OpenDalFileReader {
    async fn read_and_display(&self, path: &str, size_limit_mb: u64, force: bool) -> Result<()> {
        let relative = self.locate(path)?;

        if !self.validate_cat_argument(&relative, size_limit_mb, force).await? {
            return Ok(());
        }

        let content = wrap_err!(
            self.operator.read(&relative).await,
            CatFailed {
                path: relative.clone()
            }
        )?;

        let mut stdout = io::stdout().lock();
        wrap_err!(
            stdout
                .write_all(&content.to_vec())
                .and_then(|_| stdout.flush()),
            CatFailed { path: relative }
        )
    }
}
