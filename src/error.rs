use snafu::Snafu;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Storage root is not a directory: {}", path.display()))]
    StorageRootNotDirectory { path: PathBuf },

    #[snafu(display("Path does not exist: {}", path.display()))]
    PathNotFound { path: PathBuf },

    #[snafu(display("Path escapes the storage root: {path}"))]
    PathOutsideRoot { path: String },

    #[snafu(display("Not a regular file: {path}"))]
    NotAFile { path: String },

    #[snafu(display("Cannot upload a directory: {}", path.display()))]
    DirectoryUploadNotSupported { path: PathBuf },

    #[snafu(display("No free name for '{name}' after {attempts} attempts"))]
    AllocationExhausted { name: String, attempts: u32 },

    #[snafu(display("Failed to upload '{local_path}' into '{destination}': {source}"))]
    UploadFailed {
        local_path: String,
        destination: String,
        source: Box<Error>,
    },

    #[snafu(display("Failed to read '{path}': {source}"))]
    CatFailed { path: String, source: Box<Error> },

    #[snafu(display("Failed to stat '{path}': {source}"))]
    StatFailed { path: String, source: Box<Error> },

    #[snafu(display("Failed to list directory '{path}': {source}"))]
    ListDirectoryFailed { path: String, source: Box<Error> },

    #[snafu(display("OpenDAL error: {source}"))]
    OpenDal { source: opendal::Error },

    #[snafu(display("JSON error: {source}"))]
    Json { source: serde_json::Error },

    #[snafu(display("IO error: {source}"))]
    Io { source: std::io::Error },
}

impl Error {
    /// Whether a file-serving caller should answer this error with "not found".
    ///
    /// Paths escaping the storage root count as missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::PathNotFound { .. } | Error::PathOutsideRoot { .. } | Error::NotAFile { .. } => {
                true
            }
            Error::CatFailed { source, .. }
            | Error::StatFailed { source, .. }
            | Error::ListDirectoryFailed { source, .. } => source.is_not_found(),
            Error::OpenDal { source } => source.kind() == opendal::ErrorKind::NotFound,
            Error::Io { source } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

impl From<opendal::Error> for Error {
    fn from(error: opendal::Error) -> Self {
        Error::OpenDal { source: error }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io { source: error }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json { source: error }
    }
}
