// Storage operation traits and implementations
pub mod cat;
pub mod list;
pub mod stat;
pub mod upload;

pub use cat::FileReader;
pub use list::Lister;
pub use stat::Stater;
pub use upload::Uploader;
