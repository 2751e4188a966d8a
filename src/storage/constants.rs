// Buffer related constants
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

// Progress related constants
// Controls how often progress is printed (in multiples of buffer size)
pub const PROGRESS_UPDATE_INTERVAL: u64 = 100;

// Filesystem defaults
pub const DEFAULT_FS_ROOT: &str = "./storage";
pub const DEFAULT_MEDIA_PREFIX: &str = "/media";

// Leading segment callers may put in front of a relative path
pub const RESERVED_PREFIX: &str = "storage/";

// Naming
pub const FALLBACK_STEM: &str = "fichier";
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 10_000;

// Default size (in MB) above which `cat` asks for confirmation
pub const CAT_CONFIRM_SIZE_MB: u64 = 10;
