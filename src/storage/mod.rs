mod local;

pub use local::{write_atomically, LocalStorage, StorageError};

pub const DARK_MODE_KEY: &str = "darkMode";
pub const AUTO_REFRESH_KEY: &str = "autoRefresh";
pub const HISTORY_KEY: &str = "emailHistory";
