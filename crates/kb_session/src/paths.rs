use std::path::{Path, PathBuf};

/// File name written by the external login tool under the user's home directory.
pub const CACHE_FILE_NAME: &str = ".teamcenter_easy_auth_cache.json";

#[must_use]
pub fn cache_path_in(home: &Path) -> PathBuf {
    home.join(CACHE_FILE_NAME)
}

/// Default location of the persisted credential cache.
///
/// Falls back to the current directory when no home directory can be resolved.
#[must_use]
pub fn default_cache_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    cache_path_in(&home)
}
