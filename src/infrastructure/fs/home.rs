//! Home directory resolution with test isolation support.
//!
//! On Windows, `dirs::home_dir()` uses the Windows system API rather than
//! environment variables, so setting `HOME` in tests has no effect there.
//! `omnirelease_home_dir()` checks `OMNIRELEASE_TEST_HOME` first and falls back
//! to `dirs::home_dir()`.

use std::path::{Path, PathBuf};

/// Environment variable for test isolation of the home directory.
pub const OMNIRELEASE_TEST_HOME_VAR: &str = "OMNIRELEASE_TEST_HOME";

/// Home directory used for the default state root and `~` expansion
pub fn omnirelease_home_dir() -> Option<PathBuf> {
    std::env::var(OMNIRELEASE_TEST_HOME_VAR)
        .ok()
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
}

/// Expand a leading `~` in a configured path
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match omnirelease_home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
