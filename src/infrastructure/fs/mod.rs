//! File System Helpers
//!
//! Atomic persistence and home directory resolution.

mod atomic;
mod home;

pub use atomic::{read_json, write_atomic, write_json_atomic};
pub use home::{expand_home, omnirelease_home_dir, OMNIRELEASE_TEST_HOME_VAR};
