//! Configuration module for omnirelease
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (OMNIRELEASE_*)
//! 3. `--config <path>`, `./omnirelease.toml` or `<config_dir>/omnirelease/config.toml`
//! 4. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use loader::{discover, ConfigWarning, LoadedConfig, PROJECT_CONFIG_FILE};
pub use types::{Config, EnvironmentConfig, RepositoryConfig, ToolsConfig};
