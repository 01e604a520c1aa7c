//! Configuration types

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::loader;
use crate::application::ExportBatching;
use crate::error::{ReleaseError, ReleaseResult};
use crate::infrastructure::fs::expand_home;

/// Release repository configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Clone URL of the release repository
    #[serde(default)]
    pub url: String,

    /// Directory inside the repository holding component bundles
    #[serde(default = "default_bundle_dir")]
    pub bundle_dir: String,

    /// Directory inside the repository holding release records
    #[serde(default = "default_releases_dir")]
    pub releases_dir: String,

    #[serde(default = "default_author_name")]
    pub author_name: String,

    #[serde(default = "default_author_email")]
    pub author_email: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            bundle_dir: default_bundle_dir(),
            releases_dir: default_releases_dir(),
            author_name: default_author_name(),
            author_email: default_author_email(),
        }
    }
}

/// External tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_vlocity")]
    pub vlocity: PathBuf,

    #[serde(default = "default_sf")]
    pub sf: PathBuf,

    /// Deadline for every external invocation
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How long to wait for another process holding an environment lock
    #[serde(default = "default_lock_timeout_secs")]
    pub lock_timeout_secs: u64,

    #[serde(default = "default_export_batch_size")]
    pub export_batch_size: usize,

    #[serde(default = "default_export_parallelism")]
    pub export_parallelism: usize,

    /// Regular platform metadata types exported by `refresh`
    #[serde(default = "default_metadata_types")]
    pub metadata_types: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            vlocity: default_vlocity(),
            sf: default_sf(),
            timeout_secs: default_timeout_secs(),
            lock_timeout_secs: default_lock_timeout_secs(),
            export_batch_size: default_export_batch_size(),
            export_parallelism: default_export_parallelism(),
            metadata_types: default_metadata_types(),
        }
    }
}

/// Per-environment settings, keyed by alias
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// File holding an SFDX auth URL used to log the alias in
    #[serde(default)]
    pub sfdx_auth_url_file: Option<PathBuf>,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root of the durable state (component stores, ledgers, snapshots)
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    /// Operator recorded on releases and rollbacks
    #[serde(default)]
    pub actor: Option<String>,

    #[serde(default)]
    pub repository: RepositoryConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            actor: None,
            repository: RepositoryConfig::default(),
            tools: ToolsConfig::default(),
            environments: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> ReleaseResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> ReleaseResult<(Self, Vec<loader::ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Apply environment variable overrides (OMNIRELEASE_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::apply_overrides(self, |key| std::env::var(key).ok())
    }

    /// State root with `~` expanded
    pub fn state_root(&self) -> PathBuf {
        expand_home(&self.state_dir)
    }

    /// Configured actor, then `$USER`/`$USERNAME`
    pub fn actor(&self) -> String {
        self.actor
            .clone()
            .filter(|a| !a.trim().is_empty())
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
            .unwrap_or_else(|| "unknown".to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.tools.timeout_secs)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.tools.lock_timeout_secs)
    }

    pub fn export_batching(&self) -> ExportBatching {
        ExportBatching {
            batch_size: self.tools.export_batch_size,
            parallelism: self.tools.export_parallelism,
        }
    }

    /// Auth URL files per alias, with `~` expanded
    pub fn auth_url_files(&self) -> BTreeMap<String, PathBuf> {
        self.environments
            .iter()
            .filter_map(|(alias, env)| {
                env.sfdx_auth_url_file
                    .as_deref()
                    .map(|file| (alias.clone(), expand_home(file)))
            })
            .collect()
    }

    /// Reject settings no operation can run with
    pub fn validate(&self, source: &Path) -> ReleaseResult<()> {
        let invalid = |detail: &str| {
            Err(ReleaseError::Config {
                path: source.to_path_buf(),
                detail: detail.to_string(),
            })
        };
        if self.tools.timeout_secs == 0 {
            return invalid("tools.timeout_secs must be greater than zero");
        }
        if self.tools.export_batch_size == 0 {
            return invalid("tools.export_batch_size must be greater than zero");
        }
        if self.tools.export_parallelism == 0 {
            return invalid("tools.export_parallelism must be greater than zero");
        }
        if self.repository.bundle_dir.trim().is_empty() {
            return invalid("repository.bundle_dir must not be empty");
        }
        if self.repository.releases_dir.trim().is_empty() {
            return invalid("repository.releases_dir must not be empty");
        }
        Ok(())
    }

    /// Release repository URL, required by every operation touching it
    pub fn require_repository_url(&self) -> ReleaseResult<&str> {
        let url = self.repository.url.trim();
        if url.is_empty() {
            return Err(ReleaseError::Validation(
                "repository.url is not configured (set it or OMNIRELEASE_REPOSITORY_URL)"
                    .to_string(),
            ));
        }
        Ok(url)
    }
}

fn default_state_dir() -> PathBuf {
    PathBuf::from("~/.omnirelease")
}

fn default_bundle_dir() -> String {
    "vlocity".to_string()
}

fn default_releases_dir() -> String {
    "releases".to_string()
}

fn default_author_name() -> String {
    "omnirelease".to_string()
}

fn default_author_email() -> String {
    "omnirelease@localhost".to_string()
}

fn default_vlocity() -> PathBuf {
    PathBuf::from("vlocity")
}

fn default_sf() -> PathBuf {
    PathBuf::from("sf")
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_lock_timeout_secs() -> u64 {
    60
}

fn default_export_batch_size() -> usize {
    50
}

fn default_export_parallelism() -> usize {
    2
}

fn default_metadata_types() -> Vec<String> {
    vec![
        "ApexClass".to_string(),
        "LightningComponentBundle".to_string(),
    ]
}
