//! Configuration discovery and loading

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::types::Config;
use crate::error::{ReleaseError, ReleaseResult};

/// Config file looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = "omnirelease.toml";

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

/// Configuration plus where it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub warnings: Vec<ConfigWarning>,
    /// `None` when only defaults and environment overrides apply
    pub source: Option<PathBuf>,
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> ReleaseResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path).map_err(|e| ReleaseError::Config {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| ReleaseError::Config {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Find and load the configuration
///
/// An explicit path must exist. Otherwise `./omnirelease.toml`, then
/// `<config_dir>/omnirelease/config.toml`, then defaults. Environment
/// overrides apply last and the result is validated.
pub fn discover(explicit: Option<&Path>) -> ReleaseResult<LoadedConfig> {
    let source = match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(ReleaseError::Config {
                    path: path.to_path_buf(),
                    detail: "file not found".to_string(),
                });
            }
            Some(path.to_path_buf())
        }
        None => candidates().into_iter().find(|p| p.is_file()),
    };

    let (config, warnings) = match &source {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration");
            load_with_warnings(path)?
        }
        None => (Config::default(), Vec::new()),
    };

    let config = config.with_env_overrides();
    config.validate(source.as_deref().unwrap_or(Path::new("<defaults>")))?;

    Ok(LoadedConfig {
        config,
        warnings,
        source,
    })
}

fn candidates() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(PROJECT_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("omnirelease").join("config.toml"));
    }
    paths
}

/// Apply OMNIRELEASE_* overrides read through `lookup`
pub(crate) fn apply_overrides(
    mut config: Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Config {
    if let Some(dir) = lookup("OMNIRELEASE_STATE_DIR").filter(|v| !v.trim().is_empty()) {
        config.state_dir = PathBuf::from(dir);
    }

    if let Some(url) = lookup("OMNIRELEASE_REPOSITORY_URL").filter(|v| !v.trim().is_empty()) {
        config.repository.url = url;
    }

    if let Some(raw) = lookup("OMNIRELEASE_TIMEOUT_SECS") {
        match raw.trim().parse::<u64>() {
            Ok(secs) => config.tools.timeout_secs = secs,
            Err(_) => warn!(value = %raw, "ignoring non-numeric OMNIRELEASE_TIMEOUT_SECS"),
        }
    }

    config
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "state_dir",
        "actor",
        "repository",
        "url",
        "bundle_dir",
        "releases_dir",
        "author_name",
        "author_email",
        "tools",
        "vlocity",
        "sf",
        "timeout_secs",
        "lock_timeout_secs",
        "export_batch_size",
        "export_parallelism",
        "metadata_types",
        "environments",
        "sfdx_auth_url_file",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
