//! Release identifier
//!
//! Timestamp-derived (`release-2024-01-01T00-00-00Z`). The id doubles as the
//! git tag name, so it must stay a valid ref name.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReleaseId(String);

impl ReleaseId {
    pub const PREFIX: &'static str = "release-";

    /// Id derived from a deployment instant
    pub fn from_time(at: DateTime<Utc>) -> Self {
        Self(format!("{}{}", Self::PREFIX, at.format("%Y-%m-%dT%H-%M-%SZ")))
    }

    /// Same id with a numeric disambiguation suffix (`-2`, `-3`, ...)
    pub fn with_suffix(&self, n: u32) -> Self {
        Self(format!("{}-{}", self.0, n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_valid(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 200
        && !s.starts_with('-')
        && !s.starts_with('.')
        && !s.ends_with(".lock")
        && !s.contains("..")
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

impl FromStr for ReleaseId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_valid(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(format!("'{}' is not a valid release id", s))
        }
    }
}

impl TryFrom<String> for ReleaseId {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ReleaseId> for String {
    fn from(id: ReleaseId) -> Self {
        id.0
    }
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
