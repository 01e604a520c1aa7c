//! Persisted timestamp
//!
//! Component timestamps are stored as RFC 3339 text. A stored value that no
//! longer parses must still round-trip, so the raw text is kept.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parsed instant, or `None` if the stored text is not RFC 3339
    pub fn parse(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.0)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_utc_with_millis() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(Timestamp::from(dt).as_str(), "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn parse_roundtrip() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 5, 12, 30, 0).unwrap();
        assert_eq!(Timestamp::from(dt).parse(), Some(dt));
    }

    #[test]
    fn unparsable_value_is_kept() {
        let ts = Timestamp::from_raw("yesterday");
        assert_eq!(ts.parse(), None);
        assert_eq!(ts.as_str(), "yesterday");
    }
}
