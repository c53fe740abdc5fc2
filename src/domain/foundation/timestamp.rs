//! UTC instants for message creation and receipt times.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::ValidationError;

/// A point in time, normalized to UTC on construction.
///
/// Serializes as an RFC 3339 string, the format the realtime server emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Accepts any RFC 3339 offset; `field` names the source in errors.
    pub fn parse_rfc3339(field: &str, value: &str) -> Result<Self, ValidationError> {
        match DateTime::parse_from_rfc3339(value) {
            Ok(parsed) => Ok(Self(parsed.with_timezone(&Utc))),
            Err(e) => Err(ValidationError::invalid_format(field, e.to_string())),
        }
    }

    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Shifted by `secs`, which may be negative.
    pub fn plus_secs(&self, secs: i64) -> Self {
        Self(self.0 + Duration::seconds(secs))
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}
