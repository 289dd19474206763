use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type Timestamp = DateTime<Utc>;

/// Launch status as reported by the status feed.
///
/// Anything other than `PENDING` or `SUCCESS` is kept verbatim in `Other` so
/// that repeats of the same unknown value compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LaunchStatus {
    Pending,
    Success,
    Other(String),
}

impl LaunchStatus {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("PENDING") {
            Self::Pending
        } else if trimmed.eq_ignore_ascii_case("SUCCESS") {
            Self::Success
        } else {
            Self::Other(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for LaunchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for LaunchStatus {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl Serialize for LaunchStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LaunchStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchEvent {
    pub status: LaunchStatus,
    pub status_at: Timestamp,
}

impl LaunchEvent {
    pub fn new(status: impl Into<LaunchStatus>, status_at: Timestamp) -> Self {
        Self {
            status: status.into(),
            status_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub success: u64,
    pub failure: u64,
}
