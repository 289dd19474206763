use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    domain::{LaunchEvent, LaunchStatus, Stats, Timestamp},
    error::RecordError,
};

/// Body of the launch status endpoint as received.
///
/// Records are kept loose so that one bad entry is reported against its index
/// instead of failing the whole document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusDocument {
    #[serde(default)]
    pub events: Vec<LaunchEventRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaunchEventRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    #[serde(
        rename = "statusAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub status_at: Option<Value>,
}

impl LaunchEventRecord {
    pub fn new(status: impl Into<String>, status_at: impl Into<Value>) -> Self {
        Self {
            status: Some(Value::String(status.into())),
            status_at: Some(status_at.into()),
        }
    }

    pub fn to_event(&self) -> Result<LaunchEvent, RecordError> {
        let status = match &self.status {
            None | Some(Value::Null) => return Err(RecordError::MissingStatus),
            Some(Value::String(raw)) => LaunchStatus::parse(raw),
            Some(other) => return Err(RecordError::StatusNotString(other.to_string())),
        };
        let status_at = match &self.status_at {
            None | Some(Value::Null) => return Err(RecordError::MissingStatusAt),
            Some(raw) => parse_status_at(raw)?,
        };
        Ok(LaunchEvent { status, status_at })
    }
}

/// Outbound event shape written by the status feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchEventPayload {
    pub status: LaunchStatus,
    #[serde(rename = "statusAt")]
    pub status_at: DateTime<Utc>,
}

impl From<LaunchEventPayload> for LaunchEvent {
    fn from(value: LaunchEventPayload) -> Self {
        Self {
            status: value.status,
            status_at: value.status_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaunchFeed {
    pub events: Vec<LaunchEventPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLaunchStatus {
    pub status: String,
}

pub type StatsDocument = Stats;

/// `statusAt` is either RFC 3339 text or milliseconds since the Unix epoch.
pub fn parse_status_at(raw: &Value) -> Result<Timestamp, RecordError> {
    let invalid = || RecordError::InvalidStatusAt(raw.to_string());
    match raw {
        Value::Number(number) => {
            if let Some(millis) = number.as_i64() {
                Utc.timestamp_millis_opt(millis).single().ok_or_else(invalid)
            } else if let Some(millis) = number.as_f64() {
                from_fractional_millis(millis).ok_or_else(invalid)
            } else {
                Err(invalid())
            }
        }
        Value::String(text) => {
            let text = text.trim();
            if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
                let millis: i64 = text.parse().map_err(|_| invalid())?;
                return Utc.timestamp_millis_opt(millis).single().ok_or_else(invalid);
            }
            DateTime::parse_from_rfc3339(text)
                .map(|parsed| parsed.with_timezone(&Utc))
                .map_err(|_| invalid())
        }
        _ => Err(invalid()),
    }
}

fn from_fractional_millis(millis: f64) -> Option<Timestamp> {
    if !millis.is_finite() {
        return None;
    }
    let whole = millis.floor();
    let nanos = ((millis - whole) * 1_000_000.0).round() as i64;
    let base = Utc.timestamp_millis_opt(whole as i64).single()?;
    base.checked_add_signed(chrono::Duration::nanoseconds(nanos))
}
