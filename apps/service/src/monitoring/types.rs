use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Registry identifier of a monitored target
pub type TargetId = i64;

/// Default polling interval for new targets, in minutes
pub const DEFAULT_INTERVAL_MINUTES: u32 = 10;

/// Upper bound for a polling interval (one day), in minutes
pub const MAX_INTERVAL_MINUTES: u32 = 1440;

/// Outcome of a single reachability probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Up,
    Down,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Up => "UP",
            Status::Down => "DOWN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown status: {0}")]
pub struct ParseStatusError(String);

impl FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "UP" => Ok(Status::Up),
            "DOWN" => Ok(Status::Down),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// Live status of a target as shown to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrentStatus {
    /// No sample has been recorded yet
    Pending,
    Up,
    Down,
}

impl From<Status> for CurrentStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Up => CurrentStatus::Up,
            Status::Down => CurrentStatus::Down,
        }
    }
}

/// A monitored endpoint, as stored in the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    pub url: String,
    pub name: String,
    pub usage: String,
    pub interval_minutes: u32,
    /// Private targets are never polled by the scheduler; they report
    /// their own telemetry or are checked on demand.
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
}

/// One timestamped observation for a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub target_id: TargetId,
    pub timestamp: DateTime<Utc>,
    pub status: Status,
}

impl Sample {
    pub fn new(target_id: TargetId, timestamp: DateTime<Utc>, status: Status) -> Self {
        Self { target_id, timestamp, status }
    }
}

/// A maximal run of consecutive same-status samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryBlock {
    pub status: Status,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Availability metrics derived from a target's full sample history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityStats {
    /// Number of distinct UTC calendar days with at least one UP sample
    pub distinct_up_days: usize,
    /// Most recent UTC calendar day with an UP sample
    pub last_online: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_text() {
        assert_eq!("UP".parse::<Status>().unwrap(), Status::Up);
        assert_eq!("down".parse::<Status>().unwrap(), Status::Down);
        assert!("degraded".parse::<Status>().is_err());
        assert_eq!(Status::Down.to_string(), "DOWN");
    }

    #[test]
    fn status_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Status::Up).unwrap(), "\"UP\"");
        assert_eq!(serde_json::to_string(&CurrentStatus::Pending).unwrap(), "\"PENDING\"");
    }
}
