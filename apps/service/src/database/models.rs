use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use libsql::Row;
use serde::{Deserialize, Serialize};

use crate::monitoring::types::{DEFAULT_INTERVAL_MINUTES, Sample, Status, Target};

/// Attributes of a target that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTarget {
    pub url: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub usage: String,
    #[serde(default = "default_interval")]
    pub interval_minutes: u32,
    #[serde(default)]
    pub is_private: bool,
}

fn default_interval() -> u32 {
    DEFAULT_INTERVAL_MINUTES
}

impl NewTarget {
    /// Public target polled at the default interval
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: String::new(),
            usage: String::new(),
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
            is_private: false,
        }
    }

    pub fn with_interval(mut self, interval_minutes: u32) -> Self {
        self.interval_minutes = interval_minutes;
        self
    }

    pub fn private(mut self) -> Self {
        self.is_private = true;
        self
    }
}

/// Convert a timestamp to the stored representation (Unix milliseconds)
pub fn timestamp_to_i64(time: DateTime<Utc>) -> i64 {
    time.timestamp_millis()
}

/// Convert stored Unix milliseconds back to a timestamp
pub fn i64_to_timestamp(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| anyhow!("Timestamp out of range: {}", millis))
}

/// Column list matching `target_from_row`
pub(crate) const TARGET_COLUMNS: &str = "id, url, name, usage, interval_minutes, is_private, created_at";

pub(crate) fn target_from_row(row: &Row) -> Result<Target> {
    let interval: i64 = row.get(4)?;

    Ok(Target {
        id: row.get(0)?,
        url: row.get(1)?,
        name: row.get(2)?,
        usage: row.get(3)?,
        interval_minutes: u32::try_from(interval)
            .map_err(|_| anyhow!("Stored interval out of range: {}", interval))?,
        is_private: row.get::<i64>(5)? != 0,
        created_at: i64_to_timestamp(row.get(6)?)?,
    })
}

pub(crate) fn sample_from_row(row: &Row) -> Result<Sample> {
    let status: String = row.get(2)?;

    Ok(Sample {
        target_id: row.get(0)?,
        timestamp: i64_to_timestamp(row.get(1)?)?,
        status: status.parse::<Status>()?,
    })
}
