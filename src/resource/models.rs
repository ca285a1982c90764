//! Resource records
//!
//! Typed views over the subset of OCI response fields the report displays.
//! Unknown fields are ignored; anything OCI may omit is optional.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde::Deserialize;

/// Compute instance (`core.Instance`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub shape: String,
    #[serde(default)]
    pub lifecycle_state: String,
    #[serde(default)]
    pub availability_domain: Option<String>,
    #[serde(default)]
    pub time_created: Option<String>,
    #[serde(default)]
    pub shape_config: Option<ShapeConfig>,
}

impl Instance {
    pub fn is_running(&self) -> bool {
        self.lifecycle_state == "RUNNING"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeConfig {
    #[serde(default)]
    pub processor_description: Option<String>,
    #[serde(default)]
    pub ocpus: Option<f64>,
    #[serde(default, rename = "memoryInGBs")]
    pub memory_in_gbs: Option<f64>,
}

/// Boot volume (`core.BootVolume`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootVolume {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, rename = "sizeInGBs")]
    pub size_in_gbs: Option<i64>,
    #[serde(default)]
    pub lifecycle_state: String,
    #[serde(default)]
    pub availability_domain: Option<String>,
}

/// Load balancer (`loadbalancer.LoadBalancer`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancer {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub shape_name: String,
    #[serde(default)]
    pub lifecycle_state: String,
}

/// Object storage bucket summary
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub time_created: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityDomain {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
}

/// File system summary (`filestorage.FileSystemSummary`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSystem {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub metered_bytes: Option<i64>,
    #[serde(default)]
    pub lifecycle_state: String,
    #[serde(default)]
    pub availability_domain: Option<String>,
}

/// File system snapshot summary
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub time_created: Option<String>,
    #[serde(default)]
    pub lifecycle_state: String,
}

/// DB system summary (`database.DbSystemSummary`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbSystem {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub database_edition: Option<String>,
    #[serde(default)]
    pub shape: Option<String>,
    #[serde(default)]
    pub lifecycle_state: String,
}

/// One usage line from the Usage API (`usageapi.UsageSummary`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    #[serde(default)]
    pub time_usage_started: Option<String>,
    #[serde(default)]
    pub time_usage_ended: Option<String>,
    #[serde(default)]
    pub computed_quantity: Option<f64>,
    #[serde(default)]
    pub computed_amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Date range for usage queries, `[start, end)` at day granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl UsageRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end <= start {
            bail!("Usage range end {} must be after start {}", end, start);
        }
        Ok(Self { start, end })
    }

    /// Midnight UTC of a date, in the millisecond RFC 3339 form OCI expects
    pub fn timestamp(date: NaiveDate) -> String {
        format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
    }
}

impl Default for UsageRange {
    /// May 2024
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2024, 5, 31).unwrap_or_default(),
        }
    }
}
