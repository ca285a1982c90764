//! Instance metrics
//!
//! Queries the Monitoring service for the compute agent metrics of one
//! instance and reduces each returned series to a single value.

use crate::oci::client::{OciClient, Service};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;

/// Metric namespace published by the Oracle Cloud Agent
pub const NAMESPACE: &str = "oci_computeagent";

/// Length of the query window ending now
pub const WINDOW_MINUTES: i64 = 1;

/// Compute agent metrics reported per running instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricName {
    CpuUtilization,
    MemoryUtilization,
    DiskBytesRead,
    DiskBytesWritten,
}

impl MetricName {
    /// Query order
    pub const ALL: [MetricName; 4] = [
        MetricName::CpuUtilization,
        MetricName::MemoryUtilization,
        MetricName::DiskBytesRead,
        MetricName::DiskBytesWritten,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricName::CpuUtilization => "CpuUtilization",
            MetricName::MemoryUtilization => "MemoryUtilization",
            MetricName::DiskBytesRead => "DiskBytesRead",
            MetricName::DiskBytesWritten => "DiskBytesWritten",
        }
    }

    /// MQL: per-minute maximum, restricted to one resource
    pub fn query(self, resource_id: &str) -> String {
        format!(
            "{}[1m]{{resourceID =~ \"{}\"}}.max()",
            self.as_str(),
            resource_id
        )
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One series of a `summarizeMetricsData` response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub aggregated_datapoints: Vec<AggregatedDatapoint>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AggregatedDatapoint {
    #[serde(default)]
    pub timestamp: Option<String>,
    pub value: f64,
}

/// Reduced metric values for one instance; absent metrics read as zero
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceMetrics {
    values: BTreeMap<MetricName, f64>,
}

impl InstanceMetrics {
    pub fn get(&self, name: MetricName) -> f64 {
        self.values.get(&name).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, name: MetricName, value: f64) {
        self.values.insert(name, value);
    }
}

/// Reduce a response to one value: the last data point of each series, in
/// response order, replaces the result unless it is zero. Earlier points are
/// never considered, so `[5, 0, 0]` yields 0. Zero also stands for "no data".
pub fn reduce_series(series: &[MetricData]) -> f64 {
    let mut value = 0.0;
    for data in series {
        if let Some(last) = data.aggregated_datapoints.last() {
            if last.value != 0.0 {
                value = last.value;
            }
        }
    }
    value
}

/// Fetch the metrics of one instance over the last minute
pub async fn get_instance_metrics(client: &OciClient, instance_id: &str) -> Result<InstanceMetrics> {
    get_instance_metrics_at(client, instance_id, Utc::now()).await
}

/// Fetch the metrics of one instance over the window ending at `end`.
/// Any failed query fails the whole call.
pub async fn get_instance_metrics_at(
    client: &OciClient,
    instance_id: &str,
    end: DateTime<Utc>,
) -> Result<InstanceMetrics> {
    let start = end - Duration::minutes(WINDOW_MINUTES);
    let url = client.url(
        Service::Monitoring,
        "/metrics/actions/summarizeMetricsData",
        &[("compartmentId", client.tenancy_id.as_str())],
    )?;

    let mut metrics = InstanceMetrics::default();
    for name in MetricName::ALL {
        let body = json!({
            "namespace": NAMESPACE,
            "query": name.query(instance_id),
            "startTime": start.to_rfc3339_opts(SecondsFormat::Millis, true),
            "endTime": end.to_rfc3339_opts(SecondsFormat::Millis, true),
        });

        let response = client
            .post(&url, &body)
            .await
            .with_context(|| format!("Failed to query {} for {}", name, instance_id))?;

        let series: Vec<MetricData> = if response.body.is_null() {
            Vec::new()
        } else {
            serde_json::from_value(response.body)
                .with_context(|| format!("Unexpected {} response", name))?
        };

        let value = reduce_series(&series);
        tracing::debug!("{} {} = {} ({} series)", instance_id, name, value, series.len());
        metrics.set(name, value);
    }

    Ok(metrics)
}
