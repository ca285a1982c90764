//! Integration tests for instance metric queries using wiremock

mod common;

use chrono::{TimeZone, Utc};
use common::*;
use serde_json::json;
use toci::metrics::{self, MetricName};
use wiremock::matchers::{body_partial_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer};

const INSTANCE: &str = "ocid1.instance.oc1..web";

fn series(values: &[f64]) -> serde_json::Value {
    let points: Vec<_> = values
        .iter()
        .map(|value| json!({"timestamp": "2024-05-01T12:00:00.000Z", "value": value}))
        .collect();
    json!([{
        "namespace": "oci_computeagent",
        "name": "metric",
        "aggregatedDatapoints": points
    }])
}

/// Each metric is reduced from its own response
#[tokio::test]
async fn test_each_metric_is_queried_and_reduced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(METRICS_PATH))
        .and(query_param("compartmentId", TENANCY))
        .and(body_string_contains("CpuUtilization[1m]"))
        .respond_with(page(series(&[10.0, 42.5]), None))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(METRICS_PATH))
        .and(body_string_contains("MemoryUtilization[1m]"))
        .respond_with(page(series(&[5.0, 0.0]), None))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(METRICS_PATH))
        .and(body_string_contains("DiskBytesRead[1m]"))
        .respond_with(page(series(&[0.0, 2048.0]), None))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(METRICS_PATH))
        .and(body_string_contains("DiskBytesWritten[1m]"))
        .respond_with(page(json!([]), None))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let values = metrics::get_instance_metrics(&client, INSTANCE).await.unwrap();

    assert_eq!(values.get(MetricName::CpuUtilization), 42.5);
    // trailing zero wins over the earlier 5
    assert_eq!(values.get(MetricName::MemoryUtilization), 0.0);
    assert_eq!(values.get(MetricName::DiskBytesRead), 2048.0);
    assert_eq!(values.get(MetricName::DiskBytesWritten), 0.0);
}

/// The query names the namespace, the instance and a one minute window
#[tokio::test]
async fn test_query_body_shape() {
    let server = MockServer::start().await;
    let end = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

    Mock::given(method("POST"))
        .and(path(METRICS_PATH))
        .and(body_partial_json(json!({
            "namespace": "oci_computeagent",
            "query": format!("CpuUtilization[1m]{{resourceID =~ \"{}\"}}.max()", INSTANCE),
            "startTime": "2024-05-01T11:59:00.000Z",
            "endTime": "2024-05-01T12:00:00.000Z"
        })))
        .respond_with(page(series(&[1.0]), None))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(METRICS_PATH))
        .respond_with(page(json!([]), None))
        .with_priority(10)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let values = metrics::get_instance_metrics_at(&client, INSTANCE, end)
        .await
        .unwrap();

    assert_eq!(values.get(MetricName::CpuUtilization), 1.0);
}

/// One failed metric query fails the whole call
#[tokio::test]
async fn test_failed_query_aborts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(METRICS_PATH))
        .and(body_string_contains("DiskBytesRead[1m]"))
        .respond_with(api_error(429, "TooManyRequests"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(METRICS_PATH))
        .and(body_string_contains("DiskBytesWritten[1m]"))
        .respond_with(page(json!([]), None))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(METRICS_PATH))
        .respond_with(page(series(&[3.0]), None))
        .with_priority(10)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = metrics::get_instance_metrics(&client, INSTANCE)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        format!("Failed to query DiskBytesRead for {}", INSTANCE)
    );
}
