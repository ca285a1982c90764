//! End-to-end report runs against a mocked tenancy

mod common;

use common::*;
use serde_json::json;
use toci::report::{self, ReportOptions};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer};

async fn run_report(server: &MockServer, options: &ReportOptions) -> (anyhow::Result<()>, String) {
    let client = test_client(server);
    let mut out = Vec::new();
    let result = report::run(&client, options, &mut out).await;
    (result, String::from_utf8(out).unwrap())
}

/// A small tenancy renders every section in order
#[tokio::test]
async fn test_full_report_output() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(INSTANCES_PATH))
        .respond_with(page(
            json!([
                {
                    "id": "ocid1.instance.oc1..web",
                    "displayName": "web-1",
                    "shape": "VM.Standard.E4.Flex",
                    "lifecycleState": "RUNNING",
                    "shapeConfig": {
                        "processorDescription": "AMD EPYC",
                        "ocpus": 2.0,
                        "memoryInGBs": 16.0
                    }
                },
                {
                    "id": "ocid1.instance.oc1..old",
                    "displayName": "old-1",
                    "shape": "VM.Standard2.1",
                    "lifecycleState": "STOPPED"
                }
            ]),
            None,
        ))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(METRICS_PATH))
        .and(body_string_contains("CpuUtilization[1m]"))
        .and(body_string_contains("ocid1.instance.oc1..web"))
        .respond_with(page(
            json!([{"aggregatedDatapoints": [{"value": 42.5}]}]),
            None,
        ))
        .expect(1)
        .mount(&server)
        .await;

    // stopped instances are never queried
    Mock::given(method("POST"))
        .and(path(METRICS_PATH))
        .and(body_string_contains("ocid1.instance.oc1..old"))
        .respond_with(page(json!([]), None))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(AVAILABILITY_DOMAINS_PATH))
        .respond_with(page(json!([{"name": "AD-1", "id": "ad-1"}]), None))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(FILE_SYSTEMS_PATH))
        .and(query_param("availabilityDomain", "AD-1"))
        .respond_with(page(
            json!([{
                "id": "fs-1",
                "displayName": "shared",
                "meteredBytes": 4096,
                "lifecycleState": "ACTIVE"
            }]),
            None,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(SNAPSHOTS_PATH))
        .and(query_param("fileSystemId", "fs-1"))
        .respond_with(page(
            json!([{
                "id": "snap-1",
                "name": "nightly",
                "timeCreated": "2024-05-02T00:00:00.000Z",
                "lifecycleState": "ACTIVE"
            }]),
            None,
        ))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(USAGE_PATH))
        .respond_with(page(
            json!({"items": [
                {"timeUsageStarted": "2024-05-01T00:00:00.000Z", "computedQuantity": 24.0}
            ]}),
            None,
        ))
        .mount(&server)
        .await;

    mount_empty_tenancy(&server).await;

    let (result, output) = run_report(&server, &ReportOptions::default()).await;
    result.unwrap();

    let expected = "\
Instances:
  Name: web-1, Shape: VM.Standard.E4.Flex, State: RUNNING
    Shape Details:
      Processor: AMD EPYC
      Cores: 2
      Memory: 16 Gb
    Metrics:
      CpuUtilization: 42.50 %
      MemoryUtilization: 0.00 %
      DiskBytesRead: 0.000000 Mb
      DiskBytesWritten: 0.000000 Mb
  Name: old-1, Shape: VM.Standard2.1, State: STOPPED
    Shape Details:
      Processor: -
      Cores: 0
      Memory: 0 Gb
Load Balancers:
Databases:
Buckets:
Availability Domains:
  Name: AD-1, ID: ad-1
File Systems:
  Name: shared, Size: 4096 Bytes, Availability Domain: AD-1, State: ACTIVE
    Snapshots:
      Name: nightly, Creation Date: 2024-05-02T00:00:00.000Z, State: ACTIVE
Billing:
   Date: 2024-05-01T00:00:00.000Z, Comp. Qty: 24.000000
";
    assert_eq!(output, expected);
}

/// A failing step stops the run; later steps are never requested
#[tokio::test]
async fn test_load_balancer_failure_stops_report() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LOAD_BALANCERS_PATH))
        .respond_with(api_error(401, "NotAuthenticated"))
        .mount(&server)
        .await;

    for later in [DB_SYSTEMS_PATH, NAMESPACE_PATH, AVAILABILITY_DOMAINS_PATH] {
        Mock::given(method("GET"))
            .and(path(later))
            .respond_with(page(json!([]), None))
            .expect(0)
            .mount(&server)
            .await;
    }

    Mock::given(method("POST"))
        .and(path(USAGE_PATH))
        .respond_with(page(json!({"items": []}), None))
        .expect(0)
        .mount(&server)
        .await;

    mount_empty_tenancy(&server).await;

    let (result, output) = run_report(&server, &ReportOptions::default()).await;
    let err = result.unwrap_err();

    assert_eq!(err.to_string(), "Error fetching load balancers");
    assert!(format!("{:#}", err).contains("Failed to list load balancers"));
    assert_eq!(output, "Instances:\nLoad Balancers:\n");
}

/// Boot volumes are listed only when asked for
#[tokio::test]
async fn test_boot_volumes_are_opt_in() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(AVAILABILITY_DOMAINS_PATH))
        .respond_with(page(json!([{"name": "AD-1"}]), None))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(BOOT_VOLUMES_PATH))
        .and(query_param("availabilityDomain", "AD-1"))
        .respond_with(page(
            json!([{
                "id": "bv-1",
                "displayName": "web-1 (Boot Volume)",
                "sizeInGBs": 50,
                "lifecycleState": "AVAILABLE"
            }]),
            None,
        ))
        .expect(1)
        .mount(&server)
        .await;

    mount_empty_tenancy(&server).await;

    let (result, output) = run_report(&server, &ReportOptions::default()).await;
    result.unwrap();
    assert!(!output.contains("Boot Volumes:"));
    assert!(output.contains("  Name: AD-1, ID: -\n"));

    let options = ReportOptions {
        boot_volumes: true,
        ..Default::default()
    };
    let (result, output) = run_report(&server, &options).await;
    result.unwrap();
    assert!(output.contains(
        "Boot Volumes:\n  Name: web-1 (Boot Volume), Size: 50 Gb, Availability Domain: AD-1, State: AVAILABLE\nFile Systems:\n"
    ));
}

/// An empty tenancy still prints every heading
#[tokio::test]
async fn test_empty_tenancy_prints_headings() {
    let server = MockServer::start().await;
    mount_empty_tenancy(&server).await;

    let (result, output) = run_report(&server, &ReportOptions::default()).await;
    result.unwrap();

    assert_eq!(
        output,
        "Instances:\nLoad Balancers:\nDatabases:\nBuckets:\nAvailability Domains:\nFile Systems:\nBilling:\n"
    );
}
