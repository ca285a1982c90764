//! Shared helpers for integration tests against a mocked OCI endpoint

#![allow(dead_code)]

use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};
use std::sync::Arc;
use toci::oci::auth::RequestSigner;
use toci::oci::client::OciClient;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TENANCY: &str = "ocid1.tenancy.oc1..aaaaaaaatest";
pub const REGION: &str = "sa-saopaulo-1";
pub const NAMESPACE: &str = "tenancy-ns";

pub const INSTANCES_PATH: &str = "/20160918/instances";
pub const BOOT_VOLUMES_PATH: &str = "/20160918/bootVolumes";
pub const LOAD_BALANCERS_PATH: &str = "/20170115/loadBalancers";
pub const DB_SYSTEMS_PATH: &str = "/20160918/dbSystems";
pub const NAMESPACE_PATH: &str = "/n/";
pub const AVAILABILITY_DOMAINS_PATH: &str = "/20160918/availabilityDomains";
pub const FILE_SYSTEMS_PATH: &str = "/20171215/fileSystems";
pub const SNAPSHOTS_PATH: &str = "/20171215/snapshots";
pub const USAGE_PATH: &str = "/20200107/usage";
pub const METRICS_PATH: &str = "/20180401/metrics/actions/summarizeMetricsData";

pub fn buckets_path() -> String {
    format!("/n/{}/b/", NAMESPACE)
}

/// Signer that marks requests without real cryptography
pub struct StaticSigner;

impl RequestSigner for StaticSigner {
    fn sign(&self, request: &mut reqwest::Request) -> anyhow::Result<()> {
        request
            .headers_mut()
            .insert(AUTHORIZATION, HeaderValue::from_static("Signature test"));
        Ok(())
    }
}

/// Client routed entirely to the mock server
pub fn test_client(server: &MockServer) -> OciClient {
    OciClient::with_signer(Arc::new(StaticSigner), TENANCY, REGION)
        .expect("client should build")
        .with_endpoint(&server.uri())
        .expect("mock server URI is valid")
}

/// 200 response carrying a JSON body and, optionally, a next-page cursor
pub fn page(body: Value, next_page: Option<&str>) -> ResponseTemplate {
    let template = ResponseTemplate::new(200).set_body_json(body);
    match next_page {
        Some(token) => template.insert_header("opc-next-page", token),
        None => template,
    }
}

/// OCI style error response
pub fn api_error(status: u16, code: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "code": code,
        "message": format!("{} (mocked)", code)
    }))
}

/// Serve an empty answer for every listing the report performs.
/// Mounted at low priority so tests can override single endpoints.
pub async fn mount_empty_tenancy(server: &MockServer) {
    for list_path in [
        INSTANCES_PATH,
        BOOT_VOLUMES_PATH,
        LOAD_BALANCERS_PATH,
        DB_SYSTEMS_PATH,
        AVAILABILITY_DOMAINS_PATH,
        FILE_SYSTEMS_PATH,
        SNAPSHOTS_PATH,
    ] {
        Mock::given(method("GET"))
            .and(path(list_path))
            .respond_with(page(json!([]), None))
            .with_priority(10)
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path(NAMESPACE_PATH))
        .respond_with(page(json!(NAMESPACE), None))
        .with_priority(10)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(buckets_path()))
        .respond_with(page(json!([]), None))
        .with_priority(10)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(USAGE_PATH))
        .respond_with(page(json!({"groupBy": [], "items": []}), None))
        .with_priority(10)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(METRICS_PATH))
        .respond_with(page(json!([]), None))
        .with_priority(10)
        .mount(server)
        .await;
}
