//! Resource Fetcher
//!
//! One listing operation per resource kind, each an instantiation of
//! [`paginate`] over a per-kind request.

use super::models::{
    AvailabilityDomain, BootVolume, Bucket, DbSystem, FileSystem, Instance, LoadBalancer,
    Snapshot, UsageRange, UsageSummary,
};
use super::pagination::{paginate, Page, ResourceKind};
use crate::oci::client::{OciClient, Service};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use url::Url;

/// Where the items of a page live in the response body
#[derive(Debug, Clone, Copy)]
enum ItemsPath {
    /// The body is the array
    Body,
    /// The array sits under this field of a body object
    Field(&'static str),
}

/// A listing request, minus the cursor
struct ListRequest {
    kind: ResourceKind,
    url: Url,
    body: Option<Value>,
    items: ItemsPath,
}

impl ListRequest {
    fn get(kind: ResourceKind, url: Url) -> Self {
        Self {
            kind,
            url,
            body: None,
            items: ItemsPath::Body,
        }
    }

    fn post(kind: ResourceKind, url: Url, body: Value, items: ItemsPath) -> Self {
        Self {
            kind,
            url,
            body: Some(body),
            items,
        }
    }

    /// Request URL carrying the cursor as the `page` parameter
    fn page_url(&self, page: Option<&str>) -> Url {
        let mut url = self.url.clone();
        if let Some(token) = page {
            url.query_pairs_mut().append_pair("page", token);
        }
        url
    }
}

/// Fetch one page of a listing
async fn fetch_page<T: DeserializeOwned>(
    client: &OciClient,
    request: &ListRequest,
    page: Option<String>,
) -> Result<Page<T>> {
    let url = request.page_url(page.as_deref());
    let response = match &request.body {
        Some(body) => client.post(&url, body).await?,
        None => client.get(&url).await?,
    };

    let items = extract_items(response.body, request.items)
        .with_context(|| format!("Unexpected {} response", request.kind))?;

    Ok(Page {
        items,
        next_page: response.next_page,
    })
}

/// Fetch all resources of one listing (auto-paginate)
async fn fetch_all<T: DeserializeOwned>(client: &OciClient, request: ListRequest) -> Result<Vec<T>> {
    let request = &request;
    paginate(request.kind, |page| fetch_page(client, request, page)).await
}

/// Extract and decode the items of a page
fn extract_items<T: DeserializeOwned>(body: Value, path: ItemsPath) -> Result<Vec<T>> {
    let raw = match (path, body) {
        (_, Value::Null) => return Ok(Vec::new()),
        (ItemsPath::Body, body) => body,
        (ItemsPath::Field(field), Value::Object(mut map)) => match map.remove(field) {
            Some(Value::Null) | None => return Ok(Vec::new()),
            Some(items) => items,
        },
        (ItemsPath::Field(field), other) => {
            anyhow::bail!("Expected an object with '{}', got {}", field, type_name(&other))
        }
    };

    serde_json::from_value(raw).context("Failed to decode items")
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// Compute / Block storage
// =============================================================================

/// List all compute instances in the tenancy
pub async fn list_instances(client: &OciClient) -> Result<Vec<Instance>> {
    let url = client.url(
        Service::Compute,
        "/instances",
        &[("compartmentId", client.tenancy_id.as_str())],
    )?;
    fetch_all(client, ListRequest::get(ResourceKind::Instances, url)).await
}

/// List all boot volumes of one availability domain
pub async fn list_boot_volumes(
    client: &OciClient,
    availability_domain: &str,
) -> Result<Vec<BootVolume>> {
    let url = client.url(
        Service::Compute,
        "/bootVolumes",
        &[
            ("availabilityDomain", availability_domain),
            ("compartmentId", client.tenancy_id.as_str()),
        ],
    )?;
    fetch_all(client, ListRequest::get(ResourceKind::BootVolumes, url)).await
}

// =============================================================================
// Load balancing
// =============================================================================

pub async fn list_load_balancers(client: &OciClient) -> Result<Vec<LoadBalancer>> {
    let url = client.url(
        Service::LoadBalancer,
        "/loadBalancers",
        &[("compartmentId", client.tenancy_id.as_str())],
    )?;
    fetch_all(client, ListRequest::get(ResourceKind::LoadBalancers, url)).await
}

// =============================================================================
// Object storage
// =============================================================================

/// Resolve the tenancy's object storage namespace
pub async fn get_namespace(client: &OciClient) -> Result<String> {
    let url = client.url(
        Service::ObjectStorage,
        "/n/",
        &[("compartmentId", client.tenancy_id.as_str())],
    )?;
    let response = client
        .get(&url)
        .await
        .context("Failed to resolve object storage namespace")?;

    match response.body {
        Value::String(namespace) if !namespace.is_empty() => Ok(namespace),
        other => anyhow::bail!(
            "Object storage namespace response was {}, expected a non-empty string",
            type_name(&other)
        ),
    }
}

/// List all buckets, resolving the namespace first
pub async fn list_buckets(client: &OciClient) -> Result<Vec<Bucket>> {
    let namespace = get_namespace(client).await?;
    tracing::debug!("Object storage namespace: {}", namespace);
    list_buckets_in(client, &namespace).await
}

/// List all buckets of a known namespace
pub async fn list_buckets_in(client: &OciClient, namespace: &str) -> Result<Vec<Bucket>> {
    let path = format!("/n/{}/b/", urlencoding::encode(namespace));
    let url = client.url(
        Service::ObjectStorage,
        &path,
        &[("compartmentId", client.tenancy_id.as_str())],
    )?;
    fetch_all(client, ListRequest::get(ResourceKind::Buckets, url)).await
}

// =============================================================================
// Identity
// =============================================================================

/// List the availability domains of the region.
/// The cursor is followed like every other listing.
pub async fn list_availability_domains(client: &OciClient) -> Result<Vec<AvailabilityDomain>> {
    let url = client.url(
        Service::Identity,
        "/availabilityDomains",
        &[("compartmentId", client.tenancy_id.as_str())],
    )?;
    fetch_all(client, ListRequest::get(ResourceKind::AvailabilityDomains, url)).await
}

// =============================================================================
// File storage
// =============================================================================

pub async fn list_file_systems(
    client: &OciClient,
    availability_domain: &str,
) -> Result<Vec<FileSystem>> {
    let url = client.url(
        Service::FileStorage,
        "/fileSystems",
        &[
            ("compartmentId", client.tenancy_id.as_str()),
            ("availabilityDomain", availability_domain),
        ],
    )?;
    fetch_all(client, ListRequest::get(ResourceKind::FileSystems, url)).await
}

pub async fn list_snapshots(client: &OciClient, file_system_id: &str) -> Result<Vec<Snapshot>> {
    let url = client.url(
        Service::FileStorage,
        "/snapshots",
        &[("fileSystemId", file_system_id)],
    )?;
    fetch_all(client, ListRequest::get(ResourceKind::Snapshots, url)).await
}

// =============================================================================
// Database
// =============================================================================

pub async fn list_db_systems(client: &OciClient) -> Result<Vec<DbSystem>> {
    let url = client.url(
        Service::Database,
        "/dbSystems",
        &[("compartmentId", client.tenancy_id.as_str())],
    )?;
    fetch_all(client, ListRequest::get(ResourceKind::Databases, url)).await
}

// =============================================================================
// Usage
// =============================================================================

/// Daily usage summaries for the tenancy over `range`
pub async fn list_usage(client: &OciClient, range: &UsageRange) -> Result<Vec<UsageSummary>> {
    let url = client.url(Service::Usage, "/usage", &[])?;
    let body = json!({
        "tenantId": client.tenancy_id,
        "timeUsageStarted": UsageRange::timestamp(range.start),
        "timeUsageEnded": UsageRange::timestamp(range.end),
        "granularity": "DAILY",
    });
    fetch_all(
        client,
        ListRequest::post(ResourceKind::Usage, url, body, ItemsPath::Field("items")),
    )
    .await
}
