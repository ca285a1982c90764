//! OCI Client
//!
//! Main client for interacting with OCI APIs, combining request signing,
//! HTTP transport and per-service endpoint construction.

use super::auth::{self, ApiKeySigner, RequestSigner};
use super::http::{ApiResponse, OciHttpClient};
use crate::config::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// OCI services the report talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Compute,
    LoadBalancer,
    ObjectStorage,
    Identity,
    FileStorage,
    Database,
    Usage,
    Monitoring,
}

impl Service {
    fn host_prefix(self) -> &'static str {
        match self {
            Service::Compute | Service::LoadBalancer => "iaas",
            Service::ObjectStorage => "objectstorage",
            Service::Identity => "identity",
            Service::FileStorage => "filestorage",
            Service::Database => "database",
            Service::Usage => "usageapi",
            Service::Monitoring => "telemetry",
        }
    }

    fn domain(self) -> &'static str {
        match self {
            Service::Usage => "oci.oraclecloud.com",
            _ => "oraclecloud.com",
        }
    }

    /// API version path segment; Object Storage has none
    fn api_version(self) -> &'static str {
        match self {
            Service::Compute | Service::Identity | Service::Database => "/20160918",
            Service::LoadBalancer => "/20170115",
            Service::FileStorage => "/20171215",
            Service::Usage => "/20200107",
            Service::Monitoring => "/20180401",
            Service::ObjectStorage => "",
        }
    }
}

/// Main OCI client
#[derive(Clone)]
pub struct OciClient {
    pub http: OciHttpClient,
    pub tenancy_id: String,
    pub region: String,
    /// Single base URL used for every service instead of the regional hosts
    endpoint: Option<String>,
}

impl OciClient {
    /// Create a client signing with the API key named by `config`
    pub fn new(config: &Config) -> Result<Self> {
        let key_id = auth::key_id(&config.tenancy_id, &config.user_id, &config.fingerprint);
        let signer = ApiKeySigner::from_pem_file(key_id, &config.private_key_path)
            .context("Failed to initialize OCI API key signer")?;

        Self::with_signer(Arc::new(signer), &config.tenancy_id, &config.region)
    }

    /// Create a client with any request signer
    pub fn with_signer(
        signer: Arc<dyn RequestSigner>,
        tenancy_id: &str,
        region: &str,
    ) -> Result<Self> {
        let http = OciHttpClient::new(signer)?;

        Ok(Self {
            http,
            tenancy_id: tenancy_id.to_string(),
            region: region.to_string(),
            endpoint: None,
        })
    }

    /// Route every service through one base URL (proxies, test servers)
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        Url::parse(endpoint).with_context(|| format!("Invalid endpoint URL: {}", endpoint))?;
        self.endpoint = Some(endpoint.trim_end_matches('/').to_string());
        Ok(self)
    }

    /// Base URL of a service in the current region
    pub fn service_base(&self, service: Service) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!(
                "https://{}.{}.{}",
                service.host_prefix(),
                self.region,
                service.domain()
            ),
        }
    }

    /// Build a versioned API URL for `service` with the given query parameters
    pub fn url(&self, service: Service, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let raw = format!(
            "{}{}{}",
            self.service_base(service),
            service.api_version(),
            path
        );
        let mut url = Url::parse(&raw).with_context(|| format!("Invalid API URL: {}", raw))?;

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter().copied());
        }

        Ok(url)
    }

    /// Make a GET request to an OCI API
    pub async fn get(&self, url: &Url) -> Result<ApiResponse> {
        self.http.get(url).await
    }

    /// Make a POST request to an OCI API
    pub async fn post(&self, url: &Url, body: &Value) -> Result<ApiResponse> {
        self.http.post(url, body).await
    }
}

/// Format an OCI API error for display
pub fn format_oci_error(error: &anyhow::Error) -> String {
    super::http::format_oci_error(error)
}
