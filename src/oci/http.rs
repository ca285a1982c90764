//! HTTP utilities for OCI REST API calls

use super::auth::RequestSigner;
use anyhow::{Context, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, Request, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Response header carrying the pagination cursor
pub const NEXT_PAGE_HEADER: &str = "opc-next-page";

/// Request/response header used by OCI to correlate calls
pub const REQUEST_ID_HEADER: &str = "opc-request-id";

/// Sanitize response body for logging
/// Truncates long responses and drops control characters
fn sanitize_for_log(body: &str) -> String {
    let mut truncated: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
    if truncated.len() < body.len() {
        truncated.push_str(&format!("... [truncated, {} bytes total]", body.len()));
    }

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// A successful API response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub body: Value,
    /// Cursor for the next page, if the listing has more data
    pub next_page: Option<String>,
    pub request_id: Option<String>,
}

/// A non-2xx answer from an OCI endpoint
#[derive(Debug, thiserror::Error)]
#[error("API request failed: {status} ({code})")]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub opc_request_id: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ApiError {
    fn from_response(status: StatusCode, body: &str, opc_request_id: Option<String>) -> Self {
        let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
        let (code, message) = match parsed {
            Some(ErrorBody { code, message }) => (code, message),
            None => (None, None),
        };

        Self {
            status,
            code: code.unwrap_or_else(|| {
                status.canonical_reason().unwrap_or("Unknown").to_string()
            }),
            message: message.unwrap_or_default(),
            opc_request_id,
        }
    }
}

/// Signed HTTP client for OCI API calls
#[derive(Clone)]
pub struct OciHttpClient {
    client: Client,
    signer: Arc<dyn RequestSigner>,
}

impl OciHttpClient {
    /// Create a new HTTP client
    pub fn new(signer: Arc<dyn RequestSigner>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("toci/{}", crate::VERSION))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, signer })
    }

    /// Make a GET request to an OCI API
    pub async fn get(&self, url: &Url) -> Result<ApiResponse> {
        let request = self
            .client
            .request(Method::GET, url.clone())
            .header(ACCEPT, "application/json")
            .header(REQUEST_ID_HEADER, new_request_id())
            .build()
            .context("Failed to build request")?;

        self.execute(request).await
    }

    /// Make a POST request with a JSON body to an OCI API
    pub async fn post(&self, url: &Url, body: &Value) -> Result<ApiResponse> {
        let payload = serde_json::to_vec(body).context("Failed to encode request body")?;
        let request = self
            .client
            .request(Method::POST, url.clone())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .header(REQUEST_ID_HEADER, new_request_id())
            .body(payload)
            .build()
            .context("Failed to build request")?;

        self.execute(request).await
    }

    async fn execute(&self, mut request: Request) -> Result<ApiResponse> {
        tracing::debug!("{} {}", request.method(), request.url());

        self.signer
            .sign(&mut request)
            .context("Failed to sign request")?;

        let response = self
            .client
            .execute(request)
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let next_page = header_string(response.headers(), NEXT_PAGE_HEADER);
        let request_id = header_string(response.headers(), REQUEST_ID_HEADER);
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            // Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!(
                "API error: {} [{}] - {}",
                status,
                request_id.as_deref().unwrap_or("-"),
                sanitize_for_log(&body)
            );
            return Err(ApiError::from_response(status, &body, request_id).into());
        }

        // Handle empty response
        let body = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body).context("Failed to parse response JSON")?
        };

        Ok(ApiResponse {
            body,
            next_page,
            request_id,
        })
    }
}

fn header_string(headers: &reqwest::header::HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn new_request_id() -> String {
    uuid::Uuid::new_v4().simple().to_string().to_uppercase()
}

/// Format an OCI API error for display
/// Maps well-known HTTP statuses to short hints instead of echoing raw API details
pub fn format_oci_error(error: &anyhow::Error) -> String {
    if let Some(api_error) = error.chain().find_map(|e| e.downcast_ref::<ApiError>()) {
        let hint = match api_error.status.as_u16() {
            400 => "Invalid request. Check your parameters.",
            401 => "Authentication failed. Check the API key, fingerprint and user OCID.",
            403 => "Permission denied. Check your IAM policies.",
            404 => "Resource not found, or not authorized to see it.",
            409 => "Resource conflict. The resource may already exist or be in use.",
            429 => "Rate limit exceeded. Please try again later.",
            500..=599 => "OCI service temporarily unavailable. Please try again.",
            _ => "Request failed.",
        };
        return match &api_error.opc_request_id {
            Some(id) => format!("{} [{}, opc-request-id {}]", hint, api_error.code, id),
            None => format!("{} [{}]", hint, api_error.code),
        };
    }

    // Truncate long error messages and remove potential sensitive data
    let error_str = error.root_cause().to_string();
    let sanitized = error_str
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .take(160)
        .collect::<String>();

    if sanitized.len() < error_str.len() {
        format!("{}...", sanitized)
    } else {
        sanitized
    }
}
