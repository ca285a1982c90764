//! OCI Authentication
//!
//! Signs API requests with an API signing key using the OCI "Signature"
//! scheme (draft-cavage HTTP signatures, version 1, rsa-sha256).

use anyhow::{Context, Result};
use base64::Engine as _;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, DATE, HOST};
use reqwest::{Method, Request};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use sha2::{Digest, Sha256};
use std::path::Path;
use url::Url;

/// Header carrying the base64 SHA-256 digest of the request body
pub const CONTENT_SHA256: &str = "x-content-sha256";

const SIGNATURE_VERSION: &str = "1";
const SIGNATURE_ALGORITHM: &str = "rsa-sha256";

/// Headers signed on requests without a body
const GENERIC_HEADERS: &[&str] = &["date", "(request-target)", "host"];

/// Headers signed on POST/PUT/PATCH requests
const BODY_HEADERS: &[&str] = &[
    "date",
    "(request-target)",
    "host",
    "content-length",
    "content-type",
    CONTENT_SHA256,
];

/// Anything able to authorize an outgoing OCI request in place
pub trait RequestSigner: Send + Sync {
    fn sign(&self, request: &mut Request) -> Result<()>;
}

/// Signer backed by a user's API signing key
pub struct ApiKeySigner {
    key_id: String,
    signing_key: SigningKey<Sha256>,
}

impl ApiKeySigner {
    pub fn new(key_id: String, private_key: RsaPrivateKey) -> Self {
        Self {
            key_id,
            signing_key: SigningKey::<Sha256>::new(private_key),
        }
    }

    /// Load the private key from a PEM file on disk
    pub fn from_pem_file(key_id: String, path: &Path) -> Result<Self> {
        let pem = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read private key {}", path.display()))?;
        let private_key = parse_private_key(&pem)
            .with_context(|| format!("Failed to load private key {}", path.display()))?;
        Ok(Self::new(key_id, private_key))
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }
}

impl RequestSigner for ApiKeySigner {
    fn sign(&self, request: &mut Request) -> Result<()> {
        let method = request.method().clone();
        let target = request_target(request.url());
        let host = host_header(request.url())?;
        let body = request
            .body()
            .and_then(|b| b.as_bytes())
            .map(<[u8]>::to_vec)
            .unwrap_or_default();

        let headers = request.headers_mut();
        headers.insert(DATE, HeaderValue::from_str(&http_date())?);
        headers.insert(HOST, HeaderValue::from_str(&host)?);

        let signed_headers = if has_body(&method) {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
            if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            headers.insert(CONTENT_SHA256, HeaderValue::from_str(&content_sha256(&body))?);
            BODY_HEADERS
        } else {
            GENERIC_HEADERS
        };

        let signing_string = signing_string(&method, &target, headers, signed_headers)?;
        let signature = self.signing_key.sign(signing_string.as_bytes());
        let signature = base64::engine::general_purpose::STANDARD.encode(signature.to_bytes());

        let authorization = format!(
            "Signature version=\"{}\",headers=\"{}\",keyId=\"{}\",algorithm=\"{}\",signature=\"{}\"",
            SIGNATURE_VERSION,
            signed_headers.join(" "),
            self.key_id,
            SIGNATURE_ALGORITHM,
            signature
        );
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&authorization)?);

        tracing::trace!("Signed {} {} with key {}", method, target, self.key_id);
        Ok(())
    }
}

/// Build the `keyId` value for an API signing key
pub fn key_id(tenancy_id: &str, user_id: &str, fingerprint: &str) -> String {
    format!("{}/{}/{}", tenancy_id, user_id, fingerprint)
}

/// Parse an unencrypted RSA private key in PKCS#8 or PKCS#1 PEM form
pub fn parse_private_key(pem: &str) -> Result<RsaPrivateKey> {
    RsaPrivateKey::from_pkcs8_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
        .context("Not an unencrypted PKCS#1 or PKCS#8 RSA private key")
}

/// Assemble the string that gets signed, one `name: value` line per header
pub fn signing_string(
    method: &Method,
    target: &str,
    headers: &HeaderMap,
    names: &[&str],
) -> Result<String> {
    let mut lines = Vec::with_capacity(names.len());
    for name in names {
        if *name == "(request-target)" {
            lines.push(format!(
                "(request-target): {} {}",
                method.as_str().to_lowercase(),
                target
            ));
            continue;
        }
        let value = headers
            .get(*name)
            .with_context(|| format!("Missing header to sign: {}", name))?
            .to_str()
            .with_context(|| format!("Header {} is not valid ASCII", name))?;
        lines.push(format!("{}: {}", name, value));
    }
    Ok(lines.join("\n"))
}

/// Base64 SHA-256 digest of a request body
pub fn content_sha256(body: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(Sha256::digest(body))
}

fn has_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

fn request_target(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

fn host_header(url: &Url) -> Result<String> {
    let host = url.host_str().context("Request URL has no host")?;
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

fn http_date() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
