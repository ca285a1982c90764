//! OCI API interaction module
//!
//! This module provides the core functionality for talking to Oracle Cloud
//! Infrastructure REST APIs: request signing, the HTTP transport and the
//! client that builds per-service endpoint URLs.
//!
//! # Module Structure
//!
//! - [`auth`] - API signing key request signatures
//! - [`client`] - Main OCI client for making API requests
//! - [`http`] - HTTP transport, pagination cursor extraction, API errors
//!
//! # Example
//!
//! ```ignore
//! use toci::config::Config;
//! use toci::oci::client::{OciClient, Service};
//!
//! async fn example(config: &Config) -> anyhow::Result<()> {
//!     let client = OciClient::new(config)?;
//!     let url = client.url(Service::Compute, "/instances", &[("compartmentId", client.tenancy_id.as_str())])?;
//!     let page = client.get(&url).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
