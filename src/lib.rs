//! Inventory, metrics and usage report for Oracle Cloud Infrastructure.
//!
//! - [`config`] - Credentials loaded from a settings file and the environment
//! - [`oci`] - Request signing, HTTP transport and endpoint construction
//! - [`resource`] - Paginated listings per resource kind
//! - [`metrics`] - Per-instance compute agent metrics
//! - [`report`] - The sequential report driver

pub mod config;
pub mod metrics;
pub mod oci;
pub mod report;
pub mod resource;

/// Version injected at compile time via TOCI_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("TOCI_VERSION") {
    Some(v) => v,
    None => "dev",
};
