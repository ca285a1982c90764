//! Resource enumeration layer
//!
//! Lists every resource kind the report covers. All listings share one
//! pagination routine and differ only in the request they send.
//!
//! # Architecture
//!
//! - [`pagination`] - Generic cursor-following loop and resource kinds
//! - [`models`] - Typed records decoded from list responses
//! - `fetcher` - One listing operation per resource kind
//!
//! # Example
//!
//! ```ignore
//! use toci::oci::client::OciClient;
//! use toci::resource::{list_availability_domains, list_file_systems};
//!
//! async fn file_systems(client: &OciClient) -> anyhow::Result<usize> {
//!     let mut total = 0;
//!     for ad in list_availability_domains(client).await? {
//!         total += list_file_systems(client, &ad.name).await?.len();
//!     }
//!     Ok(total)
//! }
//! ```

mod fetcher;
pub mod models;
pub mod pagination;

pub use fetcher::{
    get_namespace, list_availability_domains, list_boot_volumes, list_buckets, list_buckets_in,
    list_db_systems, list_file_systems, list_instances, list_load_balancers, list_snapshots,
    list_usage,
};
pub use models::*;
pub use pagination::{paginate, Page, ResourceKind};
