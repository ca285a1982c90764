//! Cursor-based pagination
//!
//! Every OCI list call returns one page of items plus an optional
//! `opc-next-page` cursor. [`paginate`] drives any such call to exhaustion.

use anyhow::{Context, Result};
use std::fmt;
use std::future::Future;

/// Resource kinds the report enumerates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Instances,
    BootVolumes,
    LoadBalancers,
    Buckets,
    AvailabilityDomains,
    FileSystems,
    Snapshots,
    Databases,
    Usage,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Instances => "instances",
            ResourceKind::BootVolumes => "boot volumes",
            ResourceKind::LoadBalancers => "load balancers",
            ResourceKind::Buckets => "buckets",
            ResourceKind::AvailabilityDomains => "availability domains",
            ResourceKind::FileSystems => "file systems",
            ResourceKind::Snapshots => "snapshots",
            ResourceKind::Databases => "databases",
            ResourceKind::Usage => "usage records",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page: Option<String>,
}

/// Fetch all pages (auto-paginate)
///
/// `fetch_page` is called with `None` first, then with each cursor exactly as
/// the previous page returned it, until a page comes back without one. Items
/// keep page-arrival order. The first failing page aborts the whole listing;
/// nothing already collected is returned.
pub async fn paginate<T, F, Fut>(kind: ResourceKind, mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut all_items = Vec::new();
    let mut page_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = fetch_page(page_token.take())
            .await
            .with_context(|| format!("Failed to list {}", kind))?;
        pages += 1;
        all_items.extend(page.items);

        match page.next_page {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    tracing::info!("Listed {} {} in {} page(s)", all_items.len(), kind, pages);
    Ok(all_items)
}
