//! Report driver
//!
//! Runs every listing in a fixed order and writes plain text as each step
//! completes. The first failing step ends the run.

use crate::metrics::{self, InstanceMetrics, MetricName};
use crate::oci::client::OciClient;
use crate::resource::{
    self, AvailabilityDomain, Bucket, DbSystem, FileSystem, Instance, LoadBalancer, Snapshot,
    UsageRange, UsageSummary,
};
use anyhow::{Context, Result};
use std::io::{self, Write};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Options controlling one report run
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Billing period
    pub usage: UsageRange,
    /// Also list boot volumes per availability domain
    pub boot_volumes: bool,
}

/// Run the whole report against `client`, writing to `out`
pub async fn run<W: Write>(client: &OciClient, options: &ReportOptions, out: &mut W) -> Result<()> {
    report_instances(client, out).await?;

    writeln!(out, "Load Balancers:")?;
    let load_balancers = resource::list_load_balancers(client)
        .await
        .context("Error fetching load balancers")?;
    for load_balancer in &load_balancers {
        tracing::trace!("{:?}", load_balancer);
        render_load_balancer(out, load_balancer)?;
    }

    writeln!(out, "Databases:")?;
    let databases = resource::list_db_systems(client)
        .await
        .context("Error fetching databases")?;
    for database in &databases {
        tracing::trace!("{:?}", database);
        render_database(out, database)?;
    }

    writeln!(out, "Buckets:")?;
    let buckets = resource::list_buckets(client)
        .await
        .context("Error fetching buckets")?;
    for bucket in &buckets {
        tracing::trace!("{:?}", bucket);
        render_bucket(out, bucket)?;
    }

    writeln!(out, "Availability Domains:")?;
    let availability_domains = resource::list_availability_domains(client)
        .await
        .context("Error fetching availability domains")?;
    for availability_domain in &availability_domains {
        render_availability_domain(out, availability_domain)?;
    }

    if options.boot_volumes {
        report_boot_volumes(client, &availability_domains, out).await?;
    }

    report_file_systems(client, &availability_domains, out).await?;

    writeln!(out, "Billing:")?;
    let usage = resource::list_usage(client, &options.usage)
        .await
        .context("Error fetching billing usage")?;
    for line in &usage {
        render_usage(out, line)?;
    }

    Ok(())
}

async fn report_instances<W: Write>(client: &OciClient, out: &mut W) -> Result<()> {
    writeln!(out, "Instances:")?;
    let instances = resource::list_instances(client)
        .await
        .context("Error fetching instances")?;

    for instance in &instances {
        render_instance(out, instance)?;
        if instance.is_running() {
            let metrics = metrics::get_instance_metrics(client, &instance.id)
                .await
                .with_context(|| format!("Error fetching instance {} metrics", instance.display_name))?;
            render_metrics(out, &metrics)?;
        }
    }

    Ok(())
}

async fn report_boot_volumes<W: Write>(
    client: &OciClient,
    availability_domains: &[AvailabilityDomain],
    out: &mut W,
) -> Result<()> {
    writeln!(out, "Boot Volumes:")?;
    for availability_domain in availability_domains {
        let volumes = resource::list_boot_volumes(client, &availability_domain.name)
            .await
            .with_context(|| format!("Error fetching boot volumes in {}", availability_domain.name))?;

        for volume in &volumes {
            writeln!(
                out,
                "  Name: {}, Size: {} Gb, Availability Domain: {}, State: {}",
                volume.display_name,
                volume.size_in_gbs.unwrap_or(0),
                availability_domain.name,
                volume.lifecycle_state
            )?;
        }
    }
    Ok(())
}

async fn report_file_systems<W: Write>(
    client: &OciClient,
    availability_domains: &[AvailabilityDomain],
    out: &mut W,
) -> Result<()> {
    writeln!(out, "File Systems:")?;
    for availability_domain in availability_domains {
        let file_systems = resource::list_file_systems(client, &availability_domain.name)
            .await
            .with_context(|| format!("Error fetching file systems in {}", availability_domain.name))?;

        for file_system in &file_systems {
            render_file_system(out, file_system, &availability_domain.name)?;

            let snapshots = resource::list_snapshots(client, &file_system.id)
                .await
                .with_context(|| format!("Error fetching file system ({}) snapshots", file_system.id))?;

            writeln!(out, "    Snapshots:")?;
            for snapshot in &snapshots {
                render_snapshot(out, snapshot)?;
            }
        }
    }
    Ok(())
}

fn or_dash(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

fn render_instance<W: Write>(out: &mut W, instance: &Instance) -> io::Result<()> {
    writeln!(
        out,
        "  Name: {}, Shape: {}, State: {}",
        instance.display_name, instance.shape, instance.lifecycle_state
    )?;

    let shape = instance.shape_config.clone().unwrap_or_default();
    writeln!(out, "    Shape Details:")?;
    writeln!(out, "      Processor: {}", or_dash(&shape.processor_description))?;
    writeln!(out, "      Cores: {:.0}", shape.ocpus.unwrap_or(0.0))?;
    writeln!(out, "      Memory: {:.0} Gb", shape.memory_in_gbs.unwrap_or(0.0))
}

fn render_metrics<W: Write>(out: &mut W, metrics: &InstanceMetrics) -> io::Result<()> {
    writeln!(out, "    Metrics:")?;
    writeln!(
        out,
        "      CpuUtilization: {:.2} %",
        metrics.get(MetricName::CpuUtilization)
    )?;
    writeln!(
        out,
        "      MemoryUtilization: {:.2} %",
        metrics.get(MetricName::MemoryUtilization)
    )?;
    writeln!(
        out,
        "      DiskBytesRead: {:.6} Mb",
        metrics.get(MetricName::DiskBytesRead) / BYTES_PER_MB
    )?;
    writeln!(
        out,
        "      DiskBytesWritten: {:.6} Mb",
        metrics.get(MetricName::DiskBytesWritten) / BYTES_PER_MB
    )
}

fn render_load_balancer<W: Write>(out: &mut W, load_balancer: &LoadBalancer) -> io::Result<()> {
    writeln!(
        out,
        "  Name: {}, Shape: {}, State: {}",
        load_balancer.display_name, load_balancer.shape_name, load_balancer.lifecycle_state
    )
}

fn render_database<W: Write>(out: &mut W, database: &DbSystem) -> io::Result<()> {
    writeln!(
        out,
        "  Name: {}, DB: {}, State: {}",
        database.display_name,
        or_dash(&database.database_edition),
        database.lifecycle_state
    )
}

fn render_bucket<W: Write>(out: &mut W, bucket: &Bucket) -> io::Result<()> {
    writeln!(
        out,
        "  Name: {}, Created by: {}, Creation Date: {}",
        bucket.name,
        or_dash(&bucket.created_by),
        or_dash(&bucket.time_created)
    )
}

fn render_availability_domain<W: Write>(
    out: &mut W,
    availability_domain: &AvailabilityDomain,
) -> io::Result<()> {
    writeln!(
        out,
        "  Name: {}, ID: {}",
        availability_domain.name,
        or_dash(&availability_domain.id)
    )
}

fn render_file_system<W: Write>(
    out: &mut W,
    file_system: &FileSystem,
    availability_domain: &str,
) -> io::Result<()> {
    writeln!(
        out,
        "  Name: {}, Size: {} Bytes, Availability Domain: {}, State: {}",
        file_system.display_name,
        file_system.metered_bytes.unwrap_or(0),
        availability_domain,
        file_system.lifecycle_state
    )
}

fn render_snapshot<W: Write>(out: &mut W, snapshot: &Snapshot) -> io::Result<()> {
    writeln!(
        out,
        "      Name: {}, Creation Date: {}, State: {}",
        snapshot.name,
        or_dash(&snapshot.time_created),
        snapshot.lifecycle_state
    )
}

fn render_usage<W: Write>(out: &mut W, usage: &UsageSummary) -> io::Result<()> {
    writeln!(
        out,
        "   Date: {}, Comp. Qty: {:.6}",
        or_dash(&usage.time_usage_started),
        usage.computed_quantity.unwrap_or(0.0)
    )
}
