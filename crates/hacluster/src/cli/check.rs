//! Check command - validate a cluster config and register it
//!
//! Loads the config, assembles a descriptor with the built-in strategies and
//! publishes it to the process registry, then reports what was resolved.

use crate::cli::error::HelpfulError;
use crate::cli::output::{format_instant, or_dash, print_json, print_table};
use anyhow::Context;
use chrono::{DateTime, Utc};
use hacluster_cluster::{register_cluster, ClusterDescriptor, ClusterRegistry, ClusterSummary};
use hacluster_config::paths::{hacluster_home, resolve_config_path};
use hacluster_config::{ClusterConfig, ConfigError};
use hacluster_strategies::StatePersistenceSettings;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug)]
pub struct CheckArgs {
    pub config: Option<PathBuf>,
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub config_path: PathBuf,
    pub cluster: ClusterSummary,
    /// Configured settings merged with strategy defaults, placeholders expanded.
    pub effective_state_persistence: StatePersistenceSettings,
    pub next_reactivation: Option<DateTime<Utc>>,
    pub registered_clusters: Vec<String>,
}

impl CheckReport {
    pub fn new(
        config_path: &Path,
        descriptor: &ClusterDescriptor,
        registry: &ClusterRegistry,
        now: DateTime<Utc>,
        home: &Path,
    ) -> Self {
        Self {
            config_path: config_path.to_path_buf(),
            cluster: descriptor.summary(),
            effective_state_persistence: descriptor
                .state_persistence()
                .effective_settings()
                .render(descriptor.cluster_name(), home),
            next_reactivation: descriptor.reactivation().next_after(&now),
            registered_clusters: registry.names(),
        }
    }
}

/// Load a config, mapping a missing file to a helpful error.
pub fn load_config(path: &Path) -> anyhow::Result<ClusterConfig> {
    match ClusterConfig::load(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::NotFound(missing)) => Err(HelpfulError::config_not_found(&missing).into()),
        Err(err) => Err(err).with_context(|| format!("Failed to load {}", path.display())),
    }
}

pub fn run(args: CheckArgs) -> anyhow::Result<()> {
    let path = resolve_config_path(args.config.as_deref());
    let config = load_config(&path)?;

    let descriptor =
        register_cluster(&config).map_err(|err| HelpfulError::assembly_failed(&path, &err))?;
    info!(
        cluster = descriptor.cluster_name(),
        path = %path.display(),
        "Cluster config validated"
    );

    let report = CheckReport::new(
        &path,
        &descriptor,
        ClusterRegistry::global(),
        Utc::now(),
        &hacluster_home(),
    );

    if args.json {
        return print_json(&report);
    }
    print_report(&report);
    Ok(())
}

fn print_report(report: &CheckReport) {
    let cluster = &report.cluster;
    println!("Cluster '{}' is valid and registered", cluster.cluster_name);
    println!("  Config:            {}", report.config_path.display());
    println!("  Balancer:          {}", cluster.balancer);
    println!("  Metadata cache:    {}", cluster.metadata_cache);
    println!(
        "  Synchronization:   {} (available: {})",
        cluster.synchronization.default,
        cluster.synchronization.available.join(", ")
    );
    println!(
        "  State persistence: {} {}",
        cluster.state_persistence.strategy,
        describe_settings(&report.effective_state_persistence)
    );
    println!(
        "  Detection:         identity columns {}, sequences {}",
        on_off(cluster.detection.identity_columns),
        on_off(cluster.detection.sequences)
    );
    println!("  Reactivation:      {}", cluster.reactivation_schedule);
    match &report.next_reactivation {
        Some(next) => println!("  Next reactivation: {}", format_instant(next)),
        None => println!("  Next reactivation: never"),
    }
    println!();

    let rows = cluster
        .replicas
        .iter()
        .map(|r| {
            vec![
                r.name.clone(),
                r.location.clone(),
                r.weight.to_string(),
                if r.local { "yes".to_string() } else { "no".to_string() },
            ]
        })
        .collect();
    print_table(&["Replica", "Location", "Weight", "Local"], rows);
}

fn describe_settings(settings: &StatePersistenceSettings) -> String {
    match settings {
        StatePersistenceSettings::InMemory => "(in memory)".to_string(),
        StatePersistenceSettings::Sql(sql) => format!(
            "(url {}, user {})",
            or_dash(sql.url_pattern.as_deref()),
            or_dash(sql.user.as_deref())
        ),
        StatePersistenceSettings::Embedded(embedded) => {
            format!("(location {})", or_dash(embedded.location_pattern.as_deref()))
        }
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}
