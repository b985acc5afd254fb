//! Init command - write a starter cluster config

use crate::cli::error::HelpfulError;
use anyhow::Context;
use hacluster_config::paths::resolve_config_path;
use hacluster_config::{ClusterConfig, ReplicaDescriptor};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug)]
pub struct InitArgs {
    pub config: Option<PathBuf>,
    pub force: bool,
}

/// Defaults plus two placeholder replicas.
pub fn starter_config() -> ClusterConfig {
    ClusterConfig::with_replicas(vec![
        ReplicaDescriptor::new("primary", "postgres://localhost:5432/app")
            .with_property("connect_timeout", "10"),
        ReplicaDescriptor::new("standby", "postgres://localhost:5433/app")
            .with_property("connect_timeout", "10"),
    ])
}

pub fn write_starter(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        return Err(HelpfulError::new(format!("Config already exists: {}", path.display()))
            .with_suggestion("TRY: Pass --force to overwrite it")
            .into());
    }
    starter_config()
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Starter config written");
    Ok(())
}

pub fn run(args: InitArgs) -> anyhow::Result<()> {
    let path = resolve_config_path(args.config.as_deref());
    write_starter(&path, args.force)?;
    println!("Wrote {}", path.display());
    println!("Edit the [[replicas]] entries, then run: hacluster check");
    Ok(())
}
