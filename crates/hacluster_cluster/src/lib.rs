//! Cluster descriptor assembly for HA database clusters.
//!
//! [`ClusterAssembler`] resolves every strategy identifier in a
//! [`ClusterConfig`] against the strategy catalogs, validates replicas and
//! the reactivation schedule, and produces an immutable
//! [`ClusterDescriptor`]. Descriptors are published through a
//! [`RegistrationSink`], normally the process-wide [`ClusterRegistry`].
//!
//! ```
//! use hacluster_cluster::{ClusterAssembler, ClusterRegistry};
//! use hacluster_config::{ClusterConfig, ReplicaDescriptor};
//!
//! let config = ClusterConfig::with_replicas(vec![
//!     ReplicaDescriptor::new("primary", "postgres://db1/app"),
//!     ReplicaDescriptor::new("standby", "postgres://db2/app"),
//! ]);
//! let registry = ClusterRegistry::new();
//! let descriptor = ClusterAssembler::builtin()
//!     .assemble_and_register(&config, &registry)
//!     .unwrap();
//!
//! assert_eq!(descriptor.balancer().id(), "round-robin");
//! assert!(registry.get("default").is_some());
//! ```

mod assembler;
mod descriptor;
mod error;
mod quartz;
mod registry;
mod schedule;

pub use assembler::ClusterAssembler;
pub use descriptor::{
    ClusterDescriptor, ClusterSummary, DetectionFlags, ReplicaSummary, ResolvedStatePersistence,
    StatePersistenceSummary, SynchronizationSelection, SynchronizationSummary,
};
pub use error::{AssemblyError, Result, ScheduleError};
pub use registry::{ClusterRegistry, RegistrationSink};
pub use schedule::ReactivationSchedule;

use hacluster_config::ClusterConfig;
use std::sync::Arc;

/// Assemble `config` with the built-in strategies and publish it to
/// [`ClusterRegistry::global`].
pub fn register_cluster(config: &ClusterConfig) -> Result<Arc<ClusterDescriptor>> {
    ClusterAssembler::builtin().assemble_and_register(config, ClusterRegistry::global())
}
