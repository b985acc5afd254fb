//! The immutable, fully-resolved cluster descriptor.

use crate::schedule::ReactivationSchedule;
use hacluster_config::ReplicaDescriptor;
use hacluster_strategies::{
    BalancerStrategy, Catalog, MetadataCacheStrategy, StatePersistenceSettings,
    StatePersistenceStrategy, SynchronizationStrategy,
};
use serde::Serialize;
use std::sync::Arc;

/// Schema features the driver inspects on each replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DetectionFlags {
    pub identity_columns: bool,
    pub sequences: bool,
}

/// The selected state-persistence strategy and the settings supplied for it.
#[derive(Debug, Clone)]
pub struct ResolvedStatePersistence {
    strategy: Arc<dyn StatePersistenceStrategy>,
    settings: StatePersistenceSettings,
}

impl ResolvedStatePersistence {
    pub(crate) fn new(
        strategy: Arc<dyn StatePersistenceStrategy>,
        settings: StatePersistenceSettings,
    ) -> Self {
        Self { strategy, settings }
    }

    pub fn strategy(&self) -> &Arc<dyn StatePersistenceStrategy> {
        &self.strategy
    }

    /// Only what configuration provided; unset fields stay `None`.
    pub fn settings(&self) -> &StatePersistenceSettings {
        &self.settings
    }

    /// Configured settings with the strategy's own defaults filling the gaps.
    pub fn effective_settings(&self) -> StatePersistenceSettings {
        self.settings.overlay(&self.strategy.default_settings())
    }
}

impl PartialEq for ResolvedStatePersistence {
    fn eq(&self, other: &Self) -> bool {
        self.strategy.id() == other.strategy.id() && self.settings == other.settings
    }
}

impl Eq for ResolvedStatePersistence {}

/// The whole synchronization catalog plus the default selection.
///
/// Every strategy stays addressable by name so the driver can honour
/// per-operation overrides.
#[derive(Debug, Clone)]
pub struct SynchronizationSelection {
    catalog: Catalog<dyn SynchronizationStrategy>,
    default: Arc<dyn SynchronizationStrategy>,
}

impl SynchronizationSelection {
    pub(crate) fn new(
        catalog: Catalog<dyn SynchronizationStrategy>,
        default: Arc<dyn SynchronizationStrategy>,
    ) -> Self {
        Self { catalog, default }
    }

    pub fn default_strategy(&self) -> &Arc<dyn SynchronizationStrategy> {
        &self.default
    }

    pub fn catalog(&self) -> &Catalog<dyn SynchronizationStrategy> {
        &self.catalog
    }

    /// Strategy for an explicit override, or `None` if the name is unknown.
    pub fn get(&self, identifier: &str) -> Option<&Arc<dyn SynchronizationStrategy>> {
        self.catalog.get(identifier)
    }

    pub fn identifiers(&self) -> Vec<&str> {
        self.catalog.identifiers()
    }
}

impl PartialEq for SynchronizationSelection {
    fn eq(&self, other: &Self) -> bool {
        self.catalog == other.catalog && self.default.id() == other.default.id()
    }
}

impl Eq for SynchronizationSelection {}

/// Fully resolved cluster configuration handed to the runtime driver.
///
/// Built by [`crate::ClusterAssembler`] and never mutated afterwards; a
/// configuration change means assembling and registering a new descriptor.
/// Equality compares every field, with strategies compared by identifier.
#[derive(Debug, Clone)]
pub struct ClusterDescriptor {
    cluster_name: String,
    replicas: Arc<[ReplicaDescriptor]>,
    detection: DetectionFlags,
    balancer: Arc<dyn BalancerStrategy>,
    metadata_cache: Arc<dyn MetadataCacheStrategy>,
    state_persistence: ResolvedStatePersistence,
    synchronization: SynchronizationSelection,
    reactivation: ReactivationSchedule,
}

pub(crate) struct DescriptorParts {
    pub cluster_name: String,
    pub replicas: Arc<[ReplicaDescriptor]>,
    pub detection: DetectionFlags,
    pub balancer: Arc<dyn BalancerStrategy>,
    pub metadata_cache: Arc<dyn MetadataCacheStrategy>,
    pub state_persistence: ResolvedStatePersistence,
    pub synchronization: SynchronizationSelection,
    pub reactivation: ReactivationSchedule,
}

impl ClusterDescriptor {
    pub(crate) fn from_parts(parts: DescriptorParts) -> Self {
        Self {
            cluster_name: parts.cluster_name,
            replicas: parts.replicas,
            detection: parts.detection,
            balancer: parts.balancer,
            metadata_cache: parts.metadata_cache,
            state_persistence: parts.state_persistence,
            synchronization: parts.synchronization,
            reactivation: parts.reactivation,
        }
    }

    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    pub fn replicas(&self) -> &[ReplicaDescriptor] {
        &self.replicas
    }

    pub fn replica(&self, name: &str) -> Option<&ReplicaDescriptor> {
        self.replicas.iter().find(|r| r.name == name)
    }

    pub fn detection(&self) -> DetectionFlags {
        self.detection
    }

    pub fn balancer(&self) -> &Arc<dyn BalancerStrategy> {
        &self.balancer
    }

    pub fn metadata_cache(&self) -> &Arc<dyn MetadataCacheStrategy> {
        &self.metadata_cache
    }

    pub fn state_persistence(&self) -> &ResolvedStatePersistence {
        &self.state_persistence
    }

    pub fn synchronization(&self) -> &SynchronizationSelection {
        &self.synchronization
    }

    pub fn reactivation(&self) -> &ReactivationSchedule {
        &self.reactivation
    }

    /// Serializable view without credentials.
    pub fn summary(&self) -> ClusterSummary {
        ClusterSummary {
            cluster_name: self.cluster_name.clone(),
            replicas: self
                .replicas
                .iter()
                .map(|r| ReplicaSummary {
                    name: r.name.clone(),
                    location: r.location.clone(),
                    weight: r.weight,
                    local: r.local,
                })
                .collect(),
            detection: self.detection,
            balancer: self.balancer.id().to_string(),
            metadata_cache: self.metadata_cache.id().to_string(),
            state_persistence: StatePersistenceSummary {
                strategy: self.state_persistence.strategy().id().to_string(),
                settings: self.state_persistence.settings().clone(),
            },
            synchronization: SynchronizationSummary {
                default: self.synchronization.default_strategy().id().to_string(),
                available: self
                    .synchronization
                    .identifiers()
                    .into_iter()
                    .map(String::from)
                    .collect(),
            },
            reactivation_schedule: self.reactivation.expression().to_string(),
        }
    }
}

impl PartialEq for ClusterDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.cluster_name == other.cluster_name
            && self.replicas == other.replicas
            && self.detection == other.detection
            && self.balancer.id() == other.balancer.id()
            && self.metadata_cache.id() == other.metadata_cache.id()
            && self.state_persistence == other.state_persistence
            && self.synchronization == other.synchronization
            && self.reactivation == other.reactivation
    }
}

impl Eq for ClusterDescriptor {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterSummary {
    pub cluster_name: String,
    pub replicas: Vec<ReplicaSummary>,
    pub detection: DetectionFlags,
    pub balancer: String,
    pub metadata_cache: String,
    pub state_persistence: StatePersistenceSummary,
    pub synchronization: SynchronizationSummary,
    pub reactivation_schedule: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplicaSummary {
    pub name: String,
    pub location: String,
    pub weight: u32,
    pub local: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatePersistenceSummary {
    pub strategy: String,
    pub settings: StatePersistenceSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynchronizationSummary {
    pub default: String,
    pub available: Vec<String>,
}
