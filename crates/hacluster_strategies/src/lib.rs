//! Strategy catalogs for HA database clusters.
//!
//! Four closed families of interchangeable strategies are known to the
//! cluster driver: load balancing, metadata caching, state persistence and
//! replica synchronization. Each family is a [`Catalog`] mapping a stable
//! identifier to a shared strategy instance.
//!
//! # Usage
//!
//! ```rust
//! use hacluster_strategies::{StrategyKind, StrategyRegistry};
//!
//! let registry = StrategyRegistry::builtin();
//! let balancer = registry.balancers().resolve("round-robin").unwrap();
//! assert_eq!(balancer.id(), "round-robin");
//!
//! let err = registry.resolve(StrategyKind::Balancing, "nonexistent").unwrap_err();
//! assert!(err.to_string().contains("nonexistent"));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

/// Declares a stateless strategy type with a fixed identifier.
macro_rules! define_unit_strategy {
    ($name:ident, $id:expr, $summary:expr) => {
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl $name {
            pub const ID: &'static str = $id;
        }

        impl $crate::Strategy for $name {
            fn id(&self) -> &str {
                Self::ID
            }

            fn summary(&self) -> &'static str {
                $summary
            }
        }
    };
}

pub mod balancer;
pub mod cache;
mod catalog;
mod error;
pub mod persistence;
pub mod sync;

pub use balancer::{BalancerStrategy, SelectionPolicy};
pub use cache::{CachePopulation, CacheSharing, MetadataCacheStrategy};
pub use catalog::Catalog;
pub use error::StrategyError;
pub use persistence::{
    EmbeddedStateSettings, PersistenceBackend, SettingsKind, SqlStateSettings,
    StatePersistenceSettings, StatePersistenceStrategy,
};
pub use sync::{PerTableSynchronization, SynchronizationStrategy};

/// Common surface of every pluggable strategy.
pub trait Strategy: fmt::Debug + Send + Sync {
    /// Stable identifier used to select this strategy in configuration.
    fn id(&self) -> &str;

    /// One-line human readable description.
    fn summary(&self) -> &'static str;
}

/// The four strategy families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    #[serde(rename = "balancer")]
    Balancing,
    MetadataCache,
    StatePersistence,
    Synchronization,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Balancing,
        StrategyKind::MetadataCache,
        StrategyKind::StatePersistence,
        StrategyKind::Synchronization,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Balancing => "balancer",
            StrategyKind::MetadataCache => "metadata-cache",
            StrategyKind::StatePersistence => "state-persistence",
            StrategyKind::Synchronization => "synchronization",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "balancer" | "balancing" => Ok(StrategyKind::Balancing),
            "metadata-cache" | "cache" => Ok(StrategyKind::MetadataCache),
            "state-persistence" | "state" => Ok(StrategyKind::StatePersistence),
            "synchronization" | "sync" => Ok(StrategyKind::Synchronization),
            _ => Err(format!(
                "Invalid strategy kind: '{}'. Expected: balancer, metadata-cache, state-persistence, or synchronization",
                s
            )),
        }
    }
}

/// A strategy resolved through [`StrategyRegistry::resolve`].
#[derive(Debug, Clone)]
pub enum ResolvedStrategy {
    Balancer(Arc<dyn BalancerStrategy>),
    MetadataCache(Arc<dyn MetadataCacheStrategy>),
    StatePersistence(Arc<dyn StatePersistenceStrategy>),
    Synchronization(Arc<dyn SynchronizationStrategy>),
}

impl ResolvedStrategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            ResolvedStrategy::Balancer(_) => StrategyKind::Balancing,
            ResolvedStrategy::MetadataCache(_) => StrategyKind::MetadataCache,
            ResolvedStrategy::StatePersistence(_) => StrategyKind::StatePersistence,
            ResolvedStrategy::Synchronization(_) => StrategyKind::Synchronization,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ResolvedStrategy::Balancer(s) => s.id(),
            ResolvedStrategy::MetadataCache(s) => s.id(),
            ResolvedStrategy::StatePersistence(s) => s.id(),
            ResolvedStrategy::Synchronization(s) => s.id(),
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            ResolvedStrategy::Balancer(s) => s.summary(),
            ResolvedStrategy::MetadataCache(s) => s.summary(),
            ResolvedStrategy::StatePersistence(s) => s.summary(),
            ResolvedStrategy::Synchronization(s) => s.summary(),
        }
    }
}

/// Listing entry for a catalog member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyInfo {
    pub kind: StrategyKind,
    pub id: String,
    pub summary: String,
}

/// The full set of catalogs consulted by the cluster assembler.
#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    balancers: Catalog<dyn BalancerStrategy>,
    metadata_caches: Catalog<dyn MetadataCacheStrategy>,
    state_persistence: Catalog<dyn StatePersistenceStrategy>,
    synchronization: Catalog<dyn SynchronizationStrategy>,
}

static BUILTIN: OnceLock<Result<StrategyRegistry, StrategyError>> = OnceLock::new();

impl StrategyRegistry {
    /// Assemble a registry from explicit catalogs.
    pub fn new(
        balancers: Catalog<dyn BalancerStrategy>,
        metadata_caches: Catalog<dyn MetadataCacheStrategy>,
        state_persistence: Catalog<dyn StatePersistenceStrategy>,
        synchronization: Catalog<dyn SynchronizationStrategy>,
    ) -> Self {
        Self {
            balancers,
            metadata_caches,
            state_persistence,
            synchronization,
        }
    }

    /// Build a registry from raw entry lists, rejecting duplicate identifiers.
    pub fn from_entries(
        balancers: Vec<Arc<dyn BalancerStrategy>>,
        metadata_caches: Vec<Arc<dyn MetadataCacheStrategy>>,
        state_persistence: Vec<Arc<dyn StatePersistenceStrategy>>,
        synchronization: Vec<Arc<dyn SynchronizationStrategy>>,
    ) -> Result<Self, StrategyError> {
        Ok(Self::new(
            Catalog::new(StrategyKind::Balancing, balancers)?,
            Catalog::new(StrategyKind::MetadataCache, metadata_caches)?,
            Catalog::new(StrategyKind::StatePersistence, state_persistence)?,
            Catalog::new(StrategyKind::Synchronization, synchronization)?,
        ))
    }

    /// The process-wide built-in catalogs, created on first use.
    ///
    /// Fails when two compiled-in strategies of one kind share an identifier.
    pub fn try_builtin() -> Result<&'static StrategyRegistry, StrategyError> {
        BUILTIN
            .get_or_init(|| {
                Self::from_entries(
                    balancer::builtin(),
                    cache::builtin(),
                    persistence::builtin(),
                    sync::builtin(),
                )
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Like [`StrategyRegistry::try_builtin`] for callers that have already
    /// validated the built-in catalogs at startup.
    ///
    /// # Panics
    ///
    /// Panics if the built-in catalogs contain a duplicate identifier.
    pub fn builtin() -> &'static StrategyRegistry {
        match Self::try_builtin() {
            Ok(registry) => registry,
            Err(err) => panic!("built-in strategy catalogs are inconsistent: {}", err),
        }
    }

    pub fn balancers(&self) -> &Catalog<dyn BalancerStrategy> {
        &self.balancers
    }

    pub fn metadata_caches(&self) -> &Catalog<dyn MetadataCacheStrategy> {
        &self.metadata_caches
    }

    pub fn state_persistence(&self) -> &Catalog<dyn StatePersistenceStrategy> {
        &self.state_persistence
    }

    pub fn synchronization(&self) -> &Catalog<dyn SynchronizationStrategy> {
        &self.synchronization
    }

    /// Look up `identifier` in the catalog for `kind`.
    ///
    /// Matching is exact and case-sensitive; an unknown identifier is an
    /// error, never a fallback.
    pub fn resolve(
        &self,
        kind: StrategyKind,
        identifier: &str,
    ) -> Result<ResolvedStrategy, StrategyError> {
        match kind {
            StrategyKind::Balancing => self
                .balancers
                .resolve(identifier)
                .map(ResolvedStrategy::Balancer),
            StrategyKind::MetadataCache => self
                .metadata_caches
                .resolve(identifier)
                .map(ResolvedStrategy::MetadataCache),
            StrategyKind::StatePersistence => self
                .state_persistence
                .resolve(identifier)
                .map(ResolvedStrategy::StatePersistence),
            StrategyKind::Synchronization => self
                .synchronization
                .resolve(identifier)
                .map(ResolvedStrategy::Synchronization),
        }
    }

    /// Identifiers of one catalog, in declaration order.
    pub fn identifiers(&self, kind: StrategyKind) -> Vec<&str> {
        match kind {
            StrategyKind::Balancing => self.balancers.identifiers(),
            StrategyKind::MetadataCache => self.metadata_caches.identifiers(),
            StrategyKind::StatePersistence => self.state_persistence.identifiers(),
            StrategyKind::Synchronization => self.synchronization.identifiers(),
        }
    }

    /// Describe every member of one catalog.
    pub fn describe(&self, kind: StrategyKind) -> Vec<StrategyInfo> {
        fn collect<S: Strategy + ?Sized>(kind: StrategyKind, catalog: &Catalog<S>) -> Vec<StrategyInfo> {
            catalog
                .iter()
                .map(|(id, strategy)| StrategyInfo {
                    kind,
                    id: id.to_string(),
                    summary: strategy.summary().to_string(),
                })
                .collect()
        }

        match kind {
            StrategyKind::Balancing => collect(kind, &self.balancers),
            StrategyKind::MetadataCache => collect(kind, &self.metadata_caches),
            StrategyKind::StatePersistence => collect(kind, &self.state_persistence),
            StrategyKind::Synchronization => collect(kind, &self.synchronization),
        }
    }
}
