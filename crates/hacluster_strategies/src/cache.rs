//! Metadata-cache strategies for per-replica schema introspection.

use crate::Strategy;
use serde::Serialize;
use std::sync::Arc;

/// When schema metadata is loaded into the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CachePopulation {
    /// Nothing is cached; every lookup introspects the replica.
    Never,
    /// Entries are loaded on first access.
    Lazy,
    /// All metadata is loaded up front.
    Eager,
}

/// Who shares a cache instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheSharing {
    PerConnection,
    Shared,
}

pub trait MetadataCacheStrategy: Strategy {
    fn population(&self) -> CachePopulation;
    fn sharing(&self) -> CacheSharing;
}

define_unit_strategy!(
    SimpleMetadataCache,
    "simple",
    "No caching; introspects replica metadata on every request"
);
define_unit_strategy!(
    LazyMetadataCache,
    "lazy",
    "Per-connection cache populated on first access"
);
define_unit_strategy!(
    EagerMetadataCache,
    "eager",
    "Per-connection cache populated when the connection opens"
);
define_unit_strategy!(
    SharedLazyMetadataCache,
    "shared-lazy",
    "Cluster-wide cache populated on first access"
);
define_unit_strategy!(
    SharedEagerMetadataCache,
    "shared-eager",
    "Cluster-wide cache populated at cluster start"
);

macro_rules! impl_cache {
    ($name:ident, $population:expr, $sharing:expr) => {
        impl MetadataCacheStrategy for $name {
            fn population(&self) -> CachePopulation {
                $population
            }

            fn sharing(&self) -> CacheSharing {
                $sharing
            }
        }
    };
}

impl_cache!(SimpleMetadataCache, CachePopulation::Never, CacheSharing::PerConnection);
impl_cache!(LazyMetadataCache, CachePopulation::Lazy, CacheSharing::PerConnection);
impl_cache!(EagerMetadataCache, CachePopulation::Eager, CacheSharing::PerConnection);
impl_cache!(SharedLazyMetadataCache, CachePopulation::Lazy, CacheSharing::Shared);
impl_cache!(SharedEagerMetadataCache, CachePopulation::Eager, CacheSharing::Shared);

pub(crate) fn builtin() -> Vec<Arc<dyn MetadataCacheStrategy>> {
    vec![
        Arc::new(SimpleMetadataCache),
        Arc::new(LazyMetadataCache),
        Arc::new(EagerMetadataCache),
        Arc::new(SharedLazyMetadataCache),
        Arc::new(SharedEagerMetadataCache),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_variants_are_shared() {
        for cache in builtin() {
            let shared = cache.id().starts_with("shared-");
            assert_eq!(cache.sharing() == CacheSharing::Shared, shared, "{}", cache.id());
        }
    }

    #[test]
    fn test_simple_never_caches() {
        assert_eq!(SimpleMetadataCache.population(), CachePopulation::Never);
        assert_eq!(SharedEagerMetadataCache.population(), CachePopulation::Eager);
    }
}
