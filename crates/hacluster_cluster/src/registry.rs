//! Named registry through which the runtime driver finds cluster descriptors.

use crate::descriptor::ClusterDescriptor;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tracing::debug;

/// Receives assembled descriptors under their cluster name.
///
/// Implementations must serialize concurrent registrations themselves; a
/// second registration under the same name replaces the first.
pub trait RegistrationSink: Send + Sync {
    fn register(&self, cluster_name: &str, descriptor: Arc<ClusterDescriptor>);
}

/// In-process registry of cluster descriptors, last write wins.
#[derive(Debug, Default)]
pub struct ClusterRegistry {
    clusters: RwLock<HashMap<String, Arc<ClusterDescriptor>>>,
}

static GLOBAL: OnceLock<ClusterRegistry> = OnceLock::new();

impl ClusterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry consulted by connection requests.
    pub fn global() -> &'static ClusterRegistry {
        GLOBAL.get_or_init(ClusterRegistry::new)
    }

    pub fn get(&self, cluster_name: &str) -> Option<Arc<ClusterDescriptor>> {
        self.clusters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(cluster_name)
            .cloned()
    }

    /// Registered cluster names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .clusters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn remove(&self, cluster_name: &str) -> Option<Arc<ClusterDescriptor>> {
        self.clusters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(cluster_name)
    }

    pub fn len(&self) -> usize {
        self.clusters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RegistrationSink for ClusterRegistry {
    fn register(&self, cluster_name: &str, descriptor: Arc<ClusterDescriptor>) {
        let previous = self
            .clusters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(cluster_name.to_string(), descriptor);
        if previous.is_some() {
            debug!(cluster = cluster_name, "Replaced existing cluster registration");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClusterAssembler;
    use hacluster_config::{ClusterConfig, ReplicaDescriptor};

    fn descriptor(name: &str) -> Arc<ClusterDescriptor> {
        let mut config =
            ClusterConfig::with_replicas(vec![ReplicaDescriptor::new("r1", "postgres://db1/app")]);
        config.cluster_name = name.to_string();
        Arc::new(ClusterAssembler::builtin().assemble(&config).unwrap())
    }

    #[test]
    fn test_remove_unregisters_one_cluster() {
        let registry = ClusterRegistry::new();
        registry.register("orders", descriptor("orders"));
        registry.register("billing", descriptor("billing"));

        let removed = registry.remove("orders").unwrap();
        assert_eq!(removed.cluster_name(), "orders");
        assert!(registry.get("orders").is_none());
        assert_eq!(registry.names(), vec!["billing".to_string()]);
        assert_eq!(registry.len(), 1);

        assert!(registry.remove("orders").is_none());
        registry.remove("billing");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_after_remove_starts_fresh() {
        let registry = ClusterRegistry::new();
        let first = descriptor("orders");
        registry.register("orders", Arc::clone(&first));
        registry.remove("orders");

        let second = descriptor("orders");
        registry.register("orders", Arc::clone(&second));
        let current = registry.get("orders").unwrap();
        assert!(Arc::ptr_eq(&current, &second));
        assert!(!Arc::ptr_eq(&current, &first));
    }
}
