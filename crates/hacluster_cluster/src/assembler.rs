//! Turns raw configuration into a validated [`ClusterDescriptor`].

use crate::descriptor::{
    ClusterDescriptor, DescriptorParts, DetectionFlags, ResolvedStatePersistence,
    SynchronizationSelection,
};
use crate::error::{AssemblyError, Result};
use crate::registry::RegistrationSink;
use crate::schedule::ReactivationSchedule;
use hacluster_config::defaults::DEFAULT_CLUSTER_NAME;
use hacluster_config::{ClusterConfig, ReplicaDescriptor, StatePersistenceConfig};
use hacluster_strategies::{
    EmbeddedStateSettings, SettingsKind, SqlStateSettings, StatePersistenceSettings,
    StatePersistenceStrategy, StrategyRegistry,
};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Resolves configuration against a set of strategy catalogs.
///
/// Assembly is pure; the only outward effect is the single
/// [`RegistrationSink::register`] call made by
/// [`ClusterAssembler::assemble_and_register`] once everything validated.
#[derive(Debug, Clone, Copy)]
pub struct ClusterAssembler<'a> {
    strategies: &'a StrategyRegistry,
}

impl ClusterAssembler<'static> {
    /// Assembler over the built-in catalogs.
    pub fn builtin() -> Self {
        Self::new(StrategyRegistry::builtin())
    }
}

impl<'a> ClusterAssembler<'a> {
    pub fn new(strategies: &'a StrategyRegistry) -> Self {
        Self { strategies }
    }

    pub fn strategies(&self) -> &'a StrategyRegistry {
        self.strategies
    }

    /// Validate `config` and build the descriptor without registering it.
    pub fn assemble(&self, config: &ClusterConfig) -> Result<ClusterDescriptor> {
        let cluster_name = effective_cluster_name(&config.cluster_name);

        if config.replicas.is_empty() {
            return Err(AssemblyError::EmptyReplicaList {
                cluster: cluster_name,
            });
        }
        check_unique_replicas(&cluster_name, &config.replicas)?;

        let balancer = self.strategies.balancers().resolve(&config.balancer)?;
        let metadata_cache = self
            .strategies
            .metadata_caches()
            .resolve(&config.metadata_cache)?;
        let persistence = self
            .strategies
            .state_persistence()
            .resolve(&config.state_persistence.strategy)?;

        let default_sync = self
            .strategies
            .synchronization()
            .resolve(&config.default_synchronization_strategy)?;
        let synchronization =
            SynchronizationSelection::new(self.strategies.synchronization().clone(), default_sync);

        let settings = persistence_settings(persistence.as_ref(), &config.state_persistence);
        let state_persistence = ResolvedStatePersistence::new(persistence, settings);

        let reactivation = ReactivationSchedule::parse(&config.reactivation_schedule)?;
        if reactivation.is_exhausted_after(&Utc::now()) {
            warn!(
                cluster = %cluster_name,
                schedule = reactivation.expression(),
                "Reactivation schedule never fires again; failed replicas will not be reactivated automatically"
            );
        }

        debug!(
            cluster = %cluster_name,
            balancer = balancer.id(),
            metadata_cache = metadata_cache.id(),
            state_persistence = state_persistence.strategy().id(),
            synchronization = synchronization.default_strategy().id(),
            schedule = reactivation.expression(),
            "Resolved cluster strategies"
        );

        Ok(ClusterDescriptor::from_parts(DescriptorParts {
            cluster_name,
            replicas: Arc::from(config.replicas.as_slice()),
            detection: DetectionFlags {
                identity_columns: config.identity_column_detection,
                sequences: config.sequence_detection,
            },
            balancer,
            metadata_cache,
            state_persistence,
            synchronization,
            reactivation,
        }))
    }

    /// Assemble, then hand the descriptor to `sink` under its cluster name.
    ///
    /// Nothing reaches the sink if assembly fails.
    pub fn assemble_and_register(
        &self,
        config: &ClusterConfig,
        sink: &dyn RegistrationSink,
    ) -> Result<Arc<ClusterDescriptor>> {
        let descriptor = Arc::new(self.assemble(config)?);
        sink.register(descriptor.cluster_name(), Arc::clone(&descriptor));

        info!(
            cluster = descriptor.cluster_name(),
            replicas = descriptor.replicas().len(),
            balancer = descriptor.balancer().id(),
            "Cluster registered"
        );
        Ok(descriptor)
    }
}

fn effective_cluster_name(configured: &str) -> String {
    if configured.trim().is_empty() {
        warn!(
            "Cluster name is blank; registering as '{}'",
            DEFAULT_CLUSTER_NAME
        );
        DEFAULT_CLUSTER_NAME.to_string()
    } else {
        configured.to_string()
    }
}

fn check_unique_replicas(cluster: &str, replicas: &[ReplicaDescriptor]) -> Result<()> {
    let mut seen = HashSet::with_capacity(replicas.len());
    for replica in replicas {
        if !seen.insert(replica.name.as_str()) {
            return Err(AssemblyError::DuplicateReplica {
                cluster: cluster.to_string(),
                name: replica.name.clone(),
            });
        }
    }
    Ok(())
}

/// Copy only the sub-settings the selected backend understands.
///
/// Fields left unset stay unset; the strategy's own defaults are never
/// written here. Irrelevant fields are ignored rather than rejected.
fn persistence_settings(
    strategy: &dyn StatePersistenceStrategy,
    input: &StatePersistenceConfig,
) -> StatePersistenceSettings {
    let mut ignored = Vec::new();

    let settings = match strategy.settings_kind() {
        SettingsKind::Sql => {
            if input.location.is_some() {
                ignored.push("location");
            }
            StatePersistenceSettings::Sql(SqlStateSettings {
                url_pattern: input.url.clone(),
                user: input.user.clone(),
                password: input.password.clone(),
            })
        }
        SettingsKind::Embedded => {
            for (field, value) in [
                ("url", &input.url),
                ("user", &input.user),
                ("password", &input.password),
            ] {
                if value.is_some() {
                    ignored.push(field);
                }
            }
            StatePersistenceSettings::Embedded(EmbeddedStateSettings {
                location_pattern: input.location.clone(),
            })
        }
        SettingsKind::None => {
            for (field, value) in [
                ("url", &input.url),
                ("user", &input.user),
                ("password", &input.password),
                ("location", &input.location),
            ] {
                if value.is_some() {
                    ignored.push(field);
                }
            }
            StatePersistenceSettings::InMemory
        }
    };

    if !ignored.is_empty() {
        debug!(
            strategy = strategy.id(),
            ignored = ?ignored,
            "State persistence settings not used by the selected strategy"
        );
    }
    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ClusterRegistry;
    use hacluster_strategies::{StrategyError, StrategyKind};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        calls: Mutex<Vec<(String, Arc<ClusterDescriptor>)>>,
    }

    impl RecordingSink {
        fn calls(&self) -> Vec<(String, Arc<ClusterDescriptor>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl RegistrationSink for RecordingSink {
        fn register(&self, cluster_name: &str, descriptor: Arc<ClusterDescriptor>) {
            self.calls
                .lock()
                .unwrap()
                .push((cluster_name.to_string(), descriptor));
        }
    }

    fn one_replica() -> ClusterConfig {
        ClusterConfig::with_replicas(vec![ReplicaDescriptor::new("r1", "postgres://db1/app")])
    }

    #[test]
    fn test_defaults_assemble() {
        let config = ClusterConfig {
            reactivation_schedule: "0 0/1 * 1/1 * ? *".to_string(),
            ..one_replica()
        };
        let descriptor = ClusterAssembler::builtin().assemble(&config).unwrap();

        assert_eq!(descriptor.cluster_name(), "default");
        assert_eq!(descriptor.balancer().id(), "round-robin");
        assert_eq!(descriptor.metadata_cache().id(), "shared-eager");
        assert_eq!(descriptor.state_persistence().strategy().id(), "simple");
        assert_eq!(
            descriptor.state_persistence().settings(),
            &StatePersistenceSettings::InMemory
        );
        assert_eq!(descriptor.synchronization().default_strategy().id(), "full");
        for id in [
            "full",
            "diff",
            "fastdiff",
            "dump-restore",
            "passive",
            "per-table-full",
            "per-table-diff",
        ] {
            assert!(descriptor.synchronization().get(id).is_some(), "missing {id}");
        }
        assert_eq!(descriptor.replicas().len(), 1);
        assert_eq!(descriptor.replica("r1").map(|r| r.location.as_str()), Some("postgres://db1/app"));
        assert_eq!(
            descriptor.detection(),
            DetectionFlags {
                identity_columns: true,
                sequences: true
            }
        );
    }

    #[test]
    fn test_sql_settings_copied() {
        let mut config = one_replica();
        config.state_persistence = StatePersistenceConfig {
            strategy: "sql".to_string(),
            url: Some("postgres://state/ha".to_string()),
            user: Some("ha".to_string()),
            password: Some("secret".to_string()),
            location: Some("/ignored".to_string()),
        };
        let descriptor = ClusterAssembler::builtin().assemble(&config).unwrap();

        assert_eq!(
            descriptor.state_persistence().settings(),
            &StatePersistenceSettings::Sql(SqlStateSettings {
                url_pattern: Some("postgres://state/ha".to_string()),
                user: Some("ha".to_string()),
                password: Some("secret".to_string()),
            })
        );
    }

    #[test]
    fn test_sql_partial_settings_are_not_defaulted() {
        let mut config = one_replica();
        config.state_persistence = StatePersistenceConfig::new("sql");
        config.state_persistence.user = Some("ha".to_string());
        let descriptor = ClusterAssembler::builtin().assemble(&config).unwrap();

        let StatePersistenceSettings::Sql(sql) = descriptor.state_persistence().settings() else {
            panic!("expected sql settings");
        };
        assert_eq!(sql.user.as_deref(), Some("ha"));
        assert_eq!(sql.url_pattern, None);
        assert_eq!(sql.password, None);

        let StatePersistenceSettings::Sql(effective) =
            descriptor.state_persistence().effective_settings()
        else {
            panic!("expected sql settings");
        };
        assert_eq!(effective.user.as_deref(), Some("ha"));
        assert!(effective.url_pattern.is_some());
    }

    #[test]
    fn test_embedded_backends_take_location_only() {
        for strategy in ["berkeleydb", "sqlite"] {
            let mut config = one_replica();
            config.state_persistence = StatePersistenceConfig {
                strategy: strategy.to_string(),
                url: Some("postgres://state/ha".to_string()),
                user: Some("ha".to_string()),
                password: None,
                location: Some("/var/lib/ha/{cluster}".to_string()),
            };
            let descriptor = ClusterAssembler::builtin().assemble(&config).unwrap();
            assert_eq!(
                descriptor.state_persistence().settings(),
                &StatePersistenceSettings::Embedded(EmbeddedStateSettings {
                    location_pattern: Some("/var/lib/ha/{cluster}".to_string()),
                }),
                "{strategy}"
            );
        }
    }

    #[test]
    fn test_in_memory_ignores_sub_settings() {
        let mut config = one_replica();
        config.state_persistence.url = Some("postgres://state/ha".to_string());
        config.state_persistence.location = Some("/tmp/state".to_string());
        let descriptor = ClusterAssembler::builtin().assemble(&config).unwrap();
        assert_eq!(
            descriptor.state_persistence().settings(),
            &StatePersistenceSettings::InMemory
        );
    }

    #[test]
    fn test_unknown_balancer_is_not_registered() {
        let mut config = one_replica();
        config.balancer = "nonexistent".to_string();
        let sink = RecordingSink::default();

        let err = ClusterAssembler::builtin()
            .assemble_and_register(&config, &sink)
            .unwrap_err();
        match err {
            AssemblyError::UnknownStrategy(StrategyError::UnknownIdentifier {
                kind,
                identifier,
                ..
            }) => {
                assert_eq!(kind, StrategyKind::Balancing);
                assert_eq!(identifier, "nonexistent");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(sink.calls().is_empty());
    }

    #[test]
    fn test_unknown_identifiers_name_their_kind() {
        let cases: [(fn(&mut ClusterConfig), StrategyKind); 3] = [
            (|c: &mut ClusterConfig| c.metadata_cache = "warm".to_string(), StrategyKind::MetadataCache),
            (
                |c: &mut ClusterConfig| c.state_persistence.strategy = "redis".to_string(),
                StrategyKind::StatePersistence,
            ),
            (
                |c: &mut ClusterConfig| c.default_synchronization_strategy = "FULL".to_string(),
                StrategyKind::Synchronization,
            ),
        ];
        for (mutate, expected) in cases {
            let mut config = one_replica();
            mutate(&mut config);
            let err = ClusterAssembler::builtin().assemble(&config).unwrap_err();
            let AssemblyError::UnknownStrategy(inner) = err else {
                panic!("unexpected error: {err:?}");
            };
            assert_eq!(inner.kind(), expected);
        }
    }

    #[test]
    fn test_empty_replicas_rejected_first() {
        let config = ClusterConfig {
            balancer: "nonexistent".to_string(),
            reactivation_schedule: "never".to_string(),
            ..ClusterConfig::default()
        };
        let err = ClusterAssembler::builtin().assemble(&config).unwrap_err();
        assert_eq!(
            err,
            AssemblyError::EmptyReplicaList {
                cluster: "default".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_replica_names_rejected() {
        let config = ClusterConfig::with_replicas(vec![
            ReplicaDescriptor::new("r1", "postgres://db1/app"),
            ReplicaDescriptor::new("r1", "postgres://db2/app"),
        ]);
        let err = ClusterAssembler::builtin().assemble(&config).unwrap_err();
        assert!(matches!(err, AssemblyError::DuplicateReplica { ref name, .. } if name == "r1"));
    }

    #[test]
    fn test_invalid_schedule_is_not_registered() {
        let mut config = one_replica();
        config.reactivation_schedule = "every minute".to_string();
        let sink = RecordingSink::default();

        let err = ClusterAssembler::builtin()
            .assemble_and_register(&config, &sink)
            .unwrap_err();
        assert!(matches!(err, AssemblyError::InvalidSchedule(_)));
        assert!(sink.calls().is_empty());
    }

    #[test]
    fn test_schedules_that_never_fire_are_accepted() {
        let sink = RecordingSink::default();
        for expression in ["0 0 0 30 2 ?", "0 0 0 1 1 ? 1999"] {
            let mut config = one_replica();
            config.reactivation_schedule = expression.to_string();
            let descriptor = ClusterAssembler::builtin()
                .assemble_and_register(&config, &sink)
                .unwrap();
            assert!(descriptor.reactivation().is_exhausted_after(&Utc::now()));
        }
        assert_eq!(sink.calls().len(), 2);
    }

    #[test]
    fn test_quartz_day_modifiers_assemble() {
        for expression in ["0 15 10 L * ?", "0 15 10 ? * 6L", "0 0 0 ? * 2#1", "0 0 12 15W * ?"] {
            let mut config = one_replica();
            config.reactivation_schedule = expression.to_string();
            let descriptor = ClusterAssembler::builtin().assemble(&config).unwrap();
            assert_eq!(descriptor.reactivation().expression(), expression);
            assert!(!descriptor.reactivation().is_exhausted_after(&Utc::now()));
        }
    }

    #[test]
    fn test_blank_cluster_name_defaults() {
        let mut config = one_replica();
        config.cluster_name = "  ".to_string();
        let descriptor = ClusterAssembler::builtin().assemble(&config).unwrap();
        assert_eq!(descriptor.cluster_name(), "default");
    }

    #[test]
    fn test_reassembly_is_idempotent_and_overwrites() {
        let mut config = one_replica();
        config.cluster_name = "orders".to_string();
        let registry = ClusterRegistry::new();
        let assembler = ClusterAssembler::builtin();

        let first = assembler.assemble_and_register(&config, &registry).unwrap();
        let second = assembler.assemble_and_register(&config, &registry).unwrap();

        assert_eq!(*first, *second);
        assert!(!Arc::ptr_eq(&first, &second));
        let registered = registry.get("orders").unwrap();
        assert!(Arc::ptr_eq(&registered, &second));
        assert_eq!(registry.names(), vec!["orders".to_string()]);
    }

    #[test]
    fn test_changed_config_replaces_registration() {
        let registry = ClusterRegistry::new();
        let assembler = ClusterAssembler::builtin();
        let mut config = one_replica();
        assembler.assemble_and_register(&config, &registry).unwrap();

        config.balancer = "random".to_string();
        assembler.assemble_and_register(&config, &registry).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("default").unwrap().balancer().id(), "random");
    }
}
