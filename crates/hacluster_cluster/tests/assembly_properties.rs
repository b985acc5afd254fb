//! Property tests for cluster assembly.

use hacluster_cluster::{
    AssemblyError, ClusterAssembler, ClusterDescriptor, ClusterRegistry, RegistrationSink,
};
use hacluster_config::{ClusterConfig, ReplicaDescriptor, StatePersistenceConfig};
use hacluster_strategies::{StrategyKind, StrategyRegistry};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct CountingSink {
    calls: AtomicUsize,
}

impl RegistrationSink for CountingSink {
    fn register(&self, _cluster_name: &str, _descriptor: Arc<ClusterDescriptor>) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn pick(kind: StrategyKind, index: prop::sample::Index) -> String {
    let ids = StrategyRegistry::builtin().identifiers(kind);
    ids[index.index(ids.len())].to_string()
}

fn arb_identifier(kind: StrategyKind) -> impl Strategy<Value = String> {
    prop_oneof![
        any::<prop::sample::Index>().prop_map(move |i| pick(kind, i)),
        "[a-z-]{1,12}",
    ]
}

prop_compose! {
    fn arb_config()(
        cluster_name in "[a-z]{0,8}",
        balancer in arb_identifier(StrategyKind::Balancing),
        cache in arb_identifier(StrategyKind::MetadataCache),
        persistence in arb_identifier(StrategyKind::StatePersistence),
        sync in arb_identifier(StrategyKind::Synchronization),
        schedule in prop_oneof![
            Just("0 0/1 * 1/1 * ? *".to_string()),
            Just("0 0/5 * * * ?".to_string()),
            "[a-z ]{0,10}",
        ],
        identity in any::<bool>(),
        sequences in any::<bool>(),
    ) -> ClusterConfig {
        ClusterConfig {
            cluster_name,
            balancer,
            default_synchronization_strategy: sync,
            metadata_cache: cache,
            identity_column_detection: identity,
            sequence_detection: sequences,
            reactivation_schedule: schedule,
            state_persistence: StatePersistenceConfig::new(persistence),
            replicas: Vec::new(),
        }
    }
}

proptest! {
    #[test]
    fn test_empty_replica_list_always_fails(config in arb_config()) {
        let sink = CountingSink::default();
        let err = ClusterAssembler::builtin()
            .assemble_and_register(&config, &sink)
            .unwrap_err();
        prop_assert!(
            matches!(err, AssemblyError::EmptyReplicaList { .. }),
            "unexpected error {:?}",
            err
        );
        prop_assert_eq!(sink.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_registration_happens_only_on_success(config in arb_config()) {
        let config = ClusterConfig {
            replicas: vec![ReplicaDescriptor::new("r1", "postgres://db1/app")],
            ..config
        };
        let sink = CountingSink::default();
        let outcome = ClusterAssembler::builtin().assemble_and_register(&config, &sink);
        let expected = usize::from(outcome.is_ok());
        prop_assert_eq!(sink.calls.load(Ordering::SeqCst), expected);
    }

    #[test]
    fn test_invalid_schedule_never_registers(expr in "[a-z ]{0,10}") {
        let config = ClusterConfig {
            reactivation_schedule: expr,
            ..ClusterConfig::with_replicas(vec![ReplicaDescriptor::new("r1", "postgres://db1/app")])
        };
        let registry = ClusterRegistry::new();
        let err = ClusterAssembler::builtin()
            .assemble_and_register(&config, &registry)
            .unwrap_err();
        prop_assert!(matches!(err, AssemblyError::InvalidSchedule(_)));
        prop_assert!(registry.is_empty());
    }
}
