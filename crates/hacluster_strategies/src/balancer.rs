//! Load-balancing strategies: which replica serves a read.

use crate::Strategy;
use serde::Serialize;
use std::sync::Arc;

/// How a balancer picks among active replicas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// Always the replica with the highest weight.
    HighestWeight,
    /// Cycle through replicas, visiting each in proportion to its weight.
    WeightedRoundRobin,
    /// Pick at random, biased by weight.
    WeightedRandom,
}

pub trait BalancerStrategy: Strategy {
    fn policy(&self) -> SelectionPolicy;
}

define_unit_strategy!(
    RoundRobinBalancer,
    "round-robin",
    "Rotates reads across active replicas in weight proportion"
);
define_unit_strategy!(
    RandomBalancer,
    "random",
    "Sends each read to a weighted random active replica"
);
define_unit_strategy!(
    SimpleBalancer,
    "simple",
    "Sends every read to the highest-weighted active replica"
);

impl BalancerStrategy for RoundRobinBalancer {
    fn policy(&self) -> SelectionPolicy {
        SelectionPolicy::WeightedRoundRobin
    }
}

impl BalancerStrategy for RandomBalancer {
    fn policy(&self) -> SelectionPolicy {
        SelectionPolicy::WeightedRandom
    }
}

impl BalancerStrategy for SimpleBalancer {
    fn policy(&self) -> SelectionPolicy {
        SelectionPolicy::HighestWeight
    }
}

pub(crate) fn builtin() -> Vec<Arc<dyn BalancerStrategy>> {
    vec![
        Arc::new(RoundRobinBalancer),
        Arc::new(RandomBalancer),
        Arc::new(SimpleBalancer),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policies() {
        assert_eq!(RoundRobinBalancer.policy(), SelectionPolicy::WeightedRoundRobin);
        assert_eq!(RandomBalancer.policy(), SelectionPolicy::WeightedRandom);
        assert_eq!(SimpleBalancer.policy(), SelectionPolicy::HighestWeight);
    }
}
