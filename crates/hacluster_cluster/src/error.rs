//! Error types for cluster assembly.

use hacluster_strategies::StrategyError;
use thiserror::Error;

/// Assembly result type.
pub type Result<T> = std::result::Result<T, AssemblyError>;

/// Reasons a cluster descriptor cannot be assembled.
///
/// Every variant is fatal to the assembly call: nothing is registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    /// A strategy identifier is not in its catalog.
    #[error(transparent)]
    UnknownStrategy(#[from] StrategyError),

    #[error("Cluster '{cluster}' has no replicas")]
    EmptyReplicaList { cluster: String },

    #[error("Cluster '{cluster}' declares replica '{name}' more than once")]
    DuplicateReplica { cluster: String, name: String },

    #[error(transparent)]
    InvalidSchedule(#[from] ScheduleError),
}

/// A reactivation schedule that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid reactivation schedule '{expression}': {reason}")]
pub struct ScheduleError {
    pub expression: String,
    pub reason: String,
}
