//! Canonical default values for cluster configuration.

pub const DEFAULT_CLUSTER_NAME: &str = "default";
pub const DEFAULT_BALANCER: &str = "round-robin";
pub const DEFAULT_SYNCHRONIZATION_STRATEGY: &str = "full";
pub const DEFAULT_METADATA_CACHE: &str = "shared-eager";
pub const DEFAULT_STATE_PERSISTENCE: &str = "simple";
pub const DEFAULT_IDENTITY_COLUMN_DETECTION: bool = true;
pub const DEFAULT_SEQUENCE_DETECTION: bool = true;
/// Every minute, on the minute (seconds minutes hours day-of-month month day-of-week year).
pub const DEFAULT_REACTIVATION_SCHEDULE: &str = "0 0/1 * 1/1 * ? *";
pub const DEFAULT_REPLICA_WEIGHT: u32 = 1;

pub const CONFIG_FILE_NAME: &str = "cluster.toml";
pub const HOME_ENV: &str = "HACLUSTER_HOME";
pub const CONFIG_ENV: &str = "HACLUSTER_CONFIG";
