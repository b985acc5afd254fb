//! Configuration input for HA cluster assembly.
//!
//! A [`ClusterConfig`] is the raw, operator-supplied description of one
//! cluster: the replica list plus the identifiers of the strategies to use.
//! Every option has a default, so an empty file only lacks replicas.
//!
//! ```toml
//! cluster_name = "orders"
//! balancer = "round-robin"
//!
//! [state_persistence]
//! strategy = "sql"
//! url = "postgres://state-db/ha"
//!
//! [[replicas]]
//! name = "r1"
//! location = "postgres://db1:5432/orders"
//! ```

pub mod defaults;
mod error;
pub mod paths;
mod replica;

pub use error::{ConfigError, Result};
pub use replica::ReplicaDescriptor;

use defaults::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Raw configuration for one cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Registration key for the assembled cluster
    #[serde(default = "default_cluster_name")]
    pub cluster_name: String,

    /// Load-balancing strategy identifier
    #[serde(default = "default_balancer")]
    pub balancer: String,

    /// Synchronization strategy used unless a call overrides it
    #[serde(default = "default_synchronization_strategy")]
    pub default_synchronization_strategy: String,

    /// Metadata-cache strategy identifier
    #[serde(default = "default_metadata_cache")]
    pub metadata_cache: String,

    #[serde(default = "default_identity_column_detection")]
    pub identity_column_detection: bool,

    #[serde(default = "default_sequence_detection")]
    pub sequence_detection: bool,

    /// Cron expression for automatic replica reactivation
    #[serde(default = "default_reactivation_schedule")]
    pub reactivation_schedule: String,

    // Tables last so the struct serializes to valid TOML.
    /// State-persistence strategy and its optional sub-settings
    #[serde(default)]
    pub state_persistence: StatePersistenceConfig,

    /// Replicas, in configuration order
    #[serde(default)]
    pub replicas: Vec<ReplicaDescriptor>,
}

fn default_cluster_name() -> String {
    DEFAULT_CLUSTER_NAME.to_string()
}

fn default_balancer() -> String {
    DEFAULT_BALANCER.to_string()
}

fn default_synchronization_strategy() -> String {
    DEFAULT_SYNCHRONIZATION_STRATEGY.to_string()
}

fn default_metadata_cache() -> String {
    DEFAULT_METADATA_CACHE.to_string()
}

fn default_state_persistence() -> String {
    DEFAULT_STATE_PERSISTENCE.to_string()
}

fn default_identity_column_detection() -> bool {
    DEFAULT_IDENTITY_COLUMN_DETECTION
}

fn default_sequence_detection() -> bool {
    DEFAULT_SEQUENCE_DETECTION
}

fn default_reactivation_schedule() -> String {
    DEFAULT_REACTIVATION_SCHEDULE.to_string()
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            cluster_name: default_cluster_name(),
            replicas: Vec::new(),
            balancer: default_balancer(),
            default_synchronization_strategy: default_synchronization_strategy(),
            metadata_cache: default_metadata_cache(),
            state_persistence: StatePersistenceConfig::default(),
            identity_column_detection: default_identity_column_detection(),
            sequence_detection: default_sequence_detection(),
            reactivation_schedule: default_reactivation_schedule(),
        }
    }
}

impl ClusterConfig {
    /// Defaults plus the given replicas.
    pub fn with_replicas(replicas: Vec<ReplicaDescriptor>) -> Self {
        Self {
            replicas,
            ..Self::default()
        }
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// `[state_persistence]` table.
///
/// `url`, `user` and `password` only matter for the `sql` strategy and
/// `location` only for the embedded ones; the rest are ignored.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatePersistenceConfig {
    #[serde(default = "default_state_persistence")]
    pub strategy: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Default for StatePersistenceConfig {
    fn default() -> Self {
        Self {
            strategy: default_state_persistence(),
            url: None,
            user: None,
            password: None,
            location: None,
        }
    }
}

impl StatePersistenceConfig {
    pub fn new(strategy: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            ..Self::default()
        }
    }
}

impl fmt::Debug for StatePersistenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatePersistenceConfig")
            .field("strategy", &self.strategy)
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("location", &self.location)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ClusterConfig::from_toml_str("").unwrap();
        assert_eq!(config, ClusterConfig::default());
        assert_eq!(config.cluster_name, "default");
        assert_eq!(config.balancer, "round-robin");
        assert_eq!(config.default_synchronization_strategy, "full");
        assert_eq!(config.metadata_cache, "shared-eager");
        assert_eq!(config.state_persistence.strategy, "simple");
        assert!(config.identity_column_detection);
        assert!(config.sequence_detection);
        assert_eq!(config.reactivation_schedule, "0 0/1 * 1/1 * ? *");
        assert!(config.replicas.is_empty());
    }

    #[test]
    fn test_full_document() {
        let config = ClusterConfig::from_toml_str(
            r#"
            cluster_name = "orders"
            balancer = "simple"
            default_synchronization_strategy = "diff"
            metadata_cache = "lazy"
            identity_column_detection = false
            reactivation_schedule = "0 0 * * * ?"

            [state_persistence]
            strategy = "sql"
            url = "postgres://state/ha"
            user = "ha"

            [[replicas]]
            name = "r1"
            location = "postgres://db1/orders"
            weight = 3

            [[replicas]]
            name = "r2"
            location = "postgres://db2/orders"
            local = true
            [replicas.properties]
            sslmode = "require"
            "#,
        )
        .unwrap();

        assert_eq!(config.cluster_name, "orders");
        assert_eq!(config.balancer, "simple");
        assert!(!config.identity_column_detection);
        assert!(config.sequence_detection);
        assert_eq!(config.state_persistence.strategy, "sql");
        assert_eq!(config.state_persistence.user.as_deref(), Some("ha"));
        assert_eq!(config.state_persistence.password, None);
        assert_eq!(config.replicas.len(), 2);
        assert_eq!(config.replicas[0].weight, 3);
        assert!(config.replicas[1].local);
        assert_eq!(
            config.replicas[1].properties.get("sslmode").map(String::as_str),
            Some("require")
        );
    }

    #[test]
    fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("cluster.toml");

        let mut config =
            ClusterConfig::with_replicas(vec![ReplicaDescriptor::new("r1", "postgres://db1/app")]);
        config.state_persistence = StatePersistenceConfig::new("sqlite");
        config.state_persistence.location = Some("/var/lib/ha/{cluster}.db".to_string());
        config.save(&path).unwrap();

        let loaded = ClusterConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = ClusterConfig::load(&tmp.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = ClusterConfig::from_toml_str("replicas = 7").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
