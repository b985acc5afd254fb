//! Per-replica connection descriptors.

use crate::defaults::DEFAULT_REPLICA_WEIGHT;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One database replica participating in the cluster.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaDescriptor {
    /// Unique name within the cluster
    pub name: String,

    /// Connection address (URL or DSN understood by the driver)
    pub location: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Relative share of reads; 0 keeps the replica out of read rotation
    #[serde(default = "default_weight")]
    pub weight: u32,

    /// Replica runs on the same host as the driver
    #[serde(default)]
    pub local: bool,

    /// Driver-specific connection properties
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

fn default_weight() -> u32 {
    DEFAULT_REPLICA_WEIGHT
}

impl ReplicaDescriptor {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            user: None,
            password: None,
            weight: default_weight(),
            local: false,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

impl fmt::Debug for ReplicaDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplicaDescriptor")
            .field("name", &self.name)
            .field("location", &self.location)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("weight", &self.weight)
            .field("local", &self.local)
            .field("properties", &self.properties)
            .finish()
    }
}
