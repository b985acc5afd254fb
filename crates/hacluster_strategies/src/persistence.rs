//! State-persistence strategies and their backend-specific settings.
//!
//! A persistence strategy records which replicas are active so that cluster
//! state survives a restart. Each backend accepts a different set of
//! sub-settings; [`StatePersistenceSettings`] is a tagged union so that only
//! the fields meaningful for the selected backend can exist.
//!
//! Patterns may contain the placeholders `{cluster}` and `{home}`, expanded by
//! [`render_pattern`].

use crate::Strategy;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

pub const CLUSTER_PLACEHOLDER: &str = "{cluster}";
pub const HOME_PLACEHOLDER: &str = "{home}";

pub const DEFAULT_SQL_URL_PATTERN: &str = "sqlite:{home}/{cluster}-state.sqlite3";
pub const DEFAULT_BERKELEYDB_LOCATION_PATTERN: &str = "{home}/{cluster}";
pub const DEFAULT_SQLITE_LOCATION_PATTERN: &str = "{home}/{cluster}.sqlite3";

/// Where cluster state is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersistenceBackend {
    /// Process memory only; state is lost on restart.
    InMemory,
    /// Embedded transactional key-value engine.
    EmbeddedKeyValue,
    /// Embedded single-file relational database.
    EmbeddedRelational,
    /// External SQL database reached by URL.
    Sql,
}

impl PersistenceBackend {
    pub fn settings_kind(&self) -> SettingsKind {
        match self {
            PersistenceBackend::InMemory => SettingsKind::None,
            PersistenceBackend::EmbeddedKeyValue | PersistenceBackend::EmbeddedRelational => {
                SettingsKind::Embedded
            }
            PersistenceBackend::Sql => SettingsKind::Sql,
        }
    }
}

/// Which sub-settings a backend understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SettingsKind {
    None,
    Sql,
    Embedded,
}

pub trait StatePersistenceStrategy: Strategy {
    fn backend(&self) -> PersistenceBackend;

    fn settings_kind(&self) -> SettingsKind {
        self.backend().settings_kind()
    }

    /// Values this strategy uses for any setting left unset in configuration.
    fn default_settings(&self) -> StatePersistenceSettings;
}

/// Connection settings for an external SQL state store.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct SqlStateSettings {
    pub url_pattern: Option<String>,
    pub user: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

impl SqlStateSettings {
    /// Fill unset fields from `defaults`.
    pub fn overlay(&self, defaults: &SqlStateSettings) -> SqlStateSettings {
        SqlStateSettings {
            url_pattern: self.url_pattern.clone().or_else(|| defaults.url_pattern.clone()),
            user: self.user.clone().or_else(|| defaults.user.clone()),
            password: self.password.clone().or_else(|| defaults.password.clone()),
        }
    }
}

impl fmt::Debug for SqlStateSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlStateSettings")
            .field("url_pattern", &self.url_pattern)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Filesystem location for an embedded state store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmbeddedStateSettings {
    pub location_pattern: Option<String>,
}

impl EmbeddedStateSettings {
    pub fn overlay(&self, defaults: &EmbeddedStateSettings) -> EmbeddedStateSettings {
        EmbeddedStateSettings {
            location_pattern: self
                .location_pattern
                .clone()
                .or_else(|| defaults.location_pattern.clone()),
        }
    }
}

/// Sub-settings for the selected persistence backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StatePersistenceSettings {
    InMemory,
    Sql(SqlStateSettings),
    Embedded(EmbeddedStateSettings),
}

impl StatePersistenceSettings {
    /// Empty settings of the shape `kind` expects.
    pub fn empty(kind: SettingsKind) -> Self {
        match kind {
            SettingsKind::None => StatePersistenceSettings::InMemory,
            SettingsKind::Sql => StatePersistenceSettings::Sql(SqlStateSettings::default()),
            SettingsKind::Embedded => {
                StatePersistenceSettings::Embedded(EmbeddedStateSettings::default())
            }
        }
    }

    pub fn kind(&self) -> SettingsKind {
        match self {
            StatePersistenceSettings::InMemory => SettingsKind::None,
            StatePersistenceSettings::Sql(_) => SettingsKind::Sql,
            StatePersistenceSettings::Embedded(_) => SettingsKind::Embedded,
        }
    }

    /// Fill unset fields from `defaults` when both have the same shape.
    pub fn overlay(&self, defaults: &StatePersistenceSettings) -> StatePersistenceSettings {
        match (self, defaults) {
            (StatePersistenceSettings::Sql(own), StatePersistenceSettings::Sql(fallback)) => {
                StatePersistenceSettings::Sql(own.overlay(fallback))
            }
            (
                StatePersistenceSettings::Embedded(own),
                StatePersistenceSettings::Embedded(fallback),
            ) => StatePersistenceSettings::Embedded(own.overlay(fallback)),
            _ => self.clone(),
        }
    }

    /// Expand `{cluster}` and `{home}` in every pattern field.
    pub fn render(&self, cluster_name: &str, home: &Path) -> StatePersistenceSettings {
        match self {
            StatePersistenceSettings::InMemory => StatePersistenceSettings::InMemory,
            StatePersistenceSettings::Sql(sql) => StatePersistenceSettings::Sql(SqlStateSettings {
                url_pattern: sql
                    .url_pattern
                    .as_deref()
                    .map(|p| render_pattern(p, cluster_name, home)),
                user: sql.user.clone(),
                password: sql.password.clone(),
            }),
            StatePersistenceSettings::Embedded(embedded) => {
                StatePersistenceSettings::Embedded(EmbeddedStateSettings {
                    location_pattern: embedded
                        .location_pattern
                        .as_deref()
                        .map(|p| render_pattern(p, cluster_name, home)),
                })
            }
        }
    }
}

/// Substitute the `{cluster}` and `{home}` placeholders.
pub fn render_pattern(pattern: &str, cluster_name: &str, home: &Path) -> String {
    pattern
        .replace(CLUSTER_PLACEHOLDER, cluster_name)
        .replace(HOME_PLACEHOLDER, &home.display().to_string())
}

define_unit_strategy!(
    SimpleStatePersistence,
    "simple",
    "Keeps replica state in memory; nothing survives a restart"
);
define_unit_strategy!(
    BerkeleyDbStatePersistence,
    "berkeleydb",
    "Embedded transactional key-value store on local disk"
);
define_unit_strategy!(
    SqliteStatePersistence,
    "sqlite",
    "Embedded single-file relational store on local disk"
);
define_unit_strategy!(
    SqlStatePersistence,
    "sql",
    "External SQL database reached through a connection URL"
);

impl StatePersistenceStrategy for SimpleStatePersistence {
    fn backend(&self) -> PersistenceBackend {
        PersistenceBackend::InMemory
    }

    fn default_settings(&self) -> StatePersistenceSettings {
        StatePersistenceSettings::InMemory
    }
}

impl StatePersistenceStrategy for BerkeleyDbStatePersistence {
    fn backend(&self) -> PersistenceBackend {
        PersistenceBackend::EmbeddedKeyValue
    }

    fn default_settings(&self) -> StatePersistenceSettings {
        StatePersistenceSettings::Embedded(EmbeddedStateSettings {
            location_pattern: Some(DEFAULT_BERKELEYDB_LOCATION_PATTERN.to_string()),
        })
    }
}

impl StatePersistenceStrategy for SqliteStatePersistence {
    fn backend(&self) -> PersistenceBackend {
        PersistenceBackend::EmbeddedRelational
    }

    fn default_settings(&self) -> StatePersistenceSettings {
        StatePersistenceSettings::Embedded(EmbeddedStateSettings {
            location_pattern: Some(DEFAULT_SQLITE_LOCATION_PATTERN.to_string()),
        })
    }
}

impl StatePersistenceStrategy for SqlStatePersistence {
    fn backend(&self) -> PersistenceBackend {
        PersistenceBackend::Sql
    }

    fn default_settings(&self) -> StatePersistenceSettings {
        StatePersistenceSettings::Sql(SqlStateSettings {
            url_pattern: Some(DEFAULT_SQL_URL_PATTERN.to_string()),
            user: None,
            password: None,
        })
    }
}

pub(crate) fn builtin() -> Vec<Arc<dyn StatePersistenceStrategy>> {
    vec![
        Arc::new(SimpleStatePersistence),
        Arc::new(BerkeleyDbStatePersistence),
        Arc::new(SqliteStatePersistence),
        Arc::new(SqlStatePersistence),
    ]
}
