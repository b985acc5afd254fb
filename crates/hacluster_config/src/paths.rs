use crate::defaults::{CONFIG_ENV, CONFIG_FILE_NAME, HOME_ENV};
use std::path::{Path, PathBuf};

/// Resolve the hacluster home directory.
///
/// Priority:
/// 1) HACLUSTER_HOME
/// 2) HOME/USERPROFILE
/// 3) ./.hacluster
pub fn hacluster_home() -> PathBuf {
    if let Ok(override_path) = std::env::var(HOME_ENV) {
        return PathBuf::from(override_path);
    }
    if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
        return PathBuf::from(home).join(".hacluster");
    }
    PathBuf::from(".").join(".hacluster")
}

/// Default config path: ~/.hacluster/cluster.toml
pub fn default_config_path() -> PathBuf {
    hacluster_home().join(CONFIG_FILE_NAME)
}

/// Default logs directory: ~/.hacluster/logs
pub fn default_logs_dir() -> PathBuf {
    hacluster_home().join("logs")
}

/// Default item store: ~/.hacluster/items.sqlite3
pub fn default_item_store_path() -> PathBuf {
    hacluster_home().join("items.sqlite3")
}

/// Pick the config file to load.
///
/// Priority:
/// 1) explicit path (CLI flag)
/// 2) HACLUSTER_CONFIG
/// 3) default_config_path()
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    default_config_path()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let explicit = Path::new("/etc/hacluster/orders.toml");
        assert_eq!(resolve_config_path(Some(explicit)), explicit);
    }

    #[test]
    fn test_default_paths_live_under_home() {
        let home = hacluster_home();
        assert!(default_config_path().starts_with(&home));
        assert!(default_logs_dir().starts_with(&home));
        assert!(default_item_store_path().ends_with("items.sqlite3"));
    }
}
