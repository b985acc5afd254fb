//! Helpful error types for CLI commands
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use hacluster_cluster::AssemblyError;
use hacluster_strategies::StrategyError;
use std::fmt;
use std::path::Path;

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_suggestions(
        mut self,
        suggestions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.suggestions
            .extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    /// Cluster config file does not exist
    pub fn config_not_found(path: &Path) -> Self {
        Self::new(format!("Cluster config not found: {}", path.display()))
            .with_context("hacluster looks at --config, then HACLUSTER_CONFIG, then $HACLUSTER_HOME/cluster.toml")
            .with_suggestions([
                format!("TRY: Write a starter config: hacluster init --config {}", path.display()),
                "TRY: Point at an existing file: hacluster check --config PATH".to_string(),
            ])
    }

    /// Config exists but cannot be turned into a cluster
    pub fn assembly_failed(path: &Path, err: &AssemblyError) -> Self {
        let base = Self::new(format!("Invalid cluster configuration: {}", err))
            .with_context(format!("While assembling {}", path.display()));

        match err {
            AssemblyError::UnknownStrategy(StrategyError::UnknownIdentifier { kind, .. }) => base
                .with_suggestion(format!(
                    "TRY: List valid identifiers: hacluster strategies --kind {}",
                    kind
                ))
                .with_suggestion("TRY: Identifiers are case-sensitive"),
            AssemblyError::EmptyReplicaList { .. } => base.with_suggestion(
                "TRY: Add at least one [[replicas]] table with name and location",
            ),
            AssemblyError::DuplicateReplica { .. } => {
                base.with_suggestion("TRY: Give every [[replicas]] entry a distinct name")
            }
            AssemblyError::InvalidSchedule(_) => base.with_suggestions([
                "TRY: Use Quartz layout: sec min hour day-of-month month day-of-week [year]",
                "TRY: Preview an expression: hacluster schedule --expr \"0 0/1 * 1/1 * ? *\"",
            ]),
            AssemblyError::UnknownStrategy(_) => base,
        }
    }

    /// Item id does not exist
    pub fn item_not_found(id: i64) -> Self {
        Self::new(format!("Item not found: {}", id))
            .with_suggestion("TRY: List stored items: hacluster item list")
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}

/// Print an error as a JSON object on stdout for `--json` callers.
pub fn print_json_error(err: &anyhow::Error) {
    let payload = match err.downcast_ref::<HelpfulError>() {
        Some(helpful) => serde_json::json!({
            "error": helpful.message,
            "context": helpful.context,
            "suggestions": helpful.suggestions,
        }),
        None => serde_json::json!({
            "error": format!("{:#}", err),
        }),
    };
    println!("{}", payload);
}

#[cfg(test)]
mod tests {
    use super::*;
    use hacluster_cluster::ScheduleError;
    use hacluster_strategies::StrategyKind;
    use std::path::PathBuf;

    #[test]
    fn test_helpful_error_display() {
        let err = HelpfulError::new("Something went wrong")
            .with_context("While processing data")
            .with_suggestion("Try again");

        let display = format!("{}", err);
        assert!(display.contains("ERROR: Something went wrong"));
        assert!(display.contains("CONTEXT: While processing data"));
        assert!(display.contains("Try again"));
    }

    #[test]
    fn test_config_not_found() {
        let path = PathBuf::from("/nonexistent/cluster.toml");
        let display = HelpfulError::config_not_found(&path).to_string();
        assert!(display.contains("/nonexistent/cluster.toml"));
        assert!(display.contains("hacluster init"));
    }

    #[test]
    fn test_unknown_strategy_points_at_catalog() {
        let err = AssemblyError::UnknownStrategy(StrategyError::UnknownIdentifier {
            kind: StrategyKind::Balancing,
            identifier: "nonexistent".to_string(),
            available: vec!["round-robin".to_string()],
        });
        let display = HelpfulError::assembly_failed(Path::new("cluster.toml"), &err).to_string();
        assert!(display.contains("nonexistent"));
        assert!(display.contains("hacluster strategies --kind balancer"));
    }

    #[test]
    fn test_invalid_schedule_suggests_preview() {
        let err = AssemblyError::InvalidSchedule(ScheduleError {
            expression: "every minute".to_string(),
            reason: "bad".to_string(),
        });
        let helpful = HelpfulError::assembly_failed(Path::new("cluster.toml"), &err);
        assert_eq!(helpful.suggestions.len(), 2);
    }
}
