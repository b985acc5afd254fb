//! Error types for catalog lookups.

use crate::StrategyKind;
use thiserror::Error;

/// Errors raised by strategy catalogs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    /// No strategy with this identifier exists in the catalog for `kind`.
    #[error("Unknown {kind} strategy '{identifier}' (available: {})", .available.join(", "))]
    UnknownIdentifier {
        kind: StrategyKind,
        identifier: String,
        available: Vec<String>,
    },

    /// Two catalog entries report the same identifier.
    #[error("Duplicate {kind} strategy identifier '{identifier}'")]
    DuplicateIdentifier { kind: StrategyKind, identifier: String },
}

impl StrategyError {
    /// Kind of the catalog that rejected the identifier.
    pub fn kind(&self) -> StrategyKind {
        match self {
            StrategyError::UnknownIdentifier { kind, .. } => *kind,
            StrategyError::DuplicateIdentifier { kind, .. } => *kind,
        }
    }

    /// The offending identifier.
    pub fn identifier(&self) -> &str {
        match self {
            StrategyError::UnknownIdentifier { identifier, .. } => identifier,
            StrategyError::DuplicateIdentifier { identifier, .. } => identifier,
        }
    }
}
