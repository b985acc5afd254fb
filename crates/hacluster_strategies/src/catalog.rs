//! Immutable identifier → strategy mapping for one strategy family.

use crate::error::StrategyError;
use crate::{Strategy, StrategyKind};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// An ordered, read-only set of strategies keyed by their own identifiers.
///
/// Catalogs are built once and never mutated. Cloning is cheap: entries are
/// shared through `Arc`.
pub struct Catalog<S: ?Sized> {
    kind: StrategyKind,
    entries: Vec<Arc<S>>,
    index: HashMap<String, usize>,
}

impl<S: Strategy + ?Sized> Catalog<S> {
    /// Build a catalog, rejecting entries that share an identifier.
    pub fn new(kind: StrategyKind, entries: Vec<Arc<S>>) -> Result<Self, StrategyError> {
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            let id = entry.id().to_string();
            if index.contains_key(&id) {
                return Err(StrategyError::DuplicateIdentifier {
                    kind,
                    identifier: id,
                });
            }
            index.insert(id, position);
        }
        Ok(Self {
            kind,
            entries,
            index,
        })
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, identifier: &str) -> Option<&Arc<S>> {
        self.index.get(identifier).map(|&position| &self.entries[position])
    }

    /// Like [`Catalog::get`], but an unknown identifier is an error.
    pub fn resolve(&self, identifier: &str) -> Result<Arc<S>, StrategyError> {
        self.get(identifier)
            .cloned()
            .ok_or_else(|| StrategyError::UnknownIdentifier {
                kind: self.kind,
                identifier: identifier.to_string(),
                available: self.identifiers().into_iter().map(String::from).collect(),
            })
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.index.contains_key(identifier)
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<S>)> + '_ {
        self.entries.iter().map(|entry| (entry.id(), entry))
    }

    pub fn identifiers(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: ?Sized> Clone for Catalog<S> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            entries: self.entries.clone(),
            index: self.index.clone(),
        }
    }
}

impl<S: Strategy + ?Sized> fmt::Debug for Catalog<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("kind", &self.kind)
            .field("identifiers", &self.identifiers())
            .finish()
    }
}

/// Two catalogs are equal when they hold the same identifiers in the same order.
impl<S: Strategy + ?Sized> PartialEq for Catalog<S> {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.identifiers() == other.identifiers()
    }
}

impl<S: Strategy + ?Sized> Eq for Catalog<S> {}
