//! Synchronization strategies: how a lagging replica is made consistent
//! before it is reactivated.

use crate::Strategy;
use std::sync::Arc;

pub trait SynchronizationStrategy: Strategy {
    /// Whether activation copies data into the target replica.
    fn copies_data(&self) -> bool {
        true
    }

    /// The strategy applied to each table, for table-by-table variants.
    fn per_table(&self) -> Option<&dyn SynchronizationStrategy> {
        None
    }
}

define_unit_strategy!(
    FullSynchronization,
    "full",
    "Truncates target tables and copies every row from an active replica"
);
define_unit_strategy!(
    DumpRestoreSynchronization,
    "dump-restore",
    "Dumps an active replica with vendor tooling and restores it on the target"
);
define_unit_strategy!(
    DifferentialSynchronization,
    "diff",
    "Compares rows by primary key and applies only the differences"
);
define_unit_strategy!(
    FastDifferentialSynchronization,
    "fastdiff",
    "Differential sync comparing row checksums in bulk"
);
define_unit_strategy!(
    PassiveSynchronization,
    "passive",
    "Assumes the target is already consistent; copies nothing"
);

impl SynchronizationStrategy for FullSynchronization {}
impl SynchronizationStrategy for DumpRestoreSynchronization {}
impl SynchronizationStrategy for DifferentialSynchronization {}
impl SynchronizationStrategy for FastDifferentialSynchronization {}

impl SynchronizationStrategy for PassiveSynchronization {
    fn copies_data(&self) -> bool {
        false
    }
}

/// Applies a wrapped strategy one table at a time.
///
/// The identifier is `per-table-<inner id>`.
#[derive(Debug, Clone)]
pub struct PerTableSynchronization {
    id: String,
    inner: Arc<dyn SynchronizationStrategy>,
}

impl PerTableSynchronization {
    pub const PREFIX: &'static str = "per-table-";

    pub fn new(inner: Arc<dyn SynchronizationStrategy>) -> Self {
        Self {
            id: format!("{}{}", Self::PREFIX, inner.id()),
            inner,
        }
    }

    pub fn inner(&self) -> &Arc<dyn SynchronizationStrategy> {
        &self.inner
    }
}

impl Strategy for PerTableSynchronization {
    fn id(&self) -> &str {
        &self.id
    }

    fn summary(&self) -> &'static str {
        "Runs the wrapped strategy table by table, each in its own transaction"
    }
}

impl SynchronizationStrategy for PerTableSynchronization {
    fn copies_data(&self) -> bool {
        self.inner.copies_data()
    }

    fn per_table(&self) -> Option<&dyn SynchronizationStrategy> {
        Some(self.inner.as_ref())
    }
}

pub(crate) fn builtin() -> Vec<Arc<dyn SynchronizationStrategy>> {
    let full: Arc<dyn SynchronizationStrategy> = Arc::new(FullSynchronization);
    let diff: Arc<dyn SynchronizationStrategy> = Arc::new(DifferentialSynchronization);
    vec![
        Arc::clone(&full),
        Arc::new(DumpRestoreSynchronization),
        Arc::clone(&diff),
        Arc::new(FastDifferentialSynchronization),
        Arc::new(PerTableSynchronization::new(full)),
        Arc::new(PerTableSynchronization::new(diff)),
        Arc::new(PassiveSynchronization),
    ]
}
