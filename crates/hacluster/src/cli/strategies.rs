//! Strategies command - list the built-in strategy catalogs

use crate::cli::output::{print_json, print_table};
use hacluster_strategies::{StrategyInfo, StrategyKind, StrategyRegistry};

#[derive(Debug)]
pub struct StrategiesArgs {
    pub kind: Option<StrategyKind>,
    pub json: bool,
}

/// Catalog entries for one kind, or every kind in catalog order.
pub fn collect(registry: &StrategyRegistry, kind: Option<StrategyKind>) -> Vec<StrategyInfo> {
    match kind {
        Some(kind) => registry.describe(kind),
        None => StrategyKind::ALL
            .iter()
            .flat_map(|kind| registry.describe(*kind))
            .collect(),
    }
}

pub fn run(args: StrategiesArgs) -> anyhow::Result<()> {
    let entries = collect(StrategyRegistry::builtin(), args.kind);

    if args.json {
        return print_json(&entries);
    }

    let rows = entries
        .into_iter()
        .map(|info| vec![info.kind.to_string(), info.id, info.summary])
        .collect();
    print_table(&["Kind", "Identifier", "Description"], rows);
    Ok(())
}
