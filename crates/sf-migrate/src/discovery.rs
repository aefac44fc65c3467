//! Pending-set computation.

use crate::error::MigrateResult;
use crate::ledger::Ledger;
use sf_core::{Catalog, ChangeUnit, UnitName};
use sf_db::Database;
use std::collections::BTreeSet;

/// Catalog units not in `applied`, in catalog order.
///
/// An applied unit is never returned, even when it sits between pending
/// ones; gaps are applied in place without disturbing later units.
pub fn pending<'a>(catalog: &'a Catalog, applied: &BTreeSet<UnitName>) -> Vec<&'a ChangeUnit> {
    catalog
        .list()
        .iter()
        .filter(|unit| !applied.contains(unit.name()))
        .collect()
}

/// Re-read the ledger and compute the pending units.
pub async fn pending_from_db<'a>(
    db: &dyn Database,
    ledger: &Ledger,
    catalog: &'a Catalog,
) -> MigrateResult<Vec<&'a ChangeUnit>> {
    let applied = ledger.applied_names(db).await?;
    Ok(pending(catalog, &applied))
}

#[cfg(test)]
#[path = "discovery_test.rs"]
mod tests;
