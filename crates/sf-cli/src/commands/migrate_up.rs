//! Migrate-up command implementation

use anyhow::Result;

use crate::cli::GlobalArgs;
use crate::commands::common::{prepare, report_failure};

/// Execute the migrate-up command
pub(crate) async fn execute(global: &GlobalArgs) -> Result<()> {
    let (project, db, migrator) = prepare(global)?;

    let report = migrator.migrate_up(&db).await.map_err(report_failure)?;

    if report.applied.is_empty() {
        println!(
            "Schema is up to date ({} change units applied).",
            project.catalog.len()
        );
        return Ok(());
    }

    for name in &report.applied {
        println!("  ✓ {name}");
    }
    println!();
    println!("Applied {} change unit(s).", report.applied.len());
    if report.applied.len() < report.pending_before {
        println!(
            "{} unit(s) were applied concurrently by another runner.",
            report.pending_before - report.applied.len()
        );
    }
    Ok(())
}
