//! Seed command implementation

use anyhow::Result;

use crate::cli::GlobalArgs;
use crate::commands::common::{prepare, report_failure};
use sf_migrate::SeedReport;

/// Execute the seed command
pub(crate) async fn execute(global: &GlobalArgs) -> Result<()> {
    let (_project, db, migrator) = prepare(global)?;

    let report = migrator.seed(&db).await.map_err(report_failure)?;
    if report.sets.is_empty() {
        println!("No seed files found in seed_paths.");
        return Ok(());
    }
    print_seed_report(&report);
    Ok(())
}

/// Print one line per seed set plus a total.
pub(crate) fn print_seed_report(report: &SeedReport) {
    for set in &report.sets {
        println!(
            "  {:<24} {:<24} {} inserted, {} already present",
            set.name, set.table, set.inserted, set.skipped
        );
    }
    println!();
    println!(
        "Seeded {} set(s): {} row(s) inserted, {} skipped.",
        report.sets.len(),
        report.inserted(),
        report.skipped()
    );
}
