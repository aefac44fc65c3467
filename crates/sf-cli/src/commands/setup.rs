//! Setup command implementation: migrate up, then seed

use anyhow::Result;

use crate::cli::GlobalArgs;
use crate::commands::common::{prepare, report_failure};
use crate::commands::seed::print_seed_report;

/// Execute the setup command
pub(crate) async fn execute(global: &GlobalArgs) -> Result<()> {
    let (_project, db, migrator) = prepare(global)?;

    let report = migrator.setup(&db).await.map_err(report_failure)?;

    for name in &report.applied {
        println!("  ✓ {name}");
    }
    if report.applied.is_empty() {
        println!("Schema is up to date.");
    } else {
        println!("Applied {} change unit(s).", report.applied.len());
    }
    println!();
    if report.seeds_already_present {
        println!("Seed data already present.");
    } else {
        print_seed_report(&report.seeds);
    }

    log::debug!(
        "Setup phases: {}",
        report
            .phases
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ")
    );
    Ok(())
}
