//! Status command implementation

use anyhow::{Context, Result};
use sf_migrate::{UnitState, UnitStatus};

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::commands::common::{prepare, report_failure};

/// Execute the status command
pub(crate) async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let (_project, db, migrator) = prepare(global)?;

    let statuses = migrator.status(&db).await.map_err(report_failure)?;

    match args.output {
        StatusOutput::Json => {
            let json = serde_json::to_string_pretty(&statuses)
                .context("Failed to serialize status")?;
            println!("{json}");
        }
        StatusOutput::Table => print_table(&statuses),
    }
    Ok(())
}

fn print_table(statuses: &[UnitStatus]) {
    if statuses.is_empty() {
        println!("No change units found.");
        return;
    }

    let width = statuses
        .iter()
        .map(|s| s.name.len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    println!("{:<width$}  {:<9}  APPLIED AT", "NAME", "STATE");
    for status in statuses {
        let applied_at = status
            .state
            .applied_at()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<width$}  {:<9}  {}",
            status.name.as_str(),
            status.state.label(),
            applied_at
        );
    }

    let count = |label: &str| {
        statuses
            .iter()
            .filter(|s| s.state.label() == label)
            .count()
    };
    println!();
    println!(
        "{} applied, {} pending, {} modified, {} orphaned",
        count("applied"),
        count("pending"),
        count("modified"),
        count("orphaned")
    );
    if statuses
        .iter()
        .any(|s| matches!(s.state, UnitState::Modified { .. }))
    {
        println!("Modified units were edited after they ran; restore them or add a new unit.");
    }
}
