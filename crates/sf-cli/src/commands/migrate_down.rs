//! Migrate-down command implementation

use anyhow::Result;

use crate::cli::{GlobalArgs, MigrateDownArgs};
use crate::commands::common::{prepare, report_failure};

/// Execute the migrate-down command
pub(crate) async fn execute(args: &MigrateDownArgs, global: &GlobalArgs) -> Result<()> {
    let (_project, db, migrator) = prepare(global)?;

    let reverted = migrator
        .migrate_down(&db, args.name.as_deref())
        .await
        .map_err(report_failure)?;

    println!("Reverted {reverted}.");
    Ok(())
}
