use super::*;
use sf_db::DuckDbBackend;

fn catalog(names: &[&str]) -> Catalog {
    Catalog::from_units(
        names
            .iter()
            .map(|n| {
                ChangeUnit::from_sql(UnitName::parse(*n).unwrap(), "SELECT 1", "SELECT 1").unwrap()
            })
            .collect(),
    )
    .unwrap()
}

fn names(units: &[&ChangeUnit]) -> Vec<String> {
    units.iter().map(|u| u.name().to_string()).collect()
}

#[test]
fn nothing_applied_returns_everything_in_order() {
    let catalog = catalog(&["002_b", "001_a", "003_c"]);
    let pending = pending(&catalog, &BTreeSet::new());
    assert_eq!(names(&pending), vec!["001_a", "002_b", "003_c"]);
}

#[test]
fn applied_middle_unit_is_never_returned() {
    let catalog = catalog(&["001_a", "002_b", "003_c"]);
    let applied: BTreeSet<UnitName> = [UnitName::parse("002_b").unwrap()].into();
    assert_eq!(names(&pending(&catalog, &applied)), vec!["001_a", "003_c"]);
}

#[test]
fn all_applied_is_empty() {
    let catalog = catalog(&["001_a"]);
    let applied: BTreeSet<UnitName> = [UnitName::parse("001_a").unwrap()].into();
    assert!(pending(&catalog, &applied).is_empty());
}

#[tokio::test]
async fn pending_from_db_reads_ledger() {
    let db = DuckDbBackend::in_memory().unwrap();
    let catalog = catalog(&["001_a", "002_b"]);
    let ledger = Ledger::default();
    ledger.ensure_exists(&db).await.unwrap();
    ledger
        .record_applied(&db, &catalog.list()[0])
        .await
        .unwrap();

    let pending = pending_from_db(&db, &ledger, &catalog).await.unwrap();
    assert_eq!(names(&pending), vec!["002_b"]);
}
