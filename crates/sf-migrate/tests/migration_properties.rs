//! Property tests for the migration engine against in-memory DuckDB.
//!
//! Covers idempotence, ordering, atomicity, the up/down inverse law, seed
//! idempotence, racing runners and a full end-to-end run from an on-disk
//! project.

use async_trait::async_trait;
use sf_core::{Catalog, ChangeUnit, Project, SeedSet, UnitName};
use sf_db::{ColumnInfo, Database, DbError, DbResult, DuckDbBackend};
use sf_migrate::{Engine, Ledger, MigrateError, Migrator, RunPhase};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

// ── Helpers ────────────────────────────────────────────────────────────

/// Wraps a backend and counts every statement that can change state.
struct CountingDb {
    inner: DuckDbBackend,
    writes: AtomicUsize,
    fail_ping: bool,
}

impl CountingDb {
    fn new(inner: DuckDbBackend) -> Self {
        Self {
            inner,
            writes: AtomicUsize::new(0),
            fail_ping: false,
        }
    }

    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Database for CountingDb {
    async fn ping(&self) -> DbResult<()> {
        if self.fail_ping {
            return Err(DbError::ConnectionError("refused".to_string()));
        }
        self.inner.ping().await
    }
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        self.bump();
        self.inner.execute(sql).await
    }
    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.bump();
        self.inner.execute_batch(sql).await
    }
    async fn begin(&self) -> DbResult<()> {
        self.bump();
        self.inner.begin().await
    }
    async fn commit(&self) -> DbResult<()> {
        self.inner.commit().await
    }
    async fn rollback(&self) -> DbResult<()> {
        self.inner.rollback().await
    }
    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.inner.relation_exists(name).await
    }
    async fn describe_table(&self, name: &str) -> DbResult<Option<Vec<ColumnInfo>>> {
        self.inner.describe_table(name).await
    }
    async fn index_exists(&self, name: &str) -> DbResult<bool> {
        self.inner.index_exists(name).await
    }
    async fn query_count(&self, sql: &str) -> DbResult<usize> {
        self.inner.query_count(sql).await
    }
    async fn query_rows(&self, sql: &str) -> DbResult<Vec<Vec<Option<String>>>> {
        self.inner.query_rows(sql).await
    }
    async fn create_schema_if_not_exists(&self, schema: &str) -> DbResult<()> {
        self.bump();
        self.inner.create_schema_if_not_exists(schema).await
    }
}

fn unit(name: &str, up: &str, down: &str) -> ChangeUnit {
    ChangeUnit::from_sql(UnitName::parse(name).unwrap(), up, down).unwrap()
}

fn four_units() -> Vec<ChangeUnit> {
    vec![
        unit("001_a", "CREATE TABLE a (id INT)", "DROP TABLE a"),
        unit("002_b", "CREATE TABLE b (id INT)", "DROP TABLE b"),
        unit("003_c", "CREATE TABLE c (id INT)", "DROP TABLE c"),
        unit("004_d", "CREATE TABLE d (id INT)", "DROP TABLE d"),
    ]
}

fn migrator(units: Vec<ChangeUnit>, seeds: Vec<SeedSet>) -> Migrator {
    Migrator::new(Catalog::from_units(units).unwrap(), Ledger::default(), seeds)
}

async fn ledger_names(db: &dyn Database) -> Vec<String> {
    Ledger::default()
        .applied_names(db)
        .await
        .unwrap()
        .into_iter()
        .map(UnitName::into_inner)
        .collect()
}

async fn table_names(db: &dyn Database) -> Vec<Option<String>> {
    db.query_rows(
        "SELECT table_name FROM information_schema.tables \
         WHERE table_name <> 'sf_schema_ledger' ORDER BY table_name",
    )
    .await
    .unwrap()
    .into_iter()
    .map(|mut row| row.remove(0))
    .collect()
}

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

// ── Properties ─────────────────────────────────────────────────────────

#[tokio::test]
async fn second_run_performs_zero_writes() {
    let db = CountingDb::new(DuckDbBackend::in_memory().unwrap());
    let m = migrator(four_units(), vec![]);

    m.migrate_up(&db).await.unwrap();
    let after_first = db.writes();
    assert!(after_first > 0);

    let report = m.migrate_up(&db).await.unwrap();
    assert!(report.applied.is_empty());
    assert_eq!(db.writes(), after_first);
}

#[tokio::test]
async fn gap_in_applied_set_is_filled_in_place() {
    let db = DuckDbBackend::in_memory().unwrap();
    migrator(four_units(), vec![]).migrate_up(&db).await.unwrap();
    migrator(four_units(), vec![])
        .migrate_down(&db, Some("003_c"))
        .await
        .unwrap();
    assert_eq!(ledger_names(&db).await, vec!["001_a", "002_b", "004_d"]);

    let report = migrator(four_units(), vec![]).migrate_up(&db).await.unwrap();
    let applied: Vec<&str> = report.applied.iter().map(|n| n.as_str()).collect();
    assert_eq!(applied, vec!["003_c"]);
    assert_eq!(ledger_names(&db).await, vec!["001_a", "002_b", "003_c", "004_d"]);
}

#[tokio::test]
async fn failing_unit_leaves_no_partial_effects() {
    let db = DuckDbBackend::in_memory().unwrap();
    let units = vec![
        unit("001_a", "CREATE TABLE a (id INT)", "DROP TABLE a"),
        unit(
            "002_b",
            "CREATE TABLE b (id INT); INSERT INTO b VALUES (1); INSERT INTO ghost VALUES (1)",
            "DROP TABLE b",
        ),
    ];

    let err = migrator(units, vec![]).migrate_up(&db).await.unwrap_err();
    assert!(matches!(err, MigrateError::MigrationFailed { .. }));
    assert_eq!(ledger_names(&db).await, vec!["001_a"]);
    assert_eq!(table_names(&db).await, vec![Some("a".to_string())]);
}

#[tokio::test]
async fn up_then_down_restores_schema() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE existing (id INT)").await.unwrap();
    let before = table_names(&db).await;

    let u = unit(
        "001_products",
        "CREATE TABLE products (id INT, title VARCHAR)",
        "DROP TABLE products",
    );
    let m = migrator(vec![u], vec![]);
    m.migrate_up(&db).await.unwrap();
    m.migrate_down(&db, Some("001_products")).await.unwrap();

    assert_eq!(table_names(&db).await, before);
    assert!(ledger_names(&db).await.is_empty());
}

#[tokio::test]
async fn racing_runners_record_once() {
    let runner_a = DuckDbBackend::in_memory().unwrap();
    let runner_b = runner_a.try_clone().unwrap();
    let ledger = Ledger::default();
    ledger.ensure_exists(&runner_a).await.unwrap();
    runner_a
        .execute_batch("CREATE TABLE up_calls (unit VARCHAR)")
        .await
        .unwrap();

    let d = unit("004_d", "INSERT INTO up_calls VALUES ('004_d')", "SELECT 1");

    // Runner B decided 004_d was pending before runner A committed it.
    Engine::new(&ledger)
        .apply_pending(&runner_a, &[&d])
        .await
        .unwrap();
    let applied_b = Engine::new(&ledger)
        .apply_pending(&runner_b, &[&d])
        .await
        .unwrap();

    assert!(applied_b.is_empty());
    assert_eq!(
        runner_a
            .query_count("SELECT * FROM sf_schema_ledger WHERE name = '004_d'")
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        runner_a.query_count("SELECT * FROM up_calls").await.unwrap(),
        1
    );
}

#[tokio::test]
async fn unreachable_database_fails_before_inspection() {
    let mut db = CountingDb::new(DuckDbBackend::in_memory().unwrap());
    db.fail_ping = true;

    let err = migrator(four_units(), vec![]).setup(&db).await.unwrap_err();
    assert!(matches!(err, MigrateError::ConnectionUnavailable(_)), "{err}");
    assert_eq!(db.writes(), 0);
    assert!(!db.relation_exists("sf_schema_ledger").await.unwrap());
}

// ── End to end ─────────────────────────────────────────────────────────

#[tokio::test]
async fn project_end_to_end() {
    let tmp = tempfile::TempDir::new().unwrap();
    let root = tmp.path();
    write(&root.join("schemaforge.yml"), "name: shop\n");
    write(
        &root.join("migrations/001_users/up.sql"),
        "CREATE TABLE users (email VARCHAR PRIMARY KEY, role VARCHAR NOT NULL, password_hash VARCHAR NOT NULL)",
    );
    write(&root.join("migrations/001_users/down.sql"), "DROP TABLE users");
    write(
        &root.join("migrations/002_categories/unit.yml"),
        r#"
description: Product categories
up:
  - op: create_table
    table: categories
    columns:
      - { name: slug, type: VARCHAR, primary_key: true }
      - { name: title, type: VARCHAR, nullable: false }
down:
  - op: drop_table
    table: categories
"#,
    );
    write(
        &root.join("seeds/admin.yml"),
        r#"
table: users
key: email
rows:
  - email: admin@example.com
    role: admin
    password_hash: { secret: "correct horse" }
"#,
    );
    write(
        &root.join("seeds/categories.yml"),
        r#"
table: categories
key: slug
rows:
  - { slug: books, title: Books }
  - { slug: games, title: Games }
"#,
    );

    let project = Project::load(root).unwrap();
    let db = DuckDbBackend::in_memory().unwrap();
    let m = Migrator::from_project(&project);

    let report = m.setup(&db).await.unwrap();
    assert_eq!(report.applied.len(), 2);
    assert_eq!(report.seeds.inserted(), 3);
    assert_eq!(report.phases.last(), Some(&RunPhase::Done));
    assert_eq!(ledger_names(&db).await, vec!["001_users", "002_categories"]);

    let hash = db
        .query_rows("SELECT password_hash FROM users")
        .await
        .unwrap()
        .remove(0)
        .remove(0)
        .unwrap();
    assert!(sf_migrate::verify_secret("correct horse", &hash));

    // A second setup is a no-op
    let again = m.setup(&db).await.unwrap();
    assert!(again.applied.is_empty());
    assert_eq!(again.seeds.inserted(), 0);
    assert_eq!(db.query_count("SELECT * FROM users").await.unwrap(), 1);
    assert_eq!(db.query_count("SELECT * FROM categories").await.unwrap(), 2);
}
