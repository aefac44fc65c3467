use super::*;

#[tokio::test]
async fn test_in_memory() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.ping().await.unwrap();
}

#[tokio::test]
async fn test_from_file_persists() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("app.duckdb");
    {
        let db = DuckDbBackend::new(path.to_str().unwrap()).unwrap();
        db.execute_batch("CREATE TABLE t (id INT); INSERT INTO t VALUES (1), (2);")
            .await
            .unwrap();
    }
    let db = DuckDbBackend::from_path(&path).unwrap();
    assert_eq!(db.query_count("SELECT * FROM t").await.unwrap(), 2);
}

#[tokio::test]
async fn test_query_count() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE nums AS SELECT * FROM range(10) t(n)")
        .await
        .unwrap();

    let count = db.query_count("SELECT * FROM nums").await.unwrap();
    assert_eq!(count, 10);
}

#[tokio::test]
async fn test_query_rows_renders_values() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE t (id INTEGER, label VARCHAR);
         INSERT INTO t VALUES (1, 'one'), (2, NULL);",
    )
    .await
    .unwrap();

    let rows = db
        .query_rows("SELECT id, label FROM t ORDER BY id")
        .await
        .unwrap();
    assert_eq!(
        rows,
        vec![
            vec![Some("1".into()), Some("one".into())],
            vec![Some("2".into()), None],
        ]
    );
}

#[tokio::test]
async fn test_execute_batch() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE t1 (id INT); CREATE TABLE t2 (id INT); INSERT INTO t1 VALUES (1);",
    )
    .await
    .unwrap();

    assert!(db.relation_exists("t1").await.unwrap());
    assert!(db.relation_exists("t2").await.unwrap());
}

#[tokio::test]
async fn test_relation_not_exists() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert!(!db.relation_exists("nonexistent").await.unwrap());
}

#[tokio::test]
async fn test_describe_table() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE users (id INTEGER NOT NULL, email VARCHAR)")
        .await
        .unwrap();

    let cols = db.describe_table("users").await.unwrap().unwrap();
    assert_eq!(cols.len(), 2);
    assert_eq!(cols[0].name, "id");
    assert_eq!(cols[0].data_type, "INTEGER");
    assert!(!cols[0].nullable);
    assert!(cols[1].nullable);

    assert!(db.column_exists("users", "email").await.unwrap());
    assert!(!db.column_exists("users", "phone").await.unwrap());
    assert!(db.describe_table("missing").await.unwrap().is_none());
    assert!(!db.column_exists("missing", "id").await.unwrap());
}

#[tokio::test]
async fn test_index_exists() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE t (id INT); CREATE INDEX idx_t_id ON t (id);")
        .await
        .unwrap();
    assert!(db.index_exists("idx_t_id").await.unwrap());
    assert!(!db.index_exists("idx_other").await.unwrap());
}

#[tokio::test]
async fn test_rollback_discards_changes() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE t (id INT)").await.unwrap();

    db.begin().await.unwrap();
    db.execute("INSERT INTO t VALUES (1)").await.unwrap();
    db.execute_batch("CREATE TABLE t2 (id INT)").await.unwrap();
    db.rollback().await.unwrap();

    assert_eq!(db.query_count("SELECT * FROM t").await.unwrap(), 0);
    assert!(!db.relation_exists("t2").await.unwrap());
}

#[tokio::test]
async fn test_commit_keeps_changes() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE t (id INT)").await.unwrap();

    db.begin().await.unwrap();
    db.execute("INSERT INTO t VALUES (1)").await.unwrap();
    db.commit().await.unwrap();

    assert_eq!(db.query_count("SELECT * FROM t").await.unwrap(), 1);
}

#[tokio::test]
async fn test_commit_without_begin_fails() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert!(matches!(
        db.commit().await,
        Err(DbError::TransactionError(_))
    ));
}

#[tokio::test]
async fn test_duplicate_key_classified() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE t (name VARCHAR PRIMARY KEY); INSERT INTO t VALUES ('a');")
        .await
        .unwrap();

    let err = db.execute("INSERT INTO t VALUES ('a')").await.unwrap_err();
    assert!(matches!(err, DbError::UniqueViolation(_)), "{err}");
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_missing_table_classified() {
    let db = DuckDbBackend::in_memory().unwrap();
    let err = db.execute("INSERT INTO nowhere VALUES (1)").await.unwrap_err();
    assert!(matches!(err, DbError::TableNotFound(_)), "{err}");
}

#[tokio::test]
async fn test_clone_shares_database() {
    let db = DuckDbBackend::in_memory().unwrap();
    let other = db.try_clone().unwrap();
    db.execute_batch("CREATE TABLE shared (id INT)").await.unwrap();
    assert!(other.relation_exists("shared").await.unwrap());
}

#[tokio::test]
async fn test_create_schema_if_not_exists() {
    let db = DuckDbBackend::in_memory().unwrap();

    db.create_schema_if_not_exists("meta").await.unwrap();
    db.execute_batch("CREATE TABLE meta.ledger (id INT)")
        .await
        .unwrap();

    assert!(db.relation_exists("meta.ledger").await.unwrap());
    assert!(db.describe_table("meta.ledger").await.unwrap().is_some());

    // IF NOT EXISTS
    db.create_schema_if_not_exists("meta").await.unwrap();
}
