use super::*;
use sf_core::ColumnDef;
use sf_db::DuckDbBackend;

fn products() -> SchemaOp {
    SchemaOp::CreateTable {
        table: "products".to_string(),
        columns: vec![
            ColumnDef::new("id", "INTEGER").primary_key(),
            ColumnDef::new("title", "VARCHAR").not_null(),
        ],
    }
}

#[tokio::test]
async fn create_table_only_when_absent() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert_eq!(apply_op(&db, &products()).await.unwrap(), OpOutcome::Applied);
    assert_eq!(
        apply_op(&db, &products()).await.unwrap(),
        OpOutcome::AlreadyInPlace
    );
    assert!(db.relation_exists("products").await.unwrap());
}

#[tokio::test]
async fn drop_table_only_when_present() {
    let db = DuckDbBackend::in_memory().unwrap();
    let drop = SchemaOp::DropTable {
        table: "products".to_string(),
    };
    assert_eq!(apply_op(&db, &drop).await.unwrap(), OpOutcome::AlreadyInPlace);

    apply_op(&db, &products()).await.unwrap();
    assert_eq!(apply_op(&db, &drop).await.unwrap(), OpOutcome::Applied);
    assert!(!db.relation_exists("products").await.unwrap());
}

#[tokio::test]
async fn add_column_only_when_absent() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE items (id INTEGER)").await.unwrap();
    let add = SchemaOp::AddColumn {
        table: "items".to_string(),
        column: ColumnDef::new("price", "DOUBLE").default_value("0"),
    };

    assert_eq!(apply_op(&db, &add).await.unwrap(), OpOutcome::Applied);
    assert_eq!(apply_op(&db, &add).await.unwrap(), OpOutcome::AlreadyInPlace);
    assert!(db.column_exists("items", "price").await.unwrap());
}

#[tokio::test]
async fn add_column_to_missing_table_fails() {
    let db = DuckDbBackend::in_memory().unwrap();
    let add = SchemaOp::AddColumn {
        table: "ghost".to_string(),
        column: ColumnDef::new("price", "DOUBLE"),
    };
    assert!(matches!(
        apply_op(&db, &add).await,
        Err(DbError::TableNotFound(_))
    ));
}

#[tokio::test]
async fn drop_column_only_when_present() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE items (id INTEGER, price DOUBLE)")
        .await
        .unwrap();
    let drop = SchemaOp::DropColumn {
        table: "items".to_string(),
        column: "price".to_string(),
    };

    assert_eq!(apply_op(&db, &drop).await.unwrap(), OpOutcome::Applied);
    assert_eq!(apply_op(&db, &drop).await.unwrap(), OpOutcome::AlreadyInPlace);
    assert!(!db.column_exists("items", "price").await.unwrap());
}

#[tokio::test]
async fn index_ops_are_conditional() {
    let db = DuckDbBackend::in_memory().unwrap();
    apply_op(&db, &products()).await.unwrap();
    let create = SchemaOp::CreateIndex {
        name: "idx_products_title".to_string(),
        table: "products".to_string(),
        columns: vec!["title".to_string()],
        unique: false,
    };
    let drop = SchemaOp::DropIndex {
        name: "idx_products_title".to_string(),
    };

    assert_eq!(apply_op(&db, &create).await.unwrap(), OpOutcome::Applied);
    assert_eq!(apply_op(&db, &create).await.unwrap(), OpOutcome::AlreadyInPlace);
    assert_eq!(apply_op(&db, &drop).await.unwrap(), OpOutcome::Applied);
    assert_eq!(apply_op(&db, &drop).await.unwrap(), OpOutcome::AlreadyInPlace);
}

#[tokio::test]
async fn sql_always_runs() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE log (n INT)").await.unwrap();
    let op = SchemaOp::Sql {
        sql: "INSERT INTO log VALUES (1)".to_string(),
    };
    let applied = apply_all(&db, &[op.clone(), op]).await.unwrap();
    assert_eq!(applied, 2);
    assert_eq!(db.query_count("SELECT * FROM log").await.unwrap(), 2);
}

#[tokio::test]
async fn apply_all_counts_only_changes() {
    let db = DuckDbBackend::in_memory().unwrap();
    let ops = vec![
        SchemaOp::CreateTable {
            table: "tags".to_string(),
            columns: vec![ColumnDef::new("label", "VARCHAR")],
        },
        SchemaOp::AddColumn {
            table: "tags".to_string(),
            column: ColumnDef::new("price", "DOUBLE"),
        },
    ];
    assert_eq!(apply_all(&db, &ops).await.unwrap(), 2);
    assert_eq!(apply_all(&db, &ops).await.unwrap(), 0);
}
