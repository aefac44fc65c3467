use super::*;
use tempfile::TempDir;

fn sql_unit(root: &Path, name: &str, up: &str, down: &str) {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("up.sql"), up).unwrap();
    std::fs::write(dir.join("down.sql"), down).unwrap();
}

#[test]
fn test_load_orders_by_name() {
    let tmp = TempDir::new().unwrap();
    sql_unit(tmp.path(), "003_c", "CREATE TABLE c (id INT)", "DROP TABLE c");
    sql_unit(tmp.path(), "001_a", "CREATE TABLE a (id INT)", "DROP TABLE a");
    sql_unit(tmp.path(), "002_b", "CREATE TABLE b (id INT)", "DROP TABLE b");

    let catalog = Catalog::load(&[tmp.path().to_path_buf()]).unwrap();
    let names: Vec<&str> = catalog.names().iter().map(|n| n.as_str()).collect();
    assert_eq!(names, vec!["001_a", "002_b", "003_c"]);
    assert_eq!(catalog.len(), 3);
    assert!(catalog.get("002_b").is_some());
    assert!(catalog.get("004_d").is_none());
    assert_eq!(
        catalog.get("001_a").unwrap().source(),
        Some(tmp.path().join("001_a").as_path())
    );
}

#[test]
fn test_load_is_repeatable() {
    let tmp = TempDir::new().unwrap();
    sql_unit(tmp.path(), "001_a", "CREATE TABLE a (id INT)", "DROP TABLE a");
    let first = Catalog::load(&[tmp.path().to_path_buf()]).unwrap();
    let second = Catalog::load(&[tmp.path().to_path_buf()]).unwrap();
    assert_eq!(
        first.list()[0].checksum(),
        second.list()[0].checksum()
    );
}

#[test]
fn test_merges_multiple_paths() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    sql_unit(a.path(), "002_b", "CREATE TABLE b (id INT)", "DROP TABLE b");
    sql_unit(b.path(), "001_a", "CREATE TABLE a (id INT)", "DROP TABLE a");

    let catalog = Catalog::load(&[a.path().to_path_buf(), b.path().to_path_buf()]).unwrap();
    assert_eq!(catalog.names(), vec!["001_a", "002_b"]);
}

#[test]
fn test_declarative_unit() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("001_products");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("unit.yml"),
        r#"
up:
  - op: create_table
    table: products
    columns:
      - { name: id, type: INTEGER, primary_key: true }
      - { name: title, type: VARCHAR, nullable: false }
down:
  - op: drop_table
    table: products
"#,
    )
    .unwrap();

    let catalog = Catalog::load(&[tmp.path().to_path_buf()]).unwrap();
    let unit = catalog.get("001_products").unwrap();
    assert_eq!(unit.up()[0].describe(), "create table products");
}

#[test]
fn test_missing_directory_is_unreadable() {
    let tmp = TempDir::new().unwrap();
    let err = Catalog::load(&[tmp.path().join("nope")]).unwrap_err();
    assert!(matches!(err, CoreError::CatalogUnreadable { .. }), "{err}");
}

#[test]
fn test_invalid_unit_name() {
    let tmp = TempDir::new().unwrap();
    sql_unit(tmp.path(), "create_users", "CREATE TABLE u (id INT)", "DROP TABLE u");
    let err = Catalog::load(&[tmp.path().to_path_buf()]).unwrap_err();
    assert!(matches!(err, CoreError::MalformedUnit { ref name, .. } if name == "create_users"));
}

#[test]
fn test_missing_down_is_malformed() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("001_a");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("up.sql"), "CREATE TABLE a (id INT)").unwrap();
    let err = Catalog::load(&[tmp.path().to_path_buf()]).unwrap_err();
    assert!(err.to_string().contains("up.sql"), "{err}");
}

#[test]
fn test_extra_file_is_malformed() {
    let tmp = TempDir::new().unwrap();
    sql_unit(tmp.path(), "001_a", "CREATE TABLE a (id INT)", "DROP TABLE a");
    std::fs::write(tmp.path().join("001_a").join("notes.md"), "todo").unwrap();
    assert!(matches!(
        Catalog::load(&[tmp.path().to_path_buf()]),
        Err(CoreError::MalformedUnit { .. })
    ));
}

#[test]
fn test_loose_file_is_malformed() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("001_a.sql"), "CREATE TABLE a (id INT)").unwrap();
    assert!(matches!(
        Catalog::load(&[tmp.path().to_path_buf()]),
        Err(CoreError::MalformedUnit { .. })
    ));
}

#[test]
fn test_hidden_entries_ignored() {
    let tmp = TempDir::new().unwrap();
    sql_unit(tmp.path(), "001_a", "CREATE TABLE a (id INT)", "DROP TABLE a");
    std::fs::write(tmp.path().join(".gitkeep"), "").unwrap();
    std::fs::write(tmp.path().join("001_a").join(".DS_Store"), "").unwrap();
    assert_eq!(Catalog::load(&[tmp.path().to_path_buf()]).unwrap().len(), 1);
}

#[test]
fn test_unparseable_sql_fails_at_load() {
    let tmp = TempDir::new().unwrap();
    sql_unit(tmp.path(), "001_a", "CREATE TABEL a (id INT)", "DROP TABLE a");
    assert!(matches!(
        Catalog::load(&[tmp.path().to_path_buf()]),
        Err(CoreError::MalformedUnit { .. })
    ));
}

#[test]
fn test_duplicate_across_paths() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    sql_unit(a.path(), "001_a", "CREATE TABLE a (id INT)", "DROP TABLE a");
    sql_unit(b.path(), "001_a", "CREATE TABLE a (id INT)", "DROP TABLE a");
    let err = Catalog::load(&[a.path().to_path_buf(), b.path().to_path_buf()]).unwrap_err();
    assert!(matches!(err, CoreError::DuplicateUnit { .. }), "{err}");
}

#[test]
fn test_from_units_rejects_duplicates() {
    let unit = |n: &str| {
        ChangeUnit::from_sql(UnitName::parse(n).unwrap(), "SELECT 1", "SELECT 1").unwrap()
    };
    let err = Catalog::from_units(vec![unit("001_a"), unit("001_a")]).unwrap_err();
    assert!(err.to_string().contains("<registered>"), "{err}");
}

#[test]
fn test_empty_catalog() {
    let tmp = TempDir::new().unwrap();
    let catalog = Catalog::load(&[tmp.path().to_path_buf()]).unwrap();
    assert!(catalog.is_empty());
}
