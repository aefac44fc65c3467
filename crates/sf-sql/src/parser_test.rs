use super::*;

#[test]
fn test_parse_multiple_statements() {
    let parser = SqlParser::duckdb();
    let stmts = parser
        .parse("CREATE TABLE a (id INT); CREATE TABLE b (id INT);")
        .unwrap();
    assert_eq!(stmts.len(), 2);
}

#[test]
fn test_parse_empty() {
    let parser = SqlParser::duckdb();
    assert!(matches!(parser.parse("   \n"), Err(SqlError::EmptySql)));
}

#[test]
fn test_parse_comment_only() {
    let parser = SqlParser::default();
    assert!(matches!(
        parser.parse("-- nothing to do\n"),
        Err(SqlError::EmptySql)
    ));
}

#[test]
fn test_parse_error() {
    let parser = SqlParser::duckdb();
    assert!(parser.parse("ALTER TABLE").is_err());
}
