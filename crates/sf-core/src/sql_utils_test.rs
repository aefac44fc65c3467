use super::*;

#[test]
fn test_quote_ident_with_embedded_quotes() {
    assert_eq!(quote_ident(r#"my"table"#), r#""my""table""#);
}

#[test]
fn test_quote_qualified_two_parts() {
    assert_eq!(quote_qualified("staging.orders"), r#""staging"."orders""#);
}

#[test]
fn test_split_qualified_name() {
    assert_eq!(split_qualified_name("users"), ("main", "users"));
    assert_eq!(
        split_qualified_name("sf_meta.ledger"),
        ("sf_meta", "ledger")
    );
}

#[test]
fn test_quote_literal() {
    assert_eq!(quote_literal("admin"), "'admin'");
    assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
}

#[test]
fn test_simple_identifier() {
    assert!(is_simple_identifier("sf_schema_ledger"));
    assert!(is_simple_identifier("meta.ledger_v2"));
    assert!(!is_simple_identifier(""));
    assert!(!is_simple_identifier("meta."));
    assert!(!is_simple_identifier("1ledger"));
    assert!(!is_simple_identifier("ledger; DROP TABLE users"));
}
