//! Strongly-typed change unit name.
//!
//! A unit name is `<digits>_<suffix>`, e.g. `001_users` or
//! `20240105093000_add_price`. The digit prefix encodes the apply order, so
//! names compare lexicographically in the order they must run.

use crate::newtype_string::define_newtype_string;

define_newtype_string! {
    /// The unique, ordered name of a change unit.
    pub struct UnitName;
    validate = validate_unit_name;
}

fn validate_unit_name(name: &str) -> Result<(), String> {
    let Some((prefix, suffix)) = name.split_once('_') else {
        return Err("expected '<sequence>_<description>'".to_string());
    };
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err("sequence prefix must be one or more ASCII digits".to_string());
    }
    if suffix.is_empty() {
        return Err("description after the sequence prefix is empty".to_string());
    }
    if !suffix
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
    {
        return Err("description may only contain [a-z0-9_]".to_string());
    }
    Ok(())
}

impl UnitName {
    /// The numeric sequence prefix as written (leading zeros preserved).
    pub fn sequence(&self) -> &str {
        self.as_str()
            .split_once('_')
            .map(|(prefix, _)| prefix)
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "unit_name_test.rs"]
mod tests;
