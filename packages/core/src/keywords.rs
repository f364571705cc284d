//! Static lookup tables for completion.
//!
//! Order matters: completion takes the first matching entry.

pub const KEYWORDS: &[&str] = &[
    "SELECT",
    "FROM",
    "WHERE",
    "INSERT",
    "INTO",
    "VALUES",
    "UPDATE",
    "SET",
    "DELETE",
    "CREATE",
    "TABLE",
    "DROP",
    "ALTER",
    "ADD",
    "CONSTRAINT",
    "PRIMARY",
    "KEY",
    "FOREIGN",
    "REFERENCES",
    "JOIN",
    "INNER",
    "LEFT",
    "RIGHT",
    "ON",
    "GROUP",
    "BY",
    "ORDER",
    "ASC",
    "DESC",
    "LIMIT",
    "OFFSET",
    "AS",
    "DISTINCT",
    "EXISTS",
    "HAVING",
    "OUTER",
    "NULL",
];

pub const OPERATORS: &[&str] = &[
    "=",
    "<>",
    "!=",
    ">",
    "<",
    ">=",
    "<=",
    "AND",
    "OR",
    "IN",
    "NOT",
    "LIKE",
    "BETWEEN",
    "IS NULL",
    "IS NOT NULL",
];

pub const FUNCTIONS: &[&str] = &[
    "AVG", "COUNT", "SUM", "MIN", "MAX", "ROUND", "LENGTH", "UPPER", "LOWER",
];

pub const DATA_TYPES: &[&str] = &[
    "VARCHAR(255)",
    "INTEGER",
    "TEXT",
    "NUM",
    "REAL",
    "BLOB",
    "BOOLEAN",
    "DATE",
];

pub const CONSTRAINTS: &[&str] = &["PRIMARY KEY", "NOT NULL", "UNIQUE", "DEFAULT"];

/// Data type keyword without its parenthesized size, e.g. `VARCHAR`.
pub fn base_type(data_type: &str) -> &str {
    match data_type.find('(') {
        Some(i) => &data_type[..i],
        None => data_type,
    }
}

pub fn is_function(word: &str) -> bool {
    let upper = word.to_uppercase();
    FUNCTIONS.contains(&upper.as_str())
}

pub fn is_operator(word: &str) -> bool {
    let upper = word.to_uppercase();
    OPERATORS.contains(&upper.as_str())
}

/// Statement keywords whose success changes stored data or structure.
pub const MODIFYING: &[&str] = &["insert", "update", "delete", "create", "drop", "alter"];

/// Subset of [`MODIFYING`] that changes structure.
pub const STRUCTURAL: &[&str] = &["create", "drop", "alter"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_type_strips_size() {
        assert_eq!(base_type("VARCHAR(255)"), "VARCHAR");
        assert_eq!(base_type("INTEGER"), "INTEGER");
    }

    #[test]
    fn function_lookup_ignores_case() {
        assert!(is_function("count"));
        assert!(is_function("Max"));
        assert!(!is_function("COUNT("));
    }

    #[test]
    fn operator_lookup_ignores_case() {
        assert!(is_operator("="));
        assert!(is_operator("like"));
        assert!(!is_operator("IS"));
    }
}
