//! Test utilities for SQL emission validation.
//!
//! Validates that emitted SQL is syntactically correct using sqlparser-rs
//! for roundtrip validation.

use sqlparser::dialect::{
    GenericDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect,
};
use sqlparser::parser::Parser;

use crate::dialect::Dialect;

/// Validates that a SQL string parses under the given dialect.
///
/// Placeholders must be inlined or parseable; sqlparser accepts `$n`, `?`,
/// `:name`, and `@name` forms.
pub fn validate_sql(sql: &str, dialect: Dialect) -> Result<(), String> {
    let parser_dialect: Box<dyn sqlparser::dialect::Dialect> = match dialect {
        Dialect::Postgres => Box::new(PostgreSqlDialect {}),
        Dialect::MySql => Box::new(MySqlDialect {}),
        Dialect::Sqlite => Box::new(SQLiteDialect {}),
        Dialect::Oracle => Box::new(GenericDialect {}), // sqlparser has no Oracle dialect
        Dialect::SqlServer => Box::new(MsSqlDialect {}),
    };

    Parser::parse_sql(&*parser_dialect, sql)
        .map(|_| ())
        .map_err(|e| format!("Invalid SQL for {dialect:?}: {e}\nSQL: {sql}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_sql() {
        validate_sql("SELECT * FROM users", Dialect::Postgres).unwrap();
        validate_sql("SELECT * FROM users WHERE id = $1", Dialect::Postgres).unwrap();
        validate_sql("SELECT * FROM users WHERE id = ?", Dialect::MySql).unwrap();
    }

    #[test]
    fn test_validate_invalid_sql() {
        assert!(validate_sql("SELEC * FORM users", Dialect::Postgres).is_err());
    }
}
