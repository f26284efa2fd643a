//! Shared helper functions for SQL dialect implementations.
//!
//! Reusable building blocks that dialects compose to implement the
//! `SqlDialect` trait with minimal duplication.

use crate::token::{Token, TokenStream};

// =============================================================================
// Identifier quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: Postgres, SQLite, Oracle
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote identifier with backticks.
/// Used by: MySQL
pub fn quote_backtick(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// Quote identifier with square brackets.
/// Used by: SQL Server
pub fn quote_bracket(ident: &str) -> String {
    format!("[{}]", ident.replace(']', "]]"))
}

// =============================================================================
// String quoting
// =============================================================================

/// Quote string with single quotes (standard SQL).
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Quote string with N prefix for Unicode (SQL Server).
pub fn quote_string_unicode(s: &str) -> String {
    format!("N'{}'", s.replace('\'', "''"))
}

// =============================================================================
// Boolean formatting
// =============================================================================

/// Format boolean as literal true/false.
/// Used by: Postgres
pub fn format_bool_literal(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

/// Format boolean as numeric 1/0.
/// Used by: MySQL, SQLite, Oracle, SQL Server
pub fn format_bool_numeric(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Emit LIMIT ... OFFSET ... (standard SQL).
/// Used by: Postgres, MySQL, SQLite
pub fn emit_limit_offset_standard(limit: Option<u64>, offset: Option<u64>) -> TokenStream {
    let mut ts = TokenStream::new();

    if let Some(lim) = limit {
        ts.push(Token::Limit)
            .space()
            .push(Token::LitInt(lim as i64));
    }

    if let Some(off) = offset {
        if limit.is_some() {
            ts.space();
        }
        ts.push(Token::Offset)
            .space()
            .push(Token::LitInt(off as i64));
    }

    ts
}

/// Emit OFFSET ... ROWS FETCH NEXT ... ROWS ONLY.
/// Used by: SQL Server (requires ORDER BY), Oracle 12c+
pub fn emit_limit_offset_fetch(limit: Option<u64>, offset: Option<u64>) -> TokenStream {
    let mut ts = TokenStream::new();

    let off = offset.unwrap_or(0);
    ts.push(Token::Offset)
        .space()
        .push(Token::LitInt(off as i64))
        .space()
        .push(Token::Rows);

    if let Some(lim) = limit {
        ts.space()
            .push(Token::Fetch)
            .space()
            .push(Token::Next)
            .space()
            .push(Token::LitInt(lim as i64))
            .space()
            .push(Token::Rows)
            .space()
            .push(Token::Only);
    }

    ts
}

// =============================================================================
// Function remapping
// =============================================================================

/// Remap functions for the Postgres dialect.
pub fn remap_function_postgres(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "NVL" => Some("COALESCE"),
        "IFNULL" => Some("COALESCE"),
        "ISNULL" => Some("COALESCE"),
        "GETDATE" => Some("NOW"),
        _ => None,
    }
}

/// Remap functions for the MySQL dialect.
pub fn remap_function_mysql(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "NVL" => Some("IFNULL"),
        "ISNULL" => Some("IFNULL"),
        "SUBSTR" => Some("SUBSTRING"),
        "GETDATE" => Some("NOW"),
        _ => None,
    }
}

/// Remap functions for the SQLite dialect.
pub fn remap_function_sqlite(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "NVL" => Some("COALESCE"),
        "ISNULL" => Some("IFNULL"),
        "SUBSTRING" => Some("SUBSTR"),
        _ => None,
    }
}

/// Remap functions for the Oracle dialect.
pub fn remap_function_oracle(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "IFNULL" => Some("NVL"),
        "ISNULL" => Some("NVL"),
        "SUBSTRING" => Some("SUBSTR"),
        "NOW" => Some("SYSTIMESTAMP"),
        _ => None,
    }
}

/// Remap functions for the SQL Server dialect.
pub fn remap_function_mssql(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "LENGTH" => Some("LEN"),
        "SUBSTR" => Some("SUBSTRING"),
        "NOW" => Some("GETDATE"),
        "NVL" => Some("ISNULL"),
        "IFNULL" => Some("ISNULL"),
        "STDDEV" => Some("STDEV"),
        "VARIANCE" => Some("VAR"),
        "CEIL" => Some("CEILING"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;

    #[test]
    fn test_quoting() {
        assert_eq!(quote_double("a\"b"), "\"a\"\"b\"");
        assert_eq!(quote_backtick("a`b"), "`a``b`");
        assert_eq!(quote_bracket("a]b"), "[a]]b]");
    }

    #[test]
    fn test_limit_offset_standard() {
        let ts = emit_limit_offset_standard(Some(10), Some(20));
        assert_eq!(ts.serialize(Dialect::Postgres).sql, "LIMIT 10 OFFSET 20");

        let ts = emit_limit_offset_standard(Some(5), None);
        assert_eq!(ts.serialize(Dialect::Postgres).sql, "LIMIT 5");
    }

    #[test]
    fn test_limit_offset_fetch() {
        let ts = emit_limit_offset_fetch(Some(10), Some(20));
        assert_eq!(
            ts.serialize(Dialect::SqlServer).sql,
            "OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
        );

        let ts = emit_limit_offset_fetch(Some(10), None);
        assert_eq!(
            ts.serialize(Dialect::SqlServer).sql,
            "OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY"
        );
    }
}
