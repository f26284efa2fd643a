//! SQL Server (T-SQL) dialect.
//!
//! T-SQL differences from ANSI:
//! - Square bracket identifier quoting (`[name]`)
//! - `@p1, @p2, ...` named placeholders
//! - No boolean literal (1/0)
//! - OFFSET FETCH pagination (requires ORDER BY)
//! - N'...' prefix for Unicode strings
//! - OUTPUT instead of RETURNING
//! - No RECURSIVE keyword for recursive CTEs
//! - String concatenation with `+`
//! - Native MERGE

use super::helpers;
use super::{ReturningStyle, SqlDialect};
use crate::token::TokenStream;

/// SQL Server dialect.
#[derive(Debug, Clone, Copy)]
pub struct SqlServer;

impl SqlDialect for SqlServer {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_bracket(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        // N'...' for Unicode; plain quoting for ASCII
        if !s.is_ascii() {
            helpers::quote_string_unicode(s)
        } else {
            helpers::quote_string_single(s)
        }
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn placeholder(&self, index: usize) -> String {
        format!("@p{index}")
    }

    fn format_date_literal(&self, date: &str) -> String {
        helpers::quote_string_single(date)
    }

    fn format_timestamp_literal(&self, ts: &str) -> String {
        helpers::quote_string_single(ts)
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_fetch(limit, offset)
    }

    fn requires_order_by_for_offset(&self) -> bool {
        true
    }

    fn concat_operator(&self) -> &'static str {
        "+"
    }

    fn emit_recursive_keyword(&self) -> bool {
        false
    }

    fn supports_nulls_ordering(&self) -> bool {
        // 2022+ supports NULLS FIRST/LAST; being conservative
        false
    }

    fn supports_nulls_ignore(&self) -> bool {
        // IGNORE NULLS on LAG/LEAD/FIRST_VALUE/LAST_VALUE (2022+)
        true
    }

    fn supports_merge(&self) -> bool {
        true
    }

    fn returning_style(&self) -> ReturningStyle {
        ReturningStyle::Output
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_mssql(name)
    }
}
