//! MySQL dialect.
//!
//! MySQL differences from ANSI:
//! - Backtick identifier quoting (`` `name` ``)
//! - `?` positional placeholders
//! - Boolean is TINYINT(1), literals render as 1/0
//! - `||` is logical OR by default (use CONCAT())
//! - INSERT IGNORE / ON DUPLICATE KEY UPDATE for conflict handling
//! - No RETURNING clause
//! - No NULLS FIRST/LAST
//! - No native MERGE

use super::helpers;
use super::{ConflictStyle, SqlDialect};

/// MySQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".into()
    }

    fn format_timestamp_literal(&self, ts: &str) -> String {
        // MySQL has no TIMESTAMP '...' literal prefix
        helpers::quote_string_single(ts)
    }

    // Uses default emit_limit_offset (LIMIT ... OFFSET ...)

    fn concat_operator(&self) -> &'static str {
        // || is OR by default; callers check supports_concat_operator()
        "||"
    }

    fn supports_concat_operator(&self) -> bool {
        false
    }

    fn supports_nulls_ordering(&self) -> bool {
        false
    }

    fn supports_for_update(&self) -> bool {
        true
    }

    fn conflict_style(&self) -> ConflictStyle {
        ConflictStyle::DuplicateKey
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_mysql(name)
    }
}
