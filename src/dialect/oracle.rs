//! Oracle dialect.
//!
//! Oracle differences from ANSI:
//! - ANSI identifier quoting (`"`)
//! - `:p1, :p2, ...` named-positional placeholders
//! - No boolean literal (1/0)
//! - Table aliases reject the AS keyword
//! - OFFSET ... FETCH pagination (12c+)
//! - Native MERGE
//! - IGNORE/RESPECT NULLS and FROM FIRST/LAST on value functions

use super::helpers;
use super::SqlDialect;
use crate::token::TokenStream;

/// Oracle dialect.
#[derive(Debug, Clone, Copy)]
pub struct Oracle;

impl SqlDialect for Oracle {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn placeholder(&self, index: usize) -> String {
        format!(":p{index}")
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_fetch(limit, offset)
    }

    fn emit_as_for_table_alias(&self) -> bool {
        // Oracle rejects AS between a table and its alias
        false
    }

    fn supports_nulls_ordering(&self) -> bool {
        true
    }

    fn supports_nulls_ignore(&self) -> bool {
        true
    }

    fn supports_from_first_last(&self) -> bool {
        true
    }

    fn supports_for_update(&self) -> bool {
        true
    }

    fn supports_merge(&self) -> bool {
        true
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_oracle(name)
    }
}
