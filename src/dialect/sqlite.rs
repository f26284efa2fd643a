//! SQLite dialect.
//!
//! SQLite differences from ANSI:
//! - ANSI identifier quoting (`"`)
//! - `?` positional placeholders
//! - Boolean stored as integer, literals render as 1/0
//! - RETURNING (3.35+), ON CONFLICT (3.24+), NULLS ordering (3.30+)
//! - No MERGE, no FOR UPDATE (whole-database locking)
//! - Rich JSON1 function family

use super::helpers;
use super::{ConflictStyle, ReturningStyle, SqlDialect};

/// SQLite dialect.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".into()
    }

    fn format_date_literal(&self, date: &str) -> String {
        helpers::quote_string_single(date)
    }

    fn format_timestamp_literal(&self, ts: &str) -> String {
        helpers::quote_string_single(ts)
    }

    // Uses default emit_limit_offset (LIMIT ... OFFSET ...)

    fn supports_nulls_ordering(&self) -> bool {
        true
    }

    fn supports_aggregate_filter(&self) -> bool {
        true
    }

    fn returning_style(&self) -> ReturningStyle {
        ReturningStyle::Returning
    }

    fn conflict_style(&self) -> ConflictStyle {
        ConflictStyle::OnConflict
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_sqlite(name)
    }
}
