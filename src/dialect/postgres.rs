//! PostgreSQL dialect.
//!
//! PostgreSQL features:
//! - ANSI identifier quoting (`"`)
//! - `$1, $2, ...` positional placeholders
//! - Native boolean type (true/false)
//! - RETURNING clause
//! - ON CONFLICT for upserts
//! - Native MERGE (15+)
//! - GROUPS window frames, FILTER clause for aggregates

use super::helpers;
use super::{ConflictStyle, ReturningStyle, SqlDialect};

/// PostgreSQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    // Uses default emit_limit_offset (LIMIT ... OFFSET ...)

    fn supports_ilike(&self) -> bool {
        true
    }

    fn supports_nulls_ordering(&self) -> bool {
        true
    }

    fn supports_groups_frame(&self) -> bool {
        true
    }

    fn supports_aggregate_filter(&self) -> bool {
        true
    }

    fn supports_for_update(&self) -> bool {
        true
    }

    fn supports_merge(&self) -> bool {
        // PostgreSQL 15+ has native MERGE support
        true
    }

    fn returning_style(&self) -> ReturningStyle {
        ReturningStyle::Returning
    }

    fn conflict_style(&self) -> ConflictStyle {
        ConflictStyle::OnConflict
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_postgres(name)
    }
}
