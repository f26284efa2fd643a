//! SQL dialect definitions and formatting rules.
//!
//! This module provides a trait-based abstraction for SQL dialect
//! differences. Each dialect implements [`SqlDialect`] to handle its
//! specific syntax:
//!
//! - Identifier quoting: `"` (PostgreSQL/Oracle/SQLite), `` ` `` (MySQL), `[]` (SQL Server)
//! - Placeholders: `$1` / `?` / `?` / `:p1` / `@p1`
//! - Pagination: LIMIT/OFFSET vs OFFSET ... FETCH NEXT ... ROWS ONLY
//! - Boolean literals: true/false vs 1/0
//! - String concatenation: `||` vs `+` vs CONCAT()
//! - Feature support: MERGE, RETURNING, ON CONFLICT, NULLS ordering, ...
//!
//! The dialect identity is established once at the facade entry point and
//! borrowed immutably during rendering.

mod mssql;
mod mysql;
mod oracle;
mod postgres;
mod sqlite;

pub mod helpers;

pub use mssql::SqlServer as SqlServerDialect;
pub use mysql::MySql as MySqlDialect;
pub use oracle::Oracle as OracleDialect;
pub use postgres::Postgres as PostgresDialect;
pub use sqlite::Sqlite as SqliteDialect;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::token::TokenStream;

/// How a dialect expresses "give me back the affected rows".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturningStyle {
    /// `RETURNING ...` appended to the statement.
    Returning,
    /// SQL Server `OUTPUT INSERTED.* / DELETED.*` before the source clause.
    Output,
    /// The dialect has no equivalent.
    Unsupported,
}

/// How a dialect expresses insert conflict policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictStyle {
    /// `ON CONFLICT [(cols)] DO NOTHING / DO UPDATE SET ...`.
    OnConflict,
    /// MySQL `INSERT IGNORE` / `ON DUPLICATE KEY UPDATE`.
    DuplicateKey,
    /// The dialect has no equivalent.
    Unsupported,
}

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// The default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifier and literal quoting
    // =========================================================================

    /// Quote an identifier (table, column, alias), escaping embedded quotes.
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote a string literal. All dialects use single quotes with `''`
    /// escaping; SQL Server overrides for Unicode (`N'...'`).
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Format a boolean literal.
    fn format_bool(&self, b: bool) -> &'static str;

    /// Format a date literal.
    fn format_date_literal(&self, date: &str) -> String {
        format!("DATE '{date}'")
    }

    /// Format a timestamp literal.
    fn format_timestamp_literal(&self, ts: &str) -> String {
        format!("TIMESTAMP '{ts}'")
    }

    /// Positional placeholder for the 1-based parameter `index`.
    fn placeholder(&self, index: usize) -> String;

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Emit LIMIT/OFFSET or the dialect's equivalent pagination clause.
    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_standard(limit, offset)
    }

    /// Whether pagination requires an ORDER BY clause (SQL Server).
    fn requires_order_by_for_offset(&self) -> bool {
        false
    }

    // =========================================================================
    // Operators
    // =========================================================================

    /// String concatenation operator.
    fn concat_operator(&self) -> &'static str {
        "||"
    }

    /// Whether the concat operator is usable. MySQL treats `||` as logical
    /// OR by default, so it gets `CONCAT()` instead.
    fn supports_concat_operator(&self) -> bool {
        true
    }

    /// Whether ILIKE is available (PostgreSQL). Others fall back to
    /// LOWER(a) LIKE LOWER(b).
    fn supports_ilike(&self) -> bool {
        false
    }

    // =========================================================================
    // Clause support
    // =========================================================================

    /// Whether to emit the RECURSIVE keyword for recursive CTEs.
    fn emit_recursive_keyword(&self) -> bool {
        true
    }

    /// Whether table aliases take the AS keyword. Oracle rejects it.
    fn emit_as_for_table_alias(&self) -> bool {
        true
    }

    /// Whether ORDER BY supports NULLS FIRST/LAST.
    fn supports_nulls_ordering(&self) -> bool {
        true
    }

    /// Whether window/value functions accept IGNORE NULLS / RESPECT NULLS.
    fn supports_nulls_ignore(&self) -> bool {
        false
    }

    /// Whether NTH_VALUE accepts FROM FIRST / FROM LAST.
    fn supports_from_first_last(&self) -> bool {
        false
    }

    /// Whether the GROUPS window frame type is available.
    fn supports_groups_frame(&self) -> bool {
        false
    }

    /// Whether aggregates accept a FILTER (WHERE ...) clause.
    fn supports_aggregate_filter(&self) -> bool {
        false
    }

    /// Whether SELECT ... FOR UPDATE/SHARE row locking is available.
    fn supports_for_update(&self) -> bool {
        false
    }

    // =========================================================================
    // DML support
    // =========================================================================

    /// Whether a native MERGE statement is available.
    fn supports_merge(&self) -> bool {
        false
    }

    /// How RETURNING is expressed, if at all.
    fn returning_style(&self) -> ReturningStyle {
        ReturningStyle::Unsupported
    }

    /// How insert conflict policies are expressed, if at all.
    fn conflict_style(&self) -> ConflictStyle {
        ConflictStyle::Unsupported
    }

    // =========================================================================
    // Function remapping
    // =========================================================================

    /// Remap a function name for this dialect (e.g. `NOW` -> `GETDATE` on
    /// SQL Server). Matched case-insensitively; `None` keeps the original.
    fn remap_function(&self, name: &str) -> Option<&'static str> {
        let _ = name;
        None
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    #[default]
    Postgres,
    MySql,
    Sqlite,
    Oracle,
    SqlServer,
}

impl Dialect {
    /// All dialects, for dispatch-totality checks.
    pub const ALL: [Dialect; 5] = [
        Dialect::Postgres,
        Dialect::MySql,
        Dialect::Sqlite,
        Dialect::Oracle,
        Dialect::SqlServer,
    ];

    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Postgres => &PostgresDialect,
            Dialect::MySql => &MySqlDialect,
            Dialect::Sqlite => &SqliteDialect,
            Dialect::Oracle => &OracleDialect,
            Dialect::SqlServer => &SqlServerDialect,
        }
    }
}

// Implement SqlDialect for the enum by delegating to the concrete types.
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        self.dialect().format_bool(b)
    }

    fn format_date_literal(&self, date: &str) -> String {
        self.dialect().format_date_literal(date)
    }

    fn format_timestamp_literal(&self, ts: &str) -> String {
        self.dialect().format_timestamp_literal(ts)
    }

    fn placeholder(&self, index: usize) -> String {
        self.dialect().placeholder(index)
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        self.dialect().emit_limit_offset(limit, offset)
    }

    fn requires_order_by_for_offset(&self) -> bool {
        self.dialect().requires_order_by_for_offset()
    }

    fn concat_operator(&self) -> &'static str {
        self.dialect().concat_operator()
    }

    fn supports_concat_operator(&self) -> bool {
        self.dialect().supports_concat_operator()
    }

    fn supports_ilike(&self) -> bool {
        self.dialect().supports_ilike()
    }

    fn emit_recursive_keyword(&self) -> bool {
        self.dialect().emit_recursive_keyword()
    }

    fn emit_as_for_table_alias(&self) -> bool {
        self.dialect().emit_as_for_table_alias()
    }

    fn supports_nulls_ordering(&self) -> bool {
        self.dialect().supports_nulls_ordering()
    }

    fn supports_nulls_ignore(&self) -> bool {
        self.dialect().supports_nulls_ignore()
    }

    fn supports_from_first_last(&self) -> bool {
        self.dialect().supports_from_first_last()
    }

    fn supports_groups_frame(&self) -> bool {
        self.dialect().supports_groups_frame()
    }

    fn supports_aggregate_filter(&self) -> bool {
        self.dialect().supports_aggregate_filter()
    }

    fn supports_for_update(&self) -> bool {
        self.dialect().supports_for_update()
    }

    fn supports_merge(&self) -> bool {
        self.dialect().supports_merge()
    }

    fn returning_style(&self) -> ReturningStyle {
        self.dialect().returning_style()
    }

    fn conflict_style(&self) -> ConflictStyle {
        self.dialect().conflict_style()
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        self.dialect().remap_function(name)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}

// =============================================================================
// Dialect dispatch
// =============================================================================

/// A branch selector for [`run_for_dialect`].
#[derive(Debug, Clone, Copy)]
pub enum DialectCase {
    /// Matches one dialect.
    Only(Dialect),
    /// Matches any dialect in the slice.
    AnyOf(&'static [Dialect]),
    /// Matches when no other branch did.
    Default,
}

/// Pick the branch value for the active dialect.
///
/// Specific branches win over `Default` regardless of declaration order.
/// No matching branch and no `Default` means the feature cannot be
/// expressed: [`Error::UnsupportedDialect`].
pub fn run_for_dialect<T>(
    feature: &'static str,
    dialect: Dialect,
    cases: impl IntoIterator<Item = (DialectCase, T)>,
) -> Result<T> {
    let mut fallback = None;
    for (case, value) in cases {
        match case {
            DialectCase::Only(d) if d == dialect => return Ok(value),
            DialectCase::AnyOf(ds) if ds.contains(&dialect) => return Ok(value),
            DialectCase::Default => fallback = Some(value),
            _ => {}
        }
    }
    fallback.ok_or(Error::unsupported(feature, dialect))
}
