//! # sqlmint
//!
//! A fluent, type-safe SQL statement generator for multiple dialects.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │            Fluent builders (stmt, cond, expr)            │
//! │   SELECT / INSERT / UPDATE / DELETE / MERGE / RAW        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [audit pipeline]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Auto-managed columns (created/updated by/at)      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [render]
//! ┌─────────────────────────────────────────────────────────┐
//! │   TokenStream ──serialize──▶ Statement { sql, params }   │
//! │          (dialect quoting, placeholders, remaps)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [terminal]
//! ┌─────────────────────────────────────────────────────────┐
//! │              Driver (external collaborator)              │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Values always travel as bound parameters; SQL text carries the
//! dialect's positional placeholder syntax (`$1`, `?`, `:p1`, `@p1`).
//! Builders are lazy: misuse is reported when a terminal operation
//! renders the statement, never mid-chain.
//!
//! ## Example
//!
//! ```ignore
//! use sqlmint::prelude::*;
//!
//! let stmt = Select::new()
//!     .model::<User>()
//!     .filter(|c| { c.eq("age", 30).or_eq("age", 25); })
//!     .order_by("id")
//!     .to_sql(Dialect::Postgres)?;
//!
//! assert_eq!(
//!     stmt.sql,
//!     "SELECT \"u\".* FROM \"users\" AS \"u\" \
//!      WHERE \"u\".\"age\" = $1 OR \"u\".\"age\" = $2 \
//!      ORDER BY \"u\".\"id\" ASC"
//! );
//! ```

pub mod agg;
pub mod audit;
pub mod clause;
pub mod cond;
pub mod db;
pub mod dialect;
pub mod driver;
pub mod error;
pub mod expr;
pub mod funcs;
pub mod schema;
pub mod stmt;
pub mod token;
pub mod value;
pub mod window;

#[cfg(test)]
pub mod test_utils;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::agg::{
        array_agg, avg, bit_and, bit_or, bool_and, bool_or, count, count_distinct, count_star,
        json_array_agg, json_object_agg, max, min, stddev, string_agg, sum, variance, AggCall,
    };
    pub use crate::audit::{AuditHandler, AuditPipeline};
    pub use crate::clause::{
        Cte, Join, JoinKind, JoinTarget, LimitOffset, NullsOrder, OrderByExpr, Returning, SortDir,
    };
    pub use crate::cond::{Cond, PkKey};
    pub use crate::db::{CancelHandle, Context, CoreOptions, Db};
    pub use crate::dialect::{Dialect, SqlDialect};
    pub use crate::driver::{Driver, ExecResult, Rows};
    pub use crate::error::{Error, Result};
    pub use crate::expr::{
        case, case_on, coalesce, col, func, ident, if_null, lit, null_if, raw_sql, table_col,
        table_star, template, star, val, Expr, ExprExt, RenderCtx,
    };
    pub use crate::funcs::{
        age, current_date, current_time, current_timestamp, date_add, date_diff, date_subtract,
        date_trunc, extract_day, extract_hour, extract_minute, extract_month, extract_second,
        extract_year, json_array, json_array_append, json_contains, json_contains_path,
        json_extract, json_insert, json_keys, json_length, json_object, json_replace, json_set,
        json_type, json_unquote, json_valid, now, TimeUnit,
    };
    pub use crate::schema::{AuditRole, ColumnDescriptor, Row, Table, TableDescriptor};
    pub use crate::stmt::{
        Delete, Insert, Merge, MergeAction, OnConflict, Raw, Select, SelectExpr, Update,
        WhenBranch, WhenKind,
    };
    pub use crate::token::{Statement, Token, TokenStream};
    pub use crate::value::Value;
    pub use crate::window::{
        cume_dist, dense_rank, first_value, lag, lag_default, lag_offset, last_value, lead,
        lead_default, lead_offset, nth_value, ntile, percent_rank, rank, row_number, FrameBound,
        FrameKind, WindowBuilder, WindowExt,
    };
}

// Also export the most-used types at the crate root
pub use db::{Context, CoreOptions, Db};
pub use dialect::Dialect;
pub use error::{Error, Result};
pub use expr::{col, lit, table_col, val, Expr, ExprExt};
pub use schema::{AuditRole, ColumnDescriptor, Row, Table, TableDescriptor};
pub use stmt::{Delete, Insert, Merge, Raw, Select, Update};
pub use token::{Statement, Token, TokenStream};
pub use value::Value;
