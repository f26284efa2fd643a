//! The consumed driver interface.
//!
//! The core never talks to the wire itself: terminal calls hand a rendered
//! [`Statement`](crate::token::Statement)'s SQL and ordered arguments to a
//! [`Driver`], and scan results through [`Rows`]. Both are trait objects
//! supplied by the embedding application.

use crate::db::Context;
use crate::error::Result;
use crate::value::Value;

/// Result of a non-query statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    pub last_insert_id: Option<i64>,
}

/// A forward-only result cursor.
pub trait Rows {
    /// Advance to the next row. Returns false when exhausted.
    fn next(&mut self) -> bool;

    /// Copy the current row's columns into `dest`.
    fn scan(&mut self, dest: &mut [Value]) -> Result<()>;

    /// Release the cursor.
    fn close(&mut self) -> Result<()>;
}

/// A synchronous database driver.
pub trait Driver: Send + Sync {
    /// Execute a statement that returns no rows.
    fn exec(&self, ctx: &Context, sql: &str, params: &[Value]) -> Result<ExecResult>;

    /// Execute a query and return a row cursor.
    fn query(&self, ctx: &Context, sql: &str, params: &[Value]) -> Result<Box<dyn Rows>>;
}
