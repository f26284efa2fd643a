//! Database facade: dialect + driver + audit pipeline + options.
//!
//! `Db` is the entry point users hold: it mints statement builders and
//! runs their terminal operations. The dialect identity is fixed here,
//! once, and borrowed by everything the facade produces.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use tracing::debug;

use crate::audit::AuditPipeline;
use crate::dialect::Dialect;
use crate::driver::{Driver, ExecResult, Rows};
use crate::error::{Error, Result};
use crate::stmt::{Delete, Insert, Merge, Raw, Select, Update};
use crate::token::Statement;
use crate::value::Value;

// =============================================================================
// Context
// =============================================================================

/// Request-scoped context: operator identity, deadline, cancellation.
///
/// The core does not poll cancellation during rendering (rendering is
/// bounded by input size); terminal calls check it once before touching
/// the driver and pass the context through.
#[derive(Debug, Clone, Default)]
pub struct Context {
    operator: Option<String>,
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl Context {
    /// An empty context: no operator, no deadline, never cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    /// Attach the authenticated principal performing the mutation.
    pub fn with_operator(mut self, operator: &str) -> Self {
        self.operator = Some(operator.into());
        self
    }

    /// Attach an absolute deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// The operator id, if any.
    pub fn operator(&self) -> Option<&str> {
        self.operator.as_deref()
    }

    /// A handle that cancels this context from another thread.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(Arc::clone(&self.cancelled))
    }

    /// The context's error, if it was cancelled or its deadline passed.
    pub fn err(&self) -> Option<Error> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Some(Error::Cancelled("context cancelled".into()));
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Some(Error::Cancelled("deadline exceeded".into()));
            }
        }
        None
    }
}

/// Cancels the [`Context`] it was taken from.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

// =============================================================================
// Options
// =============================================================================

/// Rendering options fixed at facade construction.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct CoreOptions {
    /// Emit a CASE sort key in place of NULLS FIRST/LAST on dialects that
    /// reject the clause (MySQL, SQL Server). Off by default: the clause
    /// is dropped silently there.
    pub emulate_nulls_ordering: bool,
}

// =============================================================================
// Facade
// =============================================================================

/// The database facade.
#[derive(Clone)]
pub struct Db {
    dialect: Dialect,
    driver: Arc<dyn Driver>,
    audit: AuditPipeline,
    options: CoreOptions,
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("dialect", &self.dialect)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Db {
    pub fn new(dialect: Dialect, driver: Arc<dyn Driver>) -> Self {
        Self {
            dialect,
            driver,
            audit: AuditPipeline::standard(),
            options: CoreOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CoreOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_audit(mut self, audit: AuditPipeline) -> Self {
        self.audit = audit;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn options(&self) -> CoreOptions {
        self.options
    }

    pub(crate) fn audit_pipeline(&self) -> &AuditPipeline {
        &self.audit
    }

    // Statement entry points

    pub fn new_select(&self) -> Select {
        Select::new()
    }

    pub fn new_insert(&self) -> Insert {
        Insert::new()
    }

    pub fn new_update(&self) -> Update {
        Update::new()
    }

    pub fn new_delete(&self) -> Delete {
        Delete::new()
    }

    pub fn new_merge(&self) -> Merge {
        Merge::new()
    }

    pub fn new_raw(&self, sql: &str, params: Vec<Value>) -> Raw {
        Raw::new(sql, params)
    }

    // Terminal plumbing

    /// Run a rendered statement through the driver. A cancelled context
    /// returns its error without touching the driver.
    pub(crate) fn run_exec(&self, ctx: &Context, stmt: &Statement) -> Result<ExecResult> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }
        debug!(dialect = %self.dialect, params = stmt.params.len(), sql = %stmt.sql, "exec");
        self.driver.exec(ctx, &stmt.sql, &stmt.params)
    }

    /// Run a rendered query through the driver.
    pub(crate) fn run_query(&self, ctx: &Context, stmt: &Statement) -> Result<Box<dyn Rows>> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }
        debug!(dialect = %self.dialect, params = stmt.params.len(), sql = %stmt.sql, "query");
        self.driver.query(ctx, &stmt.sql, &stmt.params)
    }
}
