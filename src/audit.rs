//! Audit handler pipeline.
//!
//! Columns carrying an [`AuditRole`] receive auto-managed values at
//! INSERT/UPDATE time: creation/update timestamps and the operator id
//! taken from the request context. The pipeline runs once per statement,
//! after fluent assembly and before rendering, and never overwrites a
//! value the user supplied explicitly.

use crate::db::Context;
use crate::expr::{val, Expr};
use crate::funcs::current_timestamp;
use crate::schema::{AuditRole, TableDescriptor};

/// Produces the value for an audited column, or `None` to skip
/// (e.g. no operator in the context).
pub type AuditFn = fn(&Context) -> Option<Expr>;

/// A handler for one audit role.
#[derive(Debug, Clone, Copy)]
pub struct AuditHandler {
    pub role: AuditRole,
    pub on_insert: Option<AuditFn>,
    pub on_update: Option<AuditFn>,
}

fn timestamp_value(_ctx: &Context) -> Option<Expr> {
    Some(current_timestamp())
}

fn operator_value(ctx: &Context) -> Option<Expr> {
    ctx.operator().map(|op| val(op.to_string()))
}

/// The ordered set of registered audit handlers.
#[derive(Debug, Clone)]
pub struct AuditPipeline {
    handlers: Vec<AuditHandler>,
}

impl Default for AuditPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl AuditPipeline {
    /// The standard role table:
    ///
    /// | role       | on insert          | on update          |
    /// |------------|--------------------|--------------------|
    /// | created_at | current timestamp  | -                  |
    /// | created_by | operator           | -                  |
    /// | updated_at | current timestamp  | current timestamp  |
    /// | updated_by | operator           | operator           |
    /// | deleted_*  | explicit only      | explicit only      |
    pub fn standard() -> Self {
        Self {
            handlers: vec![
                AuditHandler {
                    role: AuditRole::CreatedAt,
                    on_insert: Some(timestamp_value),
                    on_update: None,
                },
                AuditHandler {
                    role: AuditRole::CreatedBy,
                    on_insert: Some(operator_value),
                    on_update: None,
                },
                AuditHandler {
                    role: AuditRole::UpdatedAt,
                    on_insert: Some(timestamp_value),
                    on_update: Some(timestamp_value),
                },
                AuditHandler {
                    role: AuditRole::UpdatedBy,
                    on_insert: Some(operator_value),
                    on_update: Some(operator_value),
                },
            ],
        }
    }

    /// A pipeline with no handlers.
    pub fn empty() -> Self {
        Self { handlers: vec![] }
    }

    /// Register (or replace) the handler for a role.
    pub fn register(mut self, handler: AuditHandler) -> Self {
        self.handlers.retain(|h| h.role != handler.role);
        self.handlers.push(handler);
        self
    }

    /// Values to add to an INSERT for audited columns the user did not
    /// supply. Returns `(column, value)` pairs in handler order.
    pub fn insert_values(
        &self,
        table: &TableDescriptor,
        ctx: &Context,
        provided: &[String],
    ) -> Vec<(String, Expr)> {
        self.collect(table, ctx, provided, |h| h.on_insert)
    }

    /// SET assignments to add to an UPDATE for audited columns the user
    /// did not assign.
    pub fn update_assignments(
        &self,
        table: &TableDescriptor,
        ctx: &Context,
        provided: &[String],
    ) -> Vec<(String, Expr)> {
        self.collect(table, ctx, provided, |h| h.on_update)
    }

    fn collect(
        &self,
        table: &TableDescriptor,
        ctx: &Context,
        provided: &[String],
        pick: impl Fn(&AuditHandler) -> Option<AuditFn>,
    ) -> Vec<(String, Expr)> {
        let mut out = Vec::new();
        for column in &table.columns {
            let Some(role) = column.audit else { continue };
            // A user-supplied value always wins over the handler
            if provided.iter().any(|p| p == &column.name) {
                continue;
            }
            let Some(handler) = self.handlers.iter().find(|h| h.role == role) else {
                continue;
            };
            if let Some(f) = pick(handler) {
                if let Some(expr) = f(ctx) {
                    out.push((column.name.clone(), expr));
                }
            }
        }
        out
    }
}
