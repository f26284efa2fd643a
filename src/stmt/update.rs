//! UPDATE builder.

use crate::audit::AuditPipeline;
use crate::clause::{with_clause, Cte, Returning};
use crate::cond::Cond;
use crate::db::{Context, Db};
use crate::dialect::{Dialect, ReturningStyle, SqlDialect};
use crate::driver::ExecResult;
use crate::error::{Error, Result};
use crate::expr::{Expr, RenderCtx};
use crate::schema::{Table, TableDescriptor};
use crate::stmt::Select;
use crate::token::{Statement, Token, TokenStream};

/// An UPDATE statement under fluent construction.
#[derive(Debug, Clone, Default)]
#[must_use = "Update has no effect until rendered with to_sql() or executed"]
pub struct Update {
    ctes: Vec<Cte>,
    model: Option<TableDescriptor>,
    table: Option<String>,
    sets: Vec<(String, Expr)>,
    from: Vec<(String, Option<String>)>,
    where_cond: Cond,
    returning: Returning,
}

/// Whether the dialect's UPDATE target accepts an alias, and how.
fn alias_style(dialect: Dialect) -> Option<bool> {
    // Some(true): AS keyword, Some(false): bare alias, None: no alias
    match dialect {
        Dialect::Postgres | Dialect::MySql => Some(true),
        Dialect::Oracle => Some(false),
        Dialect::Sqlite | Dialect::SqlServer => None,
    }
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, query: Select) -> Self {
        self.ctes.push(Cte::new(name, query));
        self
    }

    pub fn model<T: Table>(mut self) -> Self {
        self.model = Some(T::descriptor());
        self
    }

    pub fn model_table(mut self, table: TableDescriptor) -> Self {
        self.model = Some(table);
        self
    }

    /// Override the bound model's alias.
    pub fn alias(mut self, alias: &str) -> Self {
        if let Some(model) = &mut self.model {
            model.alias = alias.into();
        }
        self
    }

    /// Override the target table name.
    pub fn table(mut self, name: &str) -> Self {
        self.table = Some(name.into());
        self
    }

    /// Assign a column. Later assignments to the same column override
    /// earlier ones.
    pub fn set(mut self, column: &str, value: impl Into<Expr>) -> Self {
        self.sets.push((column.into(), value.into()));
        self
    }

    /// Whether any SET assignment was made.
    pub fn has_set(&self) -> bool {
        !self.sets.is_empty()
    }

    /// Auxiliary FROM table (PostgreSQL style).
    pub fn from(mut self, name: &str) -> Self {
        self.from.push((name.into(), None));
        self
    }

    pub fn from_as(mut self, name: &str, alias: &str) -> Self {
        self.from.push((name.into(), Some(alias.into())));
        self
    }

    /// Add WHERE predicates. Repeated calls accumulate with AND.
    pub fn filter(mut self, f: impl FnOnce(&mut Cond)) -> Self {
        if self.where_cond.is_empty() {
            self.where_cond = Cond::with_table(self.model.clone());
        }
        f(&mut self.where_cond);
        self
    }

    pub fn returning<'a>(mut self, columns: impl IntoIterator<Item = &'a str>) -> Self {
        self.returning = Returning::Columns(columns.into_iter().map(String::from).collect());
        self
    }

    pub fn returning_all(mut self) -> Self {
        self.returning = Returning::All;
        self
    }

    /// Run the audit pipeline: add SET assignments for audited columns
    /// the user did not assign. Only applies when the statement already
    /// carries user assignments.
    pub fn audit(mut self, pipeline: &AuditPipeline, ctx: &Context) -> Self {
        if !self.has_set() {
            return self;
        }
        let Some(model) = &self.model else {
            return self;
        };
        let provided: Vec<String> = self.sets.iter().map(|(c, _)| c.clone()).collect();
        for (column, expr) in pipeline.update_assignments(model, ctx, &provided) {
            self.sets.push((column, expr));
        }
        self
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    pub fn to_tokens(&self, dialect: Dialect) -> Result<TokenStream> {
        self.to_tokens_with(RenderCtx::new(dialect))
    }

    pub(crate) fn to_tokens_with(&self, base: RenderCtx) -> Result<TokenStream> {
        let dialect = base.dialect;

        let table_name = self
            .table
            .clone()
            .or_else(|| self.model.as_ref().map(|m| m.name.clone()))
            .ok_or(Error::ModelNotBound("UPDATE"))?;

        if self.sets.is_empty() {
            return Err(Error::EmptyValueSource("UPDATE"));
        }

        // Later assignments to the same column win, first position kept
        let mut sets: Vec<(String, Expr)> = Vec::with_capacity(self.sets.len());
        for (column, expr) in &self.sets {
            match sets.iter_mut().find(|(c, _)| c == column) {
                Some((_, slot)) => *slot = expr.clone(),
                None => sets.push((column.clone(), expr.clone())),
            }
        }

        let alias = self.model.as_ref().map(|m| m.alias.clone());
        let style = alias_style(dialect);
        let mut ctx = base.without_qualifier();
        if style.is_some() {
            if let Some(a) = alias.as_deref() {
                ctx = ctx.with_qualifier(a);
            }
        }

        let mut ts = TokenStream::new();
        ts.append(&with_clause(&self.ctes, ctx)?);

        ts.push(Token::Update).space();
        ts.push(Token::Ident(table_name));
        if let (Some(with_as), Some(a)) = (style, alias.as_deref()) {
            if with_as {
                ts.space().push(Token::As);
            }
            ts.space().push(Token::Ident(a.into()));
        }

        ts.space().push(Token::Set).space();
        for (i, (column, expr)) in sets.iter().enumerate() {
            if i > 0 {
                ts.comma().space();
            }
            ts.push(Token::Ident(column.clone()))
                .space()
                .push(Token::Eq)
                .space()
                .append(&expr.to_tokens(ctx)?);
        }

        // SQL Server: OUTPUT after SET, before FROM/WHERE
        if !self.returning.is_none() && dialect.returning_style() == ReturningStyle::Output {
            ts.space().append(&self.returning.to_output_tokens(false));
        }

        if !self.from.is_empty() {
            ts.space().push(Token::From).space();
            for (i, (name, alias)) in self.from.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.push(Token::Ident(name.clone()));
                if let Some(a) = alias {
                    if dialect.emit_as_for_table_alias() {
                        ts.space().push(Token::As);
                    }
                    ts.space().push(Token::Ident(a.clone()));
                }
            }
        }

        let where_tokens = self.where_cond.to_tokens(ctx)?;
        if !where_tokens.is_empty() {
            ts.space().push(Token::Where).space().append(&where_tokens);
        }

        if !self.returning.is_none() {
            match dialect.returning_style() {
                ReturningStyle::Returning => {
                    ts.space().append(&self.returning.to_tokens(ctx));
                }
                ReturningStyle::Output => {}
                ReturningStyle::Unsupported => {
                    return Err(Error::unsupported("RETURNING", dialect));
                }
            }
        }

        Ok(ts)
    }

    pub fn to_sql(&self, dialect: Dialect) -> Result<Statement> {
        Ok(self.to_tokens(dialect)?.serialize(dialect))
    }

    /// Apply the facade's audit pipeline, render, and execute.
    pub fn exec(self, ctx: &Context, db: &Db) -> Result<ExecResult> {
        let audited = self.audit(db.audit_pipeline(), ctx);
        let mut render_ctx = RenderCtx::new(db.dialect());
        render_ctx.emulate_nulls_ordering = db.options().emulate_nulls_ordering;
        let stmt = audited.to_tokens_with(render_ctx)?.serialize(db.dialect());
        db.run_exec(ctx, &stmt)
    }
}
