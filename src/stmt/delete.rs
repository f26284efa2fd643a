//! DELETE builder.

use crate::clause::{with_clause, Cte, Returning};
use crate::cond::Cond;
use crate::db::{Context, Db};
use crate::dialect::{Dialect, ReturningStyle, SqlDialect};
use crate::driver::ExecResult;
use crate::error::{Error, Result};
use crate::expr::RenderCtx;
use crate::schema::{Table, TableDescriptor};
use crate::stmt::Select;
use crate::token::{Statement, Token, TokenStream};

/// A DELETE statement under fluent construction.
///
/// Rendering refuses a DELETE whose WHERE clause is empty unless
/// [`Delete::force_all`] was called.
#[derive(Debug, Clone, Default)]
#[must_use = "Delete has no effect until rendered with to_sql() or executed"]
pub struct Delete {
    ctes: Vec<Cte>,
    model: Option<TableDescriptor>,
    table: Option<String>,
    using: Vec<(String, Option<String>)>,
    where_cond: Cond,
    returning: Returning,
    force_all: bool,
}

/// Dialects that accept an alias on the DELETE target.
fn alias_style(dialect: Dialect) -> Option<bool> {
    match dialect {
        Dialect::Postgres => Some(true),
        Dialect::Oracle => Some(false),
        _ => None,
    }
}

impl Delete {
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

    pub fn table(mut self, name: &str) -> Self {
        self.table = Some(name.into());
        self
    }

    /// Auxiliary USING table (PostgreSQL style).
    pub fn using(mut self, name: &str) -> Self {
        self.using.push((name.into(), None));
        self
    }

    pub fn using_as(mut self, name: &str, alias: &str) -> Self {
        self.using.push((name.into(), Some(alias.into())));
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

    /// Allow deleting every row of the table.
    pub fn force_all(mut self) -> Self {
        self.force_all = true;
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
            .ok_or(Error::ModelNotBound("DELETE"))?;

        let alias = self.model.as_ref().map(|m| m.alias.clone());
        let style = alias_style(dialect);
        let mut ctx = base.without_qualifier();
        if style.is_some() {
            if let Some(a) = alias.as_deref() {
                ctx = ctx.with_qualifier(a);
            }
        }

        let where_tokens = self.where_cond.to_tokens(ctx)?;
        if where_tokens.is_empty() && !self.force_all {
            return Err(Error::UnconditionalDelete);
        }

        let mut ts = TokenStream::new();
        ts.append(&with_clause(&self.ctes, ctx)?);

        ts.push(Token::Delete).space().push(Token::From).space();
        ts.push(Token::Ident(table_name));
        if let (Some(with_as), Some(a)) = (style, alias.as_deref()) {
            if with_as {
                ts.space().push(Token::As);
            }
            ts.space().push(Token::Ident(a.into()));
        }

        // SQL Server: OUTPUT after the target, before USING/WHERE
        if !self.returning.is_none() && dialect.returning_style() == ReturningStyle::Output {
            ts.space().append(&self.returning.to_output_tokens(true));
        }

        if !self.using.is_empty() {
            ts.space().push(Token::Using).space();
            for (i, (name, alias)) in self.using.iter().enumerate() {
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

    /// Render and execute. Fails with [`Error::UnconditionalDelete`]
    /// before the driver is touched when the WHERE clause is empty and
    /// `force_all` is unset.
    pub fn exec(self, ctx: &Context, db: &Db) -> Result<ExecResult> {
        let mut render_ctx = RenderCtx::new(db.dialect());
        render_ctx.emulate_nulls_ordering = db.options().emulate_nulls_ordering;
        let stmt = self.to_tokens_with(render_ctx)?.serialize(db.dialect());
        db.run_exec(ctx, &stmt)
    }
}
