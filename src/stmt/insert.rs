//! INSERT builder.

use crate::audit::AuditPipeline;
use crate::clause::{with_clause, Cte, Returning};
use crate::db::{Context, Db};
use crate::dialect::{ConflictStyle, Dialect, ReturningStyle, SqlDialect};
use crate::driver::ExecResult;
use crate::error::{Error, Result};
use crate::expr::{Expr, RenderCtx};
use crate::schema::{Row, Table, TableDescriptor};
use crate::stmt::Select;
use crate::token::{Statement, Token, TokenStream};

/// Insert conflict policy.
#[derive(Debug, Clone)]
pub enum OnConflict {
    /// Drop conflicting rows silently (ON CONFLICT DO NOTHING /
    /// INSERT IGNORE).
    DoNothing,
    /// Turn conflicts into an update of the listed assignments.
    DoUpdate {
        conflict_columns: Vec<String>,
        set: Vec<(String, Expr)>,
    },
}

/// An INSERT statement under fluent construction.
#[derive(Debug, Clone, Default)]
#[must_use = "Insert has no effect until rendered with to_sql() or executed"]
pub struct Insert {
    ctes: Vec<Cte>,
    model: Option<TableDescriptor>,
    table: Option<String>,
    columns: Vec<String>,
    rows: Vec<Vec<Expr>>,
    from_query: Option<Box<Select>>,
    on_conflict: Option<OnConflict>,
    returning: Returning,
}

impl Insert {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, query: Select) -> Self {
        self.ctes.push(Cte::new(name, query));
        self
    }

    pub fn with_values(mut self, name: &str, rows: Vec<Row>) -> Self {
        self.ctes.push(Cte::values(name, rows));
        self
    }

    /// Bind the target model.
    pub fn model<T: Table>(mut self) -> Self {
        self.model = Some(T::descriptor());
        self
    }

    pub fn model_table(mut self, table: TableDescriptor) -> Self {
        self.model = Some(table);
        self
    }

    /// Override the target table name.
    pub fn table(mut self, name: &str) -> Self {
        self.table = Some(name.into());
        self
    }

    /// Explicit column list.
    pub fn columns<'a>(mut self, columns: impl IntoIterator<Item = &'a str>) -> Self {
        self.columns = columns.into_iter().map(String::from).collect();
        self
    }

    /// Append a row of values for the explicit column list.
    pub fn values(mut self, row: impl IntoIterator<Item = impl Into<Expr>>) -> Self {
        self.rows.push(row.into_iter().map(|v| v.into()).collect());
        self
    }

    /// Append a named row. The first row fixes the column list.
    pub fn row(mut self, row: Row) -> Self {
        if self.columns.is_empty() {
            self.columns = row.columns().to_vec();
        }
        self.rows
            .push(row.values().iter().cloned().map(Expr::Bind).collect());
        self
    }

    /// Append several named rows.
    pub fn rows(mut self, rows: impl IntoIterator<Item = Row>) -> Self {
        for row in rows {
            self = self.row(row);
        }
        self
    }

    /// Insert from a SELECT. The column list is mandatory.
    pub fn from_select<'a>(
        mut self,
        columns: impl IntoIterator<Item = &'a str>,
        query: Select,
    ) -> Self {
        self.columns = columns.into_iter().map(String::from).collect();
        self.from_query = Some(Box::new(query));
        self
    }

    /// Drop conflicting rows silently.
    pub fn ignore(mut self) -> Self {
        self.on_conflict = Some(OnConflict::DoNothing);
        self
    }

    pub fn on_conflict(mut self, policy: OnConflict) -> Self {
        self.on_conflict = Some(policy);
        self
    }

    /// Turn conflicts on the given columns into updates.
    pub fn on_conflict_update<'a>(
        mut self,
        conflict_columns: impl IntoIterator<Item = &'a str>,
        set: impl IntoIterator<Item = (&'a str, Expr)>,
    ) -> Self {
        self.on_conflict = Some(OnConflict::DoUpdate {
            conflict_columns: conflict_columns.into_iter().map(String::from).collect(),
            set: set.into_iter().map(|(c, e)| (c.into(), e)).collect(),
        });
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

    /// Run the audit pipeline: inject values for audited columns the user
    /// did not supply. Applies to VALUES sources only.
    pub fn audit(mut self, pipeline: &AuditPipeline, ctx: &Context) -> Self {
        if self.from_query.is_some() {
            return self;
        }
        let Some(model) = &self.model else {
            return self;
        };
        let added = pipeline.insert_values(model, ctx, &self.columns);
        for (column, expr) in added {
            self.columns.push(column);
            for row in &mut self.rows {
                row.push(expr.clone());
            }
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
        let ctx = base.without_qualifier();
        let dialect = ctx.dialect;

        let table_name = self
            .table
            .clone()
            .or_else(|| self.model.as_ref().map(|m| m.name.clone()))
            .ok_or(Error::ModelNotBound("INSERT"))?;

        if self.rows.is_empty() && self.from_query.is_none() {
            return Err(Error::EmptyValueSource("INSERT"));
        }
        if self.from_query.is_some() && self.columns.is_empty() {
            return Err(Error::ArgumentShape(
                "INSERT from a sub-query requires an explicit column list".into(),
            ));
        }
        if !self.columns.is_empty() {
            for row in &self.rows {
                if row.len() != self.columns.len() {
                    return Err(Error::ArgumentShape(format!(
                        "INSERT has {} columns but a row with {} values",
                        self.columns.len(),
                        row.len()
                    )));
                }
            }
        }

        let style = dialect.conflict_style();
        let insert_ignore = matches!(
            (&self.on_conflict, style),
            (Some(OnConflict::DoNothing), ConflictStyle::DuplicateKey)
        );
        if self.on_conflict.is_some() && style == ConflictStyle::Unsupported {
            return Err(Error::unsupported("insert conflict policy", dialect));
        }

        let mut ts = TokenStream::new();
        ts.append(&with_clause(&self.ctes, ctx)?);

        ts.push(Token::Insert).space();
        if insert_ignore {
            ts.push(Token::Ignore).space();
        }
        ts.push(Token::Into).space();
        ts.push(Token::Ident(table_name));

        if !self.columns.is_empty() {
            ts.space().lparen();
            for (i, column) in self.columns.iter().enumerate() {
                if i > 0 {
                    ts.comma();
                }
                ts.push(Token::Ident(column.clone()));
            }
            ts.rparen();
        }

        // SQL Server returns rows via OUTPUT before the source clause
        if !self.returning.is_none() && dialect.returning_style() == ReturningStyle::Output {
            ts.space().append(&self.returning.to_output_tokens(false));
        }

        if let Some(query) = &self.from_query {
            ts.space().append(&query.to_tokens_with(ctx)?);
        } else {
            ts.space().push(Token::Values);
            for (i, row) in self.rows.iter().enumerate() {
                if i > 0 {
                    ts.comma();
                }
                ts.space().lparen();
                for (j, value) in row.iter().enumerate() {
                    if j > 0 {
                        ts.comma();
                    }
                    ts.append(&value.to_tokens(ctx)?);
                }
                ts.rparen();
            }
        }

        if let Some(policy) = &self.on_conflict {
            match style {
                ConflictStyle::OnConflict => {
                    ts.space().append(&render_on_conflict(policy, ctx)?);
                }
                ConflictStyle::DuplicateKey => {
                    if let OnConflict::DoUpdate { set, .. } = policy {
                        ts.space().push(Token::OnDuplicateKeyUpdate).space();
                        for (i, (column, expr)) in set.iter().enumerate() {
                            if i > 0 {
                                ts.comma().space();
                            }
                            ts.push(Token::Ident(column.clone()))
                                .space()
                                .push(Token::Eq)
                                .space()
                                .append(&expr.to_tokens(ctx)?);
                        }
                    }
                    // DoNothing became INSERT IGNORE above
                }
                ConflictStyle::Unsupported => unreachable!("checked above"),
            }
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

fn render_on_conflict(policy: &OnConflict, ctx: RenderCtx) -> Result<TokenStream> {
    let mut ts = TokenStream::new();
    match policy {
        OnConflict::DoNothing => {
            ts.push(Token::On)
                .space()
                .push(Token::Conflict)
                .space()
                .push(Token::Do)
                .space()
                .push(Token::Nothing);
        }
        OnConflict::DoUpdate {
            conflict_columns,
            set,
        } => {
            ts.push(Token::On).space().push(Token::Conflict);
            if !conflict_columns.is_empty() {
                ts.space().lparen();
                for (i, column) in conflict_columns.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    ts.push(Token::Ident(column.clone()));
                }
                ts.rparen();
            }
            ts.space()
                .push(Token::Do)
                .space()
                .push(Token::Update)
                .space()
                .push(Token::Set)
                .space();
            for (i, (column, expr)) in set.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.push(Token::Ident(column.clone()))
                    .space()
                    .push(Token::Eq)
                    .space()
                    .append(&expr.to_tokens(ctx)?);
            }
        }
    }
    Ok(ts)
}
