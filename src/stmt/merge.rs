//! MERGE builder.
//!
//! A single `MERGE INTO target USING source ON cond WHEN ... WHEN ...`
//! statement with the branches in declaration order. Only dialects with a
//! native MERGE accept it; everything else fails at render time.

use crate::clause::{with_clause, Cte};
use crate::cond::Cond;
use crate::db::{Context, Db};
use crate::dialect::{Dialect, SqlDialect};
use crate::driver::ExecResult;
use crate::error::{Error, Result};
use crate::expr::{Expr, RenderCtx};
use crate::schema::{Row, Table, TableDescriptor};
use crate::stmt::Select;
use crate::token::{Statement, Token, TokenStream};

/// The source of a MERGE.
#[derive(Debug, Clone)]
pub enum MergeSource {
    Table(String),
    Subquery(Box<Select>),
    Expr(Expr),
}

/// Which rows a WHEN branch addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhenKind {
    Matched,
    /// Source rows without a target match (`WHEN NOT MATCHED`).
    NotMatchedByTarget,
    /// Target rows without a source match
    /// (`WHEN NOT MATCHED BY SOURCE`).
    NotMatchedBySource,
}

/// The action a WHEN branch takes.
#[derive(Debug, Clone)]
pub enum MergeAction {
    DoNothing,
    Update(Vec<(String, Expr)>),
    Insert {
        columns: Vec<String>,
        values: Vec<Expr>,
    },
    Delete,
}

/// One `WHEN ... THEN ...` branch.
#[derive(Debug, Clone)]
pub struct WhenBranch {
    pub kind: WhenKind,
    pub condition: Option<Cond>,
    pub action: MergeAction,
}

/// A MERGE statement under fluent construction.
#[derive(Debug, Clone, Default)]
#[must_use = "Merge has no effect until rendered with to_sql() or executed"]
pub struct Merge {
    ctes: Vec<Cte>,
    model: Option<TableDescriptor>,
    source: Option<(MergeSource, String)>,
    on: Cond,
    branches: Vec<WhenBranch>,
}

impl Merge {
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

    pub fn model<T: Table>(mut self) -> Self {
        self.model = Some(T::descriptor());
        self
    }

    pub fn model_table(mut self, table: TableDescriptor) -> Self {
        self.model = Some(table);
        self
    }

    /// Merge from a table (or CTE) with itself as the alias.
    pub fn using_table(mut self, name: &str) -> Self {
        self.source = Some((MergeSource::Table(name.into()), name.into()));
        self
    }

    pub fn using_table_as(mut self, name: &str, alias: &str) -> Self {
        self.source = Some((MergeSource::Table(name.into()), alias.into()));
        self
    }

    pub fn using_query(mut self, query: Select, alias: &str) -> Self {
        self.source = Some((MergeSource::Subquery(Box::new(query)), alias.into()));
        self
    }

    pub fn using_expr(mut self, expr: Expr, alias: &str) -> Self {
        self.source = Some((MergeSource::Expr(expr), alias.into()));
        self
    }

    /// The join condition between target and source.
    pub fn on(mut self, f: impl FnOnce(&mut Cond)) -> Self {
        if self.on.is_empty() {
            self.on = Cond::with_table(self.model.clone());
        }
        f(&mut self.on);
        self
    }

    fn branch(
        mut self,
        kind: WhenKind,
        condition: Option<impl FnOnce(&mut Cond)>,
        action: MergeAction,
    ) -> Self {
        let condition = condition.map(|f| {
            let mut cond = Cond::with_table(self.model.clone());
            f(&mut cond);
            cond
        });
        self.branches.push(WhenBranch {
            kind,
            condition,
            action,
        });
        self
    }

    fn assignments<'a>(
        set: impl IntoIterator<Item = (&'a str, Expr)>,
    ) -> Vec<(String, Expr)> {
        set.into_iter().map(|(c, e)| (c.into(), e)).collect()
    }

    // WHEN MATCHED

    pub fn when_matched_update<'a>(
        self,
        set: impl IntoIterator<Item = (&'a str, Expr)>,
    ) -> Self {
        self.branch(
            WhenKind::Matched,
            None::<fn(&mut Cond)>,
            MergeAction::Update(Self::assignments(set)),
        )
    }

    pub fn when_matched_and_update<'a>(
        self,
        condition: impl FnOnce(&mut Cond),
        set: impl IntoIterator<Item = (&'a str, Expr)>,
    ) -> Self {
        self.branch(
            WhenKind::Matched,
            Some(condition),
            MergeAction::Update(Self::assignments(set)),
        )
    }

    pub fn when_matched_delete(self) -> Self {
        self.branch(WhenKind::Matched, None::<fn(&mut Cond)>, MergeAction::Delete)
    }

    pub fn when_matched_and_delete(self, condition: impl FnOnce(&mut Cond)) -> Self {
        self.branch(WhenKind::Matched, Some(condition), MergeAction::Delete)
    }

    pub fn when_matched_do_nothing(self) -> Self {
        self.branch(
            WhenKind::Matched,
            None::<fn(&mut Cond)>,
            MergeAction::DoNothing,
        )
    }

    // WHEN NOT MATCHED [BY TARGET]

    pub fn when_not_matched_insert<'a>(
        self,
        columns: impl IntoIterator<Item = &'a str>,
        values: impl IntoIterator<Item = Expr>,
    ) -> Self {
        self.branch(
            WhenKind::NotMatchedByTarget,
            None::<fn(&mut Cond)>,
            MergeAction::Insert {
                columns: columns.into_iter().map(String::from).collect(),
                values: values.into_iter().collect(),
            },
        )
    }

    pub fn when_not_matched_and_insert<'a>(
        self,
        condition: impl FnOnce(&mut Cond),
        columns: impl IntoIterator<Item = &'a str>,
        values: impl IntoIterator<Item = Expr>,
    ) -> Self {
        self.branch(
            WhenKind::NotMatchedByTarget,
            Some(condition),
            MergeAction::Insert {
                columns: columns.into_iter().map(String::from).collect(),
                values: values.into_iter().collect(),
            },
        )
    }

    pub fn when_not_matched_do_nothing(self) -> Self {
        self.branch(
            WhenKind::NotMatchedByTarget,
            None::<fn(&mut Cond)>,
            MergeAction::DoNothing,
        )
    }

    // WHEN NOT MATCHED BY SOURCE

    pub fn when_not_matched_by_source_update<'a>(
        self,
        set: impl IntoIterator<Item = (&'a str, Expr)>,
    ) -> Self {
        self.branch(
            WhenKind::NotMatchedBySource,
            None::<fn(&mut Cond)>,
            MergeAction::Update(Self::assignments(set)),
        )
    }

    pub fn when_not_matched_by_source_and_update<'a>(
        self,
        condition: impl FnOnce(&mut Cond),
        set: impl IntoIterator<Item = (&'a str, Expr)>,
    ) -> Self {
        self.branch(
            WhenKind::NotMatchedBySource,
            Some(condition),
            MergeAction::Update(Self::assignments(set)),
        )
    }

    pub fn when_not_matched_by_source_delete(self) -> Self {
        self.branch(
            WhenKind::NotMatchedBySource,
            None::<fn(&mut Cond)>,
            MergeAction::Delete,
        )
    }

    /// Append a pre-built branch.
    pub fn when(mut self, branch: WhenBranch) -> Self {
        self.branches.push(branch);
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

        if !dialect.supports_merge() {
            return Err(Error::unsupported("MERGE", dialect));
        }
        let model = self.model.as_ref().ok_or(Error::ModelNotBound("MERGE"))?;
        let (source, source_alias) = self
            .source
            .as_ref()
            .ok_or(Error::EmptyValueSource("MERGE USING"))?;
        if self.branches.is_empty() {
            return Err(Error::EmptyValueSource("MERGE"));
        }

        let ctx = base.without_qualifier().with_qualifier(&model.alias);
        let alias_kw = dialect.emit_as_for_table_alias();
        let push_alias = |ts: &mut TokenStream, alias: &str| {
            if alias_kw {
                ts.space().push(Token::As);
            }
            ts.space().push(Token::Ident(alias.into()));
        };

        let mut ts = TokenStream::new();
        ts.append(&with_clause(&self.ctes, ctx)?);

        ts.push(Token::Merge).space().push(Token::Into).space();
        ts.push(Token::Ident(model.name.clone()));
        push_alias(&mut ts, &model.alias);

        ts.space().push(Token::Using).space();
        match source {
            MergeSource::Table(name) => {
                ts.push(Token::Ident(name.clone()));
                if name != source_alias {
                    push_alias(&mut ts, source_alias);
                }
            }
            MergeSource::Subquery(query) => {
                ts.lparen().append(&query.to_tokens_with(ctx)?).rparen();
                push_alias(&mut ts, source_alias);
            }
            MergeSource::Expr(expr) => {
                ts.append(&expr.to_tokens(ctx)?);
                push_alias(&mut ts, source_alias);
            }
        }

        ts.space().push(Token::On).space();
        let on_tokens = self.on.to_tokens(ctx)?;
        if on_tokens.is_empty() {
            return Err(Error::EmptyValueSource("MERGE ON"));
        }
        ts.append(&on_tokens);

        for branch in &self.branches {
            ts.space().append(&branch.to_tokens(ctx)?);
        }

        // T-SQL requires MERGE to end with a semicolon
        if dialect == Dialect::SqlServer {
            ts.push(Token::Raw(";".into()));
        }

        Ok(ts)
    }

    pub fn to_sql(&self, dialect: Dialect) -> Result<Statement> {
        Ok(self.to_tokens(dialect)?.serialize(dialect))
    }

    /// Render and execute.
    pub fn exec(self, ctx: &Context, db: &Db) -> Result<ExecResult> {
        let mut render_ctx = RenderCtx::new(db.dialect());
        render_ctx.emulate_nulls_ordering = db.options().emulate_nulls_ordering;
        let stmt = self.to_tokens_with(render_ctx)?.serialize(db.dialect());
        db.run_exec(ctx, &stmt)
    }
}

impl WhenBranch {
    fn to_tokens(&self, ctx: RenderCtx) -> Result<TokenStream> {
        let dialect = ctx.dialect;
        let mut ts = TokenStream::new();

        ts.push(Token::When).space();
        match self.kind {
            WhenKind::Matched => {
                ts.push(Token::Matched);
            }
            WhenKind::NotMatchedByTarget => {
                ts.push(Token::Not).space().push(Token::Matched);
            }
            WhenKind::NotMatchedBySource => {
                if dialect == Dialect::Oracle {
                    return Err(Error::unsupported("WHEN NOT MATCHED BY SOURCE", dialect));
                }
                ts.push(Token::Not)
                    .space()
                    .push(Token::Matched)
                    .space()
                    .push(Token::BySource);
            }
        }

        if let Some(cond) = &self.condition {
            let cond_tokens = cond.to_tokens(ctx)?;
            if !cond_tokens.is_empty() {
                ts.space().push(Token::And).space().append(&cond_tokens);
            }
        }

        ts.space().push(Token::Then).space();

        match &self.action {
            MergeAction::DoNothing => {
                if dialect != Dialect::Postgres {
                    return Err(Error::unsupported("MERGE DO NOTHING action", dialect));
                }
                ts.push(Token::Do).space().push(Token::Nothing);
            }
            MergeAction::Update(assignments) => {
                if assignments.is_empty() {
                    return Err(Error::EmptyValueSource("MERGE UPDATE"));
                }
                ts.push(Token::Update).space().push(Token::Set).space();
                for (i, (column, expr)) in assignments.iter().enumerate() {
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
            MergeAction::Insert { columns, values } => {
                if values.is_empty() {
                    return Err(Error::EmptyValueSource("MERGE INSERT"));
                }
                ts.push(Token::Insert).space().lparen();
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    ts.push(Token::Ident(column.clone()));
                }
                ts.rparen().space().push(Token::Values).space().lparen();
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    ts.append(&value.to_tokens(ctx)?);
                }
                ts.rparen();
            }
            MergeAction::Delete => {
                ts.push(Token::Delete);
            }
        }

        Ok(ts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{col, val};
    use crate::schema::ColumnDescriptor;

    struct User;

    impl Table for User {
        fn descriptor() -> TableDescriptor {
            TableDescriptor::new("users")
                .alias("u")
                .column(ColumnDescriptor::new("id").primary_key())
                .column(ColumnDescriptor::new("name"))
                .column(ColumnDescriptor::new("email"))
                .column(ColumnDescriptor::new("is_active"))
        }
    }

    fn upsert() -> Merge {
        Merge::new()
            .model::<User>()
            .using_table("src")
            .on(|c| {
                c.eq_col("u.id", "src.id");
            })
            .when_matched_update([
                ("name", col("src.name")),
                ("email", col("src.email")),
            ])
            .when_not_matched_insert(
                ["id", "name", "email"],
                vec![col("src.id"), col("src.name"), col("src.email")],
            )
    }

    #[test]
    fn test_merge_basic() {
        let stmt = upsert().to_sql(Dialect::Postgres).unwrap();
        assert_eq!(
            stmt.sql,
            "MERGE INTO \"users\" AS \"u\" USING \"src\" \
             ON \"u\".\"id\" = \"src\".\"id\" \
             WHEN MATCHED THEN UPDATE SET \"name\" = \"src\".\"name\", \"email\" = \"src\".\"email\" \
             WHEN NOT MATCHED THEN INSERT (\"id\", \"name\", \"email\") \
             VALUES (\"src\".\"id\", \"src\".\"name\", \"src\".\"email\")"
        );
    }

    #[test]
    fn test_merge_unsupported_dialects() {
        for d in [Dialect::MySql, Dialect::Sqlite] {
            let err = upsert().to_sql(d).unwrap_err();
            assert!(matches!(
                err,
                Error::UnsupportedDialect {
                    feature: "MERGE",
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_merge_requires_branches() {
        let err = Merge::new()
            .model::<User>()
            .using_table("src")
            .on(|c| {
                c.eq_col("u.id", "src.id");
            })
            .to_sql(Dialect::Postgres)
            .unwrap_err();
        assert!(matches!(err, Error::EmptyValueSource("MERGE")));
    }

    #[test]
    fn test_merge_branch_order_preserved() {
        let stmt = Merge::new()
            .model::<User>()
            .with_values("src", vec![Row::new().set("id", 1).set("name", "a")])
            .using_table("src")
            .on(|c| {
                c.eq_col("u.id", "src.id");
            })
            .when_matched_update([("name", col("src.name"))])
            .when_not_matched_insert(["id", "name"], vec![col("src.id"), col("src.name")])
            .when_not_matched_by_source_update([("is_active", val(false))])
            .to_sql(Dialect::Postgres)
            .unwrap();

        let matched = stmt.sql.find("WHEN MATCHED").unwrap();
        let not_matched = stmt.sql.find("WHEN NOT MATCHED THEN").unwrap();
        let by_source = stmt.sql.find("WHEN NOT MATCHED BY SOURCE").unwrap();
        assert!(matched < not_matched && not_matched < by_source);
        assert!(stmt.sql.starts_with("WITH \"src\""));
    }

    #[test]
    fn test_merge_guarded_branch() {
        let stmt = Merge::new()
            .model::<User>()
            .using_table("src")
            .on(|c| {
                c.eq_col("u.id", "src.id");
            })
            .when_matched_and_delete(|c| {
                c.eq("src.deleted", true);
            })
            .to_sql(Dialect::Postgres)
            .unwrap();
        assert!(stmt
            .sql
            .contains("WHEN MATCHED AND \"src\".\"deleted\" = $1 THEN DELETE"));
    }

    #[test]
    fn test_merge_sqlserver_semicolon() {
        let stmt = upsert().to_sql(Dialect::SqlServer).unwrap();
        assert!(stmt.sql.ends_with(";"));
    }

    #[test]
    fn test_merge_by_source_unsupported_on_oracle() {
        let err = Merge::new()
            .model::<User>()
            .using_table("src")
            .on(|c| {
                c.eq_col("u.id", "src.id");
            })
            .when_not_matched_by_source_delete()
            .to_sql(Dialect::Oracle)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedDialect { .. }));
    }

    #[test]
    fn test_merge_using_query() {
        let staging = Select::new().table("staging").select(["id", "name"]);
        let stmt = Merge::new()
            .model::<User>()
            .using_query(staging, "src")
            .on(|c| {
                c.eq_col("u.id", "src.id");
            })
            .when_matched_update([("name", col("src.name"))])
            .to_sql(Dialect::Postgres)
            .unwrap();
        assert!(stmt
            .sql
            .contains("USING (SELECT \"id\", \"name\" FROM \"staging\") AS \"src\""));
    }
}
