//! SELECT builder.

use crate::clause::{order_by_list, with_clause, Cte, Join, JoinKind, JoinTarget, LimitOffset, OrderByExpr};
use crate::cond::Cond;
use crate::db::{Context, Db};
use crate::dialect::{Dialect, SqlDialect};
use crate::driver::Rows;
use crate::error::{Error, Result};
use crate::expr::{col, lit, Expr, RenderCtx};
use crate::schema::{Row, Table, TableDescriptor};
use crate::token::{Statement, Token, TokenStream};
use crate::value::Value;

/// A SELECT list item: expression with optional alias.
#[derive(Debug, Clone)]
#[must_use = "builders have no effect until used"]
pub struct SelectExpr {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectExpr {
    pub fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn to_tokens(&self, ctx: RenderCtx) -> Result<TokenStream> {
        let mut ts = self.expr.to_tokens(ctx)?;
        if let Some(alias) = &self.alias {
            ts.space()
                .push(Token::As)
                .space()
                .push(Token::Ident(alias.clone()));
        }
        Ok(ts)
    }
}

impl From<Expr> for SelectExpr {
    fn from(expr: Expr) -> Self {
        SelectExpr::new(expr)
    }
}

/// What the statement selects from.
#[derive(Debug, Clone, Default)]
enum FromItem {
    #[default]
    None,
    Table {
        name: String,
        alias: Option<String>,
    },
    Subquery {
        query: Box<Select>,
        alias: String,
    },
    Expr {
        expr: Expr,
        alias: Option<String>,
    },
}

/// Row-locking mode for SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Share,
    Update,
    UpdateSkipLocked,
    UpdateNowait,
}

/// Set operation joining this SELECT to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOpKind {
    Union,
    UnionAll,
    Intersect,
    Except,
}

/// A SELECT statement under fluent construction.
#[derive(Debug, Clone, Default)]
#[must_use = "Select has no effect until rendered with to_sql() or executed"]
pub struct Select {
    ctes: Vec<Cte>,
    distinct: bool,
    projections: Vec<SelectExpr>,
    model: Option<TableDescriptor>,
    from: FromItem,
    joins: Vec<Join>,
    where_cond: Cond,
    group_by: Vec<Expr>,
    having_cond: Cond,
    order_by: Vec<OrderByExpr>,
    limit_offset: LimitOffset,
    lock: Option<LockMode>,
    set_ops: Vec<(SetOpKind, Select)>,
}

impl Select {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // CTEs
    // =========================================================================

    pub fn with(mut self, name: &str, query: Select) -> Self {
        self.ctes.push(Cte::new(name, query));
        self
    }

    pub fn with_recursive(mut self, name: &str, query: Select) -> Self {
        self.ctes.push(Cte::recursive(name, query));
        self
    }

    /// Bind an inline VALUES row set as a CTE.
    pub fn with_values(mut self, name: &str, rows: Vec<Row>) -> Self {
        self.ctes.push(Cte::values(name, rows));
        self
    }

    // =========================================================================
    // Projection
    // =========================================================================

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Project columns by name.
    pub fn select<'a>(mut self, columns: impl IntoIterator<Item = &'a str>) -> Self {
        self.projections
            .extend(columns.into_iter().map(|c| SelectExpr::new(col(c))));
        self
    }

    /// Project a single aliased column.
    pub fn select_as(mut self, column: &str, alias: &str) -> Self {
        self.projections
            .push(SelectExpr::new(col(column)).with_alias(alias));
        self
    }

    /// Project an expression, optionally aliased.
    pub fn select_expr(mut self, expr: impl Into<Expr>, alias: Option<&str>) -> Self {
        let mut item = SelectExpr::new(expr.into());
        if let Some(a) = alias {
            item = item.with_alias(a);
        }
        self.projections.push(item);
        self
    }

    // =========================================================================
    // Source
    // =========================================================================

    /// Bind a model; its table becomes the FROM source and its alias the
    /// default qualifier of bare columns.
    pub fn model<T: Table>(mut self) -> Self {
        self.model = Some(T::descriptor());
        self
    }

    /// Bind a table descriptor directly.
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

    /// Select from a plain table without model semantics.
    pub fn table(mut self, name: &str) -> Self {
        self.from = FromItem::Table {
            name: name.into(),
            alias: None,
        };
        self
    }

    pub fn table_as(mut self, name: &str, alias: &str) -> Self {
        self.from = FromItem::Table {
            name: name.into(),
            alias: Some(alias.into()),
        };
        self
    }

    /// Select from a table expression.
    pub fn table_expr(mut self, expr: Expr, alias: Option<&str>) -> Self {
        self.from = FromItem::Expr {
            expr,
            alias: alias.map(String::from),
        };
        self
    }

    /// Select from a sub-query. The alias is mandatory.
    pub fn table_sub_query(mut self, query: Select, alias: &str) -> Self {
        self.from = FromItem::Subquery {
            query: Box::new(query),
            alias: alias.into(),
        };
        self
    }

    // =========================================================================
    // Joins
    // =========================================================================

    fn push_join(mut self, kind: JoinKind, target: JoinTarget, f: impl FnOnce(&mut Cond)) -> Self {
        let mut on = Cond::with_table(self.model.clone());
        f(&mut on);
        self.joins.push(Join { kind, target, on });
        self
    }

    pub fn join(self, target: JoinTarget, on: impl FnOnce(&mut Cond)) -> Self {
        self.push_join(JoinKind::Inner, target, on)
    }

    pub fn left_join(self, target: JoinTarget, on: impl FnOnce(&mut Cond)) -> Self {
        self.push_join(JoinKind::Left, target, on)
    }

    pub fn right_join(self, target: JoinTarget, on: impl FnOnce(&mut Cond)) -> Self {
        self.push_join(JoinKind::Right, target, on)
    }

    pub fn full_join(self, target: JoinTarget, on: impl FnOnce(&mut Cond)) -> Self {
        self.push_join(JoinKind::Full, target, on)
    }

    pub fn cross_join(mut self, target: JoinTarget) -> Self {
        self.joins.push(Join {
            kind: JoinKind::Cross,
            target,
            on: Cond::new(),
        });
        self
    }

    /// Join a related model; with no explicit ON the relation default
    /// `self.{target}_id = target.{pk}` applies.
    pub fn join_model<T: Table>(self) -> Self {
        self.push_join(JoinKind::Inner, JoinTarget::Model(T::descriptor()), |_| {})
    }

    pub fn left_join_model<T: Table>(self) -> Self {
        self.push_join(JoinKind::Left, JoinTarget::Model(T::descriptor()), |_| {})
    }

    // =========================================================================
    // Predicates and grouping
    // =========================================================================

    /// Add WHERE predicates. Repeated calls accumulate with AND.
    pub fn filter(mut self, f: impl FnOnce(&mut Cond)) -> Self {
        if self.where_cond.is_empty() {
            self.where_cond = Cond::with_table(self.model.clone());
        }
        f(&mut self.where_cond);
        self
    }

    pub fn group_by<'a>(mut self, columns: impl IntoIterator<Item = &'a str>) -> Self {
        self.group_by.extend(columns.into_iter().map(col));
        self
    }

    pub fn group_by_expr(mut self, expr: impl Into<Expr>) -> Self {
        self.group_by.push(expr.into());
        self
    }

    /// Add HAVING predicates. Repeated calls accumulate with AND.
    pub fn having(mut self, f: impl FnOnce(&mut Cond)) -> Self {
        if self.having_cond.is_empty() {
            self.having_cond = Cond::with_table(self.model.clone());
        }
        f(&mut self.having_cond);
        self
    }

    // =========================================================================
    // Ordering and pagination
    // =========================================================================

    pub fn order_by(mut self, column: &str) -> Self {
        self.order_by.push(OrderByExpr::asc(col(column)));
        self
    }

    pub fn order_by_desc(mut self, column: &str) -> Self {
        self.order_by.push(OrderByExpr::desc(col(column)));
        self
    }

    pub fn order_by_expr(mut self, entry: OrderByExpr) -> Self {
        self.order_by.push(entry);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit_offset.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.limit_offset.offset = Some(offset);
        self
    }

    // =========================================================================
    // Locking
    // =========================================================================

    pub fn for_update(mut self) -> Self {
        self.lock = Some(LockMode::Update);
        self
    }

    pub fn for_update_skip_locked(mut self) -> Self {
        self.lock = Some(LockMode::UpdateSkipLocked);
        self
    }

    pub fn for_update_nowait(mut self) -> Self {
        self.lock = Some(LockMode::UpdateNowait);
        self
    }

    pub fn for_share(mut self) -> Self {
        self.lock = Some(LockMode::Share);
        self
    }

    // =========================================================================
    // Set operations
    // =========================================================================

    pub fn union(mut self, other: Select) -> Self {
        self.set_ops.push((SetOpKind::Union, other));
        self
    }

    pub fn union_all(mut self, other: Select) -> Self {
        self.set_ops.push((SetOpKind::UnionAll, other));
        self
    }

    pub fn intersect(mut self, other: Select) -> Self {
        self.set_ops.push((SetOpKind::Intersect, other));
        self
    }

    pub fn except(mut self, other: Select) -> Self {
        self.set_ops.push((SetOpKind::Except, other));
        self
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    fn qualifier(&self) -> Option<&str> {
        match &self.from {
            FromItem::None => self.model.as_ref().map(|m| m.alias.as_str()),
            FromItem::Table { alias, .. } => alias.as_deref(),
            FromItem::Subquery { alias, .. } => Some(alias.as_str()),
            FromItem::Expr { alias, .. } => alias.as_deref(),
        }
    }

    /// Render for a dialect with default options.
    pub fn to_tokens(&self, dialect: Dialect) -> Result<TokenStream> {
        self.to_tokens_with(RenderCtx::new(dialect))
    }

    /// Render inheriting an enclosing statement's dialect and options.
    /// The qualifier is always this statement's own.
    pub(crate) fn to_tokens_with(&self, base: RenderCtx) -> Result<TokenStream> {
        let mut ctx = base.without_qualifier();
        if let Some(q) = self.qualifier() {
            ctx = ctx.with_qualifier(q);
        }
        let dialect = ctx.dialect;

        let mut ts = TokenStream::new();

        ts.append(&with_clause(&self.ctes, ctx)?);

        ts.push(Token::Select);
        if self.distinct {
            ts.space().push(Token::Distinct);
        }
        ts.space();

        if self.projections.is_empty() {
            match ctx.qualifier {
                Some(q) => {
                    ts.push(Token::Ident(q.into())).push(Token::Dot).push(Token::Star);
                }
                None => {
                    ts.push(Token::Star);
                }
            }
        } else {
            for (i, item) in self.projections.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.append(&item.to_tokens(ctx)?);
            }
        }

        // FROM
        let alias_kw = dialect.emit_as_for_table_alias();
        let push_alias = |ts: &mut TokenStream, alias: &str| {
            if alias_kw {
                ts.space().push(Token::As);
            }
            ts.space().push(Token::Ident(alias.into()));
        };

        match &self.from {
            FromItem::None => {
                if let Some(model) = &self.model {
                    ts.space().push(Token::From).space();
                    ts.push(Token::Ident(model.name.clone()));
                    push_alias(&mut ts, &model.alias);
                }
            }
            FromItem::Table { name, alias } => {
                ts.space().push(Token::From).space();
                ts.push(Token::Ident(name.clone()));
                if let Some(a) = alias {
                    push_alias(&mut ts, a);
                }
            }
            FromItem::Subquery { query, alias } => {
                if alias.is_empty() {
                    return Err(Error::ArgumentShape(
                        "sub-query FROM requires an explicit alias".into(),
                    ));
                }
                ts.space().push(Token::From).space();
                ts.lparen().append(&query.to_tokens_with(ctx)?).rparen();
                push_alias(&mut ts, alias);
            }
            FromItem::Expr { expr, alias } => {
                ts.space().push(Token::From).space();
                ts.append(&expr.to_tokens(ctx)?);
                if let Some(a) = alias {
                    push_alias(&mut ts, a);
                }
            }
        }

        // JOINs
        for join in &self.joins {
            ts.space();
            ts.append(&join.to_tokens(ctx, self.model.as_ref())?);
        }

        // WHERE
        let where_tokens = self.where_cond.to_tokens(ctx)?;
        if !where_tokens.is_empty() {
            ts.space().push(Token::Where).space().append(&where_tokens);
        }

        // GROUP BY
        if !self.group_by.is_empty() {
            ts.space().push(Token::GroupBy).space();
            for (i, expr) in self.group_by.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.append(&expr.to_tokens(ctx)?);
            }
        }

        // HAVING
        let having_tokens = self.having_cond.to_tokens(ctx)?;
        if !having_tokens.is_empty() {
            ts.space().push(Token::Having).space().append(&having_tokens);
        }

        // Set-operation tail; a trailing ORDER BY binds the whole compound
        for (kind, query) in &self.set_ops {
            ts.space();
            ts.push(match kind {
                SetOpKind::Union => Token::Union,
                SetOpKind::UnionAll => Token::Union,
                SetOpKind::Intersect => Token::Intersect,
                SetOpKind::Except => Token::Except,
            });
            if *kind == SetOpKind::UnionAll {
                ts.space().push(Token::All);
            }
            ts.space().append(&query.to_tokens_with(ctx)?);
        }

        // ORDER BY, with the pagination placeholder dialects that demand
        // ORDER BY for OFFSET/FETCH get when none was specified
        let needs_placeholder = dialect.requires_order_by_for_offset()
            && self.order_by.is_empty()
            && !self.limit_offset.is_empty();

        if !self.order_by.is_empty() {
            ts.space().push(Token::OrderBy).space();
            ts.append(&order_by_list(&self.order_by, ctx)?);
        } else if needs_placeholder {
            // Makes row order non-deterministic; callers wanting stable
            // pagination must order explicitly
            ts.space()
                .push(Token::OrderBy)
                .space()
                .lparen()
                .push(Token::Select)
                .space()
                .push(Token::Null)
                .rparen();
        }

        // LIMIT / OFFSET
        if !self.limit_offset.is_empty() {
            ts.space();
            ts.append(&self.limit_offset.to_tokens(ctx));
        }

        // Row locking
        if let Some(lock) = &self.lock {
            if !dialect.supports_for_update() {
                return Err(Error::unsupported("row locking", dialect));
            }
            ts.space();
            match lock {
                LockMode::Share => {
                    if dialect == Dialect::Oracle {
                        return Err(Error::unsupported("FOR SHARE", dialect));
                    }
                    ts.push(Token::ForShare);
                }
                LockMode::Update => {
                    ts.push(Token::ForUpdate);
                }
                LockMode::UpdateSkipLocked => {
                    ts.push(Token::ForUpdate).space().push(Token::SkipLocked);
                }
                LockMode::UpdateNowait => {
                    ts.push(Token::ForUpdate).space().push(Token::Nowait);
                }
            }
        }

        Ok(ts)
    }

    /// Render to SQL text and the ordered argument list.
    pub fn to_sql(&self, dialect: Dialect) -> Result<Statement> {
        Ok(self.to_tokens(dialect)?.serialize(dialect))
    }

    // =========================================================================
    // Terminals
    // =========================================================================

    fn render_for(&self, db: &Db) -> Result<Statement> {
        let mut ctx = RenderCtx::new(db.dialect());
        ctx.emulate_nulls_ordering = db.options().emulate_nulls_ordering;
        Ok(self.to_tokens_with(ctx)?.serialize(db.dialect()))
    }

    /// Execute and return the row cursor.
    pub fn rows(self, ctx: &Context, db: &Db) -> Result<Box<dyn Rows>> {
        let stmt = self.render_for(db)?;
        db.run_query(ctx, &stmt)
    }

    /// Execute and scan the first row into `dest`. Returns false when the
    /// result set is empty.
    pub fn scan_one(self, ctx: &Context, db: &Db, dest: &mut [Value]) -> Result<bool> {
        let mut rows = self.limit(1).rows(ctx, db)?;
        if !rows.next() {
            rows.close()?;
            return Ok(false);
        }
        rows.scan(dest)?;
        rows.close()?;
        Ok(true)
    }

    /// Count the rows this query would return.
    pub fn count(mut self, ctx: &Context, db: &Db) -> Result<i64> {
        // Ordering and pagination do not change the count
        self.order_by.clear();
        self.limit_offset = LimitOffset::default();
        let wrapped = Select::new()
            .select_expr(crate::agg::count_star(), None)
            .table_sub_query(self, "cnt");

        let mut dest = [Value::Null];
        if wrapped.scan_one(ctx, db, &mut dest)? {
            if let Value::Int(n) = dest[0] {
                return Ok(n);
            }
        }
        Ok(0)
    }

    /// Whether the query returns at least one row.
    pub fn exists(mut self, ctx: &Context, db: &Db) -> Result<bool> {
        self.order_by.clear();
        self.projections = vec![SelectExpr::new(lit(1))];
        let mut rows = self.limit(1).rows(ctx, db)?;
        let found = rows.next();
        rows.close()?;
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnDescriptor;

    struct User;

    impl Table for User {
        fn descriptor() -> TableDescriptor {
            TableDescriptor::new("users")
                .alias("u")
                .column(ColumnDescriptor::new("id").primary_key())
                .column(ColumnDescriptor::new("name"))
                .column(ColumnDescriptor::new("age"))
        }
    }

    #[test]
    fn test_model_select_star() {
        let stmt = Select::new().model::<User>().to_sql(Dialect::Postgres).unwrap();
        assert_eq!(stmt.sql, "SELECT \"u\".* FROM \"users\" AS \"u\"");
    }

    #[test]
    fn test_basic_where_or() {
        let stmt = Select::new()
            .model::<User>()
            .filter(|c| {
                c.eq("age", 30).or_eq("age", 25);
            })
            .order_by("id")
            .to_sql(Dialect::Postgres)
            .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT \"u\".* FROM \"users\" AS \"u\" \
             WHERE \"u\".\"age\" = $1 OR \"u\".\"age\" = $2 \
             ORDER BY \"u\".\"id\" ASC"
        );
        assert_eq!(stmt.params, vec![Value::Int(30), Value::Int(25)]);
    }

    #[test]
    fn test_projection_order_preserved() {
        let stmt = Select::new()
            .model::<User>()
            .select(["name", "age"])
            .select_as("id", "uid")
            .to_sql(Dialect::Postgres)
            .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT \"u\".\"name\", \"u\".\"age\", \"u\".\"id\" AS \"uid\" \
             FROM \"users\" AS \"u\""
        );
    }

    #[test]
    fn test_empty_where_elided() {
        let stmt = Select::new()
            .model::<User>()
            .filter(|_| {})
            .to_sql(Dialect::Postgres)
            .unwrap();
        assert!(!stmt.sql.contains("WHERE"));
    }

    #[test]
    fn test_join_with_condition() {
        let stmt = Select::new()
            .model::<User>()
            .left_join(JoinTarget::table_as("orders", "o"), |c| {
                c.eq_col("u.id", "o.user_id");
            })
            .to_sql(Dialect::Postgres)
            .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT \"u\".* FROM \"users\" AS \"u\" \
             LEFT JOIN \"orders\" AS \"o\" ON \"u\".\"id\" = \"o\".\"user_id\""
        );
    }

    #[test]
    fn test_group_having() {
        use crate::agg::count_star;
        use crate::expr::ExprExt;

        let stmt = Select::new()
            .model::<User>()
            .select(["age"])
            .group_by(["age"])
            .having(|c| {
                c.expr(count_star().into_expr().gt(1));
            })
            .to_sql(Dialect::Postgres)
            .unwrap();
        assert!(stmt.sql.contains("GROUP BY \"u\".\"age\""));
        assert!(stmt.sql.contains("HAVING COUNT(*) > $1"));
    }

    #[test]
    fn test_limit_offset_postgres() {
        let stmt = Select::new()
            .model::<User>()
            .order_by("id")
            .limit(10)
            .offset(20)
            .to_sql(Dialect::Postgres)
            .unwrap();
        assert!(stmt.sql.ends_with("LIMIT 10 OFFSET 20"));
    }

    #[test]
    fn test_pagination_sqlserver_placeholder() {
        let stmt = Select::new()
            .model::<User>()
            .limit(10)
            .to_sql(Dialect::SqlServer)
            .unwrap();
        assert!(stmt.sql.contains("ORDER BY (SELECT NULL)"), "{}", stmt.sql);
        assert!(stmt.sql.contains("OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY"));
    }

    #[test]
    fn test_for_update() {
        let stmt = Select::new()
            .model::<User>()
            .filter(|c| {
                c.pk_eq(1i64);
            })
            .for_update()
            .to_sql(Dialect::Postgres)
            .unwrap();
        assert!(stmt.sql.ends_with("FOR UPDATE"));

        let err = Select::new()
            .model::<User>()
            .for_update()
            .to_sql(Dialect::Sqlite)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedDialect { .. }));
    }

    #[test]
    fn test_for_update_skip_locked() {
        let stmt = Select::new()
            .model::<User>()
            .for_update_skip_locked()
            .to_sql(Dialect::Postgres)
            .unwrap();
        assert!(stmt.sql.ends_with("FOR UPDATE SKIP LOCKED"));
    }

    #[test]
    fn test_union_tail() {
        let other = Select::new().table("archived_users");
        let stmt = Select::new()
            .model::<User>()
            .select(["name"])
            .union_all(other)
            .to_sql(Dialect::Postgres)
            .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT \"u\".\"name\" FROM \"users\" AS \"u\" \
             UNION ALL SELECT * FROM \"archived_users\""
        );
    }

    #[test]
    fn test_cte() {
        let totals = Select::new()
            .table_as("orders", "o")
            .select(["user_id"]);
        let stmt = Select::new()
            .with("totals", totals)
            .table("totals")
            .to_sql(Dialect::Postgres)
            .unwrap();
        assert!(stmt.sql.starts_with(
            "WITH \"totals\" AS (SELECT \"o\".\"user_id\" FROM \"orders\" AS \"o\") SELECT"
        ));
    }

    #[test]
    fn test_with_values() {
        let stmt = Select::new()
            .with_values("src", vec![Row::new().set("id", 1).set("n", "a")])
            .table("src")
            .to_sql(Dialect::Postgres)
            .unwrap();
        assert!(stmt
            .sql
            .starts_with("WITH \"src\" (\"id\", \"n\") AS (VALUES ($1, $2))"));
    }

    #[test]
    fn test_subquery_from_requires_alias() {
        let inner = Select::new().table("t");
        let err = Select::new()
            .table_sub_query(inner, "")
            .to_sql(Dialect::Postgres)
            .unwrap_err();
        assert!(matches!(err, Error::ArgumentShape(_)));
    }

    #[test]
    fn test_in_subquery() {
        let premium = Select::new().table("premium").select(["user_id"]);
        let stmt = Select::new()
            .model::<User>()
            .filter(|c| {
                c.in_subquery("id", premium);
            })
            .to_sql(Dialect::Postgres)
            .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT \"u\".* FROM \"users\" AS \"u\" WHERE \"u\".\"id\" IN \
             (SELECT \"user_id\" FROM \"premium\")"
        );
    }

    #[test]
    fn test_idempotent_render() {
        let q = Select::new()
            .model::<User>()
            .filter(|c| {
                c.eq("age", 30).or_eq("age", 25);
            })
            .order_by("id")
            .limit(5);
        let first = q.to_sql(Dialect::Postgres).unwrap();
        let second = q.to_sql(Dialect::Postgres).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_emitted_sql_parses() {
        let stmt = Select::new()
            .model::<User>()
            .select(["name", "age"])
            .filter(|c| {
                c.eq("age", 30).or_is_null("name");
            })
            .order_by_desc("age")
            .limit(3)
            .to_sql(Dialect::Postgres)
            .unwrap();
        crate::test_utils::validate_sql(&stmt.sql, Dialect::Postgres).unwrap();
    }

    #[test]
    fn test_oracle_alias_without_as() {
        let stmt = Select::new().model::<User>().to_sql(Dialect::Oracle).unwrap();
        assert_eq!(stmt.sql, "SELECT \"u\".* FROM \"users\" \"u\"");
    }
}
