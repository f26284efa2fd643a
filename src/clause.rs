//! Shared clause builders: ORDER BY, LIMIT/OFFSET, CTEs, JOINs, RETURNING.

use crate::cond::Cond;
use crate::error::{Error, Result};
use crate::expr::{case, Expr, RenderCtx};
use crate::schema::{Row, TableDescriptor};
use crate::stmt::Select;
use crate::token::{Token, TokenStream};

// =============================================================================
// ORDER BY
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

/// NULLS ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    First,
    Last,
}

/// An ORDER BY entry: expression, direction, optional NULLS ordering.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct OrderByExpr {
    pub expr: Expr,
    pub dir: Option<SortDir>,
    pub nulls: Option<NullsOrder>,
}

impl OrderByExpr {
    pub fn new(expr: Expr) -> Self {
        Self {
            expr,
            dir: None,
            nulls: None,
        }
    }

    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            dir: Some(SortDir::Asc),
            nulls: None,
        }
    }

    pub fn desc(expr: Expr) -> Self {
        Self {
            expr,
            dir: Some(SortDir::Desc),
            nulls: None,
        }
    }

    pub fn nulls_first(mut self) -> Self {
        self.nulls = Some(NullsOrder::First);
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls = Some(NullsOrder::Last);
        self
    }

    /// Render this entry.
    ///
    /// NULLS FIRST/LAST is emitted where the dialect supports it. Elsewhere
    /// it is dropped silently, unless `ctx.emulate_nulls_ordering` is on,
    /// in which case a CASE sort key is prepended.
    pub fn to_tokens(&self, ctx: RenderCtx) -> Result<TokenStream> {
        use crate::dialect::SqlDialect;

        if let Expr::Column { column, .. } = &self.expr {
            if column.is_empty() {
                return Err(Error::MissingColumnOrExpression);
            }
        }

        let mut ts = TokenStream::new();
        let supports_nulls = ctx.dialect.supports_nulls_ordering();

        if let Some(nulls) = &self.nulls {
            if !supports_nulls && ctx.emulate_nulls_ordering {
                // CASE WHEN e IS NULL THEN 0 ELSE 1 END sorts NULLs first;
                // flipped constants sort them last
                let (when_null, otherwise) = match nulls {
                    NullsOrder::First => (0i64, 1i64),
                    NullsOrder::Last => (1i64, 0i64),
                };
                let key = case()
                    .when(
                        Expr::IsNull {
                            expr: Box::new(self.expr.clone()),
                            negated: false,
                        },
                        crate::expr::lit(when_null),
                    )
                    .otherwise(crate::expr::lit(otherwise))
                    .end();
                ts.append(&key.to_tokens(ctx)?);
                ts.comma().space();
            }
        }

        ts.append(&self.expr.to_tokens(ctx)?);

        if let Some(dir) = &self.dir {
            ts.space().push(match dir {
                SortDir::Asc => Token::Asc,
                SortDir::Desc => Token::Desc,
            });
        }

        if let Some(nulls) = &self.nulls {
            if supports_nulls {
                ts.space().push(match nulls {
                    NullsOrder::First => Token::NullsFirst,
                    NullsOrder::Last => Token::NullsLast,
                });
            }
        }

        Ok(ts)
    }
}

impl From<Expr> for OrderByExpr {
    fn from(expr: Expr) -> Self {
        OrderByExpr::new(expr)
    }
}

/// Render an ORDER BY list: `e1 DIR [NULLS X], e2 DIR, ...` (no keyword).
pub fn order_by_list(entries: &[OrderByExpr], ctx: RenderCtx) -> Result<TokenStream> {
    let mut ts = TokenStream::new();
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            ts.comma().space();
        }
        ts.append(&entry.to_tokens(ctx)?);
    }
    Ok(ts)
}

// =============================================================================
// LIMIT / OFFSET
// =============================================================================

/// LIMIT and OFFSET clause. Rendering is dialect-specific
/// (LIMIT/OFFSET vs OFFSET ... FETCH).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LimitOffset {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl LimitOffset {
    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.offset.is_none()
    }

    pub fn to_tokens(&self, ctx: RenderCtx) -> TokenStream {
        use crate::dialect::SqlDialect;
        ctx.dialect.emit_limit_offset(self.limit, self.offset)
    }
}

// =============================================================================
// CTE
// =============================================================================

/// The body of a CTE: a sub-select or an inline VALUES row set.
#[derive(Debug, Clone)]
pub enum CteSource {
    Select(Box<Select>),
    Values(Vec<Row>),
}

/// A Common Table Expression (WITH clause entry).
#[derive(Debug, Clone)]
#[must_use = "builders have no effect until used"]
pub struct Cte {
    pub name: String,
    pub columns: Option<Vec<String>>,
    pub source: CteSource,
    pub recursive: bool,
}

impl Cte {
    pub fn new(name: &str, query: Select) -> Self {
        Self {
            name: name.into(),
            columns: None,
            source: CteSource::Select(Box::new(query)),
            recursive: false,
        }
    }

    /// Create a recursive CTE.
    pub fn recursive(name: &str, query: Select) -> Self {
        Self {
            name: name.into(),
            columns: None,
            source: CteSource::Select(Box::new(query)),
            recursive: true,
        }
    }

    /// Create an inline VALUES CTE. The column list is inferred from the
    /// first row.
    pub fn values(name: &str, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            columns: None,
            source: CteSource::Values(rows),
            recursive: false,
        }
    }

    pub fn with_columns(mut self, columns: Vec<&str>) -> Self {
        self.columns = Some(columns.into_iter().map(String::from).collect());
        self
    }

    pub fn to_tokens(&self, ctx: RenderCtx) -> Result<TokenStream> {
        let mut ts = TokenStream::new();
        ts.push(Token::Ident(self.name.clone()));

        let inferred;
        let columns: Option<&[String]> = match (&self.columns, &self.source) {
            (Some(cols), _) => Some(cols),
            (None, CteSource::Values(rows)) => {
                let first = rows
                    .first()
                    .ok_or(Error::EmptyValueSource("VALUES CTE"))?;
                inferred = first.columns().to_vec();
                Some(&inferred)
            }
            (None, CteSource::Select(_)) => None,
        };

        if let Some(cols) = columns {
            ts.space().lparen();
            for (i, c) in cols.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.push(Token::Ident(c.clone()));
            }
            ts.rparen();
        }

        ts.space().push(Token::As).space().lparen();

        match &self.source {
            CteSource::Select(query) => {
                ts.append(&query.to_tokens_with(ctx)?);
            }
            CteSource::Values(rows) => {
                ts.append(&values_body(rows, ctx)?);
            }
        }

        ts.rparen();
        Ok(ts)
    }
}

/// Render an inline row set in the dialect's VALUES form.
///
/// MySQL needs `ROW(...)` constructors; Oracle and SQL Server have no
/// standalone VALUES table, so a UNION ALL of one-row SELECTs stands in.
fn values_body(rows: &[Row], ctx: RenderCtx) -> Result<TokenStream> {
    use crate::dialect::Dialect;

    let first = rows.first().ok_or(Error::EmptyValueSource("VALUES CTE"))?;
    let width = first.columns().len();
    for row in rows {
        if row.values().len() != width {
            return Err(Error::ArgumentShape(format!(
                "VALUES rows must have uniform width, expected {width} got {}",
                row.values().len()
            )));
        }
    }

    let mut ts = TokenStream::new();
    match ctx.dialect {
        Dialect::Oracle | Dialect::SqlServer => {
            for (i, row) in rows.iter().enumerate() {
                if i > 0 {
                    ts.space().push(Token::Union).space().push(Token::All).space();
                }
                ts.push(Token::Select).space();
                for (j, v) in row.values().iter().enumerate() {
                    if j > 0 {
                        ts.comma().space();
                    }
                    ts.bind(v.clone());
                }
                if ctx.dialect == Dialect::Oracle {
                    ts.space().push(Token::From).space().push(Token::Raw("DUAL".into()));
                }
            }
        }
        dialect => {
            ts.push(Token::Values);
            for (i, row) in rows.iter().enumerate() {
                if i > 0 {
                    ts.comma();
                }
                ts.space();
                if dialect == Dialect::MySql {
                    ts.push(Token::Raw("ROW".into()));
                }
                ts.lparen();
                for (j, v) in row.values().iter().enumerate() {
                    if j > 0 {
                        ts.comma().space();
                    }
                    ts.bind(v.clone());
                }
                ts.rparen();
            }
        }
    }
    Ok(ts)
}

/// Render a full `WITH ...` prefix for a CTE list, or nothing when empty.
pub fn with_clause(ctes: &[Cte], ctx: RenderCtx) -> Result<TokenStream> {
    use crate::dialect::SqlDialect;

    let mut ts = TokenStream::new();
    if ctes.is_empty() {
        return Ok(ts);
    }

    ts.push(Token::With);
    let has_recursive = ctes.iter().any(|cte| cte.recursive);
    if has_recursive && ctx.dialect.emit_recursive_keyword() {
        ts.space().push(Token::Recursive);
    }
    ts.space();
    for (i, cte) in ctes.iter().enumerate() {
        if i > 0 {
            ts.comma().space();
        }
        ts.append(&cte.to_tokens(ctx)?);
    }
    ts.space();
    Ok(ts)
}

// =============================================================================
// JOIN
// =============================================================================

/// Type of join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

/// What a join targets.
#[derive(Debug, Clone)]
pub enum JoinTarget {
    /// A plain table, optionally aliased.
    Table { name: String, alias: Option<String> },
    /// A model relation; the default ON clause is
    /// `self.alias.{target_name}_id = target.alias.{pk}`.
    Model(TableDescriptor),
    /// A sub-query; the alias is mandatory.
    Subquery { query: Box<Select>, alias: String },
    /// A raw table expression, optionally aliased.
    Expr { expr: Expr, alias: Option<String> },
}

impl JoinTarget {
    /// A plain table.
    pub fn table(name: &str) -> Self {
        JoinTarget::Table {
            name: name.into(),
            alias: None,
        }
    }

    /// An aliased table.
    pub fn table_as(name: &str, alias: &str) -> Self {
        JoinTarget::Table {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }

    /// A related model.
    pub fn model<T: crate::schema::Table>() -> Self {
        JoinTarget::Model(T::descriptor())
    }

    /// A sub-query with its mandatory alias.
    pub fn subquery(query: Select, alias: &str) -> Self {
        JoinTarget::Subquery {
            query: Box::new(query),
            alias: alias.into(),
        }
    }

    /// A raw table expression.
    pub fn expr(expr: Expr, alias: Option<&str>) -> Self {
        JoinTarget::Expr {
            expr,
            alias: alias.map(String::from),
        }
    }
}

/// A JOIN clause.
#[derive(Debug, Clone)]
pub struct Join {
    pub kind: JoinKind,
    pub target: JoinTarget,
    pub on: Cond,
}

impl Join {
    /// Render the join. `self_table` is the enclosing statement's model,
    /// needed to derive the default ON clause of model relations.
    pub fn to_tokens(&self, ctx: RenderCtx, self_table: Option<&TableDescriptor>) -> Result<TokenStream> {
        use crate::dialect::SqlDialect;

        let mut ts = TokenStream::new();

        match self.kind {
            JoinKind::Inner => ts.push(Token::Inner),
            JoinKind::Left => ts.push(Token::Left),
            JoinKind::Right => ts.push(Token::Right),
            JoinKind::Full => ts.push(Token::Full).space().push(Token::Outer),
            JoinKind::Cross => ts.push(Token::Cross),
        };
        ts.space().push(Token::Join).space();

        let alias_kw = ctx.dialect.emit_as_for_table_alias();
        let push_alias = |ts: &mut TokenStream, alias: &str| {
            if alias_kw {
                ts.space().push(Token::As);
            }
            ts.space().push(Token::Ident(alias.into()));
        };

        match &self.target {
            JoinTarget::Table { name, alias } => {
                ts.push(Token::Ident(name.clone()));
                if let Some(a) = alias {
                    push_alias(&mut ts, a);
                }
            }
            JoinTarget::Model(table) => {
                ts.push(Token::Ident(table.name.clone()));
                push_alias(&mut ts, &table.alias);
            }
            JoinTarget::Subquery { query, alias } => {
                ts.lparen().append(&query.to_tokens_with(ctx)?).rparen();
                push_alias(&mut ts, alias);
            }
            JoinTarget::Expr { expr, alias } => {
                ts.append(&expr.to_tokens(ctx)?);
                if let Some(a) = alias {
                    push_alias(&mut ts, a);
                }
            }
        }

        if self.kind == JoinKind::Cross {
            return Ok(ts);
        }

        let on = if self.on.is_empty() {
            match &self.target {
                JoinTarget::Model(target) => self.relation_on(ctx, self_table, target)?,
                _ => TokenStream::new(),
            }
        } else {
            self.on.to_tokens(ctx)?
        };

        if !on.is_empty() {
            ts.space().push(Token::On).space().append(&on);
        }

        Ok(ts)
    }

    /// Default relation predicate: `self.alias.{target}_id = target.alias.{pk}`.
    fn relation_on(
        &self,
        ctx: RenderCtx,
        self_table: Option<&TableDescriptor>,
        target: &TableDescriptor,
    ) -> Result<TokenStream> {
        let this = self_table.ok_or(Error::ModelNotBound("model relation join"))?;
        let pk = target
            .primary_keys()
            .first()
            .map(|c| c.name.clone())
            .ok_or(Error::PkNotBound(target.name.clone()))?;
        let fk = format!("{}_id", target.name);

        let mut on = Cond::new();
        on.eq_col(
            &format!("{}.{}", this.alias, fk),
            &format!("{}.{}", target.alias, pk),
        );
        on.to_tokens(ctx)
    }
}

// =============================================================================
// RETURNING
// =============================================================================

/// RETURNING specification: nothing, all columns, or an explicit list.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Returning {
    #[default]
    None,
    All,
    Columns(Vec<String>),
}

impl Returning {
    pub fn is_none(&self) -> bool {
        matches!(self, Returning::None)
    }

    /// Render the `RETURNING ...` suffix form.
    pub fn to_tokens(&self, _ctx: RenderCtx) -> TokenStream {
        let mut ts = TokenStream::new();
        match self {
            Returning::None => {}
            Returning::All => {
                ts.push(Token::Returning).space().push(Token::Star);
            }
            Returning::Columns(cols) => {
                ts.push(Token::Returning).space();
                for (i, c) in cols.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    match c.split_once('.') {
                        Some((qualifier, name)) => {
                            ts.push(Token::QualifiedIdent {
                                qualifier: qualifier.into(),
                                name: name.into(),
                            });
                        }
                        None => {
                            ts.push(Token::Ident(c.clone()));
                        }
                    }
                }
            }
        }
        ts
    }

    /// Render the SQL Server `OUTPUT INSERTED.* / DELETED.*` form.
    /// `deleted` selects the DELETED pseudo-table (DELETE statements).
    pub fn to_output_tokens(&self, deleted: bool) -> TokenStream {
        let mut ts = TokenStream::new();
        let source = if deleted {
            Token::Deleted
        } else {
            Token::Inserted
        };
        match self {
            Returning::None => {}
            Returning::All => {
                ts.push(Token::Output)
                    .space()
                    .push(source)
                    .push(Token::Dot)
                    .push(Token::Star);
            }
            Returning::Columns(cols) => {
                ts.push(Token::Output).space();
                for (i, c) in cols.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    ts.push(source.clone())
                        .push(Token::Dot)
                        .push(Token::Ident(c.clone()));
                }
            }
        }
        ts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::expr::col;
    use crate::value::Value;

    fn ctx(d: Dialect) -> RenderCtx<'static> {
        RenderCtx::new(d)
    }

    #[test]
    fn test_order_by_directions() {
        let e = OrderByExpr::desc(col("age")).nulls_last();
        let sql = e
            .to_tokens(ctx(Dialect::Postgres))
            .unwrap()
            .serialize(Dialect::Postgres)
            .sql;
        assert_eq!(sql, "\"age\" DESC NULLS LAST");
    }

    #[test]
    fn test_order_by_nulls_dropped_on_mysql() {
        let e = OrderByExpr::asc(col("age")).nulls_first();
        let sql = e
            .to_tokens(ctx(Dialect::MySql))
            .unwrap()
            .serialize(Dialect::MySql)
            .sql;
        assert_eq!(sql, "`age` ASC");
    }

    #[test]
    fn test_order_by_nulls_emulated_when_asked() {
        let e = OrderByExpr::asc(col("age")).nulls_first();
        let mut c = ctx(Dialect::MySql);
        c.emulate_nulls_ordering = true;
        let sql = e.to_tokens(c).unwrap().serialize(Dialect::MySql).sql;
        assert_eq!(
            sql,
            "CASE WHEN `age` IS NULL THEN 0 ELSE 1 END, `age` ASC"
        );
    }

    #[test]
    fn test_order_by_empty_column_fails() {
        let e = OrderByExpr::new(col(""));
        let err = e.to_tokens(ctx(Dialect::Postgres)).unwrap_err();
        assert!(matches!(err, Error::MissingColumnOrExpression));
    }

    #[test]
    fn test_values_cte_postgres() {
        let cte = Cte::values(
            "src",
            vec![
                Row::new().set("id", 1).set("name", "a"),
                Row::new().set("id", 2).set("name", "b"),
            ],
        );
        let stmt = cte
            .to_tokens(ctx(Dialect::Postgres))
            .unwrap()
            .serialize(Dialect::Postgres);
        assert_eq!(
            stmt.sql,
            "\"src\" (\"id\", \"name\") AS (VALUES ($1, $2), ($3, $4))"
        );
        assert_eq!(stmt.params.len(), 4);
    }

    #[test]
    fn test_values_cte_mysql_rows() {
        let cte = Cte::values("src", vec![Row::new().set("id", 1)]);
        let stmt = cte
            .to_tokens(ctx(Dialect::MySql))
            .unwrap()
            .serialize(Dialect::MySql);
        assert_eq!(stmt.sql, "`src` (`id`) AS (VALUES ROW(?))");
    }

    #[test]
    fn test_values_cte_sqlserver_union() {
        let cte = Cte::values(
            "src",
            vec![Row::new().set("id", 1), Row::new().set("id", 2)],
        );
        let stmt = cte
            .to_tokens(ctx(Dialect::SqlServer))
            .unwrap()
            .serialize(Dialect::SqlServer);
        assert_eq!(
            stmt.sql,
            "[src] ([id]) AS (SELECT @p1 UNION ALL SELECT @p2)"
        );
    }

    #[test]
    fn test_values_cte_ragged_rows_fail() {
        let cte = Cte::values(
            "src",
            vec![
                Row::new().set("id", 1).set("name", "a"),
                Row::new().set("id", 2),
            ],
        );
        let err = cte.to_tokens(ctx(Dialect::Postgres)).unwrap_err();
        assert!(matches!(err, Error::ArgumentShape(_)));
    }

    #[test]
    fn test_returning_output_forms() {
        let r = Returning::Columns(vec!["id".into(), "name".into()]);
        let ts = r.to_output_tokens(false);
        assert_eq!(
            ts.serialize(Dialect::SqlServer).sql,
            "OUTPUT INSERTED.[id], INSERTED.[name]"
        );

        let ts = Returning::All.to_output_tokens(true);
        assert_eq!(ts.serialize(Dialect::SqlServer).sql, "OUTPUT DELETED.*");
    }

    #[test]
    fn test_join_oracle_omits_as() {
        let join = Join {
            kind: JoinKind::Left,
            target: JoinTarget::Table {
                name: "orders".into(),
                alias: Some("o".into()),
            },
            on: {
                let mut c = Cond::new();
                c.eq_col("u.id", "o.user_id");
                c
            },
        };
        let sql = join
            .to_tokens(ctx(Dialect::Oracle), None)
            .unwrap()
            .serialize(Dialect::Oracle)
            .sql;
        assert_eq!(
            sql,
            "LEFT JOIN \"orders\" \"o\" ON \"u\".\"id\" = \"o\".\"user_id\""
        );
    }

    #[test]
    fn test_cross_join_has_no_on() {
        let join = Join {
            kind: JoinKind::Cross,
            target: JoinTarget::Table {
                name: "tags".into(),
                alias: None,
            },
            on: Cond::new(),
        };
        let sql = join
            .to_tokens(ctx(Dialect::Postgres), None)
            .unwrap()
            .serialize(Dialect::Postgres)
            .sql;
        assert_eq!(sql, "CROSS JOIN \"tags\"");
    }

    #[test]
    fn test_model_relation_default_on() {
        use crate::schema::ColumnDescriptor;

        let users = TableDescriptor::new("users")
            .alias("u")
            .column(ColumnDescriptor::new("id").primary_key());
        let orders = TableDescriptor::new("orders")
            .alias("o")
            .column(ColumnDescriptor::new("id").primary_key())
            .column(ColumnDescriptor::new("users_id"));

        // orders joins users: o.users_id = u.id
        let join = Join {
            kind: JoinKind::Inner,
            target: JoinTarget::Model(users.clone()),
            on: Cond::new(),
        };
        let sql = join
            .to_tokens(ctx(Dialect::Postgres), Some(&orders))
            .unwrap()
            .serialize(Dialect::Postgres)
            .sql;
        assert_eq!(
            sql,
            "INNER JOIN \"users\" AS \"u\" ON \"o\".\"users_id\" = \"u\".\"id\""
        );
    }

    #[test]
    fn test_values_cte_binds_in_order() {
        let cte = Cte::values(
            "v",
            vec![Row::new().set("a", 1).set("b", 2), Row::new().set("a", 3).set("b", 4)],
        );
        let stmt = cte
            .to_tokens(ctx(Dialect::Postgres))
            .unwrap()
            .serialize(Dialect::Postgres);
        assert_eq!(
            stmt.params,
            vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]
        );
    }
}
