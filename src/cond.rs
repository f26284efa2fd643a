//! Condition builder - predicate composition for WHERE / HAVING / ON.
//!
//! A [`Cond`] accumulates predicate fragments, each tagged with the
//! connective (AND by default, OR via the `or_*` partner methods) that
//! joins it to the previous fragment. The first fragment's connective is
//! never emitted. An empty condition renders to nothing and the enclosing
//! clause is elided.
//!
//! Bare column names bind to the statement's primary-table alias; dotted
//! names carry their own qualifier.

use crate::error::{Error, Result};
use crate::expr::{col, val, Expr, ExprExt, RenderCtx};
use crate::schema::TableDescriptor;
use crate::stmt::Select;
use crate::token::{Token, TokenStream};
use crate::value::Value;

/// Connective joining a predicate fragment to its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

/// A single predicate fragment.
#[derive(Debug, Clone)]
enum Pred {
    Expr(Expr),
    Group(Cond),
    PkCompare { key: PkKey, negated: bool },
    PkIn { keys: Vec<PkKey>, negated: bool },
}

/// A primary-key value: one value per key column, in key order.
#[derive(Debug, Clone, PartialEq)]
pub struct PkKey(pub Vec<Value>);

impl From<Value> for PkKey {
    fn from(v: Value) -> Self {
        PkKey(vec![v])
    }
}

impl From<Vec<Value>> for PkKey {
    fn from(vs: Vec<Value>) -> Self {
        PkKey(vs)
    }
}

impl From<i32> for PkKey {
    fn from(n: i32) -> Self {
        PkKey(vec![n.into()])
    }
}

impl From<i64> for PkKey {
    fn from(n: i64) -> Self {
        PkKey(vec![n.into()])
    }
}

impl From<&str> for PkKey {
    fn from(s: &str) -> Self {
        PkKey(vec![s.into()])
    }
}

impl From<String> for PkKey {
    fn from(s: String) -> Self {
        PkKey(vec![s.into()])
    }
}

/// Boolean predicate builder.
#[derive(Debug, Clone, Default)]
pub struct Cond {
    table: Option<TableDescriptor>,
    fragments: Vec<(Connective, Pred)>,
}

impl Cond {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the table used by primary-key shortcut predicates.
    pub(crate) fn with_table(table: Option<TableDescriptor>) -> Self {
        Self {
            table,
            fragments: Vec::new(),
        }
    }

    /// Whether no fragments were added.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    fn push(&mut self, connective: Connective, pred: Pred) -> &mut Self {
        self.fragments.push((connective, pred));
        self
    }

    // =========================================================================
    // Value comparisons
    // =========================================================================

    pub fn eq(&mut self, column: &str, v: impl Into<Expr>) -> &mut Self {
        self.push(Connective::And, Pred::Expr(col(column).eq(v)))
    }

    pub fn or_eq(&mut self, column: &str, v: impl Into<Expr>) -> &mut Self {
        self.push(Connective::Or, Pred::Expr(col(column).eq(v)))
    }

    pub fn ne(&mut self, column: &str, v: impl Into<Expr>) -> &mut Self {
        self.push(Connective::And, Pred::Expr(col(column).ne(v)))
    }

    pub fn or_ne(&mut self, column: &str, v: impl Into<Expr>) -> &mut Self {
        self.push(Connective::Or, Pred::Expr(col(column).ne(v)))
    }

    pub fn gt(&mut self, column: &str, v: impl Into<Expr>) -> &mut Self {
        self.push(Connective::And, Pred::Expr(col(column).gt(v)))
    }

    pub fn or_gt(&mut self, column: &str, v: impl Into<Expr>) -> &mut Self {
        self.push(Connective::Or, Pred::Expr(col(column).gt(v)))
    }

    pub fn gte(&mut self, column: &str, v: impl Into<Expr>) -> &mut Self {
        self.push(Connective::And, Pred::Expr(col(column).gte(v)))
    }

    pub fn or_gte(&mut self, column: &str, v: impl Into<Expr>) -> &mut Self {
        self.push(Connective::Or, Pred::Expr(col(column).gte(v)))
    }

    pub fn lt(&mut self, column: &str, v: impl Into<Expr>) -> &mut Self {
        self.push(Connective::And, Pred::Expr(col(column).lt(v)))
    }

    pub fn or_lt(&mut self, column: &str, v: impl Into<Expr>) -> &mut Self {
        self.push(Connective::Or, Pred::Expr(col(column).lt(v)))
    }

    pub fn lte(&mut self, column: &str, v: impl Into<Expr>) -> &mut Self {
        self.push(Connective::And, Pred::Expr(col(column).lte(v)))
    }

    pub fn or_lte(&mut self, column: &str, v: impl Into<Expr>) -> &mut Self {
        self.push(Connective::Or, Pred::Expr(col(column).lte(v)))
    }

    // =========================================================================
    // Column-vs-column comparisons
    // =========================================================================

    pub fn eq_col(&mut self, a: &str, b: &str) -> &mut Self {
        self.push(Connective::And, Pred::Expr(col(a).eq(col(b))))
    }

    pub fn or_eq_col(&mut self, a: &str, b: &str) -> &mut Self {
        self.push(Connective::Or, Pred::Expr(col(a).eq(col(b))))
    }

    pub fn ne_col(&mut self, a: &str, b: &str) -> &mut Self {
        self.push(Connective::And, Pred::Expr(col(a).ne(col(b))))
    }

    pub fn or_ne_col(&mut self, a: &str, b: &str) -> &mut Self {
        self.push(Connective::Or, Pred::Expr(col(a).ne(col(b))))
    }

    pub fn gt_col(&mut self, a: &str, b: &str) -> &mut Self {
        self.push(Connective::And, Pred::Expr(col(a).gt(col(b))))
    }

    pub fn or_gt_col(&mut self, a: &str, b: &str) -> &mut Self {
        self.push(Connective::Or, Pred::Expr(col(a).gt(col(b))))
    }

    pub fn gte_col(&mut self, a: &str, b: &str) -> &mut Self {
        self.push(Connective::And, Pred::Expr(col(a).gte(col(b))))
    }

    pub fn or_gte_col(&mut self, a: &str, b: &str) -> &mut Self {
        self.push(Connective::Or, Pred::Expr(col(a).gte(col(b))))
    }

    pub fn lt_col(&mut self, a: &str, b: &str) -> &mut Self {
        self.push(Connective::And, Pred::Expr(col(a).lt(col(b))))
    }

    pub fn or_lt_col(&mut self, a: &str, b: &str) -> &mut Self {
        self.push(Connective::Or, Pred::Expr(col(a).lt(col(b))))
    }

    pub fn lte_col(&mut self, a: &str, b: &str) -> &mut Self {
        self.push(Connective::And, Pred::Expr(col(a).lte(col(b))))
    }

    pub fn or_lte_col(&mut self, a: &str, b: &str) -> &mut Self {
        self.push(Connective::Or, Pred::Expr(col(a).lte(col(b))))
    }

    // =========================================================================
    // IN / BETWEEN
    // =========================================================================

    pub fn in_list(
        &mut self,
        column: &str,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> &mut Self {
        let exprs = values.into_iter().map(|v| val(v)).collect();
        self.push(Connective::And, Pred::Expr(col(column).in_list(exprs)))
    }

    pub fn or_in_list(
        &mut self,
        column: &str,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> &mut Self {
        let exprs = values.into_iter().map(|v| val(v)).collect();
        self.push(Connective::Or, Pred::Expr(col(column).in_list(exprs)))
    }

    pub fn not_in_list(
        &mut self,
        column: &str,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> &mut Self {
        let exprs = values.into_iter().map(|v| val(v)).collect();
        self.push(Connective::And, Pred::Expr(col(column).not_in_list(exprs)))
    }

    pub fn or_not_in_list(
        &mut self,
        column: &str,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> &mut Self {
        let exprs = values.into_iter().map(|v| val(v)).collect();
        self.push(Connective::Or, Pred::Expr(col(column).not_in_list(exprs)))
    }

    pub fn in_subquery(&mut self, column: &str, subquery: Select) -> &mut Self {
        self.push(Connective::And, Pred::Expr(col(column).in_subquery(subquery)))
    }

    pub fn or_in_subquery(&mut self, column: &str, subquery: Select) -> &mut Self {
        self.push(Connective::Or, Pred::Expr(col(column).in_subquery(subquery)))
    }

    pub fn not_in_subquery(&mut self, column: &str, subquery: Select) -> &mut Self {
        self.push(
            Connective::And,
            Pred::Expr(col(column).not_in_subquery(subquery)),
        )
    }

    pub fn or_not_in_subquery(&mut self, column: &str, subquery: Select) -> &mut Self {
        self.push(
            Connective::Or,
            Pred::Expr(col(column).not_in_subquery(subquery)),
        )
    }

    pub fn between(
        &mut self,
        column: &str,
        low: impl Into<Expr>,
        high: impl Into<Expr>,
    ) -> &mut Self {
        self.push(Connective::And, Pred::Expr(col(column).between(low, high)))
    }

    pub fn or_between(
        &mut self,
        column: &str,
        low: impl Into<Expr>,
        high: impl Into<Expr>,
    ) -> &mut Self {
        self.push(Connective::Or, Pred::Expr(col(column).between(low, high)))
    }

    pub fn not_between(
        &mut self,
        column: &str,
        low: impl Into<Expr>,
        high: impl Into<Expr>,
    ) -> &mut Self {
        self.push(
            Connective::And,
            Pred::Expr(col(column).not_between(low, high)),
        )
    }

    pub fn or_not_between(
        &mut self,
        column: &str,
        low: impl Into<Expr>,
        high: impl Into<Expr>,
    ) -> &mut Self {
        self.push(
            Connective::Or,
            Pred::Expr(col(column).not_between(low, high)),
        )
    }

    // =========================================================================
    // Pattern matching
    // =========================================================================

    pub fn like(&mut self, column: &str, pattern: &str) -> &mut Self {
        self.push(Connective::And, Pred::Expr(col(column).like(pattern)))
    }

    pub fn or_like(&mut self, column: &str, pattern: &str) -> &mut Self {
        self.push(Connective::Or, Pred::Expr(col(column).like(pattern)))
    }

    pub fn not_like(&mut self, column: &str, pattern: &str) -> &mut Self {
        self.push(Connective::And, Pred::Expr(col(column).not_like(pattern)))
    }

    pub fn or_not_like(&mut self, column: &str, pattern: &str) -> &mut Self {
        self.push(Connective::Or, Pred::Expr(col(column).not_like(pattern)))
    }

    pub fn ilike(&mut self, column: &str, pattern: &str) -> &mut Self {
        self.push(Connective::And, Pred::Expr(col(column).ilike(pattern)))
    }

    pub fn or_ilike(&mut self, column: &str, pattern: &str) -> &mut Self {
        self.push(Connective::Or, Pred::Expr(col(column).ilike(pattern)))
    }

    pub fn starts_with(&mut self, column: &str, prefix: &str) -> &mut Self {
        self.like(column, &format!("{prefix}%"))
    }

    pub fn or_starts_with(&mut self, column: &str, prefix: &str) -> &mut Self {
        self.or_like(column, &format!("{prefix}%"))
    }

    pub fn ends_with(&mut self, column: &str, suffix: &str) -> &mut Self {
        self.like(column, &format!("%{suffix}"))
    }

    pub fn or_ends_with(&mut self, column: &str, suffix: &str) -> &mut Self {
        self.or_like(column, &format!("%{suffix}"))
    }

    pub fn contains(&mut self, column: &str, needle: &str) -> &mut Self {
        self.like(column, &format!("%{needle}%"))
    }

    pub fn or_contains(&mut self, column: &str, needle: &str) -> &mut Self {
        self.or_like(column, &format!("%{needle}%"))
    }

    // =========================================================================
    // NULL tests
    // =========================================================================

    pub fn is_null(&mut self, column: &str) -> &mut Self {
        self.push(Connective::And, Pred::Expr(col(column).is_null()))
    }

    pub fn or_is_null(&mut self, column: &str) -> &mut Self {
        self.push(Connective::Or, Pred::Expr(col(column).is_null()))
    }

    pub fn is_not_null(&mut self, column: &str) -> &mut Self {
        self.push(Connective::And, Pred::Expr(col(column).is_not_null()))
    }

    pub fn or_is_not_null(&mut self, column: &str) -> &mut Self {
        self.push(Connective::Or, Pred::Expr(col(column).is_not_null()))
    }

    // =========================================================================
    // Primary-key shortcuts
    // =========================================================================

    pub fn pk_eq(&mut self, key: impl Into<PkKey>) -> &mut Self {
        self.push(
            Connective::And,
            Pred::PkCompare {
                key: key.into(),
                negated: false,
            },
        )
    }

    pub fn or_pk_eq(&mut self, key: impl Into<PkKey>) -> &mut Self {
        self.push(
            Connective::Or,
            Pred::PkCompare {
                key: key.into(),
                negated: false,
            },
        )
    }

    pub fn pk_ne(&mut self, key: impl Into<PkKey>) -> &mut Self {
        self.push(
            Connective::And,
            Pred::PkCompare {
                key: key.into(),
                negated: true,
            },
        )
    }

    pub fn or_pk_ne(&mut self, key: impl Into<PkKey>) -> &mut Self {
        self.push(
            Connective::Or,
            Pred::PkCompare {
                key: key.into(),
                negated: true,
            },
        )
    }

    pub fn pk_in(&mut self, keys: impl IntoIterator<Item = impl Into<PkKey>>) -> &mut Self {
        self.push(
            Connective::And,
            Pred::PkIn {
                keys: keys.into_iter().map(|k| k.into()).collect(),
                negated: false,
            },
        )
    }

    pub fn or_pk_in(&mut self, keys: impl IntoIterator<Item = impl Into<PkKey>>) -> &mut Self {
        self.push(
            Connective::Or,
            Pred::PkIn {
                keys: keys.into_iter().map(|k| k.into()).collect(),
                negated: false,
            },
        )
    }

    pub fn pk_not_in(&mut self, keys: impl IntoIterator<Item = impl Into<PkKey>>) -> &mut Self {
        self.push(
            Connective::And,
            Pred::PkIn {
                keys: keys.into_iter().map(|k| k.into()).collect(),
                negated: true,
            },
        )
    }

    pub fn or_pk_not_in(&mut self, keys: impl IntoIterator<Item = impl Into<PkKey>>) -> &mut Self {
        self.push(
            Connective::Or,
            Pred::PkIn {
                keys: keys.into_iter().map(|k| k.into()).collect(),
                negated: true,
            },
        )
    }

    // =========================================================================
    // Raw predicates, groups, EXISTS
    // =========================================================================

    /// Raw predicate expression.
    pub fn expr(&mut self, e: Expr) -> &mut Self {
        self.push(Connective::And, Pred::Expr(e))
    }

    pub fn or_expr(&mut self, e: Expr) -> &mut Self {
        self.push(Connective::Or, Pred::Expr(e))
    }

    /// Parenthesized sub-condition.
    pub fn group(&mut self, f: impl FnOnce(&mut Cond)) -> &mut Self {
        let mut child = Cond::with_table(self.table.clone());
        f(&mut child);
        self.push(Connective::And, Pred::Group(child))
    }

    pub fn or_group(&mut self, f: impl FnOnce(&mut Cond)) -> &mut Self {
        let mut child = Cond::with_table(self.table.clone());
        f(&mut child);
        self.push(Connective::Or, Pred::Group(child))
    }

    pub fn exists(&mut self, subquery: Select) -> &mut Self {
        self.push(
            Connective::And,
            Pred::Expr(Expr::Exists {
                subquery: Box::new(subquery),
                negated: false,
            }),
        )
    }

    pub fn or_exists(&mut self, subquery: Select) -> &mut Self {
        self.push(
            Connective::Or,
            Pred::Expr(Expr::Exists {
                subquery: Box::new(subquery),
                negated: false,
            }),
        )
    }

    pub fn not_exists(&mut self, subquery: Select) -> &mut Self {
        self.push(
            Connective::And,
            Pred::Expr(Expr::Exists {
                subquery: Box::new(subquery),
                negated: true,
            }),
        )
    }

    pub fn or_not_exists(&mut self, subquery: Select) -> &mut Self {
        self.push(
            Connective::Or,
            Pred::Expr(Expr::Exists {
                subquery: Box::new(subquery),
                negated: true,
            }),
        )
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Render the fragments joined by their connectives. The first
    /// fragment's connective is dropped; fragments that render to nothing
    /// (empty groups) are skipped entirely.
    pub fn to_tokens(&self, ctx: RenderCtx) -> Result<TokenStream> {
        let mut ts = TokenStream::new();
        for (connective, pred) in &self.fragments {
            let frag = self.pred_tokens(pred, ctx)?;
            if frag.is_empty() {
                continue;
            }
            if !ts.is_empty() {
                ts.space()
                    .push(match connective {
                        Connective::And => Token::And,
                        Connective::Or => Token::Or,
                    })
                    .space();
            }
            ts.append(&frag);
        }
        Ok(ts)
    }

    fn pred_tokens(&self, pred: &Pred, ctx: RenderCtx) -> Result<TokenStream> {
        match pred {
            Pred::Expr(e) => e.to_tokens(ctx),

            Pred::Group(child) => {
                let inner = child.to_tokens(ctx)?;
                if inner.is_empty() {
                    return Ok(inner);
                }
                let mut ts = TokenStream::new();
                ts.lparen().append(&inner).rparen();
                Ok(ts)
            }

            Pred::PkCompare { key, negated } => {
                let pks = self.pk_columns()?;
                if key.0.len() != pks.len() {
                    return Err(Error::ArgumentShape(format!(
                        "primary key has {} columns but {} values were given",
                        pks.len(),
                        key.0.len()
                    )));
                }
                let mut ts = TokenStream::new();
                if pks.len() == 1 {
                    ts.append(&col(&pks[0]).to_tokens(ctx)?);
                    ts.space()
                        .push(if *negated { Token::Ne } else { Token::Eq })
                        .space()
                        .bind(key.0[0].clone());
                } else {
                    self.pk_tuple(&mut ts, &pks, ctx)?;
                    ts.space()
                        .push(if *negated { Token::Ne } else { Token::Eq })
                        .space()
                        .lparen();
                    for (i, v) in key.0.iter().enumerate() {
                        if i > 0 {
                            ts.comma();
                        }
                        ts.bind(v.clone());
                    }
                    ts.rparen();
                }
                Ok(ts)
            }

            Pred::PkIn { keys, negated } => {
                let pks = self.pk_columns()?;
                // IN () folds like the expression form
                if keys.is_empty() {
                    let mut ts = TokenStream::new();
                    ts.push(if *negated { Token::True } else { Token::False });
                    return Ok(ts);
                }
                for key in keys {
                    if key.0.len() != pks.len() {
                        return Err(Error::ArgumentShape(format!(
                            "primary key has {} columns but a key with {} values was given",
                            pks.len(),
                            key.0.len()
                        )));
                    }
                }
                let mut ts = TokenStream::new();
                if pks.len() == 1 {
                    ts.append(&col(&pks[0]).to_tokens(ctx)?);
                    if *negated {
                        ts.space().push(Token::Not);
                    }
                    ts.space().push(Token::In).space().lparen();
                    for (i, key) in keys.iter().enumerate() {
                        if i > 0 {
                            ts.comma().space();
                        }
                        ts.bind(key.0[0].clone());
                    }
                    ts.rparen();
                } else {
                    self.pk_tuple(&mut ts, &pks, ctx)?;
                    if *negated {
                        ts.space().push(Token::Not);
                    }
                    ts.space().push(Token::In).space().lparen();
                    for (i, key) in keys.iter().enumerate() {
                        if i > 0 {
                            ts.comma();
                        }
                        ts.lparen();
                        for (j, v) in key.0.iter().enumerate() {
                            if j > 0 {
                                ts.comma();
                            }
                            ts.bind(v.clone());
                        }
                        ts.rparen();
                    }
                    ts.rparen();
                }
                Ok(ts)
            }
        }
    }

    /// `(t.k1,t.k2)` tuple for composite keys.
    fn pk_tuple(&self, ts: &mut TokenStream, pks: &[String], ctx: RenderCtx) -> Result<()> {
        ts.lparen();
        for (i, pk) in pks.iter().enumerate() {
            if i > 0 {
                ts.comma();
            }
            ts.append(&col(pk).to_tokens(ctx)?);
        }
        ts.rparen();
        Ok(())
    }

    fn pk_columns(&self) -> Result<Vec<String>> {
        let table = self
            .table
            .as_ref()
            .ok_or(Error::ModelNotBound("primary-key predicate"))?;
        let pks: Vec<String> = table
            .primary_keys()
            .iter()
            .map(|c| c.name.clone())
            .collect();
        if pks.is_empty() {
            return Err(Error::PkNotBound(table.name.clone()));
        }
        Ok(pks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::schema::ColumnDescriptor;

    fn render(cond: &Cond) -> crate::token::Statement {
        cond.to_tokens(RenderCtx::new(Dialect::Postgres).with_qualifier("u"))
            .unwrap()
            .serialize(Dialect::Postgres)
    }

    fn users() -> TableDescriptor {
        TableDescriptor::new("users")
            .alias("u")
            .column(ColumnDescriptor::new("id").primary_key())
            .column(ColumnDescriptor::new("age"))
    }

    fn tenanted() -> TableDescriptor {
        TableDescriptor::new("members")
            .alias("m")
            .column(ColumnDescriptor::new("tenant_id").primary_key())
            .column(ColumnDescriptor::new("user_id").primary_key())
    }

    #[test]
    fn test_and_by_default_or_explicit() {
        let mut c = Cond::new();
        c.eq("age", 30).or_eq("age", 25).gt("score", 10);
        let stmt = render(&c);
        assert_eq!(
            stmt.sql,
            "\"u\".\"age\" = $1 OR \"u\".\"age\" = $2 AND \"u\".\"score\" > $3"
        );
        assert_eq!(
            stmt.params,
            vec![Value::Int(30), Value::Int(25), Value::Int(10)]
        );
    }

    #[test]
    fn test_first_connective_dropped() {
        let mut c = Cond::new();
        c.or_eq("age", 1);
        assert_eq!(render(&c).sql, "\"u\".\"age\" = $1");
    }

    #[test]
    fn test_empty_renders_nothing() {
        let c = Cond::new();
        assert!(render(&c).sql.is_empty());
    }

    #[test]
    fn test_group() {
        let mut c = Cond::new();
        c.eq("active", true).group(|g| {
            g.eq("age", 30).or_eq("age", 25);
        });
        assert_eq!(
            render(&c).sql,
            "\"u\".\"active\" = $1 AND (\"u\".\"age\" = $2 OR \"u\".\"age\" = $3)"
        );
    }

    #[test]
    fn test_empty_group_skipped() {
        let mut c = Cond::new();
        c.eq("a", 1).group(|_| {}).or_eq("b", 2);
        assert_eq!(render(&c).sql, "\"u\".\"a\" = $1 OR \"u\".\"b\" = $2");
    }

    #[test]
    fn test_column_vs_column() {
        let mut c = Cond::new();
        c.eq_col("u.id", "src.id");
        assert_eq!(render(&c).sql, "\"u\".\"id\" = \"src\".\"id\"");
    }

    #[test]
    fn test_pattern_shortcuts() {
        let mut c = Cond::new();
        c.starts_with("name", "Bo");
        let stmt = render(&c);
        assert_eq!(stmt.sql, "\"u\".\"name\" LIKE $1");
        assert_eq!(stmt.params, vec![Value::from("Bo%")]);

        let mut c = Cond::new();
        c.contains("name", "ob");
        assert_eq!(render(&c).params, vec![Value::from("%ob%")]);
    }

    #[test]
    fn test_pk_eq_single() {
        let mut c = Cond::with_table(Some(users()));
        c.pk_eq(7i64);
        let stmt = render(&c);
        assert_eq!(stmt.sql, "\"u\".\"id\" = $1");
        assert_eq!(stmt.params, vec![Value::Int(7)]);
    }

    #[test]
    fn test_pk_eq_composite() {
        let ctx = RenderCtx::new(Dialect::Postgres).with_qualifier("m");
        let mut c = Cond::with_table(Some(tenanted()));
        c.pk_eq(vec![Value::from("t1"), Value::from("u1")]);
        let stmt = c.to_tokens(ctx).unwrap().serialize(Dialect::Postgres);
        assert_eq!(
            stmt.sql,
            "(\"m\".\"tenant_id\",\"m\".\"user_id\") = ($1,$2)"
        );
    }

    #[test]
    fn test_pk_in_composite() {
        let ctx = RenderCtx::new(Dialect::Postgres).with_qualifier("m");
        let mut c = Cond::with_table(Some(tenanted()));
        c.pk_in(vec![
            vec![Value::from("t1"), Value::from("u1")],
            vec![Value::from("t2"), Value::from("u2")],
        ]);
        let stmt = c.to_tokens(ctx).unwrap().serialize(Dialect::Postgres);
        assert_eq!(
            stmt.sql,
            "(\"m\".\"tenant_id\",\"m\".\"user_id\") IN (($1,$2),($3,$4))"
        );
        assert_eq!(stmt.params.len(), 4);
    }

    #[test]
    fn test_pk_without_model() {
        let mut c = Cond::new();
        c.pk_eq(1i64);
        let err = c
            .to_tokens(RenderCtx::new(Dialect::Postgres))
            .unwrap_err();
        assert!(matches!(err, Error::ModelNotBound(_)));
    }

    #[test]
    fn test_pk_without_primary_key() {
        let table = TableDescriptor::new("logs").column(ColumnDescriptor::new("msg"));
        let mut c = Cond::with_table(Some(table));
        c.pk_eq(1i64);
        let err = c
            .to_tokens(RenderCtx::new(Dialect::Postgres))
            .unwrap_err();
        assert!(matches!(err, Error::PkNotBound(t) if t == "logs"));
    }

    #[test]
    fn test_pk_arity_mismatch() {
        let mut c = Cond::with_table(Some(tenanted()));
        c.pk_eq(1i64);
        let err = c
            .to_tokens(RenderCtx::new(Dialect::Postgres))
            .unwrap_err();
        assert!(matches!(err, Error::ArgumentShape(_)));
    }

    #[test]
    fn test_pk_in_empty_folds() {
        let mut c = Cond::with_table(Some(users()));
        c.pk_in(Vec::<PkKey>::new());
        assert_eq!(render(&c).sql, "FALSE");
    }

    #[test]
    fn test_pk_composite_symmetry_with_manual_and() {
        // pk_eq over (tenant_id, user_id) must bind the same values in the
        // same order as the manual AND-of-equals form
        let ctx = RenderCtx::new(Dialect::Postgres).with_qualifier("m");

        let mut shortcut = Cond::with_table(Some(tenanted()));
        shortcut.pk_eq(vec![Value::from("t1"), Value::from("u1")]);
        let shortcut = shortcut.to_tokens(ctx).unwrap().serialize(Dialect::Postgres);

        let mut manual = Cond::new();
        manual.eq("tenant_id", "t1").eq("user_id", "u1");
        let manual = manual.to_tokens(ctx).unwrap().serialize(Dialect::Postgres);

        assert_eq!(shortcut.params, manual.params);
    }
}
