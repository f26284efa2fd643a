//! Aggregate call builder.
//!
//! An [`AggCall`] is an aggregate application with the optional trimmings:
//! DISTINCT, an inner ORDER BY, a FILTER (WHERE ...) clause, and a
//! separator for string aggregation. String aggregation renders in the
//! dialect-native spelling: STRING_AGG, GROUP_CONCAT ... SEPARATOR, or
//! LISTAGG ... WITHIN GROUP.

use crate::clause::{order_by_list, OrderByExpr};
use crate::cond::Cond;
use crate::dialect::Dialect::{MySql, Oracle, Postgres, Sqlite, SqlServer};
use crate::dialect::DialectCase::{AnyOf, Only};
use crate::dialect::{run_for_dialect, Dialect, SqlDialect};
use crate::error::{Error, Result};
use crate::expr::{Expr, ExprExt, RenderCtx};
use crate::token::{Token, TokenStream};
use crate::value::Value;
use crate::window::WindowBuilder;

/// The aggregate function being applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggKind {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    StringAgg,
    ArrayAgg,
    Stddev,
    Variance,
    JsonObjectAgg,
    JsonArrayAgg,
    BitOr,
    BitAnd,
    BoolOr,
    BoolAnd,
}

/// An aggregate call under fluent construction.
#[derive(Debug, Clone)]
#[must_use = "builders have no effect until used"]
pub struct AggCall {
    kind: AggKind,
    args: Vec<Expr>,
    distinct: bool,
    order_by: Vec<OrderByExpr>,
    filter: Option<Cond>,
    separator: Option<String>,
}

impl AggCall {
    fn new(kind: AggKind, args: Vec<Expr>) -> Self {
        Self {
            kind,
            args,
            distinct: false,
            order_by: Vec::new(),
            filter: None,
            separator: None,
        }
    }

    /// Aggregate distinct inputs only.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Order inputs inside the aggregate.
    pub fn order_by(mut self, entry: impl Into<OrderByExpr>) -> Self {
        self.order_by.push(entry.into());
        self
    }

    /// Restrict aggregated rows with FILTER (WHERE ...). Hard error on
    /// dialects without the FILTER clause.
    pub fn filter_where(mut self, f: impl FnOnce(&mut Cond)) -> Self {
        let mut cond = self.filter.take().unwrap_or_default();
        f(&mut cond);
        self.filter = Some(cond);
        self
    }

    /// Separator for string aggregation. Defaults to `,`.
    pub fn separator(mut self, sep: &str) -> Self {
        self.separator = Some(sep.into());
        self
    }

    /// Skip NULL inputs. GROUP_CONCAT and LISTAGG already do; elsewhere
    /// this folds into the FILTER clause.
    pub fn ignore_nulls(mut self) -> Self {
        if let Some(arg) = self.args.first().cloned() {
            let mut cond = self.filter.take().unwrap_or_default();
            cond.expr(arg.is_not_null());
            self.filter = Some(cond);
        }
        self
    }

    /// Start a window specification over this aggregate.
    pub fn over(self) -> WindowBuilder {
        WindowBuilder::new(Expr::Agg(Box::new(self)))
    }

    fn function_name(&self, dialect: Dialect) -> Result<&'static str> {
        match self.kind {
            AggKind::Count => Ok("COUNT"),
            AggKind::Sum => Ok("SUM"),
            AggKind::Avg => Ok("AVG"),
            AggKind::Min => Ok("MIN"),
            AggKind::Max => Ok("MAX"),
            AggKind::StringAgg => run_for_dialect(
                "string_agg",
                dialect,
                [
                    (AnyOf(&[Postgres, SqlServer]), "STRING_AGG"),
                    (AnyOf(&[MySql, Sqlite]), "GROUP_CONCAT"),
                    (Only(Oracle), "LISTAGG"),
                ],
            ),
            AggKind::ArrayAgg => {
                run_for_dialect("array_agg", dialect, [(Only(Postgres), "ARRAY_AGG")])
            }
            AggKind::Stddev => run_for_dialect(
                "stddev",
                dialect,
                [(AnyOf(&[Postgres, MySql, Oracle, SqlServer]), "STDDEV")],
            ),
            AggKind::Variance => run_for_dialect(
                "variance",
                dialect,
                [(AnyOf(&[Postgres, MySql, Oracle, SqlServer]), "VARIANCE")],
            ),
            AggKind::JsonObjectAgg => run_for_dialect(
                "json_object_agg",
                dialect,
                [
                    (Only(Postgres), "JSON_OBJECT_AGG"),
                    (Only(MySql), "JSON_OBJECTAGG"),
                    (Only(Sqlite), "JSON_GROUP_OBJECT"),
                ],
            ),
            AggKind::JsonArrayAgg => run_for_dialect(
                "json_array_agg",
                dialect,
                [
                    (Only(Postgres), "JSON_AGG"),
                    (Only(MySql), "JSON_ARRAYAGG"),
                    (Only(Sqlite), "JSON_GROUP_ARRAY"),
                ],
            ),
            AggKind::BitOr => run_for_dialect(
                "bit_or",
                dialect,
                [(AnyOf(&[Postgres, MySql]), "BIT_OR")],
            ),
            AggKind::BitAnd => run_for_dialect(
                "bit_and",
                dialect,
                [(AnyOf(&[Postgres, MySql]), "BIT_AND")],
            ),
            AggKind::BoolOr => run_for_dialect("bool_or", dialect, [(Only(Postgres), "BOOL_OR")]),
            AggKind::BoolAnd => {
                run_for_dialect("bool_and", dialect, [(Only(Postgres), "BOOL_AND")])
            }
        }
    }

    pub fn to_tokens(&self, ctx: RenderCtx) -> Result<TokenStream> {
        let d = ctx.dialect;
        let name = self.function_name(d)?;
        let is_string_agg = self.kind == AggKind::StringAgg;

        if is_string_agg && self.distinct && d == SqlServer {
            return Err(Error::unsupported("string_agg distinct", d));
        }

        let mut ts = TokenStream::new();
        ts.push(Token::FunctionName(name.into())).lparen();

        if self.distinct {
            ts.push(Token::Distinct).space();
        }

        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                ts.comma().space();
            }
            ts.append(&arg.to_tokens(ctx)?);
        }

        // Separator argument placement differs per spelling
        if is_string_agg && !matches!(d, MySql) {
            let sep = self.separator.clone().unwrap_or_else(|| ",".into());
            ts.comma().space().push(Token::Lit(Value::Str(sep)));
        }

        // Inner ORDER BY (PostgreSQL / MySQL style)
        let ordered = !self.order_by.is_empty();
        if ordered && matches!(d, Postgres | MySql | Sqlite) {
            ts.space().push(Token::OrderBy).space();
            ts.append(&order_by_list(&self.order_by, ctx)?);
        }

        if is_string_agg && d == MySql {
            let sep = self.separator.clone().unwrap_or_else(|| ",".into());
            ts.space()
                .push(Token::Separator)
                .space()
                .push(Token::Lit(Value::Str(sep)));
        }

        ts.rparen();

        // WITHIN GROUP (ORDER BY ...) for LISTAGG / T-SQL STRING_AGG
        if is_string_agg && matches!(d, Oracle | SqlServer) {
            if d == Oracle || ordered {
                ts.space().push(Token::WithinGroup).space().lparen();
                ts.push(Token::OrderBy).space();
                if ordered {
                    ts.append(&order_by_list(&self.order_by, ctx)?);
                } else {
                    // LISTAGG requires WITHIN GROUP; order by the input
                    let arg = self
                        .args
                        .first()
                        .ok_or(Error::ArgumentShape("string_agg requires an argument".into()))?;
                    ts.append(&arg.to_tokens(ctx)?);
                }
                ts.rparen();
            }
        }

        // FILTER (WHERE ...)
        if let Some(filter) = &self.filter {
            if !filter.is_empty() {
                if !d.supports_aggregate_filter() {
                    return Err(Error::unsupported("aggregate filter", d));
                }
                ts.space().push(Token::Filter).space().lparen();
                ts.push(Token::Where).space();
                ts.append(&filter.to_tokens(ctx)?);
                ts.rparen();
            }
        }

        Ok(ts)
    }
}

impl ExprExt for AggCall {
    fn into_expr(self) -> Expr {
        Expr::Agg(Box::new(self))
    }
}

impl From<AggCall> for Expr {
    fn from(call: AggCall) -> Self {
        Expr::Agg(Box::new(call))
    }
}

// =============================================================================
// Constructors
// =============================================================================

/// COUNT(expr)
pub fn count(expr: Expr) -> AggCall {
    AggCall::new(AggKind::Count, vec![expr])
}

/// COUNT(*)
pub fn count_star() -> AggCall {
    AggCall::new(AggKind::Count, vec![crate::expr::star()])
}

/// COUNT(DISTINCT expr)
pub fn count_distinct(expr: Expr) -> AggCall {
    count(expr).distinct()
}

/// SUM(expr)
pub fn sum(expr: Expr) -> AggCall {
    AggCall::new(AggKind::Sum, vec![expr])
}

/// AVG(expr)
pub fn avg(expr: Expr) -> AggCall {
    AggCall::new(AggKind::Avg, vec![expr])
}

/// MIN(expr)
pub fn min(expr: Expr) -> AggCall {
    AggCall::new(AggKind::Min, vec![expr])
}

/// MAX(expr)
pub fn max(expr: Expr) -> AggCall {
    AggCall::new(AggKind::Max, vec![expr])
}

/// String aggregation with a separator (STRING_AGG / GROUP_CONCAT / LISTAGG).
pub fn string_agg(expr: Expr) -> AggCall {
    AggCall::new(AggKind::StringAgg, vec![expr])
}

/// ARRAY_AGG(expr) (PostgreSQL).
pub fn array_agg(expr: Expr) -> AggCall {
    AggCall::new(AggKind::ArrayAgg, vec![expr])
}

/// STDDEV(expr)
pub fn stddev(expr: Expr) -> AggCall {
    AggCall::new(AggKind::Stddev, vec![expr])
}

/// VARIANCE(expr)
pub fn variance(expr: Expr) -> AggCall {
    AggCall::new(AggKind::Variance, vec![expr])
}

/// JSON object aggregation from key/value expressions.
pub fn json_object_agg(key: Expr, value: Expr) -> AggCall {
    AggCall::new(AggKind::JsonObjectAgg, vec![key, value])
}

/// JSON array aggregation.
pub fn json_array_agg(expr: Expr) -> AggCall {
    AggCall::new(AggKind::JsonArrayAgg, vec![expr])
}

/// BIT_OR(expr)
pub fn bit_or(expr: Expr) -> AggCall {
    AggCall::new(AggKind::BitOr, vec![expr])
}

/// BIT_AND(expr)
pub fn bit_and(expr: Expr) -> AggCall {
    AggCall::new(AggKind::BitAnd, vec![expr])
}

/// BOOL_OR(expr)
pub fn bool_or(expr: Expr) -> AggCall {
    AggCall::new(AggKind::BoolOr, vec![expr])
}

/// BOOL_AND(expr)
pub fn bool_and(expr: Expr) -> AggCall {
    AggCall::new(AggKind::BoolAnd, vec![expr])
}
