//! Window function sub-grammar.
//!
//! `OVER (PARTITION BY ... ORDER BY ... frame)` with NULL-handling and
//! FROM FIRST/LAST directionality. Frame bounds are validated at render
//! time: `UNBOUNDED FOLLOWING` cannot start a frame, `UNBOUNDED PRECEDING`
//! cannot end one, and a BETWEEN pair must be ordered. No frame type set
//! means no frame clause, whatever bounds were given.

use crate::clause::{order_by_list, OrderByExpr};
use crate::dialect::{Dialect, SqlDialect};
use crate::error::{Error, Result};
use crate::expr::{lit, val, Expr, RenderCtx};
use crate::token::{Token, TokenStream};

/// Frame type: ROWS, RANGE, or GROUPS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Rows,
    Range,
    /// Peer groups. PostgreSQL only; a hard error elsewhere.
    Groups,
}

/// Frame boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameBound {
    UnboundedPreceding,
    Preceding(u64),
    CurrentRow,
    Following(u64),
    UnboundedFollowing,
}

impl FrameBound {
    /// Logical position for bound-pair ordering:
    /// UNBOUNDED PRECEDING < n PRECEDING < CURRENT ROW < n FOLLOWING <
    /// UNBOUNDED FOLLOWING.
    fn rank(&self) -> u8 {
        match self {
            FrameBound::UnboundedPreceding => 0,
            FrameBound::Preceding(_) => 1,
            FrameBound::CurrentRow => 2,
            FrameBound::Following(_) => 3,
            FrameBound::UnboundedFollowing => 4,
        }
    }

    fn emit(&self, ts: &mut TokenStream) {
        match self {
            FrameBound::UnboundedPreceding => {
                ts.push(Token::Unbounded).space().push(Token::Preceding);
            }
            FrameBound::Preceding(n) => {
                ts.push(Token::LitInt(*n as i64)).space().push(Token::Preceding);
            }
            FrameBound::CurrentRow => {
                ts.push(Token::CurrentRow);
            }
            FrameBound::Following(n) => {
                ts.push(Token::LitInt(*n as i64)).space().push(Token::Following);
            }
            FrameBound::UnboundedFollowing => {
                ts.push(Token::Unbounded).space().push(Token::Following);
            }
        }
    }
}

/// NULL-handling mode for value functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsMode {
    Ignore,
    Respect,
}

/// FROM FIRST / FROM LAST directionality (NTH_VALUE, Oracle only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FromDir {
    First,
    Last,
}

/// A fully-specified window function expression.
#[derive(Debug, Clone)]
pub struct WindowSpec {
    pub function: Expr,
    pub nulls: Option<NullsMode>,
    pub from_dir: Option<FromDir>,
    pub partition_by: Vec<Expr>,
    pub order_by: Vec<OrderByExpr>,
    pub frame_kind: Option<FrameKind>,
    pub frame_start: Option<FrameBound>,
    pub frame_end: Option<FrameBound>,
}

impl WindowSpec {
    pub fn to_tokens(&self, ctx: RenderCtx) -> Result<TokenStream> {
        let d = ctx.dialect;
        self.validate(d)?;

        let mut ts = TokenStream::new();

        ts.append(&self.function.to_tokens(ctx)?);

        // IGNORE/RESPECT NULLS: Oracle and SQL Server spell it; the
        // PostgreSQL family has no syntax for it and the caller is
        // documented to expect the default behavior there
        if let Some(nulls) = &self.nulls {
            if d.supports_nulls_ignore() {
                ts.space().push(match nulls {
                    NullsMode::Ignore => Token::IgnoreNulls,
                    NullsMode::Respect => Token::RespectNulls,
                });
            }
        }

        // FROM FIRST/LAST: Oracle only, omitted elsewhere
        if let Some(dir) = &self.from_dir {
            if d.supports_from_first_last() {
                ts.space().push(match dir {
                    FromDir::First => Token::FromFirst,
                    FromDir::Last => Token::FromLast,
                });
            }
        }

        ts.space().push(Token::Over).space().lparen();

        let mut need_space = false;

        if !self.partition_by.is_empty() {
            ts.push(Token::PartitionBy).space();
            for (i, expr) in self.partition_by.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.append(&expr.to_tokens(ctx)?);
            }
            need_space = true;
        }

        if !self.order_by.is_empty() {
            if need_space {
                ts.space();
            }
            ts.push(Token::OrderBy).space();
            ts.append(&order_by_list(&self.order_by, ctx)?);
            need_space = true;
        }

        // Bounds without a frame type are ignored by design
        if let Some(kind) = self.frame_kind {
            let start = self
                .frame_start
                .as_ref()
                .ok_or_else(|| Error::InvalidFrameBounds("frame type set without a start bound".into()))?;

            if need_space {
                ts.space();
            }
            ts.push(match kind {
                FrameKind::Rows => Token::Rows,
                FrameKind::Range => Token::Range,
                FrameKind::Groups => Token::Groups,
            });
            ts.space();

            if let Some(end) = &self.frame_end {
                ts.push(Token::Between).space();
                start.emit(&mut ts);
                ts.space().push(Token::And).space();
                end.emit(&mut ts);
            } else {
                start.emit(&mut ts);
            }
        }

        ts.rparen();
        Ok(ts)
    }

    fn validate(&self, dialect: Dialect) -> Result<()> {
        if self.frame_kind == Some(FrameKind::Groups) && !dialect.supports_groups_frame() {
            return Err(Error::unsupported("GROUPS window frame", dialect));
        }

        if self.frame_kind.is_some() {
            if let Some(start) = &self.frame_start {
                if matches!(start, FrameBound::UnboundedFollowing) {
                    return Err(Error::InvalidFrameBounds(
                        "UNBOUNDED FOLLOWING cannot start a frame".into(),
                    ));
                }
                if let Some(end) = &self.frame_end {
                    if matches!(end, FrameBound::UnboundedPreceding) {
                        return Err(Error::InvalidFrameBounds(
                            "UNBOUNDED PRECEDING cannot end a frame".into(),
                        ));
                    }
                    if start.rank() > end.rank() {
                        return Err(Error::InvalidFrameBounds(format!(
                            "frame start {start:?} is past frame end {end:?}"
                        )));
                    }
                }
            }
        }

        // Arity checks for value functions that carry a mandatory n
        if let Expr::Function { name, args, .. } = &self.function {
            match name.as_str() {
                "NTH_VALUE" => {
                    let n = args.get(1).ok_or(Error::ArgumentShape(
                        "nth_value requires n".into(),
                    ))?;
                    if nonpositive_int(n) {
                        return Err(Error::ArgumentShape("nth_value requires n >= 1".into()));
                    }
                }
                "NTILE" => {
                    if args.first().is_some_and(nonpositive_int) {
                        return Err(Error::ArgumentShape("ntile requires n >= 1".into()));
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }
}

fn nonpositive_int(e: &Expr) -> bool {
    matches!(
        e,
        Expr::Literal(crate::value::Value::Int(n)) | Expr::Bind(crate::value::Value::Int(n)) if *n < 1
    )
}

// =============================================================================
// Window builder
// =============================================================================

/// Builder for window function expressions.
#[derive(Debug, Clone)]
#[must_use = "WindowBuilder has no effect until build() is called"]
pub struct WindowBuilder {
    spec: WindowSpec,
}

impl WindowBuilder {
    /// Start a window over the given function.
    pub fn new(function: Expr) -> Self {
        Self {
            spec: WindowSpec {
                function,
                nulls: None,
                from_dir: None,
                partition_by: Vec::new(),
                order_by: Vec::new(),
                frame_kind: None,
                frame_start: None,
                frame_end: None,
            },
        }
    }

    /// Add a PARTITION BY expression.
    pub fn partition_by(mut self, expr: impl Into<Expr>) -> Self {
        self.spec.partition_by.push(expr.into());
        self
    }

    /// Add an ascending ORDER BY entry.
    pub fn order_by(mut self, expr: impl Into<Expr>) -> Self {
        self.spec.order_by.push(OrderByExpr::asc(expr.into()));
        self
    }

    /// Add a descending ORDER BY entry.
    pub fn order_by_desc(mut self, expr: impl Into<Expr>) -> Self {
        self.spec.order_by.push(OrderByExpr::desc(expr.into()));
        self
    }

    /// Add a fully-specified ORDER BY entry.
    pub fn order_by_expr(mut self, entry: OrderByExpr) -> Self {
        self.spec.order_by.push(entry);
        self
    }

    /// Use a ROWS frame.
    pub fn rows(mut self) -> Self {
        self.spec.frame_kind = Some(FrameKind::Rows);
        self
    }

    /// Use a RANGE frame.
    pub fn range(mut self) -> Self {
        self.spec.frame_kind = Some(FrameKind::Range);
        self
    }

    /// Use a GROUPS frame (PostgreSQL only).
    pub fn groups(mut self) -> Self {
        self.spec.frame_kind = Some(FrameKind::Groups);
        self
    }

    /// Set a single start bound.
    pub fn start(mut self, bound: FrameBound) -> Self {
        self.spec.frame_start = Some(bound);
        self.spec.frame_end = None;
        self
    }

    /// Set a BETWEEN start AND end bound pair.
    pub fn between(mut self, start: FrameBound, end: FrameBound) -> Self {
        self.spec.frame_start = Some(start);
        self.spec.frame_end = Some(end);
        self
    }

    /// ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW (running aggregate).
    pub fn rows_to_current(self) -> Self {
        self.rows()
            .between(FrameBound::UnboundedPreceding, FrameBound::CurrentRow)
    }

    /// Skip NULLs (Oracle / SQL Server syntax; omitted elsewhere).
    pub fn ignore_nulls(mut self) -> Self {
        self.spec.nulls = Some(NullsMode::Ignore);
        self
    }

    /// Keep NULLs explicitly.
    pub fn respect_nulls(mut self) -> Self {
        self.spec.nulls = Some(NullsMode::Respect);
        self
    }

    /// Count from the first row (Oracle syntax; omitted elsewhere).
    pub fn from_first(mut self) -> Self {
        self.spec.from_dir = Some(FromDir::First);
        self
    }

    /// Count from the last row (Oracle syntax; omitted elsewhere).
    pub fn from_last(mut self) -> Self {
        self.spec.from_dir = Some(FromDir::Last);
        self
    }

    /// Flatten to an expression.
    pub fn build(self) -> Expr {
        Expr::WindowFunction(Box::new(self.spec))
    }
}

/// Extension trait for adding an OVER clause to a function expression.
pub trait WindowExt: Sized {
    fn over(self) -> WindowBuilder;
}

impl WindowExt for Expr {
    fn over(self) -> WindowBuilder {
        WindowBuilder::new(self)
    }
}

impl From<WindowBuilder> for Expr {
    fn from(b: WindowBuilder) -> Self {
        b.build()
    }
}

// =============================================================================
// Ranking and value functions
// =============================================================================

/// ROW_NUMBER()
pub fn row_number() -> Expr {
    crate::expr::func("ROW_NUMBER", vec![])
}

/// RANK()
pub fn rank() -> Expr {
    crate::expr::func("RANK", vec![])
}

/// DENSE_RANK()
pub fn dense_rank() -> Expr {
    crate::expr::func("DENSE_RANK", vec![])
}

/// PERCENT_RANK()
pub fn percent_rank() -> Expr {
    crate::expr::func("PERCENT_RANK", vec![])
}

/// CUME_DIST()
pub fn cume_dist() -> Expr {
    crate::expr::func("CUME_DIST", vec![])
}

/// NTILE(n)
pub fn ntile(n: u64) -> Expr {
    crate::expr::func("NTILE", vec![lit(n as i64)])
}

/// LAG(expr) with the default offset of 1 and a NULL default.
pub fn lag(expr: Expr) -> Expr {
    crate::expr::func("LAG", vec![expr])
}

/// LAG(expr, offset)
pub fn lag_offset(expr: Expr, offset: i64) -> Expr {
    crate::expr::func("LAG", vec![expr, lit(offset)])
}

/// LAG(expr, offset, default)
pub fn lag_default(expr: Expr, offset: i64, default: impl Into<crate::value::Value>) -> Expr {
    crate::expr::func("LAG", vec![expr, lit(offset), val(default)])
}

/// LEAD(expr) with the default offset of 1 and a NULL default.
pub fn lead(expr: Expr) -> Expr {
    crate::expr::func("LEAD", vec![expr])
}

/// LEAD(expr, offset)
pub fn lead_offset(expr: Expr, offset: i64) -> Expr {
    crate::expr::func("LEAD", vec![expr, lit(offset)])
}

/// LEAD(expr, offset, default)
pub fn lead_default(expr: Expr, offset: i64, default: impl Into<crate::value::Value>) -> Expr {
    crate::expr::func("LEAD", vec![expr, lit(offset), val(default)])
}

/// FIRST_VALUE(expr)
pub fn first_value(expr: Expr) -> Expr {
    crate::expr::func("FIRST_VALUE", vec![expr])
}

/// LAST_VALUE(expr)
pub fn last_value(expr: Expr) -> Expr {
    crate::expr::func("LAST_VALUE", vec![expr])
}

/// NTH_VALUE(expr, n). `n` must be at least 1; zero fails at render time.
pub fn nth_value(expr: Expr, n: u64) -> Expr {
    crate::expr::func("NTH_VALUE", vec![expr, lit(n as i64)])
}
