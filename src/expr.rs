//! Expression AST - the core of SQL expression building.
//!
//! A strongly-typed AST for SQL expressions with exhaustive pattern
//! matching enforced by the compiler. Values flow into expressions as
//! bound parameters by default ([`Expr::Bind`]); inline literals are the
//! exception and must be requested explicitly with [`lit`].
//!
//! Rendering threads a [`RenderCtx`] down the tree: expressions hold no
//! back-reference to their enclosing statement, they borrow the context
//! only while producing tokens.

use crate::agg::AggCall;
use crate::dialect::{Dialect, SqlDialect};
use crate::error::{Error, Result};
use crate::funcs::{DateTimeFn, JsonFn};
use crate::token::{Token, TokenStream};
use crate::value::Value;
use crate::window::WindowSpec;

// =============================================================================
// Render context
// =============================================================================

/// Context borrowed by expression nodes during rendering.
///
/// `qualifier` is the enclosing statement's primary-table alias; bare
/// column references resolve against it.
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx<'a> {
    pub dialect: Dialect,
    pub qualifier: Option<&'a str>,
    /// Emulate NULLS FIRST/LAST with a CASE key on dialects that lack it.
    pub emulate_nulls_ordering: bool,
}

impl<'a> RenderCtx<'a> {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            qualifier: None,
            emulate_nulls_ordering: false,
        }
    }

    pub fn with_qualifier(mut self, qualifier: &'a str) -> Self {
        self.qualifier = Some(qualifier);
        self
    }

    pub fn without_qualifier(mut self) -> Self {
        self.qualifier = None;
        self
    }
}

// =============================================================================
// Expression AST
// =============================================================================

/// A SQL expression.
///
/// Every variant must be handled in `to_tokens()` - the compiler enforces
/// this.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Column reference: optional_qualifier.column. A bare column binds to
    /// the statement's primary-table alias at render time.
    Column {
        table: Option<String>,
        column: String,
    },

    /// A quoted bare identifier (no qualifier resolution).
    Ident(String),

    /// Inline literal value.
    Literal(Value),

    /// Placeholder-bound value.
    Bind(Value),

    /// Binary operation: left op right
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },

    /// Unary operation: op expr
    UnaryOp { op: UnaryOperator, expr: Box<Expr> },

    /// Function call: name(args...)
    Function {
        name: String,
        args: Vec<Expr>,
        distinct: bool,
    },

    /// Aggregate call with DISTINCT / ORDER BY / FILTER / separator.
    Agg(Box<AggCall>),

    /// Date/time function, translated per dialect.
    DateTime(Box<DateTimeFn>),

    /// JSON function, translated per dialect.
    Json(Box<JsonFn>),

    /// CASE [operand] WHEN ... THEN ... ELSE ... END
    Case {
        operand: Option<Box<Expr>>,
        when_clauses: Vec<(Expr, Expr)>,
        else_clause: Option<Box<Expr>>,
    },

    /// Scalar subquery: (SELECT ...)
    Subquery(Box<crate::stmt::Select>),

    /// IN: expr IN (values...)
    In {
        expr: Box<Expr>,
        values: Vec<Expr>,
        negated: bool,
    },

    /// IN subquery: expr IN (SELECT ...)
    InSubquery {
        expr: Box<Expr>,
        subquery: Box<crate::stmt::Select>,
        negated: bool,
    },

    /// BETWEEN: expr BETWEEN low AND high
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },

    /// IS NULL / IS NOT NULL
    IsNull { expr: Box<Expr>, negated: bool },

    /// LIKE / ILIKE. The case-insensitive form renders ILIKE on PostgreSQL
    /// and LOWER(a) LIKE LOWER(b) elsewhere.
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        case_insensitive: bool,
        negated: bool,
    },

    /// LIKE with ESCAPE: expr LIKE pattern ESCAPE escape_char
    LikeEscape {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        escape_char: char,
        negated: bool,
    },

    /// EXISTS (SELECT ...)
    Exists {
        subquery: Box<crate::stmt::Select>,
        negated: bool,
    },

    /// Wildcard: * or table.*
    Star { table: Option<String> },

    /// Parenthesized expression
    Paren(Box<Expr>),

    /// Window function expression.
    WindowFunction(Box<WindowSpec>),

    /// Format-string fragment: `?` marks interpolation points, one
    /// argument per marker. `?.?` with two identifier arguments renders a
    /// quoted qualified name.
    Template { fmt: String, args: Vec<Expr> },

    /// Raw SQL passed directly to output without escaping.
    ///
    /// # Security Warning
    ///
    /// **Never pass user input to this variant.** Raw SQL is not sanitized
    /// and can lead to SQL injection vulnerabilities. For user-provided
    /// values, use [`Expr::Bind`].
    Raw(String),
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    // Logical
    And,
    Or,
    // Arithmetic
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
    // String
    Concat,
    /// PostgreSQL jsonb containment.
    JsonContains,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Minus,
}

// =============================================================================
// Expression to tokens
// =============================================================================

impl Expr {
    /// Convert this expression to a token stream for the given context.
    ///
    /// Rendering is deterministic: two identical trees produce identical
    /// tokens. The first untranslatable construct aborts with an error.
    pub fn to_tokens(&self, ctx: RenderCtx) -> Result<TokenStream> {
        let mut ts = TokenStream::new();

        match self {
            Expr::Column { table, column } => match table.as_deref().or(ctx.qualifier) {
                Some(q) => {
                    ts.push(Token::QualifiedIdent {
                        qualifier: q.into(),
                        name: column.clone(),
                    });
                }
                None => {
                    ts.push(Token::Ident(column.clone()));
                }
            },

            Expr::Ident(name) => {
                ts.push(Token::Ident(name.clone()));
            }

            Expr::Literal(v) => {
                ts.push(Token::Lit(v.clone()));
            }

            Expr::Bind(v) => {
                ts.push(Token::Bind(v.clone()));
            }

            Expr::BinaryOp { left, op, right } => {
                // CONCAT becomes a function call on dialects without the
                // || operator (MySQL treats || as logical OR)
                if *op == BinaryOperator::Concat && !ctx.dialect.supports_concat_operator() {
                    ts.push(Token::FunctionName("CONCAT".into()));
                    ts.lparen();
                    ts.append(&left.to_tokens(ctx)?);
                    ts.comma().space();
                    ts.append(&right.to_tokens(ctx)?);
                    ts.rparen();
                } else {
                    ts.append(&left.to_tokens(ctx)?);
                    ts.space();
                    ts.push(binary_op_to_token(*op));
                    ts.space();
                    ts.append(&right.to_tokens(ctx)?);
                }
            }

            Expr::UnaryOp { op, expr } => {
                ts.push(match op {
                    UnaryOperator::Not => Token::Not,
                    UnaryOperator::Minus => Token::Minus,
                });
                ts.space();
                ts.append(&expr.to_tokens(ctx)?);
            }

            Expr::Function {
                name,
                args,
                distinct,
            } => {
                ts.push(Token::FunctionName(name.clone()));
                ts.lparen();
                if *distinct {
                    ts.push(Token::Distinct).space();
                }
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    ts.append(&arg.to_tokens(ctx)?);
                }
                ts.rparen();
            }

            Expr::Agg(call) => {
                ts.append(&call.to_tokens(ctx)?);
            }

            Expr::DateTime(f) => {
                ts.append(&f.to_tokens(ctx)?);
            }

            Expr::Json(f) => {
                ts.append(&f.to_tokens(ctx)?);
            }

            Expr::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                ts.push(Token::Case);
                if let Some(op) = operand {
                    ts.space().append(&op.to_tokens(ctx)?);
                }
                for (when, then) in when_clauses {
                    ts.space().push(Token::When).space();
                    ts.append(&when.to_tokens(ctx)?);
                    ts.space().push(Token::Then).space();
                    ts.append(&then.to_tokens(ctx)?);
                }
                if let Some(else_expr) = else_clause {
                    ts.space().push(Token::Else).space();
                    ts.append(&else_expr.to_tokens(ctx)?);
                }
                ts.space().push(Token::End);
            }

            Expr::Subquery(select) => {
                ts.lparen();
                ts.append(&select.to_tokens_with(ctx)?);
                ts.rparen();
            }

            Expr::In {
                expr,
                values,
                negated,
            } => {
                // "x IN ()" is invalid SQL: fold to FALSE, negated to TRUE
                if values.is_empty() {
                    ts.push(if *negated { Token::True } else { Token::False });
                } else {
                    ts.append(&expr.to_tokens(ctx)?);
                    if *negated {
                        ts.space().push(Token::Not);
                    }
                    ts.space().push(Token::In).space().lparen();
                    for (i, val) in values.iter().enumerate() {
                        if i > 0 {
                            ts.comma().space();
                        }
                        ts.append(&val.to_tokens(ctx)?);
                    }
                    ts.rparen();
                }
            }

            Expr::InSubquery {
                expr,
                subquery,
                negated,
            } => {
                ts.append(&expr.to_tokens(ctx)?);
                if *negated {
                    ts.space().push(Token::Not);
                }
                ts.space().push(Token::In).space().lparen();
                ts.append(&subquery.to_tokens_with(ctx)?);
                ts.rparen();
            }

            Expr::Between {
                expr,
                low,
                high,
                negated,
            } => {
                ts.append(&expr.to_tokens(ctx)?);
                if *negated {
                    ts.space().push(Token::Not);
                }
                ts.space().push(Token::Between).space();
                ts.append(&low.to_tokens(ctx)?);
                ts.space().push(Token::And).space();
                ts.append(&high.to_tokens(ctx)?);
            }

            Expr::IsNull { expr, negated } => {
                ts.append(&expr.to_tokens(ctx)?);
                ts.space();
                ts.push(if *negated {
                    Token::IsNotNull
                } else {
                    Token::IsNull
                });
            }

            Expr::Like {
                expr,
                pattern,
                case_insensitive,
                negated,
            } => {
                if *case_insensitive && !ctx.dialect.supports_ilike() {
                    // LOWER(a) [NOT] LIKE LOWER(p)
                    ts.push(Token::FunctionName("LOWER".into()));
                    ts.lparen().append(&expr.to_tokens(ctx)?);
                    ts.rparen();
                    if *negated {
                        ts.space().push(Token::Not);
                    }
                    ts.space().push(Token::Like).space();
                    ts.push(Token::FunctionName("LOWER".into()));
                    ts.lparen().append(&pattern.to_tokens(ctx)?);
                    ts.rparen();
                } else {
                    ts.append(&expr.to_tokens(ctx)?);
                    if *negated {
                        ts.space().push(Token::Not);
                    }
                    ts.space();
                    ts.push(if *case_insensitive {
                        Token::ILike
                    } else {
                        Token::Like
                    });
                    ts.space().append(&pattern.to_tokens(ctx)?);
                }
            }

            Expr::LikeEscape {
                expr,
                pattern,
                escape_char,
                negated,
            } => {
                ts.append(&expr.to_tokens(ctx)?);
                if *negated {
                    ts.space().push(Token::Not);
                }
                ts.space()
                    .push(Token::Like)
                    .space()
                    .append(&pattern.to_tokens(ctx)?)
                    .space()
                    .push(Token::Escape)
                    .space()
                    .push(Token::Lit(Value::Str(escape_char.to_string())));
            }

            Expr::Exists { subquery, negated } => {
                if *negated {
                    ts.push(Token::Not).space();
                }
                ts.push(Token::Exists).space().lparen();
                ts.append(&subquery.to_tokens_with(ctx)?);
                ts.rparen();
            }

            // A bare star stays bare; only an explicit table_star qualifies
            Expr::Star { table } => match table {
                Some(t) => {
                    ts.push(Token::Ident(t.clone()));
                    ts.push(Token::Dot);
                    ts.push(Token::Star);
                }
                None => {
                    ts.push(Token::Star);
                }
            },

            Expr::Paren(inner) => {
                ts.lparen();
                ts.append(&inner.to_tokens(ctx)?);
                ts.rparen();
            }

            Expr::WindowFunction(spec) => {
                ts.append(&spec.to_tokens(ctx)?);
            }

            Expr::Template { fmt, args } => {
                let slots = fmt.matches('?').count();
                if slots != args.len() {
                    return Err(Error::ArgumentShape(format!(
                        "template {fmt:?} has {slots} slots but {} arguments",
                        args.len()
                    )));
                }
                let mut parts = fmt.split('?');
                if let Some(first) = parts.next() {
                    if !first.is_empty() {
                        ts.push(Token::Raw(first.into()));
                    }
                }
                for (arg, tail) in args.iter().zip(parts) {
                    ts.append(&arg.to_tokens(ctx)?);
                    if !tail.is_empty() {
                        ts.push(Token::Raw(tail.into()));
                    }
                }
            }

            Expr::Raw(sql) => {
                ts.push(Token::Raw(sql.clone()));
            }
        }

        Ok(ts)
    }
}

fn binary_op_to_token(op: BinaryOperator) -> Token {
    match op {
        BinaryOperator::Eq => Token::Eq,
        BinaryOperator::Ne => Token::Ne,
        BinaryOperator::Lt => Token::Lt,
        BinaryOperator::Gt => Token::Gt,
        BinaryOperator::Lte => Token::Lte,
        BinaryOperator::Gte => Token::Gte,
        BinaryOperator::And => Token::And,
        BinaryOperator::Or => Token::Or,
        BinaryOperator::Plus => Token::Plus,
        BinaryOperator::Minus => Token::Minus,
        BinaryOperator::Mul => Token::Mul,
        BinaryOperator::Div => Token::Div,
        BinaryOperator::Mod => Token::Mod,
        BinaryOperator::Concat => Token::Concat,
        BinaryOperator::JsonContains => Token::JsonContains,
    }
}

// =============================================================================
// Expression constructors
// =============================================================================

/// Create a column reference. A dotted name like `"u.name"` binds to the
/// explicit qualifier; a bare name binds to the statement's primary-table
/// alias at render time.
pub fn col(name: &str) -> Expr {
    match name.split_once('.') {
        Some((table, column)) => Expr::Column {
            table: Some(table.into()),
            column: column.into(),
        },
        None => Expr::Column {
            table: None,
            column: name.into(),
        },
    }
}

/// Create a qualified column reference (table.column).
pub fn table_col(table: &str, column: &str) -> Expr {
    Expr::Column {
        table: Some(table.into()),
        column: column.into(),
    }
}

/// Create a quoted bare identifier (no qualifier resolution).
pub fn ident(name: &str) -> Expr {
    Expr::Ident(name.into())
}

/// Create a bound-parameter expression. This is the parameter-safe default
/// for user-provided values.
pub fn val(v: impl Into<Value>) -> Expr {
    Expr::Bind(v.into())
}

/// Create an inline literal expression. Prefer [`val`] for user data.
pub fn lit(v: impl Into<Value>) -> Expr {
    Expr::Literal(v.into())
}

/// Create a star (*) expression.
pub fn star() -> Expr {
    Expr::Star { table: None }
}

/// Create a qualified star (table.*) expression.
pub fn table_star(table: &str) -> Expr {
    Expr::Star {
        table: Some(table.into()),
    }
}

/// Generic function call.
pub fn func(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Function {
        name: name.into(),
        args,
        distinct: false,
    }
}

/// Format-string fragment with `?` interpolation points, one argument per
/// marker. `template("?.?", vec![ident("u"), ident("id")])` renders a
/// quoted qualified identifier.
pub fn template(fmt: &str, args: Vec<Expr>) -> Expr {
    Expr::Template {
        fmt: fmt.into(),
        args,
    }
}

/// Raw SQL expression (pass-through, no parsing).
///
/// # Security Warning
///
/// **Never pass user input to this function.** The SQL is not sanitized
/// and can lead to SQL injection vulnerabilities.
pub fn raw_sql(sql: &str) -> Expr {
    Expr::Raw(sql.into())
}

/// COALESCE(args...)
pub fn coalesce(args: Vec<Expr>) -> Expr {
    func("COALESCE", args)
}

/// NULLIF(a, b)
pub fn null_if(a: Expr, b: Expr) -> Expr {
    func("NULLIF", vec![a, b])
}

/// IFNULL(a, default) - remapped per dialect (COALESCE / NVL / ISNULL).
pub fn if_null(a: Expr, default: Expr) -> Expr {
    func("IFNULL", vec![a, default])
}

// =============================================================================
// CASE builder
// =============================================================================

/// Start a searched CASE expression.
pub fn case() -> CaseBuilder {
    CaseBuilder {
        operand: None,
        when_clauses: vec![],
        else_clause: None,
    }
}

/// Start a simple CASE expression over `operand`.
pub fn case_on(operand: Expr) -> CaseBuilder {
    CaseBuilder {
        operand: Some(Box::new(operand)),
        when_clauses: vec![],
        else_clause: None,
    }
}

/// Fluent builder for CASE expressions.
#[derive(Debug, Clone)]
#[must_use = "CaseBuilder has no effect until end() is called"]
pub struct CaseBuilder {
    operand: Option<Box<Expr>>,
    when_clauses: Vec<(Expr, Expr)>,
    else_clause: Option<Box<Expr>>,
}

impl CaseBuilder {
    /// Add a WHEN cond THEN value branch.
    pub fn when(mut self, cond: impl Into<Expr>, then: impl Into<Expr>) -> Self {
        self.when_clauses.push((cond.into(), then.into()));
        self
    }

    /// Set the ELSE value.
    pub fn otherwise(mut self, value: impl Into<Expr>) -> Self {
        self.else_clause = Some(Box::new(value.into()));
        self
    }

    /// Flatten to an expression.
    pub fn end(self) -> Expr {
        Expr::Case {
            operand: self.operand,
            when_clauses: self.when_clauses,
            else_clause: self.else_clause,
        }
    }
}

// =============================================================================
// Expression builder trait
// =============================================================================

/// Extension trait for building expressions fluently.
pub trait ExprExt: Sized {
    fn into_expr(self) -> Expr;

    // Comparison operators
    fn eq(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Eq, other.into())
    }

    fn ne(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Ne, other.into())
    }

    fn gt(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Gt, other.into())
    }

    fn gte(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Gte, other.into())
    }

    fn lt(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Lt, other.into())
    }

    fn lte(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Lte, other.into())
    }

    // Logical operators
    fn and(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::And, other.into())
    }

    fn or(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Or, other.into())
    }

    fn not(self) -> Expr {
        Expr::UnaryOp {
            op: UnaryOperator::Not,
            expr: Box::new(self.into_expr()),
        }
    }

    // Arithmetic operators
    fn add(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Plus, other.into())
    }

    fn sub(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Minus, other.into())
    }

    fn mul(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Mul, other.into())
    }

    fn div(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Div, other.into())
    }

    fn rem(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Mod, other.into())
    }

    // String operators
    fn concat(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Concat, other.into())
    }

    fn like(self, pattern: impl Into<Expr>) -> Expr {
        Expr::Like {
            expr: Box::new(self.into_expr()),
            pattern: Box::new(pattern.into()),
            case_insensitive: false,
            negated: false,
        }
    }

    fn not_like(self, pattern: impl Into<Expr>) -> Expr {
        Expr::Like {
            expr: Box::new(self.into_expr()),
            pattern: Box::new(pattern.into()),
            case_insensitive: false,
            negated: true,
        }
    }

    /// Case-insensitive LIKE: ILIKE on PostgreSQL, LOWER/LOWER elsewhere.
    fn ilike(self, pattern: impl Into<Expr>) -> Expr {
        Expr::Like {
            expr: Box::new(self.into_expr()),
            pattern: Box::new(pattern.into()),
            case_insensitive: true,
            negated: false,
        }
    }

    /// LIKE with an ESCAPE clause for matching literal `%` and `_`.
    fn like_escape(self, pattern: impl Into<Expr>, escape_char: char) -> Expr {
        Expr::LikeEscape {
            expr: Box::new(self.into_expr()),
            pattern: Box::new(pattern.into()),
            escape_char,
            negated: false,
        }
    }

    fn not_like_escape(self, pattern: impl Into<Expr>, escape_char: char) -> Expr {
        Expr::LikeEscape {
            expr: Box::new(self.into_expr()),
            pattern: Box::new(pattern.into()),
            escape_char,
            negated: true,
        }
    }

    // NULL checks
    #[allow(clippy::wrong_self_convention)]
    fn is_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self.into_expr()),
            negated: false,
        }
    }

    #[allow(clippy::wrong_self_convention)]
    fn is_not_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self.into_expr()),
            negated: true,
        }
    }

    // IN operator
    fn in_list(self, values: Vec<Expr>) -> Expr {
        Expr::In {
            expr: Box::new(self.into_expr()),
            values,
            negated: false,
        }
    }

    fn not_in_list(self, values: Vec<Expr>) -> Expr {
        Expr::In {
            expr: Box::new(self.into_expr()),
            values,
            negated: true,
        }
    }

    fn in_subquery(self, subquery: crate::stmt::Select) -> Expr {
        Expr::InSubquery {
            expr: Box::new(self.into_expr()),
            subquery: Box::new(subquery),
            negated: false,
        }
    }

    fn not_in_subquery(self, subquery: crate::stmt::Select) -> Expr {
        Expr::InSubquery {
            expr: Box::new(self.into_expr()),
            subquery: Box::new(subquery),
            negated: true,
        }
    }

    // BETWEEN operator
    fn between(self, low: impl Into<Expr>, high: impl Into<Expr>) -> Expr {
        Expr::Between {
            expr: Box::new(self.into_expr()),
            low: Box::new(low.into()),
            high: Box::new(high.into()),
            negated: false,
        }
    }

    fn not_between(self, low: impl Into<Expr>, high: impl Into<Expr>) -> Expr {
        Expr::Between {
            expr: Box::new(self.into_expr()),
            low: Box::new(low.into()),
            high: Box::new(high.into()),
            negated: true,
        }
    }

    /// Wrap in parentheses.
    fn paren(self) -> Expr {
        Expr::Paren(Box::new(self.into_expr()))
    }

    /// Alias this expression (for the SELECT list).
    fn alias(self, name: &str) -> crate::stmt::SelectExpr {
        crate::stmt::SelectExpr {
            expr: self.into_expr(),
            alias: Some(name.into()),
        }
    }
}

fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
    Expr::BinaryOp {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

impl ExprExt for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

// =============================================================================
// Conversions
// =============================================================================
//
// Plain Rust values convert to *bound parameters*, never inline literals.

impl From<i32> for Expr {
    fn from(n: i32) -> Self {
        val(n)
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        val(n)
    }
}

impl From<f64> for Expr {
    fn from(f: f64) -> Self {
        val(f)
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        val(s)
    }
}

impl From<String> for Expr {
    fn from(s: String) -> Self {
        val(s)
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        val(b)
    }
}

impl From<Value> for Expr {
    fn from(v: Value) -> Self {
        Expr::Bind(v)
    }
}

impl From<crate::stmt::Select> for Expr {
    fn from(select: crate::stmt::Select) -> Self {
        Expr::Subquery(Box::new(select))
    }
}

impl From<CaseBuilder> for Expr {
    fn from(b: CaseBuilder) -> Self {
        b.end()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pg(expr: &Expr) -> crate::token::Statement {
        expr.to_tokens(RenderCtx::new(Dialect::Postgres))
            .unwrap()
            .serialize(Dialect::Postgres)
    }

    #[test]
    fn test_column() {
        assert_eq!(pg(&col("name")).sql, "\"name\"");
        assert_eq!(pg(&col("u.name")).sql, "\"u\".\"name\"");
    }

    #[test]
    fn test_bare_column_takes_statement_qualifier() {
        let ctx = RenderCtx::new(Dialect::Postgres).with_qualifier("u");
        let sql = col("age")
            .to_tokens(ctx)
            .unwrap()
            .serialize(Dialect::Postgres)
            .sql;
        assert_eq!(sql, "\"u\".\"age\"");

        // An explicit qualifier wins over the statement's
        let sql = col("src.age")
            .to_tokens(ctx)
            .unwrap()
            .serialize(Dialect::Postgres)
            .sql;
        assert_eq!(sql, "\"src\".\"age\"");
    }

    #[test]
    fn test_bind_vs_literal() {
        let stmt = pg(&col("age").eq(30));
        assert_eq!(stmt.sql, "\"age\" = $1");
        assert_eq!(stmt.params, vec![Value::Int(30)]);

        let stmt = pg(&col("age").eq(lit(30)));
        assert_eq!(stmt.sql, "\"age\" = 30");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_chained_and() {
        let stmt = pg(&col("active").eq(true).and(col("age").gte(18)));
        assert_eq!(stmt.sql, "\"active\" = $1 AND \"age\" >= $2");
        assert_eq!(stmt.params, vec![Value::Bool(true), Value::Int(18)]);
    }

    #[test]
    fn test_arithmetic() {
        let stmt = pg(&col("price").mul(col("qty")).add(5));
        assert_eq!(stmt.sql, "\"price\" * \"qty\" + $1");
    }

    #[test]
    fn test_concat_mysql_function() {
        let expr = col("first").concat(col("last"));

        let pg_stmt = pg(&expr);
        assert_eq!(pg_stmt.sql, "\"first\" || \"last\"");

        let my = expr
            .to_tokens(RenderCtx::new(Dialect::MySql))
            .unwrap()
            .serialize(Dialect::MySql);
        assert_eq!(my.sql, "CONCAT(`first`, `last`)");

        let ms = expr
            .to_tokens(RenderCtx::new(Dialect::SqlServer))
            .unwrap()
            .serialize(Dialect::SqlServer);
        assert_eq!(ms.sql, "[first] + [last]");
    }

    #[test]
    fn test_in_list_empty_folds() {
        assert_eq!(pg(&col("status").in_list(vec![])).sql, "FALSE");
        assert_eq!(pg(&col("status").not_in_list(vec![])).sql, "TRUE");
    }

    #[test]
    fn test_in_list_binds() {
        let stmt = pg(&col("status").in_list(vec!["a".into(), "b".into()]));
        assert_eq!(stmt.sql, "\"status\" IN ($1, $2)");
        assert_eq!(stmt.params.len(), 2);
    }

    #[test]
    fn test_between() {
        let stmt = pg(&col("age").between(18, 65));
        assert_eq!(stmt.sql, "\"age\" BETWEEN $1 AND $2");
    }

    #[test]
    fn test_ilike() {
        let stmt = pg(&col("name").ilike("a%"));
        assert_eq!(stmt.sql, "\"name\" ILIKE $1");

        let my = col("name")
            .ilike("a%")
            .to_tokens(RenderCtx::new(Dialect::MySql))
            .unwrap()
            .serialize(Dialect::MySql);
        assert_eq!(my.sql, "LOWER(`name`) LIKE LOWER(?)");
    }

    #[test]
    fn test_like_escape() {
        let stmt = pg(&col("discount").like_escape(val("100\\%"), '\\'));
        assert_eq!(stmt.sql, "\"discount\" LIKE $1 ESCAPE '\\'");
    }

    #[test]
    fn test_case() {
        let expr = case()
            .when(col("status").eq(lit("A")), lit("Active"))
            .when(col("status").eq(lit("I")), lit("Inactive"))
            .otherwise(lit("Unknown"))
            .end();
        let stmt = pg(&expr);
        assert_eq!(
            stmt.sql,
            "CASE WHEN \"status\" = 'A' THEN 'Active' \
             WHEN \"status\" = 'I' THEN 'Inactive' ELSE 'Unknown' END"
        );
    }

    #[test]
    fn test_template() {
        let expr = template("?.?", vec![ident("u"), ident("id")]);
        assert_eq!(pg(&expr).sql, "\"u\".\"id\"");

        let expr = template("COALESCE(?, 0) + ?", vec![col("n"), val(1)]);
        let stmt = pg(&expr);
        assert_eq!(stmt.sql, "COALESCE(\"n\", 0) + $1");
        assert_eq!(stmt.params, vec![Value::Int(1)]);
    }

    #[test]
    fn test_template_arity_mismatch() {
        let expr = template("? + ?", vec![val(1)]);
        let err = expr.to_tokens(RenderCtx::new(Dialect::Postgres)).unwrap_err();
        assert!(matches!(err, Error::ArgumentShape(_)));
    }

    #[test]
    fn test_if_null_remaps() {
        let expr = if_null(col("n"), val(0));
        assert_eq!(pg(&expr).sql, "COALESCE(\"n\", $1)");

        let ora = expr
            .to_tokens(RenderCtx::new(Dialect::Oracle))
            .unwrap()
            .serialize(Dialect::Oracle);
        assert_eq!(ora.sql, "NVL(\"n\", :p1)");

        let ms = expr
            .to_tokens(RenderCtx::new(Dialect::SqlServer))
            .unwrap()
            .serialize(Dialect::SqlServer);
        assert_eq!(ms.sql, "ISNULL([n], @p1)");
    }

    #[test]
    fn test_render_is_deterministic() {
        let expr = col("a").eq(1).and(col("b").in_list(vec![val(2), val(3)]));
        let first = pg(&expr);
        let second = pg(&expr);
        assert_eq!(first, second);
    }
}
