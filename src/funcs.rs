//! Date/time and JSON function translation.
//!
//! Every function kind here renders to the dialect-native form through the
//! dispatch tables; a dialect without an equivalent is a hard
//! [`Error::UnsupportedDialect`], never a silent approximation.

use crate::dialect::Dialect::{MySql, Oracle, Postgres, Sqlite, SqlServer};
use crate::dialect::DialectCase::{AnyOf, Only};
use crate::dialect::run_for_dialect;
use crate::error::{Error, Result};
use crate::expr::{Expr, RenderCtx};
use crate::token::{Token, TokenStream};
use crate::value::Value;

// =============================================================================
// Time units
// =============================================================================

/// Calendar/clock unit for date arithmetic and extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

impl TimeUnit {
    /// SQL keyword form (EXTRACT, DATEADD, INTERVAL ...).
    fn keyword(self) -> &'static str {
        match self {
            TimeUnit::Second => "SECOND",
            TimeUnit::Minute => "MINUTE",
            TimeUnit::Hour => "HOUR",
            TimeUnit::Day => "DAY",
            TimeUnit::Month => "MONTH",
            TimeUnit::Year => "YEAR",
        }
    }

    /// SQLite strftime format directive for extraction.
    fn strftime_fmt(self) -> &'static str {
        match self {
            TimeUnit::Second => "%S",
            TimeUnit::Minute => "%M",
            TimeUnit::Hour => "%H",
            TimeUnit::Day => "%d",
            TimeUnit::Month => "%m",
            TimeUnit::Year => "%Y",
        }
    }

    /// Oracle TRUNC format model, where one exists.
    fn oracle_trunc_fmt(self) -> Option<&'static str> {
        match self {
            TimeUnit::Second => None,
            TimeUnit::Minute => Some("MI"),
            TimeUnit::Hour => Some("HH24"),
            TimeUnit::Day => Some("DD"),
            TimeUnit::Month => Some("MM"),
            TimeUnit::Year => Some("YYYY"),
        }
    }

    /// Length in seconds for epoch-difference arithmetic; None for units
    /// without a fixed length.
    fn seconds(self) -> Option<i64> {
        match self {
            TimeUnit::Second => Some(1),
            TimeUnit::Minute => Some(60),
            TimeUnit::Hour => Some(3600),
            TimeUnit::Day => Some(86400),
            TimeUnit::Month | TimeUnit::Year => None,
        }
    }
}

// =============================================================================
// Date/time functions
// =============================================================================

/// A date/time function application.
#[derive(Debug, Clone)]
pub enum DateTimeFn {
    CurrentDate,
    CurrentTime,
    CurrentTimestamp,
    Now,
    Extract { unit: TimeUnit, ts: Expr },
    Trunc { unit: TimeUnit, ts: Expr },
    /// Date arithmetic; `n` is negative for subtraction.
    Add { ts: Expr, n: i64, unit: TimeUnit },
    /// `a - b` in the given unit.
    Diff { a: Expr, b: Expr, unit: TimeUnit },
    Age { a: Expr, b: Expr },
}

impl DateTimeFn {
    pub fn to_tokens(&self, ctx: RenderCtx) -> Result<TokenStream> {
        let d = ctx.dialect;
        let mut ts_out = TokenStream::new();

        match self {
            DateTimeFn::CurrentDate => {
                if d == SqlServer {
                    ts_out.push(Token::Raw("CAST(GETDATE() AS DATE)".into()));
                } else {
                    ts_out.push(Token::CurrentDate);
                }
            }

            DateTimeFn::CurrentTime => match d {
                SqlServer => {
                    ts_out.push(Token::Raw("CAST(GETDATE() AS TIME)".into()));
                }
                Oracle => return Err(Error::unsupported("current_time", d)),
                _ => {
                    ts_out.push(Token::CurrentTime);
                }
            },

            DateTimeFn::CurrentTimestamp => {
                ts_out.push(Token::CurrentTimestamp);
            }

            DateTimeFn::Now => match d {
                Postgres | MySql => {
                    ts_out.push(Token::FunctionName("NOW".into())).lparen().rparen();
                }
                Sqlite => {
                    ts_out.push(Token::Raw("DATETIME('now')".into()));
                }
                Oracle => {
                    ts_out.push(Token::Raw("SYSTIMESTAMP".into()));
                }
                SqlServer => {
                    ts_out.push(Token::FunctionName("GETDATE".into())).lparen().rparen();
                }
            },

            DateTimeFn::Extract { unit, ts } => match d {
                Postgres | MySql | Oracle => {
                    ts_out.push(Token::FunctionName("EXTRACT".into())).lparen();
                    ts_out
                        .push(Token::Raw(unit.keyword().into()))
                        .space()
                        .push(Token::From)
                        .space()
                        .append(&ts.to_tokens(ctx)?)
                        .rparen();
                }
                Sqlite => {
                    ts_out.push(Token::Raw("CAST(STRFTIME(".into()));
                    ts_out.push(Token::Lit(Value::Str(unit.strftime_fmt().into())));
                    ts_out.comma().space().append(&ts.to_tokens(ctx)?);
                    ts_out.push(Token::Raw(") AS INTEGER)".into()));
                }
                SqlServer => {
                    ts_out.push(Token::FunctionName("DATEPART".into())).lparen();
                    ts_out
                        .push(Token::Raw(unit.keyword().to_lowercase()))
                        .comma()
                        .space()
                        .append(&ts.to_tokens(ctx)?)
                        .rparen();
                }
            },

            DateTimeFn::Trunc { unit, ts } => match d {
                Postgres => {
                    ts_out.push(Token::FunctionName("DATE_TRUNC".into())).lparen();
                    ts_out
                        .push(Token::Lit(Value::Str(unit.keyword().to_lowercase())))
                        .comma()
                        .space()
                        .append(&ts.to_tokens(ctx)?)
                        .rparen();
                }
                Oracle => {
                    let fmt = unit
                        .oracle_trunc_fmt()
                        .ok_or(Error::unsupported("date_trunc to second", d))?;
                    ts_out.push(Token::FunctionName("TRUNC".into())).lparen();
                    ts_out
                        .append(&ts.to_tokens(ctx)?)
                        .comma()
                        .space()
                        .push(Token::Lit(Value::Str(fmt.into())))
                        .rparen();
                }
                SqlServer => {
                    ts_out.push(Token::FunctionName("DATETRUNC".into())).lparen();
                    ts_out
                        .push(Token::Raw(unit.keyword().to_lowercase()))
                        .comma()
                        .space()
                        .append(&ts.to_tokens(ctx)?)
                        .rparen();
                }
                MySql | Sqlite => return Err(Error::unsupported("date_trunc", d)),
            },

            DateTimeFn::Add { ts, n, unit } => match d {
                Postgres => {
                    // (ts + INTERVAL '3 day')
                    ts_out.lparen().append(&ts.to_tokens(ctx)?);
                    ts_out.space().push(Token::Plus).space();
                    ts_out.push(Token::Interval).space().push(Token::Lit(Value::Str(
                        format!("{n} {}", unit.keyword().to_lowercase()),
                    )));
                    ts_out.rparen();
                }
                MySql => {
                    ts_out.push(Token::FunctionName("DATE_ADD".into())).lparen();
                    ts_out.append(&ts.to_tokens(ctx)?).comma().space();
                    ts_out
                        .push(Token::Interval)
                        .space()
                        .push(Token::LitInt(*n))
                        .space()
                        .push(Token::Raw(unit.keyword().into()))
                        .rparen();
                }
                Sqlite => {
                    ts_out.push(Token::FunctionName("DATETIME".into())).lparen();
                    ts_out.append(&ts.to_tokens(ctx)?).comma().space();
                    ts_out
                        .push(Token::Lit(Value::Str(format!(
                            "{}{n} {}",
                            if *n >= 0 { "+" } else { "" },
                            unit.keyword().to_lowercase()
                        ))))
                        .rparen();
                }
                SqlServer => {
                    ts_out.push(Token::FunctionName("DATEADD".into())).lparen();
                    ts_out
                        .push(Token::Raw(unit.keyword().to_lowercase()))
                        .comma()
                        .space()
                        .push(Token::LitInt(*n))
                        .comma()
                        .space()
                        .append(&ts.to_tokens(ctx)?)
                        .rparen();
                }
                Oracle => match unit {
                    TimeUnit::Month | TimeUnit::Year => {
                        let months = if *unit == TimeUnit::Year { n * 12 } else { *n };
                        ts_out.push(Token::FunctionName("ADD_MONTHS".into())).lparen();
                        ts_out
                            .append(&ts.to_tokens(ctx)?)
                            .comma()
                            .space()
                            .push(Token::LitInt(months))
                            .rparen();
                    }
                    _ => {
                        ts_out.lparen().append(&ts.to_tokens(ctx)?);
                        ts_out.space().push(Token::Plus).space();
                        ts_out.push(Token::FunctionName("NUMTODSINTERVAL".into())).lparen();
                        ts_out
                            .push(Token::LitInt(*n))
                            .comma()
                            .space()
                            .push(Token::Lit(Value::Str(unit.keyword().into())))
                            .rparen()
                            .rparen();
                    }
                },
            },

            DateTimeFn::Diff { a, b, unit } => match d {
                MySql => {
                    // TIMESTAMPDIFF(unit, start, end) computes end - start
                    ts_out.push(Token::FunctionName("TIMESTAMPDIFF".into())).lparen();
                    ts_out
                        .push(Token::Raw(unit.keyword().into()))
                        .comma()
                        .space()
                        .append(&b.to_tokens(ctx)?)
                        .comma()
                        .space()
                        .append(&a.to_tokens(ctx)?)
                        .rparen();
                }
                SqlServer => {
                    ts_out.push(Token::FunctionName("DATEDIFF".into())).lparen();
                    ts_out
                        .push(Token::Raw(unit.keyword().to_lowercase()))
                        .comma()
                        .space()
                        .append(&b.to_tokens(ctx)?)
                        .comma()
                        .space()
                        .append(&a.to_tokens(ctx)?)
                        .rparen();
                }
                Postgres => {
                    let secs = unit
                        .seconds()
                        .ok_or(Error::unsupported("date_diff in months/years", d))?;
                    ts_out.push(Token::Raw("FLOOR(EXTRACT(EPOCH FROM (".into()));
                    ts_out.append(&a.to_tokens(ctx)?);
                    ts_out.space().push(Token::Minus).space();
                    ts_out.append(&b.to_tokens(ctx)?);
                    ts_out.push(Token::Raw(format!(")) / {secs})")));
                }
                Sqlite => {
                    if *unit != TimeUnit::Day {
                        return Err(Error::unsupported("date_diff below/above days", d));
                    }
                    ts_out.push(Token::Raw("CAST(JULIANDAY(".into()));
                    ts_out.append(&a.to_tokens(ctx)?);
                    ts_out.push(Token::Raw(") - JULIANDAY(".into()));
                    ts_out.append(&b.to_tokens(ctx)?);
                    ts_out.push(Token::Raw(") AS INTEGER)".into()));
                }
                Oracle => return Err(Error::unsupported("date_diff", d)),
            },

            DateTimeFn::Age { a, b } => {
                if d != Postgres {
                    return Err(Error::unsupported("age", d));
                }
                ts_out.push(Token::FunctionName("AGE".into())).lparen();
                ts_out
                    .append(&a.to_tokens(ctx)?)
                    .comma()
                    .space()
                    .append(&b.to_tokens(ctx)?)
                    .rparen();
            }
        }

        Ok(ts_out)
    }
}

// Constructors

pub fn current_date() -> Expr {
    Expr::DateTime(Box::new(DateTimeFn::CurrentDate))
}

pub fn current_time() -> Expr {
    Expr::DateTime(Box::new(DateTimeFn::CurrentTime))
}

pub fn current_timestamp() -> Expr {
    Expr::DateTime(Box::new(DateTimeFn::CurrentTimestamp))
}

pub fn now() -> Expr {
    Expr::DateTime(Box::new(DateTimeFn::Now))
}

pub fn extract(unit: TimeUnit, ts: Expr) -> Expr {
    Expr::DateTime(Box::new(DateTimeFn::Extract { unit, ts }))
}

pub fn extract_year(ts: Expr) -> Expr {
    extract(TimeUnit::Year, ts)
}

pub fn extract_month(ts: Expr) -> Expr {
    extract(TimeUnit::Month, ts)
}

pub fn extract_day(ts: Expr) -> Expr {
    extract(TimeUnit::Day, ts)
}

pub fn extract_hour(ts: Expr) -> Expr {
    extract(TimeUnit::Hour, ts)
}

pub fn extract_minute(ts: Expr) -> Expr {
    extract(TimeUnit::Minute, ts)
}

pub fn extract_second(ts: Expr) -> Expr {
    extract(TimeUnit::Second, ts)
}

pub fn date_trunc(unit: TimeUnit, ts: Expr) -> Expr {
    Expr::DateTime(Box::new(DateTimeFn::Trunc { unit, ts }))
}

pub fn date_add(ts: Expr, n: i64, unit: TimeUnit) -> Expr {
    Expr::DateTime(Box::new(DateTimeFn::Add { ts, n, unit }))
}

pub fn date_subtract(ts: Expr, n: i64, unit: TimeUnit) -> Expr {
    Expr::DateTime(Box::new(DateTimeFn::Add { ts, n: -n, unit }))
}

pub fn date_diff(a: Expr, b: Expr, unit: TimeUnit) -> Expr {
    Expr::DateTime(Box::new(DateTimeFn::Diff { a, b, unit }))
}

pub fn age(a: Expr, b: Expr) -> Expr {
    Expr::DateTime(Box::new(DateTimeFn::Age { a, b }))
}

// =============================================================================
// JSON functions
// =============================================================================

/// A JSON function application.
#[derive(Debug, Clone)]
pub enum JsonFn {
    /// Flattened key/value argument list; even arity enforced at render.
    Object(Vec<Expr>),
    Array(Vec<Expr>),
    Extract { src: Expr, path: Expr },
    Valid(Expr),
    Insert { src: Expr, path: Expr, value: Expr },
    Replace { src: Expr, path: Expr, value: Expr },
    Set { src: Expr, path: Expr, value: Expr },
    Length(Expr),
    Type(Expr),
    Keys(Expr),
    Contains { src: Expr, value: Expr },
    ContainsPath { src: Expr, path: Expr },
    Unquote(Expr),
    ArrayAppend { src: Expr, path: Expr, value: Expr },
}

/// Emit `NAME(arg, arg, ...)`.
fn call(name: &str, args: &[&Expr], ctx: RenderCtx) -> Result<TokenStream> {
    let mut ts = TokenStream::new();
    ts.push(Token::FunctionName(name.into())).lparen();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            ts.comma().space();
        }
        ts.append(&arg.to_tokens(ctx)?);
    }
    ts.rparen();
    Ok(ts)
}

impl JsonFn {
    pub fn to_tokens(&self, ctx: RenderCtx) -> Result<TokenStream> {
        let d = ctx.dialect;

        match self {
            JsonFn::Object(args) => {
                if args.len() % 2 != 0 {
                    return Err(Error::ArgumentShape(format!(
                        "json_object requires an even number of arguments, got {}",
                        args.len()
                    )));
                }
                let name = run_for_dialect(
                    "json_object",
                    d,
                    [
                        (Only(Postgres), "JSON_BUILD_OBJECT"),
                        (AnyOf(&[MySql, Sqlite]), "JSON_OBJECT"),
                    ],
                )?;
                call(name, &args.iter().collect::<Vec<_>>(), ctx)
            }

            JsonFn::Array(args) => {
                let name = run_for_dialect(
                    "json_array",
                    d,
                    [
                        (Only(Postgres), "JSON_BUILD_ARRAY"),
                        (AnyOf(&[MySql, Sqlite, Oracle]), "JSON_ARRAY"),
                    ],
                )?;
                call(name, &args.iter().collect::<Vec<_>>(), ctx)
            }

            JsonFn::Extract { src, path } => {
                let name = run_for_dialect(
                    "json_extract",
                    d,
                    [
                        (AnyOf(&[MySql, Sqlite]), "JSON_EXTRACT"),
                        (Only(Postgres), "JSONB_PATH_QUERY"),
                        (AnyOf(&[Oracle, SqlServer]), "JSON_VALUE"),
                    ],
                )?;
                call(name, &[src, path], ctx)
            }

            JsonFn::Valid(src) => {
                let name = run_for_dialect(
                    "json_valid",
                    d,
                    [
                        (AnyOf(&[MySql, Sqlite]), "JSON_VALID"),
                        (Only(SqlServer), "ISJSON"),
                    ],
                )?;
                call(name, &[src], ctx)
            }

            JsonFn::Insert { src, path, value } => {
                let name = run_for_dialect(
                    "json_insert",
                    d,
                    [(AnyOf(&[MySql, Sqlite]), "JSON_INSERT")],
                )?;
                call(name, &[src, path, value], ctx)
            }

            JsonFn::Replace { src, path, value } => {
                let name = run_for_dialect(
                    "json_replace",
                    d,
                    [
                        (AnyOf(&[MySql, Sqlite]), "JSON_REPLACE"),
                        (Only(SqlServer), "JSON_MODIFY"),
                    ],
                )?;
                call(name, &[src, path, value], ctx)
            }

            JsonFn::Set { src, path, value } => {
                let name = run_for_dialect(
                    "json_set",
                    d,
                    [
                        (AnyOf(&[MySql, Sqlite]), "JSON_SET"),
                        (Only(SqlServer), "JSON_MODIFY"),
                    ],
                )?;
                call(name, &[src, path, value], ctx)
            }

            JsonFn::Length(src) => {
                let name = run_for_dialect(
                    "json_length",
                    d,
                    [
                        (Only(MySql), "JSON_LENGTH"),
                        (Only(Sqlite), "JSON_ARRAY_LENGTH"),
                        (Only(Postgres), "JSONB_ARRAY_LENGTH"),
                    ],
                )?;
                call(name, &[src], ctx)
            }

            JsonFn::Type(src) => {
                let name = run_for_dialect(
                    "json_type",
                    d,
                    [
                        (AnyOf(&[MySql, Sqlite]), "JSON_TYPE"),
                        (Only(Postgres), "JSONB_TYPEOF"),
                    ],
                )?;
                call(name, &[src], ctx)
            }

            JsonFn::Keys(src) => {
                let name = run_for_dialect("json_keys", d, [(Only(MySql), "JSON_KEYS")])?;
                call(name, &[src], ctx)
            }

            JsonFn::Contains { src, value } => match d {
                Postgres => {
                    // jsonb containment operator
                    let mut ts = TokenStream::new();
                    ts.append(&src.to_tokens(ctx)?);
                    ts.space().push(Token::JsonContains).space();
                    ts.append(&value.to_tokens(ctx)?);
                    Ok(ts)
                }
                MySql => call("JSON_CONTAINS", &[src, value], ctx),
                _ => Err(Error::unsupported("json_contains", d)),
            },

            JsonFn::ContainsPath { src, path } => match d {
                MySql => {
                    let mut ts = TokenStream::new();
                    ts.push(Token::FunctionName("JSON_CONTAINS_PATH".into())).lparen();
                    ts.append(&src.to_tokens(ctx)?)
                        .comma()
                        .space()
                        .push(Token::Lit(Value::Str("one".into())))
                        .comma()
                        .space()
                        .append(&path.to_tokens(ctx)?)
                        .rparen();
                    Ok(ts)
                }
                Postgres => call("JSONB_PATH_EXISTS", &[src, path], ctx),
                _ => Err(Error::unsupported("json_contains_path", d)),
            },

            JsonFn::Unquote(src) => {
                let name = run_for_dialect("json_unquote", d, [(Only(MySql), "JSON_UNQUOTE")])?;
                call(name, &[src], ctx)
            }

            JsonFn::ArrayAppend { src, path, value } => {
                let name = run_for_dialect(
                    "json_array_append",
                    d,
                    [(Only(MySql), "JSON_ARRAY_APPEND")],
                )?;
                call(name, &[src, path, value], ctx)
            }
        }
    }
}

// Constructors

/// JSON object from key/value pairs.
pub fn json_object(pairs: Vec<(Expr, Expr)>) -> Expr {
    let mut args = Vec::with_capacity(pairs.len() * 2);
    for (k, v) in pairs {
        args.push(k);
        args.push(v);
    }
    Expr::Json(Box::new(JsonFn::Object(args)))
}

/// JSON object from a flattened `k, v, k, v, ...` argument list. Odd arity
/// fails at render time.
pub fn json_object_args(args: Vec<Expr>) -> Expr {
    Expr::Json(Box::new(JsonFn::Object(args)))
}

pub fn json_array(values: Vec<Expr>) -> Expr {
    Expr::Json(Box::new(JsonFn::Array(values)))
}

pub fn json_extract(src: Expr, path: Expr) -> Expr {
    Expr::Json(Box::new(JsonFn::Extract { src, path }))
}

pub fn json_valid(src: Expr) -> Expr {
    Expr::Json(Box::new(JsonFn::Valid(src)))
}

pub fn json_insert(src: Expr, path: Expr, value: Expr) -> Expr {
    Expr::Json(Box::new(JsonFn::Insert { src, path, value }))
}

pub fn json_replace(src: Expr, path: Expr, value: Expr) -> Expr {
    Expr::Json(Box::new(JsonFn::Replace { src, path, value }))
}

pub fn json_set(src: Expr, path: Expr, value: Expr) -> Expr {
    Expr::Json(Box::new(JsonFn::Set { src, path, value }))
}

pub fn json_length(src: Expr) -> Expr {
    Expr::Json(Box::new(JsonFn::Length(src)))
}

pub fn json_type(src: Expr) -> Expr {
    Expr::Json(Box::new(JsonFn::Type(src)))
}

pub fn json_keys(src: Expr) -> Expr {
    Expr::Json(Box::new(JsonFn::Keys(src)))
}

pub fn json_contains(src: Expr, value: Expr) -> Expr {
    Expr::Json(Box::new(JsonFn::Contains { src, value }))
}

pub fn json_contains_path(src: Expr, path: Expr) -> Expr {
    Expr::Json(Box::new(JsonFn::ContainsPath { src, path }))
}

pub fn json_unquote(src: Expr) -> Expr {
    Expr::Json(Box::new(JsonFn::Unquote(src)))
}

pub fn json_array_append(src: Expr, path: Expr, value: Expr) -> Expr {
    Expr::Json(Box::new(JsonFn::ArrayAppend { src, path, value }))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::expr::{col, lit, val};

    fn render(expr: &Expr, d: Dialect) -> Result<String> {
        Ok(expr.to_tokens(RenderCtx::new(d))?.serialize(d).sql)
    }

    #[test]
    fn test_now_per_dialect() {
        let e = now();
        assert_eq!(render(&e, Dialect::Postgres).unwrap(), "NOW()");
        assert_eq!(render(&e, Dialect::MySql).unwrap(), "NOW()");
        assert_eq!(render(&e, Dialect::Sqlite).unwrap(), "DATETIME('now')");
        assert_eq!(render(&e, Dialect::Oracle).unwrap(), "SYSTIMESTAMP");
        assert_eq!(render(&e, Dialect::SqlServer).unwrap(), "GETDATE()");
    }

    #[test]
    fn test_current_timestamp_is_portable() {
        let e = current_timestamp();
        for d in Dialect::ALL {
            assert_eq!(render(&e, d).unwrap(), "CURRENT_TIMESTAMP");
        }
    }

    #[test]
    fn test_extract() {
        let e = extract_year(col("created_at"));
        assert_eq!(
            render(&e, Dialect::Postgres).unwrap(),
            "EXTRACT(YEAR FROM \"created_at\")"
        );
        assert_eq!(
            render(&e, Dialect::SqlServer).unwrap(),
            "DATEPART(year, [created_at])"
        );
        assert_eq!(
            render(&e, Dialect::Sqlite).unwrap(),
            "CAST(STRFTIME('%Y', \"created_at\") AS INTEGER)"
        );
    }

    #[test]
    fn test_date_trunc() {
        let e = date_trunc(TimeUnit::Day, col("ts"));
        assert_eq!(
            render(&e, Dialect::Postgres).unwrap(),
            "DATE_TRUNC('day', \"ts\")"
        );
        assert_eq!(render(&e, Dialect::Oracle).unwrap(), "TRUNC(\"ts\", 'DD')");
        assert_eq!(render(&e, Dialect::SqlServer).unwrap(), "DATETRUNC(day, [ts])");
        assert!(matches!(
            render(&e, Dialect::MySql),
            Err(Error::UnsupportedDialect { .. })
        ));
    }

    #[test]
    fn test_date_add() {
        let e = date_add(col("ts"), 3, TimeUnit::Day);
        assert_eq!(
            render(&e, Dialect::Postgres).unwrap(),
            "(\"ts\" + INTERVAL '3 day')"
        );
        assert_eq!(
            render(&e, Dialect::MySql).unwrap(),
            "DATE_ADD(`ts`, INTERVAL 3 DAY)"
        );
        assert_eq!(
            render(&e, Dialect::SqlServer).unwrap(),
            "DATEADD(day, 3, [ts])"
        );
        assert_eq!(
            render(&e, Dialect::Sqlite).unwrap(),
            "DATETIME(\"ts\", '+3 day')"
        );
        assert_eq!(
            render(&e, Dialect::Oracle).unwrap(),
            "(\"ts\" + NUMTODSINTERVAL(3, 'DAY'))"
        );
    }

    #[test]
    fn test_date_subtract() {
        let e = date_subtract(col("ts"), 2, TimeUnit::Hour);
        assert_eq!(
            render(&e, Dialect::Sqlite).unwrap(),
            "DATETIME(\"ts\", '-2 hour')"
        );
    }

    #[test]
    fn test_date_add_oracle_months() {
        let e = date_add(col("ts"), 1, TimeUnit::Year);
        assert_eq!(render(&e, Dialect::Oracle).unwrap(), "ADD_MONTHS(\"ts\", 12)");
    }

    #[test]
    fn test_date_diff() {
        let e = date_diff(col("a"), col("b"), TimeUnit::Day);
        assert_eq!(
            render(&e, Dialect::MySql).unwrap(),
            "TIMESTAMPDIFF(DAY, `b`, `a`)"
        );
        assert_eq!(
            render(&e, Dialect::SqlServer).unwrap(),
            "DATEDIFF(day, [b], [a])"
        );
        assert_eq!(
            render(&e, Dialect::Postgres).unwrap(),
            "FLOOR(EXTRACT(EPOCH FROM (\"a\" - \"b\")) / 86400)"
        );
        assert!(matches!(
            render(&e, Dialect::Oracle),
            Err(Error::UnsupportedDialect { .. })
        ));
    }

    #[test]
    fn test_age_postgres_only() {
        let e = age(col("a"), col("b"));
        assert_eq!(render(&e, Dialect::Postgres).unwrap(), "AGE(\"a\", \"b\")");
        assert!(matches!(
            render(&e, Dialect::MySql),
            Err(Error::UnsupportedDialect { .. })
        ));
    }

    #[test]
    fn test_json_object() {
        let e = json_object(vec![(lit("a"), val(1)), (lit("b"), val(2))]);
        assert_eq!(
            render(&e, Dialect::Postgres).unwrap(),
            "JSON_BUILD_OBJECT('a', $1, 'b', $2)"
        );
        assert_eq!(
            render(&e, Dialect::MySql).unwrap(),
            "JSON_OBJECT('a', ?, 'b', ?)"
        );
        assert!(matches!(
            render(&e, Dialect::SqlServer),
            Err(Error::UnsupportedDialect { .. })
        ));
    }

    #[test]
    fn test_json_object_odd_arity() {
        let e = json_object_args(vec![lit("a"), val(1), lit("b")]);
        assert!(matches!(
            render(&e, Dialect::MySql),
            Err(Error::ArgumentShape(_))
        ));
    }

    #[test]
    fn test_json_extract() {
        let e = json_extract(col("doc"), lit("$.name"));
        assert_eq!(
            render(&e, Dialect::MySql).unwrap(),
            "JSON_EXTRACT(`doc`, '$.name')"
        );
        assert_eq!(
            render(&e, Dialect::SqlServer).unwrap(),
            "JSON_VALUE([doc], '$.name')"
        );
    }

    #[test]
    fn test_json_contains() {
        let e = json_contains(col("doc"), val(serde_json::json!({"a": 1})));
        let sql = render(&e, Dialect::Postgres).unwrap();
        assert_eq!(sql, "\"doc\" @> $1");

        let sql = render(&e, Dialect::MySql).unwrap();
        assert_eq!(sql, "JSON_CONTAINS(`doc`, ?)");
    }

    #[test]
    fn test_json_contains_path_mysql_mode_arg() {
        let e = json_contains_path(col("doc"), lit("$.a"));
        assert_eq!(
            render(&e, Dialect::MySql).unwrap(),
            "JSON_CONTAINS_PATH(`doc`, 'one', '$.a')"
        );
    }

    #[test]
    fn test_json_keys_mysql_only() {
        let e = json_keys(col("doc"));
        assert_eq!(render(&e, Dialect::MySql).unwrap(), "JSON_KEYS(`doc`)");
        for d in [Dialect::Postgres, Dialect::Sqlite, Dialect::Oracle, Dialect::SqlServer] {
            assert!(matches!(
                render(&e, d),
                Err(Error::UnsupportedDialect { .. })
            ));
        }
    }
}
