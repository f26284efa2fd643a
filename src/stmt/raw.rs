//! Raw statement pass-through.
//!
//! User-supplied SQL with `?` placeholders; only the placeholder syntax is
//! dialect-translated. `?` inside single-quoted string literals is left
//! untouched.

use crate::db::{Context, Db};
use crate::dialect::{Dialect, SqlDialect};
use crate::driver::{ExecResult, Rows};
use crate::error::{Error, Result};
use crate::token::Statement;
use crate::value::Value;

/// A raw SQL statement with bound arguments.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "Raw has no effect until rendered with to_sql() or executed"]
pub struct Raw {
    sql: String,
    params: Vec<Value>,
}

impl Raw {
    pub fn new(sql: &str, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Rewrite `?` markers to the dialect's positional placeholders.
    pub fn to_sql(&self, dialect: Dialect) -> Result<Statement> {
        let mut out = String::with_capacity(self.sql.len());
        let mut index = 0usize;
        let mut in_string = false;

        for ch in self.sql.chars() {
            match ch {
                '\'' => {
                    // A doubled quote toggles twice, which is harmless
                    in_string = !in_string;
                    out.push(ch);
                }
                '?' if !in_string => {
                    index += 1;
                    out.push_str(&dialect.placeholder(index));
                }
                _ => out.push(ch),
            }
        }

        if index != self.params.len() {
            return Err(Error::ArgumentShape(format!(
                "raw SQL has {index} placeholders but {} arguments",
                self.params.len()
            )));
        }

        Ok(Statement {
            sql: out,
            params: self.params.clone(),
        })
    }

    /// Render and execute as a non-query statement.
    pub fn exec(self, ctx: &Context, db: &Db) -> Result<ExecResult> {
        let stmt = self.to_sql(db.dialect())?;
        db.run_exec(ctx, &stmt)
    }

    /// Render and execute as a query.
    pub fn query(self, ctx: &Context, db: &Db) -> Result<Box<dyn Rows>> {
        let stmt = self.to_sql(db.dialect())?;
        db.run_query(ctx, &stmt)
    }
}
