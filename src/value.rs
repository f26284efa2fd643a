//! Bound-parameter values.
//!
//! A [`Value`] is what travels in a statement's ordered argument list. The
//! same type doubles as the literal model when a value must be inlined into
//! SQL text (constant folding in tests, VALUES CTEs on dialects that need
//! them inline, ...).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::dialect::{Dialect, SqlDialect};

/// A value bound to a statement parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Json(serde_json::Value),
}

impl Value {
    /// Render this value as a SQL literal in the given dialect.
    ///
    /// Bound parameters are the normal path; literal rendering exists for
    /// the few places where SQL text must carry the value itself.
    ///
    /// # Panics
    ///
    /// Panics on NaN or infinite floats, which have no SQL literal form.
    pub fn to_literal(&self, dialect: Dialect) -> String {
        match self {
            Value::Null => "NULL".into(),
            Value::Bool(b) => dialect.format_bool(*b).into(),
            Value::Int(n) => n.to_string(),
            Value::Float(f) => {
                if f.is_nan() {
                    panic!("Cannot serialize NaN to SQL")
                }
                if f.is_infinite() {
                    panic!("Cannot serialize Infinity to SQL")
                }
                let mut buffer = ryu::Buffer::new();
                buffer.format(*f).to_string()
            }
            Value::Str(s) => dialect.quote_string(s),
            Value::Bytes(b) => {
                let mut hex = String::with_capacity(b.len() * 2 + 3);
                for byte in b {
                    hex.push_str(&format!("{byte:02x}"));
                }
                match dialect {
                    Dialect::Postgres => format!("'\\x{hex}'"),
                    _ => format!("X'{hex}'"),
                }
            }
            Value::Date(d) => dialect.format_date_literal(&d.format("%Y-%m-%d").to_string()),
            Value::Timestamp(ts) => {
                dialect.format_timestamp_literal(&ts.format("%Y-%m-%d %H:%M:%S").to_string())
            }
            Value::Json(j) => dialect.quote_string(&j.to_string()),
        }
    }

    /// Whether this value is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::Timestamp(ts)
    }
}

impl From<serde_json::Value> for Value {
    fn from(j: serde_json::Value) -> Self {
        Value::Json(j)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}
