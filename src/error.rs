//! Error types for statement building and rendering.

use crate::dialect::Dialect;
use thiserror::Error;

/// Result type for statement building and rendering.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while assembling or rendering a statement.
///
/// Misuse of the fluent API (missing model, empty MERGE, ...) is detected
/// lazily at terminal time so statements can be assembled conditionally.
/// No partial SQL is ever produced: the first error aborts rendering.
#[derive(Error, Debug)]
pub enum Error {
    /// An ORDER BY entry carries neither a column nor an expression.
    #[error("order by entry has neither a column nor an expression")]
    MissingColumnOrExpression,

    /// The operation requires a prior `model(...)` call.
    #[error("{0} requires a bound model")]
    ModelNotBound(&'static str),

    /// A primary-key shortcut was used on a model without primary keys.
    #[error("table {0} declares no primary key")]
    PkNotBound(String),

    /// INSERT with no rows, UPDATE with no SET, or MERGE with no WHEN branch.
    #[error("{0} has nothing to write")]
    EmptyValueSource(&'static str),

    /// DELETE with an empty WHERE clause and no `force_all()`.
    #[error("refusing to delete without a WHERE clause (use force_all to override)")]
    UnconditionalDelete,

    /// The active dialect cannot express the requested construct.
    #[error("{feature} is not supported on {dialect}")]
    UnsupportedDialect {
        feature: &'static str,
        dialect: Dialect,
    },

    /// A window frame bound pair violates the bound ordering rules.
    #[error("invalid window frame bounds: {0}")]
    InvalidFrameBounds(String),

    /// An argument list has the wrong shape (odd-arity pairs, missing n, ...).
    #[error("invalid argument shape: {0}")]
    ArgumentShape(String),

    /// Transparent forwarding of a driver failure.
    #[error("driver error: {0}")]
    Driver(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The context was cancelled or its deadline expired before the driver
    /// was reached.
    #[error("context cancelled: {0}")]
    Cancelled(String),
}

impl Error {
    /// Wrap a driver failure.
    pub fn driver(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Driver(Box::new(err))
    }

    /// Shorthand for an [`Error::UnsupportedDialect`].
    pub fn unsupported(feature: &'static str, dialect: Dialect) -> Self {
        Error::UnsupportedDialect { feature, dialect }
    }
}
