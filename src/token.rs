//! SQL tokens - the atomic units of SQL output.
//!
//! Tokens are dialect-agnostic representations that serialize to
//! dialect-specific strings. Bound parameters travel as [`Token::Bind`]
//! tokens and are collected into the ordered argument list when the
//! stream is serialized.

use crate::dialect::{Dialect, SqlDialect};
use crate::value::Value;

/// A rendered statement: SQL text plus the ordered argument list.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// SQL token - every possible element in a statement.
///
/// Adding a new variant here causes compile errors everywhere it needs to
/// be handled (exhaustive matching).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // === Keywords ===
    Select,
    From,
    Where,
    And,
    Or,
    Not,
    As,
    On,
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    Cross,
    GroupBy,
    Having,
    OrderBy,
    Asc,
    Desc,
    NullsFirst,
    NullsLast,
    Limit,
    Offset,
    Fetch,
    Next,
    Rows,
    Only,
    Case,
    When,
    Then,
    Else,
    End,
    In,
    Between,
    Like,
    ILike,
    IsNull,
    IsNotNull,
    Distinct,
    All,
    Union,
    Intersect,
    Except,
    With,
    Recursive,
    Exists,
    Null,
    True,
    False,
    Escape,
    Filter,
    WithinGroup,
    Separator,
    Interval,
    CurrentDate,
    CurrentTime,
    CurrentTimestamp,

    // === Window keywords ===
    Over,
    PartitionBy,
    Range,
    Groups,
    Unbounded,
    Preceding,
    Following,
    CurrentRow,
    IgnoreNulls,
    RespectNulls,
    FromFirst,
    FromLast,

    // === Locking keywords ===
    ForUpdate,
    ForShare,
    SkipLocked,
    Nowait,

    // === DML keywords ===
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
    Returning,
    Output,
    Inserted,
    Deleted,
    Using,
    Conflict,
    Do,
    Nothing,
    Ignore,
    OnDuplicateKeyUpdate,
    Merge,
    Matched,
    BySource,
    ByTarget,

    // === Punctuation ===
    Comma,
    Dot,
    Star,
    LParen,
    RParen,

    // === Operators ===
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
    Concat,
    JsonContains,

    // === Whitespace ===
    Space,

    // === Dynamic content ===
    /// Simple identifier (table, column, alias).
    Ident(String),
    /// Qualified identifier: alias.column or schema.table.
    QualifiedIdent { qualifier: String, name: String },
    /// Integer literal.
    LitInt(i64),
    /// Inlined literal value.
    Lit(Value),
    /// A bound parameter. Serializing the stream emits the dialect's
    /// positional placeholder and appends the value to the argument list.
    Bind(Value),

    // === Function names ===
    /// Function name, subject to per-dialect remapping
    /// (e.g. NOW -> GETDATE on SQL Server).
    FunctionName(String),

    // === Escape hatch ===
    /// Raw SQL passed directly to output without escaping.
    ///
    /// # Security Warning
    ///
    /// **Never pass user input to this variant.** Raw SQL is not sanitized
    /// and can lead to SQL injection vulnerabilities. For user-provided
    /// values, use `Token::Bind`.
    Raw(String),
}

impl Token {
    /// Serialize this token to a string for the given dialect.
    ///
    /// `Bind` tokens are handled by [`TokenStream::serialize`]; calling
    /// this directly on one is a logic error.
    fn serialize(&self, dialect: Dialect) -> String {
        match self {
            Token::Select => "SELECT".into(),
            Token::From => "FROM".into(),
            Token::Where => "WHERE".into(),
            Token::And => "AND".into(),
            Token::Or => "OR".into(),
            Token::Not => "NOT".into(),
            Token::As => "AS".into(),
            Token::On => "ON".into(),
            Token::Join => "JOIN".into(),
            Token::Inner => "INNER".into(),
            Token::Left => "LEFT".into(),
            Token::Right => "RIGHT".into(),
            Token::Full => "FULL".into(),
            Token::Outer => "OUTER".into(),
            Token::Cross => "CROSS".into(),
            Token::GroupBy => "GROUP BY".into(),
            Token::Having => "HAVING".into(),
            Token::OrderBy => "ORDER BY".into(),
            Token::Asc => "ASC".into(),
            Token::Desc => "DESC".into(),
            Token::NullsFirst => "NULLS FIRST".into(),
            Token::NullsLast => "NULLS LAST".into(),
            Token::Limit => "LIMIT".into(),
            Token::Offset => "OFFSET".into(),
            Token::Fetch => "FETCH".into(),
            Token::Next => "NEXT".into(),
            Token::Rows => "ROWS".into(),
            Token::Only => "ONLY".into(),
            Token::Case => "CASE".into(),
            Token::When => "WHEN".into(),
            Token::Then => "THEN".into(),
            Token::Else => "ELSE".into(),
            Token::End => "END".into(),
            Token::In => "IN".into(),
            Token::Between => "BETWEEN".into(),
            Token::Like => "LIKE".into(),
            Token::ILike => "ILIKE".into(),
            Token::IsNull => "IS NULL".into(),
            Token::IsNotNull => "IS NOT NULL".into(),
            Token::Distinct => "DISTINCT".into(),
            Token::All => "ALL".into(),
            Token::Union => "UNION".into(),
            Token::Intersect => "INTERSECT".into(),
            Token::Except => "EXCEPT".into(),
            Token::With => "WITH".into(),
            Token::Recursive => "RECURSIVE".into(),
            Token::Exists => "EXISTS".into(),
            Token::Null => "NULL".into(),
            Token::True => "TRUE".into(),
            Token::False => "FALSE".into(),
            Token::Escape => "ESCAPE".into(),
            Token::Filter => "FILTER".into(),
            Token::WithinGroup => "WITHIN GROUP".into(),
            Token::Separator => "SEPARATOR".into(),
            Token::Interval => "INTERVAL".into(),
            Token::CurrentDate => "CURRENT_DATE".into(),
            Token::CurrentTime => "CURRENT_TIME".into(),
            Token::CurrentTimestamp => "CURRENT_TIMESTAMP".into(),

            Token::Over => "OVER".into(),
            Token::PartitionBy => "PARTITION BY".into(),
            Token::Range => "RANGE".into(),
            Token::Groups => "GROUPS".into(),
            Token::Unbounded => "UNBOUNDED".into(),
            Token::Preceding => "PRECEDING".into(),
            Token::Following => "FOLLOWING".into(),
            Token::CurrentRow => "CURRENT ROW".into(),
            Token::IgnoreNulls => "IGNORE NULLS".into(),
            Token::RespectNulls => "RESPECT NULLS".into(),
            Token::FromFirst => "FROM FIRST".into(),
            Token::FromLast => "FROM LAST".into(),

            Token::ForUpdate => "FOR UPDATE".into(),
            Token::ForShare => "FOR SHARE".into(),
            Token::SkipLocked => "SKIP LOCKED".into(),
            Token::Nowait => "NOWAIT".into(),

            Token::Insert => "INSERT".into(),
            Token::Into => "INTO".into(),
            Token::Values => "VALUES".into(),
            Token::Update => "UPDATE".into(),
            Token::Set => "SET".into(),
            Token::Delete => "DELETE".into(),
            Token::Returning => "RETURNING".into(),
            Token::Output => "OUTPUT".into(),
            Token::Inserted => "INSERTED".into(),
            Token::Deleted => "DELETED".into(),
            Token::Using => "USING".into(),
            Token::Conflict => "CONFLICT".into(),
            Token::Do => "DO".into(),
            Token::Nothing => "NOTHING".into(),
            Token::Ignore => "IGNORE".into(),
            Token::OnDuplicateKeyUpdate => "ON DUPLICATE KEY UPDATE".into(),
            Token::Merge => "MERGE".into(),
            Token::Matched => "MATCHED".into(),
            Token::BySource => "BY SOURCE".into(),
            Token::ByTarget => "BY TARGET".into(),

            Token::Comma => ",".into(),
            Token::Dot => ".".into(),
            Token::Star => "*".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),

            Token::Eq => "=".into(),
            Token::Ne => "<>".into(),
            Token::Lt => "<".into(),
            Token::Gt => ">".into(),
            Token::Lte => "<=".into(),
            Token::Gte => ">=".into(),
            Token::Plus => "+".into(),
            Token::Minus => "-".into(),
            Token::Mul => "*".into(),
            Token::Div => "/".into(),
            Token::Mod => "%".into(),
            Token::Concat => dialect.concat_operator().into(),
            Token::JsonContains => "@>".into(),

            Token::Space => " ".into(),

            Token::Ident(name) => dialect.quote_identifier(name),
            Token::QualifiedIdent { qualifier, name } => format!(
                "{}.{}",
                dialect.quote_identifier(qualifier),
                dialect.quote_identifier(name)
            ),
            Token::LitInt(n) => n.to_string(),
            Token::Lit(v) => v.to_literal(dialect),
            Token::Bind(_) => unreachable!("Bind tokens are serialized by TokenStream"),

            Token::FunctionName(name) => match dialect.remap_function(name) {
                Some(remapped) => remapped.to_uppercase(),
                None => name.to_uppercase(),
            },

            Token::Raw(s) => s.clone(),
        }
    }
}

/// A stream of tokens that serializes to a [`Statement`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Create an empty token stream.
    pub fn new() -> Self {
        Self { tokens: vec![] }
    }

    /// Push a single token.
    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    /// Extend with multiple tokens.
    pub fn extend(&mut self, tokens: impl IntoIterator<Item = Token>) -> &mut Self {
        self.tokens.extend(tokens);
        self
    }

    /// Append another token stream.
    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend(other.tokens.iter().cloned());
        self
    }

    /// Whether the stream holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Serialize all tokens to SQL text plus the ordered argument list.
    ///
    /// Each `Bind` token emits the dialect's placeholder for the next
    /// 1-based parameter index and contributes its value to `params`.
    pub fn serialize(&self, dialect: Dialect) -> Statement {
        let mut sql = String::new();
        let mut params = Vec::new();
        for token in &self.tokens {
            match token {
                Token::Bind(value) => {
                    params.push(value.clone());
                    sql.push_str(&dialect.placeholder(params.len()));
                }
                other => sql.push_str(&other.serialize(dialect)),
            }
        }
        Statement { sql, params }
    }

    // Convenience methods for common tokens
    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }
    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }
    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }
    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
    pub fn bind(&mut self, value: Value) -> &mut Self {
        self.push(Token::Bind(value))
    }

    /// Append `parts` separated by `", "`.
    pub fn comma_separated(&mut self, parts: impl IntoIterator<Item = TokenStream>) -> &mut Self {
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                self.comma().space();
            }
            self.append(&part);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_serialize() {
        let mut ts = TokenStream::new();
        ts.push(Token::Select);
        assert_eq!(ts.serialize(Dialect::Postgres).sql, "SELECT");
        let mut ts = TokenStream::new();
        ts.push(Token::GroupBy);
        assert_eq!(ts.serialize(Dialect::SqlServer).sql, "GROUP BY");
    }

    #[test]
    fn test_ident_serialize() {
        let mut ts = TokenStream::new();
        ts.push(Token::Ident("users".into()));
        assert_eq!(ts.serialize(Dialect::Postgres).sql, "\"users\"");
        assert_eq!(ts.serialize(Dialect::SqlServer).sql, "[users]");
        assert_eq!(ts.serialize(Dialect::MySql).sql, "`users`");
    }

    #[test]
    fn test_qualified_ident() {
        let mut ts = TokenStream::new();
        ts.push(Token::QualifiedIdent {
            qualifier: "u".into(),
            name: "name".into(),
        });
        assert_eq!(ts.serialize(Dialect::SqlServer).sql, "[u].[name]");
        assert_eq!(ts.serialize(Dialect::Postgres).sql, "\"u\".\"name\"");
    }

    #[test]
    fn test_bind_placeholders() {
        let mut ts = TokenStream::new();
        ts.bind(Value::Int(1)).comma().space().bind(Value::from("x"));

        let pg = ts.serialize(Dialect::Postgres);
        assert_eq!(pg.sql, "$1, $2");
        assert_eq!(pg.params, vec![Value::Int(1), Value::from("x")]);

        let my = ts.serialize(Dialect::MySql);
        assert_eq!(my.sql, "?, ?");

        let ora = ts.serialize(Dialect::Oracle);
        assert_eq!(ora.sql, ":p1, :p2");

        let ms = ts.serialize(Dialect::SqlServer);
        assert_eq!(ms.sql, "@p1, @p2");
    }

    #[test]
    fn test_serialize_is_idempotent() {
        let mut ts = TokenStream::new();
        ts.push(Token::Select)
            .space()
            .bind(Value::Int(7))
            .space()
            .push(Token::Ident("a".into()));
        let first = ts.serialize(Dialect::Postgres);
        let second = ts.serialize(Dialect::Postgres);
        assert_eq!(first, second);
    }

    #[test]
    fn test_concat_dialect() {
        let mut ts = TokenStream::new();
        ts.push(Token::Concat);
        assert_eq!(ts.serialize(Dialect::Postgres).sql, "||");
        assert_eq!(ts.serialize(Dialect::SqlServer).sql, "+");
    }
}
