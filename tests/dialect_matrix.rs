//! The same statements rendered across every dialect, with sqlparser
//! roundtrip validation where a matching parser dialect exists.

use insta::assert_snapshot;
use sqlparser::dialect::{MsSqlDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;

use sqlmint::prelude::*;

struct User;

impl Table for User {
    fn descriptor() -> TableDescriptor {
        TableDescriptor::new("users")
            .alias("u")
            .column(ColumnDescriptor::new("id").primary_key())
            .column(ColumnDescriptor::new("name"))
            .column(ColumnDescriptor::new("age"))
    }
}

/// Parse the emitted SQL with the matching sqlparser dialect.
/// Oracle has no sqlparser counterpart and is skipped.
fn validate(sql: &str, dialect: Dialect) {
    let parser: Box<dyn sqlparser::dialect::Dialect> = match dialect {
        Dialect::Postgres => Box::new(PostgreSqlDialect {}),
        Dialect::MySql => Box::new(MySqlDialect {}),
        Dialect::Sqlite => Box::new(SQLiteDialect {}),
        Dialect::SqlServer => Box::new(MsSqlDialect {}),
        Dialect::Oracle => return,
    };
    Parser::parse_sql(&*parser, sql)
        .unwrap_or_else(|e| panic!("invalid SQL for {dialect:?}: {e}\n{sql}"));
}

fn paged_query(dialect: Dialect) -> Statement {
    Select::new()
        .model::<User>()
        .filter(|c| {
            c.eq("age", 30);
        })
        .order_by("id")
        .limit(10)
        .to_sql(dialect)
        .unwrap()
}

#[test]
fn paged_select_postgres() {
    let stmt = paged_query(Dialect::Postgres);
    assert_snapshot!(
        stmt.sql,
        @r#"SELECT "u".* FROM "users" AS "u" WHERE "u"."age" = $1 ORDER BY "u"."id" ASC LIMIT 10"#
    );
    validate(&stmt.sql, Dialect::Postgres);
}

#[test]
fn paged_select_mysql() {
    let stmt = paged_query(Dialect::MySql);
    assert_snapshot!(
        stmt.sql,
        @"SELECT `u`.* FROM `users` AS `u` WHERE `u`.`age` = ? ORDER BY `u`.`id` ASC LIMIT 10"
    );
    validate(&stmt.sql, Dialect::MySql);
}

#[test]
fn paged_select_sqlite() {
    let stmt = paged_query(Dialect::Sqlite);
    assert_snapshot!(
        stmt.sql,
        @r#"SELECT "u".* FROM "users" AS "u" WHERE "u"."age" = ? ORDER BY "u"."id" ASC LIMIT 10"#
    );
    validate(&stmt.sql, Dialect::Sqlite);
}

#[test]
fn paged_select_oracle() {
    let stmt = paged_query(Dialect::Oracle);
    assert_snapshot!(
        stmt.sql,
        @r#"SELECT "u".* FROM "users" "u" WHERE "u"."age" = :p1 ORDER BY "u"."id" ASC OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY"#
    );
}

#[test]
fn paged_select_sqlserver() {
    let stmt = paged_query(Dialect::SqlServer);
    assert_snapshot!(
        stmt.sql,
        @"SELECT [u].* FROM [users] AS [u] WHERE [u].[age] = @p1 ORDER BY [u].[id] ASC OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY"
    );
    validate(&stmt.sql, Dialect::SqlServer);
}

#[test]
fn insert_parses_everywhere() {
    for dialect in Dialect::ALL {
        let stmt = Insert::new()
            .model::<User>()
            .row(Row::new().set("name", "Bob").set("age", 30))
            .to_sql(dialect)
            .unwrap();
        validate(&stmt.sql, dialect);
    }
}

#[test]
fn update_parses_everywhere() {
    for dialect in Dialect::ALL {
        let stmt = Update::new()
            .model::<User>()
            .set("name", val("x"))
            .filter(|c| {
                c.pk_eq(1i64);
            })
            .to_sql(dialect)
            .unwrap();
        validate(&stmt.sql, dialect);
    }
}

#[test]
fn delete_parses_everywhere() {
    for dialect in Dialect::ALL {
        let stmt = Delete::new()
            .model::<User>()
            .filter(|c| {
                c.eq("age", 99);
            })
            .to_sql(dialect)
            .unwrap();
        validate(&stmt.sql, dialect);
    }
}

#[test]
fn placeholder_numbering_is_sequential() {
    let stmt = Select::new()
        .model::<User>()
        .filter(|c| {
            c.eq("age", 1).or_eq("age", 2).in_list("id", [3i64, 4, 5]);
        })
        .to_sql(Dialect::Postgres)
        .unwrap();
    for n in 1..=5 {
        assert!(stmt.sql.contains(&format!("${n}")), "{}", stmt.sql);
    }
    assert_eq!(stmt.params.len(), 5);
}
