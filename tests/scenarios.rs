//! End-to-end scenarios against a recording driver.

use std::sync::{Arc, Mutex};

use sqlmint::prelude::*;

// =============================================================================
// Recording driver
// =============================================================================

#[derive(Default)]
struct RecordingDriver {
    calls: Mutex<Vec<(String, Vec<Value>)>>,
    rows: Mutex<Vec<Vec<Value>>>,
}

impl RecordingDriver {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn with_rows(rows: Vec<Vec<Value>>) -> Arc<Self> {
        let driver = Self::default();
        *driver.rows.lock().unwrap() = rows;
        Arc::new(driver)
    }

    fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }
}

struct VecRows {
    rows: Vec<Vec<Value>>,
    pos: usize,
}

impl Rows for VecRows {
    fn next(&mut self) -> bool {
        if self.pos < self.rows.len() {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn scan(&mut self, dest: &mut [Value]) -> Result<()> {
        let row = &self.rows[self.pos - 1];
        for (slot, value) in dest.iter_mut().zip(row.iter()) {
            *slot = value.clone();
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Driver for RecordingDriver {
    fn exec(&self, _ctx: &Context, sql: &str, params: &[Value]) -> Result<ExecResult> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.into(), params.to_vec()));
        Ok(ExecResult {
            rows_affected: 1,
            last_insert_id: None,
        })
    }

    fn query(&self, _ctx: &Context, sql: &str, params: &[Value]) -> Result<Box<dyn Rows>> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.into(), params.to_vec()));
        Ok(Box::new(VecRows {
            rows: self.rows.lock().unwrap().clone(),
            pos: 0,
        }))
    }
}

// =============================================================================
// Models
// =============================================================================

struct User;

impl Table for User {
    fn descriptor() -> TableDescriptor {
        TableDescriptor::new("users")
            .alias("u")
            .column(ColumnDescriptor::new("id").primary_key())
            .column(ColumnDescriptor::new("name"))
            .column(ColumnDescriptor::new("email"))
            .column(ColumnDescriptor::new("age"))
            .column(ColumnDescriptor::new("is_active"))
            .column(ColumnDescriptor::new("created_at").audit(AuditRole::CreatedAt))
            .column(ColumnDescriptor::new("created_by").audit(AuditRole::CreatedBy))
            .column(ColumnDescriptor::new("updated_at").audit(AuditRole::UpdatedAt))
            .column(ColumnDescriptor::new("updated_by").audit(AuditRole::UpdatedBy))
    }
}

struct Membership;

impl Table for Membership {
    fn descriptor() -> TableDescriptor {
        TableDescriptor::new("members")
            .alias("m")
            .column(ColumnDescriptor::new("tenant_id").primary_key())
            .column(ColumnDescriptor::new("user_id").primary_key())
            .column(ColumnDescriptor::new("role"))
    }
}

struct Employee;

impl Table for Employee {
    fn descriptor() -> TableDescriptor {
        TableDescriptor::new("employees")
            .alias("t")
            .column(ColumnDescriptor::new("id").primary_key())
            .column(ColumnDescriptor::new("dept"))
            .column(ColumnDescriptor::new("salary"))
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn basic_select_with_condition() {
    let stmt = Select::new()
        .model::<User>()
        .filter(|c| {
            c.eq("age", 30).or_eq("age", 25);
        })
        .order_by("id")
        .to_sql(Dialect::Postgres)
        .unwrap();

    assert_eq!(
        stmt.sql,
        "SELECT \"u\".* FROM \"users\" AS \"u\" \
         WHERE \"u\".\"age\" = $1 OR \"u\".\"age\" = $2 \
         ORDER BY \"u\".\"id\" ASC"
    );
    assert_eq!(stmt.params, vec![Value::Int(30), Value::Int(25)]);
}

#[test]
fn composite_pk_in() {
    let stmt = Select::new()
        .model::<Membership>()
        .filter(|c| {
            c.pk_in(vec![
                vec![Value::from("t1"), Value::from("u1")],
                vec![Value::from("t2"), Value::from("u2")],
            ]);
        })
        .to_sql(Dialect::Postgres)
        .unwrap();

    assert_eq!(
        stmt.sql,
        "SELECT \"m\".* FROM \"members\" AS \"m\" \
         WHERE (\"m\".\"tenant_id\",\"m\".\"user_id\") IN (($1,$2),($3,$4))"
    );
    assert_eq!(
        stmt.params,
        vec![
            Value::from("t1"),
            Value::from("u1"),
            Value::from("t2"),
            Value::from("u2"),
        ]
    );
}

#[test]
fn insert_with_audit_injection() {
    let driver = RecordingDriver::new();
    let db = Db::new(Dialect::Postgres, driver.clone());
    let ctx = Context::background().with_operator("alice");

    db.new_insert()
        .model::<User>()
        .row(Row::new().set("name", "Bob").set("email", "b@x"))
        .exec(&ctx, &db)
        .unwrap();

    let calls = driver.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].0,
        "INSERT INTO \"users\" \
         (\"name\",\"email\",\"created_at\",\"created_by\",\"updated_at\",\"updated_by\") \
         VALUES ($1,$2,CURRENT_TIMESTAMP,$3,CURRENT_TIMESTAMP,$4)"
    );
    assert_eq!(
        calls[0].1,
        vec![
            Value::from("Bob"),
            Value::from("b@x"),
            Value::from("alice"),
            Value::from("alice"),
        ]
    );
}

#[test]
fn audit_never_overwrites_user_values() {
    let driver = RecordingDriver::new();
    let db = Db::new(Dialect::Postgres, driver.clone());
    let ctx = Context::background().with_operator("alice");

    db.new_insert()
        .model::<User>()
        .row(Row::new().set("name", "Bob").set("updated_by", "migration"))
        .exec(&ctx, &db)
        .unwrap();

    let calls = driver.calls();
    assert_eq!(calls[0].0.matches("updated_by").count(), 1);
    assert!(calls[0].1.contains(&Value::from("migration")));
    // alice appears once, for created_by only
    assert_eq!(
        calls[0].1.iter().filter(|v| **v == Value::from("alice")).count(),
        1
    );
}

#[test]
fn merge_with_three_when_branches() {
    let stmt = Merge::new()
        .model::<User>()
        .with_values(
            "src",
            vec![
                Row::new().set("id", 1).set("name", "a").set("email", "a@x"),
                Row::new().set("id", 2).set("name", "b").set("email", "b@x"),
            ],
        )
        .using_table("src")
        .on(|c| {
            c.eq_col("u.id", "src.id");
        })
        .when_matched_update([("name", col("src.name")), ("email", col("src.email"))])
        .when_not_matched_insert(
            ["id", "name", "email"],
            vec![col("src.id"), col("src.name"), col("src.email")],
        )
        .when_not_matched_by_source_update([("is_active", val(false))])
        .to_sql(Dialect::Postgres)
        .unwrap();

    assert!(stmt.sql.starts_with("WITH \"src\" (\"id\", \"name\", \"email\") AS (VALUES"));
    let matched = stmt.sql.find("WHEN MATCHED THEN UPDATE").unwrap();
    let insert = stmt.sql.find("WHEN NOT MATCHED THEN INSERT").unwrap();
    let by_source = stmt.sql.find("WHEN NOT MATCHED BY SOURCE THEN UPDATE").unwrap();
    assert!(matched < insert && insert < by_source);
    // six row values bound, then the branch argument
    assert_eq!(stmt.params.len(), 7);
}

#[test]
fn window_function_fragment() {
    let stmt = Select::new()
        .model::<Employee>()
        .select_expr(
            row_number()
                .over()
                .partition_by(col("dept"))
                .order_by_desc(col("salary"))
                .build(),
            Some("rn"),
        )
        .to_sql(Dialect::Postgres)
        .unwrap();

    assert_eq!(
        stmt.sql,
        "SELECT ROW_NUMBER() OVER (PARTITION BY \"t\".\"dept\" \
         ORDER BY \"t\".\"salary\" DESC) AS \"rn\" \
         FROM \"employees\" AS \"t\""
    );
}

#[test]
fn delete_safety() {
    let driver = RecordingDriver::new();
    let db = Db::new(Dialect::Postgres, driver.clone());
    let ctx = Context::background();

    // No WHERE, no force_all: refused before the driver sees anything
    let err = db.new_delete().model::<User>().exec(&ctx, &db).unwrap_err();
    assert!(matches!(err, Error::UnconditionalDelete));
    assert!(driver.calls().is_empty());

    // force_all opens the gate
    db.new_delete()
        .model::<User>()
        .force_all()
        .exec(&ctx, &db)
        .unwrap();
    let calls = driver.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "DELETE FROM \"users\" AS \"u\"");
}

#[test]
fn merge_on_unsupported_dialect_never_reaches_driver() {
    let driver = RecordingDriver::new();
    let db = Db::new(Dialect::MySql, driver.clone());
    let ctx = Context::background();

    let err = db
        .new_merge()
        .model::<User>()
        .using_table("src")
        .on(|c| {
            c.eq_col("u.id", "src.id");
        })
        .when_matched_update([("name", col("src.name"))])
        .exec(&ctx, &db)
        .unwrap_err();

    assert!(matches!(
        err,
        Error::UnsupportedDialect { feature: "MERGE", .. }
    ));
    assert!(driver.calls().is_empty());
}

#[test]
fn cancelled_context_short_circuits() {
    let driver = RecordingDriver::new();
    let db = Db::new(Dialect::Postgres, driver.clone());
    let ctx = Context::background();
    ctx.cancel_handle().cancel();

    let err = db
        .new_insert()
        .model::<User>()
        .row(Row::new().set("name", "x"))
        .exec(&ctx, &db)
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled(_)));
    assert!(driver.calls().is_empty());
}

#[test]
fn count_and_exists_terminals() {
    let driver = RecordingDriver::with_rows(vec![vec![Value::Int(42)]]);
    let db = Db::new(Dialect::Postgres, driver.clone());
    let ctx = Context::background();

    let n = db
        .new_select()
        .model::<User>()
        .filter(|c| {
            c.eq("is_active", true);
        })
        .order_by("id")
        .limit(10)
        .count(&ctx, &db)
        .unwrap();
    assert_eq!(n, 42);

    let calls = driver.calls();
    // Ordering and pagination are stripped from the wrapped count query
    assert!(calls[0].0.contains("SELECT COUNT(*) FROM (SELECT"));
    assert!(!calls[0].0.contains("ORDER BY"));

    let found = db
        .new_select()
        .model::<User>()
        .exists(&ctx, &db)
        .unwrap();
    assert!(found);
    let calls = driver.calls();
    assert!(calls[1].0.contains("SELECT 1 FROM \"users\""));
    assert!(calls[1].0.ends_with("LIMIT 1"));
}

#[test]
fn raw_statement_translates_placeholders_only() {
    let driver = RecordingDriver::new();
    let db = Db::new(Dialect::Postgres, driver.clone());
    let ctx = Context::background();

    db.new_raw(
        "UPDATE users SET name = ? WHERE id = ?",
        vec![Value::from("x"), Value::Int(1)],
    )
    .exec(&ctx, &db)
    .unwrap();

    let calls = driver.calls();
    assert_eq!(calls[0].0, "UPDATE users SET name = $1 WHERE id = $2");
}

// =============================================================================
// Quantified invariants
// =============================================================================

#[test]
fn idempotent_render() {
    let q = Select::new()
        .model::<User>()
        .filter(|c| {
            c.eq("age", 30).or_in_list("id", [1i64, 2, 3]);
        })
        .group_by(["age"])
        .order_by_desc("age")
        .limit(7);
    let first = q.to_sql(Dialect::Postgres).unwrap();
    let second = q.to_sql(Dialect::Postgres).unwrap();
    assert_eq!(first.sql, second.sql);
    assert_eq!(first.params, second.params);
}

#[test]
fn list_order_preservation() {
    let stmt = Select::new()
        .model::<User>()
        .select(["name", "email", "age"])
        .order_by("age")
        .order_by_desc("name")
        .to_sql(Dialect::Postgres)
        .unwrap();

    let name = stmt.sql.find("\"u\".\"name\",").unwrap();
    let email = stmt.sql.find("\"u\".\"email\",").unwrap();
    assert!(name < email);
    assert!(stmt
        .sql
        .ends_with("ORDER BY \"u\".\"age\" ASC, \"u\".\"name\" DESC"));
}

#[test]
fn connective_matches_method_variant() {
    let stmt = Select::new()
        .model::<User>()
        .filter(|c| {
            c.eq("a", 1).or_eq("b", 2).eq("c", 3).or_eq("d", 4);
        })
        .to_sql(Dialect::Postgres)
        .unwrap();
    assert!(stmt.sql.contains(
        "\"u\".\"a\" = $1 OR \"u\".\"b\" = $2 AND \"u\".\"c\" = $3 OR \"u\".\"d\" = $4"
    ));
}

#[test]
fn empty_condition_elides_clause() {
    let stmt = Select::new()
        .model::<User>()
        .filter(|_| {})
        .having(|_| {})
        .to_sql(Dialect::Postgres)
        .unwrap();
    assert!(!stmt.sql.contains("WHERE"));
    assert!(!stmt.sql.contains("HAVING"));
}

#[test]
fn pk_shortcut_binds_like_manual_form() {
    let shortcut = Select::new()
        .model::<Membership>()
        .filter(|c| {
            c.pk_eq(vec![Value::from("t1"), Value::from("u1")]);
        })
        .to_sql(Dialect::Postgres)
        .unwrap();

    let manual = Select::new()
        .model::<Membership>()
        .filter(|c| {
            c.eq("tenant_id", "t1").eq("user_id", "u1");
        })
        .to_sql(Dialect::Postgres)
        .unwrap();

    assert_eq!(shortcut.params, manual.params);
}
