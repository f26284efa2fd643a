//! Table and column descriptors.
//!
//! The schema catalog hands the statement builders an immutable
//! [`TableDescriptor`] per bound row type: physical name, canonical alias,
//! primary keys, and the full column list with audit roles. Row types
//! implement [`Table`] to act as models.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Auto-managed column roles recognized by the audit pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditRole {
    CreatedAt,
    CreatedBy,
    UpdatedAt,
    UpdatedBy,
    DeletedAt,
    DeletedBy,
}

/// A single column of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub primary_key: bool,
    pub audit: Option<AuditRole>,
}

impl ColumnDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            primary_key: false,
            audit: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn audit(mut self, role: AuditRole) -> Self {
        self.audit = Some(role);
        self
    }
}

/// An immutable description of a table: SQL name, canonical alias,
/// ordered column list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    pub alias: String,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    /// Create a descriptor. The default alias is the table name's first
    /// character; override with [`TableDescriptor::alias`].
    pub fn new(name: &str) -> Self {
        let alias = name.chars().next().map(String::from).unwrap_or_default();
        Self {
            name: name.into(),
            alias,
            columns: Vec::new(),
        }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = alias.into();
        self
    }

    pub fn column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.push(column);
        self
    }

    /// Primary-key columns in declaration order. Stable across calls.
    pub fn primary_keys(&self) -> Vec<&ColumnDescriptor> {
        self.columns.iter().filter(|c| c.primary_key).collect()
    }

    /// Non-primary-key columns in declaration order.
    pub fn data_columns(&self) -> Vec<&ColumnDescriptor> {
        self.columns.iter().filter(|c| !c.primary_key).collect()
    }

    /// Look up a column by name.
    pub fn column_named(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns carrying the given audit role.
    pub fn audit_columns(&self, role: AuditRole) -> Vec<&ColumnDescriptor> {
        self.columns
            .iter()
            .filter(|c| c.audit == Some(role))
            .collect()
    }
}

/// A row type that maps onto a table.
///
/// This is the seam to the external schema catalog: whatever reflection or
/// code generation produces the descriptor, the builders only see the
/// resulting value.
pub trait Table {
    fn descriptor() -> TableDescriptor;
}

/// A named row of values, used by row-literal INSERTs and VALUES CTEs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value. Order of calls is preserved.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.columns.push(column.into());
        self.values.push(value.into());
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> TableDescriptor {
        TableDescriptor::new("users")
            .alias("u")
            .column(ColumnDescriptor::new("id").primary_key())
            .column(ColumnDescriptor::new("name"))
            .column(ColumnDescriptor::new("created_at").audit(AuditRole::CreatedAt))
    }

    #[test]
    fn test_default_alias() {
        assert_eq!(TableDescriptor::new("orders").alias, "o");
    }

    #[test]
    fn test_primary_keys_stable() {
        let t = users();
        let first: Vec<_> = t.primary_keys().iter().map(|c| c.name.clone()).collect();
        let second: Vec<_> = t.primary_keys().iter().map(|c| c.name.clone()).collect();
        assert_eq!(first, vec!["id"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_audit_columns() {
        let t = users();
        assert_eq!(t.audit_columns(AuditRole::CreatedAt).len(), 1);
        assert!(t.audit_columns(AuditRole::DeletedAt).is_empty());
    }

    #[test]
    fn test_row() {
        let row = Row::new().set("name", "Bob").set("age", 30);
        assert_eq!(row.columns(), &["name".to_string(), "age".to_string()]);
        assert_eq!(row.get("age"), Some(&Value::Int(30)));
        assert_eq!(row.get("missing"), None);
    }
}
