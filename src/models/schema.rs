//! Schema snapshot data models.
//!
//! A snapshot is created fresh for every request and dropped once the
//! response has been serialized.

use serde::{Deserialize, Serialize};

/// One column as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Declared type as the catalog spells it
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
    /// Serialized as `null` when the column has no default
    #[serde(rename = "default")]
    pub default_expression: Option<String>,
}

impl ColumnDescriptor {
    /// Create a new column descriptor without a default.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
            default_expression: None,
        }
    }

    /// Set the default expression.
    pub fn with_default(mut self, default_expression: impl Into<String>) -> Self {
        self.default_expression = Some(default_expression.into());
        self
    }
}

/// One table with its columns in declaration order and its exact row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
    pub row_count: u64,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDescriptor>, row_count: u64) -> Self {
        Self {
            name: name.into(),
            columns,
            row_count,
        }
    }
}

/// Point-in-time read of every table in the inspected namespace.
///
/// Tables are kept sorted by name; the table count is always derived from
/// the table list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaSnapshot {
    tables: Vec<TableDescriptor>,
}

impl SchemaSnapshot {
    pub fn new(mut tables: Vec<TableDescriptor>) -> Self {
        tables.sort_by(|a, b| a.name.cmp(&b.name));
        Self { tables }
    }

    pub fn tables(&self) -> &[TableDescriptor] {
        &self.tables
    }

    pub fn total_tables(&self) -> usize {
        self.tables.len()
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|t| t.name == name)
    }
}
