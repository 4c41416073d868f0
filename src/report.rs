//! Plain-text schema report for the one-shot `report` mode.

use crate::models::SchemaSnapshot;
use std::fmt;

/// Plain-text view of a snapshot.
pub struct SchemaReport<'a>(pub &'a SchemaSnapshot);

impl fmt::Display for SchemaReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.0;

        writeln!(f, "Database tables ({}):", snapshot.total_tables())?;
        for name in snapshot.table_names() {
            writeln!(f, "  - {}", name)?;
        }

        if snapshot.total_tables() == 0 {
            return Ok(());
        }

        writeln!(f)?;
        writeln!(f, "Table details:")?;
        for table in snapshot.tables() {
            writeln!(f)?;
            writeln!(f, "  Table: {}", table.name)?;
            for col in &table.columns {
                let nullable = if col.nullable { "NULL" } else { "NOT NULL" };
                write!(f, "    - {}: {} {}", col.name, col.data_type, nullable)?;
                if let Some(default) = &col.default_expression {
                    write!(f, " DEFAULT {}", default)?;
                }
                writeln!(f)?;
            }
            writeln!(f, "    Rows: {}", table.row_count)?;
        }
        Ok(())
    }
}

/// Render a snapshot as a human-readable report.
///
/// ```
/// use table_checker::models::{ColumnDescriptor, SchemaSnapshot, TableDescriptor};
/// use table_checker::report::render_report;
///
/// let snapshot = SchemaSnapshot::new(vec![TableDescriptor::new(
///     "users",
///     vec![ColumnDescriptor::new("id", "int", false)],
///     3,
/// )]);
/// let report = render_report(&snapshot);
/// assert!(report.contains("    - id: int NOT NULL"));
/// assert!(report.contains("    Rows: 3"));
/// ```
pub fn render_report(snapshot: &SchemaSnapshot) -> String {
    SchemaReport(snapshot).to_string()
}
