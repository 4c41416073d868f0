//! Table identifiers that are safe to splice into SQL.
//!
//! Count queries cannot bind a table name as a parameter, so the name has to
//! appear in the statement text. A [`TableIdent`] can only be obtained from
//! [`KnownTables`], i.e. for a name the catalog itself just returned, and it
//! is always emitted quoted.

use crate::error::{DbError, DbResult};
use std::collections::BTreeSet;

/// Identifier quoting styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    /// `"name"` (PostgreSQL, SQLite)
    DoubleQuote,
    /// `` `name` `` (MySQL)
    Backtick,
}

impl QuoteStyle {
    fn quote_char(self) -> char {
        match self {
            Self::DoubleQuote => '"',
            Self::Backtick => '`',
        }
    }
}

/// Quote an identifier, doubling any embedded quote character.
pub fn quote_identifier(name: &str, style: QuoteStyle) -> String {
    let q = style.quote_char();
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push(q);
    for c in name.chars() {
        if c == q {
            quoted.push(q);
        }
        quoted.push(c);
    }
    quoted.push(q);
    quoted
}

/// A table name that was returned by the catalog query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableIdent {
    name: String,
}

impl TableIdent {
    /// Raw name, for binding as a query parameter.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quoted(&self, style: QuoteStyle) -> String {
        quote_identifier(&self.name, style)
    }

    /// `"namespace"."table"`
    pub fn qualified(&self, namespace: &str, style: QuoteStyle) -> String {
        format!(
            "{}.{}",
            quote_identifier(namespace, style),
            quote_identifier(&self.name, style)
        )
    }
}

/// Allow-list of table names produced by one catalog listing.
#[derive(Debug, Clone, Default)]
pub struct KnownTables {
    names: BTreeSet<String>,
}

impl KnownTables {
    pub fn from_catalog<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Resolve a name against the allow-list.
    pub fn resolve(&self, name: &str) -> DbResult<TableIdent> {
        if self.names.contains(name) {
            Ok(TableIdent {
                name: name.to_string(),
            })
        } else {
            Err(DbError::invalid_input(format!(
                "Table '{}' was not returned by the catalog",
                name
            )))
        }
    }
}
