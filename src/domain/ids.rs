//! Identifier types with validation
//!
//! Table and column names end up inside SQL text, so they are validated once
//! here and only ever emitted double-quoted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn is_plain_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    part.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn quote_identifier(part: &str) -> String {
    format!("\"{part}\"")
}

/// Source table identifier
///
/// A table name, optionally schema (and database) qualified, e.g.
/// `public.sales`. This is also the identifier the watermark is stored under.
///
/// # Examples
///
/// ```
/// use highwater::domain::ids::SourceId;
/// use std::str::FromStr;
///
/// let source = SourceId::from_str("public.sales").unwrap();
/// assert_eq!(source.table_name_only(), "sales");
/// assert_eq!(source.quoted(), "\"public\".\"sales\"");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId(String);

impl SourceId {
    /// Creates a new SourceId, validating every dot-separated part
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Table name cannot be empty".to_string());
        }

        let parts: Vec<&str> = id.split('.').collect();
        if parts.len() > 3 {
            return Err(format!(
                "Invalid table name '{id}': expected [database.][schema.]table"
            ));
        }
        if let Some(bad) = parts.iter().find(|p| !is_plain_identifier(p)) {
            return Err(format!(
                "Invalid table name '{id}': '{bad}' is not a valid identifier"
            ));
        }

        Ok(Self(id))
    }

    /// Returns the identifier as written in configuration
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Table name without schema, used to name artifacts
    pub fn table_name_only(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Double-quoted, dot-joined form for use in SQL text
    pub fn quoted(&self) -> String {
        self.0
            .split('.')
            .map(quote_identifier)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SourceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for SourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Column name of the monotonically increasing key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnName(String);

impl ColumnName {
    /// Creates a new ColumnName from a single unqualified identifier
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("Key column cannot be empty".to_string());
        }
        if !is_plain_identifier(&name) {
            return Err(format!("Invalid key column '{name}'"));
        }
        Ok(Self(name))
    }

    /// Returns the column name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted form for use in SQL text
    pub fn quoted(&self) -> String {
        quote_identifier(&self.0)
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ColumnName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
