//! Delta query construction
//!
//! Identifiers are validated on construction and emitted double-quoted; the
//! watermark value is always a bound parameter, never spliced into SQL text.

use crate::core::state::watermark::{Watermark, WatermarkValue};
use crate::domain::ids::{ColumnName, SourceId};
use chrono::{DateTime, Utc};

/// A value bound to a delta query placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    /// Bound as `bigint`
    Integer(i64),
    /// Bound as `timestamptz`
    Timestamp(DateTime<Utc>),
}

/// Parameterized query selecting rows above a watermark
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaQuery {
    /// Table being read
    pub source: SourceId,
    /// Key column the predicate and ordering apply to
    pub key_column: ColumnName,
    /// SQL text with `$n` placeholders
    pub sql: String,
    /// Values for the placeholders, in order
    pub params: Vec<QueryParam>,
}

impl DeltaQuery {
    /// Returns true if the query reads the whole table
    pub fn is_full_scan(&self) -> bool {
        self.params.is_empty()
    }
}

/// Build the query returning every row of `source` with key above `watermark`
///
/// The minimum watermark yields no predicate, so a first run reads every
/// row regardless of the key's type. Rows come back ordered by key.
///
/// # Examples
///
/// ```
/// use highwater::core::query::build_delta_query;
/// use highwater::core::state::{Watermark, WatermarkValue};
/// use highwater::domain::{ColumnName, SourceId};
///
/// let source = SourceId::new("public.sales").unwrap();
/// let key = ColumnName::new("salesid").unwrap();
/// let wm = Watermark::new(source.clone(), WatermarkValue::Integer(100));
///
/// let query = build_delta_query(&source, &key, &wm);
/// assert_eq!(
///     query.sql,
///     r#"SELECT * FROM "public"."sales" WHERE "salesid" > $1::bigint ORDER BY "salesid""#
/// );
/// ```
pub fn build_delta_query(
    source: &SourceId,
    key_column: &ColumnName,
    watermark: &Watermark,
) -> DeltaQuery {
    let table = source.quoted();
    let key = key_column.quoted();

    let (predicate, params) = match &watermark.value {
        WatermarkValue::Minimum => (String::new(), Vec::new()),
        WatermarkValue::Integer(v) => (
            format!(" WHERE {key} > $1::bigint"),
            vec![QueryParam::Integer(*v)],
        ),
        WatermarkValue::Timestamp(ts) => (
            format!(" WHERE {key} > $1::timestamptz"),
            vec![QueryParam::Timestamp(*ts)],
        ),
    };

    DeltaQuery {
        source: source.clone(),
        key_column: key_column.clone(),
        sql: format!("SELECT * FROM {table}{predicate} ORDER BY {key}"),
        params,
    }
}
