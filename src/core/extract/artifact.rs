//! Artifact naming
//!
//! Artifacts are named `{prefix}/{table}_{YYYYMMDD_HHMMSS_mmm}.{ext}` with the
//! table name stripped of its schema and the timestamp taken in UTC.

use crate::adapters::s3::join_key;
use crate::config::OutputFormat;
use crate::domain::ids::SourceId;
use chrono::{DateTime, Utc};
use std::fmt;

/// Storage key of one artifact, relative to the sink root or bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactPath(String);

impl ArtifactPath {
    /// Name the artifact for a run of `source` started at `run_at`
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use highwater::config::OutputFormat;
    /// use highwater::core::extract::ArtifactPath;
    /// use highwater::domain::SourceId;
    ///
    /// let run_at = Utc.with_ymd_and_hms(2024, 7, 4, 9, 5, 3).unwrap();
    /// let source = SourceId::new("public.sales").unwrap();
    /// let path = ArtifactPath::for_run("sales-data", &source, run_at, OutputFormat::Parquet);
    /// assert_eq!(path.as_str(), "sales-data/sales_20240704_090503_000.parquet");
    /// ```
    pub fn for_run(
        prefix: &str,
        source: &SourceId,
        run_at: DateTime<Utc>,
        format: OutputFormat,
    ) -> Self {
        let name = format!(
            "{}_{}.{}",
            source.table_name_only(),
            run_at.format("%Y%m%d_%H%M%S_%3f"),
            format.extension()
        );
        Self(join_key(prefix, &name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArtifactPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
