//! Export of a collection as a downloadable blob.
//!
//! Server-side exports go through [`ResourceApi::export`](crate::client::ResourceApi::export);
//! [`summary_csv`] renders the currently filtered view on the client instead.

use crate::filter::FilterSet;
use crate::resource::Resource;
use crate::{OpsError, OpsResult};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    pub fn extension(self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(OpsError::InvalidInput(format!(
                "unknown export format {other:?} (expected csv or pdf)"
            ))),
        }
    }
}

/// Query string sent to `<collection>/export`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportQuery {
    pub format: ExportFormat,
    /// Active selector values; `all` selectors are never sent.
    pub filters: Vec<(String, String)>,
}

impl ExportQuery {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            filters: Vec::new(),
        }
    }

    pub fn from_filters(format: ExportFormat, filters: &FilterSet) -> Self {
        Self {
            format,
            filters: filters
                .active_selectors()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }

    /// Query parameters, `format` first.
    pub fn params(&self) -> Vec<(&str, &str)> {
        std::iter::once(("format", self.format.as_str()))
            .chain(self.filters.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .collect()
    }
}

/// Downloaded export contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportBlob {
    pub content_type: String,
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ExportBlob {
    /// Name the blob `<collection-leaf>-<unix-millis>.<ext>`.
    pub fn new<R: Resource>(format: ExportFormat, content_type: String, bytes: Vec<u8>) -> Self {
        let leaf = R::COLLECTION_PATH
            .rsplit('/')
            .next()
            .unwrap_or(R::COLLECTION_PATH);
        let filename = format!(
            "{leaf}-{}.{}",
            chrono::Utc::now().timestamp_millis(),
            format.extension()
        );

        Self {
            content_type,
            filename,
            bytes,
        }
    }

    /// Write the blob into `dir` under its filename and return the full path.
    pub fn write_to(&self, dir: &Path) -> OpsResult<PathBuf> {
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes).map_err(OpsError::FileWrite)?;
        tracing::info!("wrote export to {}", path.display());
        Ok(path)
    }
}

/// CSV of each record's id followed by every selector value, in [`Resource::SELECTORS`] order.
pub fn summary_csv<'a, R, I>(records: I) -> String
where
    R: Resource,
    I: IntoIterator<Item = &'a R>,
{
    let mut headers = vec!["id"];
    headers.extend(R::SELECTORS.iter().copied());

    let rows = records.into_iter().map(|record| {
        std::iter::once(record.id().to_string())
            .chain(
                R::SELECTORS
                    .iter()
                    .map(|s| record.selector_value(s).unwrap_or_default().to_string()),
            )
            .collect::<Vec<String>>()
    });
    csv_table(&headers, rows)
}

/// Render a header row and data rows as RFC 4180 CSV.
pub fn csv_table<I>(headers: &[&str], rows: I) -> String
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut out = String::new();
    push_row(&mut out, headers.iter().map(|h| h.to_string()));
    for row in rows {
        push_row(&mut out, row.into_iter());
    }
    out
}

fn push_row(out: &mut String, cells: impl Iterator<Item = String>) {
    let row: Vec<String> = cells.map(|c| quote(&c)).collect();
    out.push_str(&row.join(","));
    out.push_str("\r\n");
}

fn quote(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::fixtures::{request, Request, RequestStatus};

    #[test]
    fn query_sends_only_active_selectors() {
        let mut filters = FilterSet::new();
        filters.select::<Request>("status", "pending").expect("select");
        filters.select::<Request>("urgency", "all").expect("select");
        filters.set_term("ignored by export");

        let query = ExportQuery::from_filters(ExportFormat::Pdf, &filters);
        assert_eq!(query.params(), vec![("format", "pdf"), ("status", "pending")]);
    }

    #[test]
    fn csv_quotes_awkward_cells() {
        let mut awkward = request("2", "Doe, \"JJ\"", RequestStatus::Approved);
        awkward.diagnosis = "line one\nline two".into();
        let records = vec![request("1", "Ada", RequestStatus::Pending), awkward];

        let csv = csv_table(
            &["ID", "Patient", "Diagnosis"],
            records
                .iter()
                .map(|r| vec![r.id.clone(), r.patient_name.clone(), r.diagnosis.clone()]),
        );

        assert_eq!(
            csv,
            "ID,Patient,Diagnosis\r\n1,Ada,observation\r\n2,\"Doe, \"\"JJ\"\"\",\"line one\nline two\"\r\n"
        );
    }

    #[test]
    fn summary_has_id_and_selector_columns() {
        let records = vec![
            request("1", "Ada", RequestStatus::Pending),
            request("2", "Alan", RequestStatus::Rejected),
        ];
        let csv = summary_csv(records.iter().filter(|r| r.status == RequestStatus::Pending));
        assert_eq!(csv, "id,status,urgency\r\n1,pending,medium\r\n");
    }

    #[test]
    fn blob_is_named_after_collection_and_written_to_disk() {
        let blob = ExportBlob::new::<Request>(ExportFormat::Csv, "text/csv".into(), b"a,b\r\n".to_vec());
        assert!(blob.filename.starts_with("requests-"));
        assert!(blob.filename.ends_with(".csv"));

        let dir = tempfile::tempdir().expect("tempdir");
        let path = blob.write_to(dir.path()).expect("write");
        assert_eq!(std::fs::read(path).expect("read back"), b"a,b\r\n");
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("CSV".parse::<ExportFormat>().expect("csv"), ExportFormat::Csv);
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }
}
