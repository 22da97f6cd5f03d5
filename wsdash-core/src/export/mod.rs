//! Export of logged readings
//!
//! Readings leave the log as [`Record`]s (ordered `(field, value)` pairs
//! with the timestamp first) and are rendered as JSON or CSV.

mod csv;
mod json;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

pub use csv::CsvExporter;
pub use json::JsonExporter;

/// One exported reading: field/value pairs in display order
pub type Record = Vec<(String, String)>;

/// Errors raised while exporting
#[derive(Debug, Error)]
pub enum ExportError {
    /// There were no readings to export
    #[error("No readings to export")]
    EmptyLog,

    /// Rendering failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Writing the output file failed
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        /// Destination file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Unknown format name
    #[error("Unsupported export format '{0}' (expected json or csv)")]
    UnsupportedFormat(String),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Pretty-printed array of objects
    Json,
    /// Semicolon-separated values with a header row
    Csv,
}

impl ExportFormat {
    /// File extension without the dot
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// MIME type of the rendered output
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv;charset=utf-8",
        }
    }

    /// All formats
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Json, Self::Csv]
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Renders records in the given format
///
/// # Errors
///
/// Returns [`ExportError::EmptyLog`] for an empty slice, or a serialization
/// error.
pub fn render(records: &[Record], format: ExportFormat) -> ExportResult<String> {
    if records.is_empty() {
        return Err(ExportError::EmptyLog);
    }
    match format {
        ExportFormat::Json => JsonExporter::export(records),
        ExportFormat::Csv => Ok(CsvExporter::export(records)),
    }
}

/// Default file name for an export made on `date`
#[must_use]
pub fn default_file_name(format: ExportFormat, date: NaiveDate) -> String {
    format!("readings-{}.{}", date.format("%Y-%m-%d"), format.extension())
}

/// Renders and writes records, returning the path written
///
/// An existing directory as `path` receives a file with the default name
/// for today's date.
///
/// # Errors
///
/// Returns an error if rendering or writing fails.
pub fn write_export(
    records: &[Record],
    format: ExportFormat,
    path: &Path,
) -> ExportResult<PathBuf> {
    let _span = tracing::info_span!(
        crate::tracing::span_names::EXPORT_EXECUTE,
        format = %format,
        count = records.len()
    )
    .entered();

    let content = render(records, format)?;
    let target = if path.is_dir() {
        path.join(default_file_name(format, chrono::Local::now().date_naive()))
    } else {
        path.to_path_buf()
    };

    fs::write(&target, content).map_err(|source| ExportError::Write {
        path: target.clone(),
        source,
    })?;

    info!(path = %target.display(), "Export written");
    Ok(target)
}
