//! Per-probe CSV export.

use crate::monitor::constants::CSV_HEADER;
use crate::monitor::error::{MonitorError, Result};
use crate::monitor::window::Sample;
use chrono::{DateTime, Local, SecondsFormat};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One row of the export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRecord {
    pub timestamp: DateTime<Local>,
    pub host: String,
    pub resolved_ip: Option<IpAddr>,
    pub latency_ms: Option<f64>,
    pub success: bool,
}

impl ExportRecord {
    pub fn new(
        timestamp: DateTime<Local>,
        host: &str,
        resolved_ip: Option<IpAddr>,
        sample: &Sample,
    ) -> Self {
        Self {
            timestamp,
            host: host.to_string(),
            resolved_ip,
            latency_ms: sample.latency(),
            success: !sample.is_failure(),
        }
    }

    /// Render as a CSV line without the trailing newline
    pub fn to_csv_row(&self) -> String {
        let fields = [
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, false),
            self.host.clone(),
            self.resolved_ip.map(|ip| ip.to_string()).unwrap_or_default(),
            self.latency_ms.map(|ms| format!("{:.3}", ms)).unwrap_or_default(),
            self.success.to_string(),
        ];
        join_row(&fields)
    }
}

/// Quote a field when it holds a delimiter, a quote or a line break
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn join_row<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Destination for probe records
pub trait Exporter {
    fn export(&mut self, record: &ExportRecord) -> Result<()>;
}

/// Appends records to a CSV file, writing the header to a new or empty file
pub struct CsvExporter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl CsvExporter {
    pub fn open(path: &Path) -> Result<Self> {
        let export_error = |source| MonitorError::Export {
            path: path.to_path_buf(),
            source,
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(export_error)?;
        let is_empty = file.metadata().map_err(export_error)?.len() == 0;

        let mut exporter = Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        };
        if is_empty {
            debug!(path = %path.display(), "Writing CSV header");
            exporter.write_line(&join_row(&CSV_HEADER))?;
        }
        info!(path = %path.display(), "Exporting probe results to CSV");
        Ok(exporter)
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{}", line)
            .and_then(|_| self.writer.flush())
            .map_err(|source| MonitorError::Export {
                path: self.path.clone(),
                source,
            })
    }
}

impl Exporter for CsvExporter {
    fn export(&mut self, record: &ExportRecord) -> Result<()> {
        self.write_line(&record.to_csv_row())
    }
}

#[cfg(test)]
mockall::mock! {
    pub Exporter {}
    impl Exporter for Exporter {
        fn export(&mut self, record: &ExportRecord) -> Result<()>;
    }
}
