// src/results/export.rs

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use tempfile::NamedTempFile;

use crate::error::AppError;

pub const EXPORT_FILE_PREFIX: &str = "Strengths-Compass-Test-Reports";

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// `Strengths-Compass-Test-Reports-2024-01-02T03-04-05-000Z.xlsx` for the given instant.
pub fn export_filename(now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{}-{}.xlsx", EXPORT_FILE_PREFIX, stamp)
}

/// A downloaded report, not yet written anywhere.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    pub fn new(bytes: Vec<u8>, now: DateTime<Utc>) -> Self {
        Self {
            filename: export_filename(now),
            bytes,
        }
    }

    /// `Content-Disposition` value offering the file as a download.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }

    /// Writes the report into `dir` under its own name.
    ///
    /// Bytes go to a temporary file in `dir` first and are moved into place
    /// once complete; on any failure the temporary file is removed.
    pub fn save_into(&self, dir: impl AsRef<Path>) -> Result<PathBuf, AppError> {
        let dir = dir.as_ref();
        let final_path = dir.join(&self.filename);

        let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| {
            AppError::Internal(format!(
                "Failed to create temporary export file in {}: {}",
                dir.display(),
                e
            ))
        })?;
        temp_file.write_all(&self.bytes)?;
        temp_file.flush()?;

        temp_file.persist(&final_path).map_err(|e| {
            AppError::Internal(format!(
                "Failed to persist export to {}: {}",
                final_path.display(),
                e.error
            ))
        })?;

        tracing::info!("Saved report export to {}", final_path.display());
        Ok(final_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn filename_embeds_sanitized_timestamp() {
        assert_eq!(
            export_filename(instant()),
            "Strengths-Compass-Test-Reports-2024-01-02T03-04-05-000Z.xlsx"
        );
    }

    #[test]
    fn timestamp_segment_has_no_colons_or_periods() {
        let name = export_filename(Utc::now());
        let stamp = name
            .strip_prefix("Strengths-Compass-Test-Reports-")
            .and_then(|rest| rest.strip_suffix(".xlsx"))
            .unwrap();
        assert!(!stamp.contains(':'));
        assert!(!stamp.contains('.'));
        assert!(stamp.ends_with('Z'));
    }

    #[test]
    fn save_into_writes_file_and_leaves_no_temporaries() {
        let dir = TempDir::new().unwrap();
        let export = ExportFile::new(b"PK\x03\x04sheet".to_vec(), instant());

        let path = export.save_into(dir.path()).unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"PK\x03\x04sheet");
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let export = ExportFile::new(vec![1, 2, 3], instant());
        assert!(export.save_into(dir.path().join("missing")).is_err());
    }

    #[test]
    fn content_disposition_quotes_filename() {
        let export = ExportFile::new(Vec::new(), instant());
        assert_eq!(
            export.content_disposition(),
            "attachment; filename=\"Strengths-Compass-Test-Reports-2024-01-02T03-04-05-000Z.xlsx\""
        );
    }
}
