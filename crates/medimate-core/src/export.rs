//! Transcript file naming and writing.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::Result;

/// File name used for an exported consultation transcript.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("MediMate_Consultation_{}.pdf", date.format("%Y%m%d"))
}

/// Write PDF bytes into `dir`, creating it when missing.
pub(crate) fn write_transcript(dir: &Path, date: NaiveDate, bytes: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(date));
    std::fs::write(&path, bytes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_uses_compact_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(export_file_name(date), "MediMate_Consultation_20240307.pdf");
    }

    #[test]
    fn test_write_creates_missing_directory() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("exports");
        let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();

        let path = write_transcript(&dir, date, b"%PDF").unwrap();

        assert_eq!(path, dir.join("MediMate_Consultation_20251231.pdf"));
        assert_eq!(std::fs::read(path).unwrap(), b"%PDF");
    }
}
