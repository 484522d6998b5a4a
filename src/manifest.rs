//! Delimited manifest of generated codes

use crate::code::Code;
use crate::error::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Header line of every manifest
pub const MANIFEST_HEADER: &str = "code,generated_at";

/// One manifest row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRecord {
    /// Issued code
    pub code: String,
    /// Run timestamp, identical on every row
    pub generated_at: String,
}

/// ISO-8601 UTC with millisecond precision, e.g. `2026-10-16T09:30:00.123Z`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Write `codes` to `path`, replacing any existing file.
///
/// Every row carries the same `generated_at` value.
pub fn write_manifest(path: &Path, codes: &[Code], generated_at: DateTime<Utc>) -> Result<()> {
    let timestamp = format_timestamp(generated_at);
    write_records(path, codes, &timestamp).map_err(|err| Error::ManifestWrite {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;

    tracing::info!(path = %path.display(), records = codes.len(), "Manifest written");
    Ok(())
}

fn write_records(path: &Path, codes: &[Code], timestamp: &str) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    // Explicit header so an empty run still produces one.
    writer.write_record(MANIFEST_HEADER.split(','))?;
    for code in codes {
        writer.serialize(ManifestRecord {
            code: code.to_string(),
            generated_at: timestamp.to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Parse a manifest written by [`write_manifest`].
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestRecord>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;

    let headers = reader.headers()?.iter().collect::<Vec<_>>().join(",");
    if headers != MANIFEST_HEADER {
        return Err(Error::Other(format!(
            "Unexpected manifest header '{headers}' in {}",
            path.display()
        )));
    }

    reader
        .deserialize::<ManifestRecord>()
        .map(|row| row.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::CodeFormat;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_timestamp_format() {
        assert_eq!(format_timestamp(fixed_time()), "2026-10-16T09:30:00.000Z");
    }

    #[test]
    fn test_manifest_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("codes.csv");
        let format = CodeFormat::new("AB", 5).unwrap();
        let codes = vec![format.parse("AB001").unwrap(), format.parse("ABXYZ").unwrap()];

        write_manifest(&path, &codes, fixed_time()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "code,generated_at",
                "AB001,2026-10-16T09:30:00.000Z",
                "ABXYZ,2026-10-16T09:30:00.000Z",
            ]
        );
    }

    #[test]
    fn test_empty_manifest_has_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");

        write_manifest(&path, &[], fixed_time()).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap().trim_end(), MANIFEST_HEADER);
        assert!(read_manifest(&path).unwrap().is_empty());
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("codes.csv");
        fs::write(&path, "stale,data\nmore,rows\nand,more\n").unwrap();
        let codes = vec![CodeFormat::new("AB", 5).unwrap().parse("AB777").unwrap()];

        write_manifest(&path, &codes, fixed_time()).unwrap();

        let records = read_manifest(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, "AB777");
    }

    #[test]
    fn test_unwritable_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no-such-dir").join("codes.csv");

        assert!(matches!(
            write_manifest(&path, &[], fixed_time()),
            Err(Error::ManifestWrite { .. })
        ));
    }
}
