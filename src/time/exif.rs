//! EXIF capture time for images

use crate::error::{Error, Result};
use crate::key::TimestampKey;
use chrono::NaiveDateTime;
use exif::{Exif, In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::trace;

/// Extract the capture time key from `DateTimeOriginal` and
/// `SubSecTimeOriginal`
pub fn extract_exif_key(path: &Path) -> Result<TimestampKey> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let exif = Reader::new()
        .read_from_container(&mut reader)
        .map_err(|e| Error::ExifRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let date = ascii_field(&exif, Tag::DateTimeOriginal).ok_or_else(|| Error::NoMetadata {
        path: path.to_path_buf(),
    })?;

    let datetime = parse_exif_datetime(&date).ok_or_else(|| Error::TimestampParse {
        source_info: path.display().to_string(),
        message: format!("unrecognized DateTimeOriginal {date:?}"),
    })?;

    let subsec = ascii_field(&exif, Tag::SubSecTimeOriginal);
    trace!(?path, %datetime, ?subsec, "Found EXIF capture time");

    Ok(TimestampKey::from_parts(datetime, subsec.as_deref()))
}

/// Read an ASCII tag from the primary IFD as a trimmed string
fn ascii_field(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    let text = match &field.value {
        Value::Ascii(parts) => parts
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())?,
        _ => field.display_value().to_string(),
    };
    let text = text.trim_matches(char::from(0)).trim().to_string();
    if text.is_empty() { None } else { Some(text) }
}

/// Parse EXIF datetime string format: "YYYY:MM:DD HH:MM:SS"
pub(crate) fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().trim_matches('"');

    let formats = [
        "%Y:%m:%d %H:%M:%S",
        // Some writers use ISO separators
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
    ];

    formats
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_exif_datetime() {
        let dt = parse_exif_datetime("2024:01:15 14:30:00").unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 15);
        assert_eq!(dt.hour(), 14);
        assert_eq!(dt.minute(), 30);
        assert_eq!(dt.second(), 0);

        // With quotes
        let dt = parse_exif_datetime("\"2024:01:15 14:30:00\"").unwrap();
        assert_eq!(dt.year(), 2024);

        let dt = parse_exif_datetime("2024-01-15 14:30:00").unwrap();
        assert_eq!(dt.day(), 15);

        assert!(parse_exif_datetime("invalid").is_none());
        assert!(parse_exif_datetime("0000:00:00 00:00:00").is_none());
    }

    #[test]
    fn test_non_image_has_no_exif() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"plain text, no metadata here").unwrap();

        let err = extract_exif_key(file.path()).unwrap_err();
        assert!(matches!(err, Error::ExifRead { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = extract_exif_key(Path::new("/nonexistent/IMG_0001.HEIC")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
