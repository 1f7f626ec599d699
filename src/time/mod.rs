//! Timestamp resolution
//!
//! A file's key comes from the first source that yields one:
//! - EXIF metadata (images)
//! - Container metadata via ffmpeg (videos)
//! - File system modification time

pub mod exif;
pub mod video;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::key::TimestampKey;
use crate::media::MediaKind;
use chrono::{DateTime, Local};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Source of the resolved timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSource {
    /// Extracted from EXIF metadata
    Exif,
    /// Extracted from video container metadata
    VideoMetadata,
    /// From file system modification time
    FileSystem,
}

/// Result of timestamp resolution
#[derive(Debug, Clone)]
pub struct ResolvedTime {
    pub key: TimestampKey,
    pub source: TimeSource,
}

/// Read the embedded capture time for `kind`.
///
/// Files of kind [`MediaKind::Other`] carry no metadata we read.
pub fn extract_metadata_key(path: &Path, kind: MediaKind, config: &Config) -> Result<ResolvedTime> {
    match kind {
        MediaKind::Image => Ok(ResolvedTime {
            key: exif::extract_exif_key(path)?,
            source: TimeSource::Exif,
        }),
        MediaKind::Video => Ok(ResolvedTime {
            key: video::extract_video_key(path, &config.ffmpeg, config.video_time_zone)?,
            source: TimeSource::VideoMetadata,
        }),
        MediaKind::Other => Err(Error::NoMetadata {
            path: path.to_path_buf(),
        }),
    }
}

/// Key from the file's modification time in local time, to hundredths
pub fn mtime_key(path: &Path) -> Result<TimestampKey> {
    let modified = fs::metadata(path)?.modified()?;
    let datetime: DateTime<Local> = modified.into();
    Ok(TimestampKey::from_datetime(datetime.naive_local()))
}

/// Resolve a key for `path`, falling back to modification time.
///
/// Metadata failures are logged and never fatal; only a failing `stat`
/// makes resolution fail.
pub fn resolve_time(path: &Path, kind: MediaKind, config: &Config) -> Result<ResolvedTime> {
    match extract_metadata_key(path, kind, config) {
        Ok(resolved) => {
            debug!(?path, key = %resolved.key, source = ?resolved.source, "Resolved embedded time");
            return Ok(resolved);
        }
        Err(Error::NoMetadata { .. }) => {
            debug!(?path, ?kind, "No embedded time, using modification time");
        }
        Err(e) => {
            warn!(?path, error = %e, "Failed to read embedded time, using modification time");
        }
    }

    let key = mtime_key(path)?;
    Ok(ResolvedTime {
        key,
        source: TimeSource::FileSystem,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KEY_LEN;
    use chrono::{NaiveDateTime, TimeZone};
    use filetime::FileTime;
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::SystemTime;
    use tempfile::{NamedTempFile, tempdir};

    /// Pin a file's mtime to a local wall-clock time like "2024-01-02 03:04:05.060"
    fn set_local_mtime(path: &Path, local: &str) {
        let naive = NaiveDateTime::parse_from_str(local, "%Y-%m-%d %H:%M:%S%.f").unwrap();
        let local = Local.from_local_datetime(&naive).single().unwrap();
        let mtime = FileTime::from_system_time(SystemTime::from(local));
        filetime::set_file_mtime(path, mtime).unwrap();
    }

    fn test_config() -> Config {
        Config {
            ffmpeg: PathBuf::from("/nonexistent/bin/ffmpeg"),
            ..Config::default()
        }
    }

    #[test]
    fn test_time_source_debug() {
        assert_eq!(format!("{:?}", TimeSource::Exif), "Exif");
        assert_eq!(format!("{:?}", TimeSource::VideoMetadata), "VideoMetadata");
        assert_eq!(format!("{:?}", TimeSource::FileSystem), "FileSystem");
    }

    #[test]
    fn test_mtime_key_hundredths() {
        let file = NamedTempFile::new().unwrap();
        set_local_mtime(file.path(), "2024-01-02 03:04:05.060");

        let key = mtime_key(file.path()).unwrap();
        assert_eq!(key.as_str(), "2024010203040506");
    }

    #[test]
    fn test_image_without_exif_falls_back_to_mtime() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"not really a heic").unwrap();
        set_local_mtime(file.path(), "2023-08-09 10:11:12.340");

        let resolved = resolve_time(file.path(), MediaKind::Image, &test_config()).unwrap();
        assert_eq!(resolved.source, TimeSource::FileSystem);
        assert_eq!(resolved.key.as_str(), "2023080910111234");
        assert_eq!(resolved.key.as_str().len(), KEY_LEN);
    }

    #[test]
    fn test_video_without_tool_falls_back_to_mtime() {
        let file = NamedTempFile::new().unwrap();
        set_local_mtime(file.path(), "2022-12-31 23:59:58.000");

        let resolved = resolve_time(file.path(), MediaKind::Video, &test_config()).unwrap();
        assert_eq!(resolved.source, TimeSource::FileSystem);
        assert_eq!(resolved.key.as_str(), "2022123123595800");
    }

    #[test]
    fn test_other_uses_mtime() {
        let file = NamedTempFile::new().unwrap();
        set_local_mtime(file.path(), "2021-05-06 07:08:09.990");

        let resolved = resolve_time(file.path(), MediaKind::Other, &test_config()).unwrap();
        assert_eq!(resolved.source, TimeSource::FileSystem);
        assert_eq!(resolved.key.as_str(), "2021050607080999");
    }

    #[test]
    fn test_missing_file_fails_resolution() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("gone.heic");
        assert!(resolve_time(&missing, MediaKind::Image, &test_config()).is_err());
    }
}
