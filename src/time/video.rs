//! Video creation time via the ffmpeg metadata dump

use crate::config::VideoTimeZone;
use crate::error::{Error, Result};
use crate::key::TimestampKey;
use crate::tool;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use regex::Regex;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, trace};

/// `creation_time : 2024-01-02T03:04:05.060000Z` in ffmpeg's input dump,
/// `creation_time=...` in ffmetadata output. Older builds print
/// `2012-06-19 12:58:46`, so the value runs to the end of the line.
static CREATION_TIME: OnceLock<Regex> = OnceLock::new();

fn creation_time_pattern() -> &'static Regex {
    CREATION_TIME.get_or_init(|| {
        Regex::new(r"creation_time[ \t]*[:=][ \t]*(.+)").expect("creation_time pattern is valid")
    })
}

/// Extract the container creation time key from a video.
///
/// Runs `ffmpeg -hide_banner -i <path>`, which prints the input's metadata
/// to stderr and exits non-zero for lack of an output; the exit status is
/// ignored and the text is searched for `creation_time`.
pub fn extract_video_key(path: &Path, ffmpeg: &Path, zone: VideoTimeZone) -> Result<TimestampKey> {
    let args = [OsStr::new("-hide_banner"), OsStr::new("-i"), path.as_os_str()];
    let output = tool::capture(ffmpeg, args, path)?;

    let mut text = String::from_utf8_lossy(&output.stderr).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stdout));
    trace!(?path, "ffmpeg metadata dump: {}", text);

    let utc = parse_creation_time(&text).ok_or_else(|| Error::VideoMetadata {
        path: path.to_path_buf(),
        message: "No creation_time found in video metadata".to_string(),
    })?;

    let datetime = apply_zone(utc, zone);
    debug!(?path, %utc, %datetime, "Found video creation time");

    Ok(TimestampKey::from_datetime(datetime))
}

/// Express a container UTC time in the configured zone
pub(crate) fn apply_zone(utc: NaiveDateTime, zone: VideoTimeZone) -> NaiveDateTime {
    match zone {
        VideoTimeZone::Utc => utc,
        VideoTimeZone::Local => Local.from_utc_datetime(&utc).naive_local(),
    }
}

/// Find the first parseable `creation_time` value in a metadata dump
pub(crate) fn parse_creation_time(dump: &str) -> Option<NaiveDateTime> {
    creation_time_pattern()
        .captures_iter(dump)
        .filter_map(|caps| caps.get(1))
        .find_map(|value| parse_video_datetime(value.as_str()))
}

/// Parse a container datetime, normalizing any offset to UTC
pub(crate) fn parse_video_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    let s = s.trim_end_matches('Z');
    let formats = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
    formats
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
}
