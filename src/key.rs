//! Fixed-width timestamp keys
//!
//! A key is `YYYYMMDDHHMMSS` followed by up to two sub-second digits,
//! always exactly [`KEY_LEN`] ASCII characters. Keys sort chronologically
//! as plain strings and double as output filename stems.

use chrono::{NaiveDateTime, Timelike};
use std::fmt;

/// Length of every timestamp key
pub const KEY_LEN: usize = 16;

/// Date/time prefix of a key, before any sub-second digits
const DATETIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// A normalized, sortable 16-character timestamp string
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimestampKey(String);

impl TimestampKey {
    /// Build a key from a date/time and an optional sub-second field.
    ///
    /// The sub-second field is read as an integer and rendered with at least
    /// two digits, so `"6"` becomes `"06"`. Anything that is not a plain
    /// number is ignored.
    pub fn from_parts(datetime: NaiveDateTime, subsec: Option<&str>) -> Self {
        let mut raw = datetime.format(DATETIME_FORMAT).to_string();
        if let Some(value) = subsec.and_then(|s| s.trim().trim_matches('"').parse::<u64>().ok()) {
            raw.push_str(&format!("{value:02}"));
        }
        format_key(&raw)
    }

    /// Build a key from a date/time carrying its own fractional seconds,
    /// truncated to hundredths
    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        let hundredths = datetime.nanosecond() % 1_000_000_000 / 10_000_000;
        let raw = format!("{}{:02}", datetime.format(DATETIME_FORMAT), hundredths);
        format_key(&raw)
    }

    /// The key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Output filename for this key with the given extension
    pub fn file_name(&self, extension: &str) -> String {
        if extension.is_empty() {
            self.0.clone()
        } else {
            format!("{}.{}", self.0, extension)
        }
    }
}

impl fmt::Display for TimestampKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TimestampKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Truncate or right-pad with `'0'` to exactly [`KEY_LEN`] characters
pub fn format_key(raw: &str) -> TimestampKey {
    let mut key: String = raw.chars().take(KEY_LEN).collect();
    while key.chars().count() < KEY_LEN {
        key.push('0');
    }
    TimestampKey(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").unwrap()
    }

    #[test]
    fn test_format_key_pads_short_input() {
        let key = format_key("20240102030405");
        assert_eq!(key.as_str(), "2024010203040500");
        assert_eq!(key.as_str().len(), KEY_LEN);

        assert_eq!(format_key("").as_str(), "0000000000000000");
    }

    #[test]
    fn test_format_key_truncates_long_input() {
        let key = format_key("20240102030405060000");
        assert_eq!(key.as_str(), "2024010203040506");
    }

    #[test]
    fn test_format_key_exact_length_unchanged() {
        assert_eq!(format_key("2024010203040506").as_str(), "2024010203040506");
    }

    #[test]
    fn test_from_parts_with_subsec() {
        let dt = datetime("2024-01-02 03:04:05");
        assert_eq!(TimestampKey::from_parts(dt, Some("06")).as_str(), "2024010203040506");
        assert_eq!(TimestampKey::from_parts(dt, Some("6")).as_str(), "2024010203040506");
        // Three digits survive formatting only up to the key width
        assert_eq!(TimestampKey::from_parts(dt, Some("123")).as_str(), "2024010203040512");
    }

    #[test]
    fn test_from_parts_without_subsec() {
        let dt = datetime("2024-01-02 03:04:05");
        assert_eq!(TimestampKey::from_parts(dt, None).as_str(), "2024010203040500");
        assert_eq!(TimestampKey::from_parts(dt, Some("abc")).as_str(), "2024010203040500");
        assert_eq!(TimestampKey::from_parts(dt, Some("  ")).as_str(), "2024010203040500");
    }

    #[test]
    fn test_from_datetime_truncates_to_hundredths() {
        let dt = datetime("2024-01-02 03:04:05.060000");
        assert_eq!(TimestampKey::from_datetime(dt).as_str(), "2024010203040506");

        let dt = datetime("2024-01-02 03:04:05.999999");
        assert_eq!(TimestampKey::from_datetime(dt).as_str(), "2024010203040599");
    }

    #[test]
    fn test_keys_sort_chronologically() {
        let earlier = TimestampKey::from_datetime(datetime("2023-12-31 23:59:59.99"));
        let later = TimestampKey::from_datetime(datetime("2024-01-01 00:00:00.00"));
        assert!(earlier < later);
    }

    #[test]
    fn test_file_name() {
        let key = format_key("2024010203040506");
        assert_eq!(key.file_name("jpg"), "2024010203040506.jpg");
        assert_eq!(key.file_name(""), "2024010203040506");
        assert_eq!(key.to_string(), "2024010203040506");
    }
}
