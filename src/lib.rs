//! photo-restamp - name a photo archive after capture time
//!
//! This library converts and renames photos and videos so that every file
//! is called `<YYYYMMDDHHMMSSxx>.<ext>`:
//! - EXIF capture time (with sub-seconds) for images
//! - ffmpeg container metadata for videos
//! - File system modification time as the fallback
//! - HEIC to JPEG and MOV to MP4 conversion through external tools
//! - Parallel processing with Rayon

pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod key;
pub mod media;
pub mod process;
pub mod time;
pub mod tool;

pub use cli::{Cli, Command};
pub use config::{Config, ConfigError, ImageConverter, VideoTimeZone};
pub use convert::{Converter, ExternalConverter};
pub use error::{Error, Result};
pub use key::{TimestampKey, format_key};
pub use media::{Action, MediaFile, MediaKind};
pub use process::{FileResult, Pipeline, ProcessingStatus, Processor};
