//! Configuration types for photo-restamp

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default worker pool size
pub const DEFAULT_THREADS: usize = 4;

/// External tool used to turn HEIC/HEIF images into JPEG
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImageConverter {
    /// FFmpeg (needs a build with HEIF demuxing)
    #[default]
    Ffmpeg,
    /// ImageMagick 7 `magick`
    Magick,
    /// macOS `sips`
    Sips,
}

impl ImageConverter {
    /// Executable name for this converter (FFmpeg uses the configured path)
    pub fn program(&self) -> &'static str {
        match self {
            ImageConverter::Ffmpeg => "ffmpeg",
            ImageConverter::Magick => "magick",
            ImageConverter::Sips => "sips",
        }
    }
}

/// How to interpret the creation time stored in video containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VideoTimeZone {
    /// Keep the container's UTC time as-is
    #[default]
    Utc,
    /// Shift the container's UTC time to the system's local offset
    Local,
}

/// Configuration for photo-restamp
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory to read media files from (not recursive)
    pub source_dir: PathBuf,

    /// Directory to write converted/copied files to
    pub output_dir: PathBuf,

    /// Number of worker threads (0 = one per CPU)
    pub threads: usize,

    /// Extensions converted to JPEG
    pub image_extensions: Vec<String>,

    /// Extensions converted to MP4
    pub video_extensions: Vec<String>,

    /// Extensions picked up by the in-place rename command
    pub rename_extensions: Vec<String>,

    /// Tool used for image conversion
    pub image_converter: ImageConverter,

    /// Path or name of the ffmpeg executable
    pub ffmpeg: PathBuf,

    /// Time zone handling for video creation times
    pub video_time_zone: VideoTimeZone,

    /// Copy the source modification time onto written files
    pub preserve_mtime: bool,

    /// Dry run mode - resolve names without writing anything
    pub dry_run: bool,

    /// Verbose output
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            output_dir: PathBuf::from("output"),
            threads: DEFAULT_THREADS,
            image_extensions: vec!["heic".into(), "heif".into()],
            video_extensions: vec!["mov".into()],
            rename_extensions: vec!["jpg".into(), "jpeg".into()],
            image_converter: ImageConverter::default(),
            ffmpeg: PathBuf::from("ffmpeg"),
            video_time_zone: VideoTimeZone::default(),
            preserve_mtime: true,
            dry_run: false,
            verbose: false,
        }
    }
}

fn contains_ext(list: &[String], ext: &str) -> bool {
    list.iter().any(|e| e.eq_ignore_ascii_case(ext))
}

impl Config {
    /// Check if a file extension is converted as an image
    pub fn is_image(&self, ext: &str) -> bool {
        contains_ext(&self.image_extensions, ext)
    }

    /// Check if a file extension is converted as a video
    pub fn is_video(&self, ext: &str) -> bool {
        contains_ext(&self.video_extensions, ext)
    }

    /// Check if a file extension is handled by the rename command
    pub fn is_renameable(&self, ext: &str) -> bool {
        contains_ext(&self.rename_extensions, ext)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Write the sample configuration to a file, creating parent directories
    pub fn write_sample<P: AsRef<Path>>(path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(path, Self::sample_config()).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# photo-restamp configuration (TOML)

# Directory holding the phone/camera dump (only the top level is read)
source_dir = "/Volumes/disc0/Photos/phone"

# Converted and renamed files land here as <YYYYMMDDHHMMSSxx>.<ext>
output_dir = "/Volumes/disc0/Photos/phoneJPG"

# Worker threads (0 = one per CPU)
threads = 4

# Converted to JPEG, timestamp from EXIF DateTimeOriginal + SubSecTimeOriginal
image_extensions = ["heic", "heif"]

# Converted to MP4, timestamp from the container creation_time
video_extensions = ["mov"]

# Renamed in place by the `rename` command
rename_extensions = ["jpg", "jpeg"]

# Image conversion tool: "ffmpeg", "magick" or "sips"
image_converter = "ffmpeg"

# ffmpeg executable (name on PATH or absolute path)
ffmpeg = "ffmpeg"

# Video creation times are stored in UTC: "utc" keeps them, "local" shifts
# them to this machine's offset
video_time_zone = "utc"

# Copy the source modification time onto written files
preserve_mtime = true

dry_run = false
verbose = false
"#
        .to_string()
    }
}

/// Errors that can occur when loading or saving configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to write configuration file
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
            ConfigError::WriteError { path, source } => {
                write!(f, "Failed to write config file '{}': {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::WriteError { source, .. } => Some(source),
        }
    }
}
