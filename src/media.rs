//! Media files discovered in a source directory

use crate::config::Config;
use crate::key::TimestampKey;
use std::path::{Path, PathBuf};

/// Declared kind of a file, decided by its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Still image carrying EXIF, converted to JPEG
    Image,
    /// Video with container metadata, converted to MP4
    Video,
    /// Anything else, copied as-is
    Other,
}

impl MediaKind {
    /// Classify a path using the configured extension lists
    pub fn classify(path: &Path, config: &Config) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if config.is_image(ext) => MediaKind::Image,
            Some(ext) if config.is_video(ext) => MediaKind::Video,
            _ => MediaKind::Other,
        }
    }
}

/// What happens to a file once its key is known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Convert to `<key>.jpg` in the output directory
    ConvertImage,
    /// Convert to `<key>.mp4` in the output directory
    ConvertVideo,
    /// Copy to `<key>.<original ext>` in the output directory
    Copy,
    /// Move to `<key>.jpg` next to the source
    Rename,
}

impl Action {
    /// Conversion action for a media kind
    pub fn for_kind(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Image => Action::ConvertImage,
            MediaKind::Video => Action::ConvertVideo,
            MediaKind::Other => Action::Copy,
        }
    }

    /// Extension of the file this action writes
    pub fn output_extension<'a>(&self, source: &'a Path) -> &'a str {
        match self {
            Action::ConvertImage | Action::Rename => "jpg",
            Action::ConvertVideo => "mp4",
            Action::Copy => source.extension().and_then(|e| e.to_str()).unwrap_or(""),
        }
    }
}

/// A file picked up from the source directory
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub path: PathBuf,
    pub kind: MediaKind,
    /// Resolved timestamp key, `None` until resolution
    pub key: Option<TimestampKey>,
}

impl MediaFile {
    pub fn new(path: PathBuf, config: &Config) -> Self {
        let kind = MediaKind::classify(&path, config);
        Self {
            path,
            kind,
            key: None,
        }
    }

    /// Destination path for `action`, or `None` before the key is resolved.
    ///
    /// Converted and copied files go to `output_dir`, renamed files stay
    /// beside their source.
    pub fn destination(&self, action: Action, output_dir: &Path) -> Option<PathBuf> {
        let key = self.key.as_ref()?;
        let name = key.file_name(action.output_extension(&self.path));
        let dir = match action {
            Action::Rename => self.path.parent().unwrap_or(Path::new("")),
            _ => output_dir,
        };
        Some(dir.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::format_key;

    #[test]
    fn test_classify() {
        let config = Config::default();
        assert_eq!(MediaKind::classify(Path::new("a/IMG_0001.HEIC"), &config), MediaKind::Image);
        assert_eq!(MediaKind::classify(Path::new("a/IMG_0002.mov"), &config), MediaKind::Video);
        assert_eq!(MediaKind::classify(Path::new("a/IMG_0003.jpg"), &config), MediaKind::Other);
        assert_eq!(MediaKind::classify(Path::new("a/README"), &config), MediaKind::Other);
    }

    #[test]
    fn test_destination_requires_key() {
        let config = Config::default();
        let mut file = MediaFile::new(PathBuf::from("in/IMG_0001.HEIC"), &config);
        assert!(file.destination(Action::ConvertImage, Path::new("out")).is_none());

        file.key = Some(format_key("2024010203040506"));
        assert_eq!(
            file.destination(Action::ConvertImage, Path::new("out")),
            Some(PathBuf::from("out/2024010203040506.jpg"))
        );
    }

    #[test]
    fn test_destination_per_action() {
        let config = Config::default();
        let key = Some(format_key("2024010203040506"));

        let mut video = MediaFile::new(PathBuf::from("in/clip.MOV"), &config);
        video.key = key.clone();
        assert_eq!(
            video.destination(Action::for_kind(video.kind), Path::new("out")),
            Some(PathBuf::from("out/2024010203040506.mp4"))
        );

        let mut other = MediaFile::new(PathBuf::from("in/scan.PNG"), &config);
        other.key = key.clone();
        assert_eq!(
            other.destination(Action::for_kind(other.kind), Path::new("out")),
            Some(PathBuf::from("out/2024010203040506.PNG"))
        );

        let mut jpg = MediaFile::new(PathBuf::from("in/DSC_0001.JPG"), &config);
        jpg.key = key;
        assert_eq!(
            jpg.destination(Action::Rename, Path::new("out")),
            Some(PathBuf::from("in/2024010203040506.jpg"))
        );
    }
}
