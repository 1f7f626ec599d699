//! Per-file actions: conversion through external tools, copy and rename

use crate::config::{Config, ImageConverter};
use crate::error::Result;
use crate::media::Action;
use crate::tool;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Turns source media into JPEG/MP4 files
pub trait Converter: Send + Sync {
    /// Write `src` as a JPEG at `dst`
    fn convert_image(&self, src: &Path, dst: &Path) -> Result<()>;

    /// Write `src` as an H.264/AAC MP4 at `dst`
    fn convert_video(&self, src: &Path, dst: &Path) -> Result<()>;
}

/// Converter backed by ffmpeg (and optionally ImageMagick or sips for images)
#[derive(Debug, Clone)]
pub struct ExternalConverter {
    ffmpeg: PathBuf,
    image_converter: ImageConverter,
}

impl ExternalConverter {
    pub fn new(config: &Config) -> Self {
        Self {
            ffmpeg: config.ffmpeg.clone(),
            image_converter: config.image_converter,
        }
    }

    fn image_program(&self) -> PathBuf {
        match self.image_converter {
            ImageConverter::Ffmpeg => self.ffmpeg.clone(),
            other => PathBuf::from(other.program()),
        }
    }
}

impl Converter for ExternalConverter {
    fn convert_image(&self, src: &Path, dst: &Path) -> Result<()> {
        let (input, output) = (src.as_os_str(), dst.as_os_str());
        let args: Vec<&OsStr> = match self.image_converter {
            ImageConverter::Ffmpeg => {
                let mut args = os_args(&["-y", "-hide_banner", "-loglevel", "error", "-i"]);
                args.push(input);
                args.extend(os_args(&["-frames:v", "1", "-q:v", "2"]));
                args.push(output);
                args
            }
            ImageConverter::Magick => {
                let mut args = vec![input];
                args.extend(os_args(&["-quality", "92"]));
                args.push(output);
                args
            }
            ImageConverter::Sips => {
                let mut args = os_args(&["-s", "format", "jpeg"]);
                args.extend([input, OsStr::new("--out"), output]);
                args
            }
        };
        tool::run(&self.image_program(), args, src)
    }

    fn convert_video(&self, src: &Path, dst: &Path) -> Result<()> {
        let mut args = os_args(&["-y", "-hide_banner", "-loglevel", "error", "-i"]);
        args.push(src.as_os_str());
        args.extend(os_args(&[
            "-c:v",
            "libx264",
            "-c:a",
            "aac",
            "-movflags",
            "+faststart",
            "-map_metadata",
            "0",
        ]));
        args.push(dst.as_os_str());
        tool::run(&self.ffmpeg, args, src)
    }
}

fn os_args<'a>(args: &[&'a str]) -> Vec<&'a OsStr> {
    args.iter().map(|a| OsStr::new(*a)).collect()
}

/// Perform `action` from `source` to `dest`, creating the parent directory
pub fn perform_action(
    action: Action,
    source: &Path,
    dest: &Path,
    converter: &dyn Converter,
    config: &Config,
) -> Result<()> {
    if let Some(parent) = dest.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    match action {
        Action::ConvertImage => converter.convert_image(source, dest)?,
        Action::ConvertVideo => converter.convert_video(source, dest)?,
        Action::Copy => copy_file(source, dest)?,
        Action::Rename => {
            move_file(source, dest)?;
            // The source is gone; its mtime travelled with the rename
            return Ok(());
        }
    }

    if config.preserve_mtime {
        copy_mtime(source, dest);
    }

    Ok(())
}

/// Move a file, falling back to copy + delete across file systems
fn move_file(source: &Path, dest: &Path) -> Result<()> {
    if fs::rename(source, dest).is_err() {
        debug!(?source, ?dest, "Rename failed, copying instead");
        copy_file(source, dest)?;
        copy_mtime(source, dest);
        fs::remove_file(source)?;
    }
    Ok(())
}

/// Give `dest` the modification time of `source`, logging instead of failing
fn copy_mtime(source: &Path, dest: &Path) {
    let mtime = match fs::metadata(source).and_then(|m| m.modified()) {
        Ok(mtime) => mtime,
        Err(e) => {
            warn!(?source, error = %e, "Cannot read source mtime");
            return;
        }
    };
    if let Err(e) = filetime::set_file_mtime(dest, filetime::FileTime::from_system_time(mtime)) {
        warn!(?dest, error = %e, "Failed to preserve modification time");
    }
}

/// Copy file with buffered I/O for efficiency
fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    let src_file = File::open(source)?;
    let dest_file = File::create(dest)?;

    let mut reader = BufReader::with_capacity(256 * 1024, src_file);
    let mut writer = BufWriter::with_capacity(256 * 1024, dest_file);

    let mut buffer = vec![0u8; 256 * 1024];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        writer.write_all(&buffer[..bytes_read])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use filetime::FileTime;
    use tempfile::tempdir;

    struct FailingConverter;

    impl Converter for FailingConverter {
        fn convert_image(&self, src: &Path, _dst: &Path) -> Result<()> {
            Err(Error::ToolFailed {
                tool: "test".into(),
                path: src.to_path_buf(),
                message: "no codec".into(),
            })
        }

        fn convert_video(&self, src: &Path, dst: &Path) -> Result<()> {
            self.convert_image(src, dst)
        }
    }

    #[test]
    fn test_copy_creates_output_dir_and_keeps_mtime() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("notes.txt");
        fs::write(&src, b"family tree").unwrap();
        let mtime = FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&src, mtime).unwrap();

        let dest = dir.path().join("out").join("2020091312264000.txt");
        perform_action(Action::Copy, &src, &dest, &FailingConverter, &Config::default()).unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"family tree");
        assert!(src.exists());
        let copied = FileTime::from_last_modification_time(&fs::metadata(&dest).unwrap());
        assert_eq!(copied.unix_seconds(), 1_600_000_000);
    }

    #[test]
    fn test_copy_mtime_tolerates_missing_files() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.txt");
        fs::write(&src, b"a").unwrap();
        let missing = dir.path().join("missing.txt");

        copy_mtime(&src, &missing);
        copy_mtime(&missing, &src);
        assert!(!missing.exists());
        assert_eq!(fs::read(&src).unwrap(), b"a");
    }

    #[test]
    fn test_copy_overwrites_existing_destination() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("b.txt");
        fs::write(&src, b"second").unwrap();
        let dest = dir.path().join("2020091312264000.txt");
        fs::write(&dest, b"first").unwrap();

        perform_action(Action::Copy, &src, &dest, &FailingConverter, &Config::default()).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"second");
    }

    #[test]
    fn test_rename_moves_file() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("DSC_0001.JPG");
        fs::write(&src, b"jpeg").unwrap();
        let dest = dir.path().join("2024010203040506.jpg");

        perform_action(Action::Rename, &src, &dest, &FailingConverter, &Config::default()).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"jpeg");
    }

    #[test]
    fn test_converter_error_propagates() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("IMG_0001.HEIC");
        fs::write(&src, b"heic").unwrap();
        let dest = dir.path().join("out").join("2024010203040506.jpg");

        let err = perform_action(Action::ConvertImage, &src, &dest, &FailingConverter, &Config::default())
            .unwrap_err();
        assert!(matches!(err, Error::ToolFailed { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn test_external_converter_without_ffmpeg() {
        let config = Config {
            ffmpeg: PathBuf::from("/nonexistent/bin/ffmpeg"),
            ..Config::default()
        };
        let converter = ExternalConverter::new(&config);
        let err = converter
            .convert_video(Path::new("clip.mov"), Path::new("clip.mp4"))
            .unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }
}
