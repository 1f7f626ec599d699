//! CLI argument parsing with clap

use crate::config::{Config, ImageConverter, VideoTimeZone};
use crate::process::Pipeline;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// photo-restamp - convert and rename an archive by capture time
///
/// Every file ends up named `<YYYYMMDDHHMMSSxx>.<ext>`, with the time taken
/// from EXIF, video metadata, or the file's modification time.
#[derive(Parser, Debug)]
#[command(name = "photo-restamp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML format)
    ///
    /// Settings from the file are used as defaults; CLI arguments override
    /// them.
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of worker threads (0 = one per CPU)
    #[arg(short = 't', long, global = true)]
    pub threads: Option<usize>,

    /// Path to the ffmpeg executable
    #[arg(long, global = true, env = "RESTAMP_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// Dry run mode - show what would be done without doing it
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output log format as JSON
    #[arg(long, global = true)]
    pub json_log: bool,

    /// Write the log to this file instead of Log/ beside the executable
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert HEIC to JPG and MOV to MP4, copy everything else, all named by timestamp
    Convert(ConvertArgs),

    /// Rename JPG files in place by timestamp
    Rename(RenameArgs),

    /// Write a sample configuration file
    InitConfig {
        /// Where to write the file
        path: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
pub struct ConvertArgs {
    /// Directory to read (top level only)
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Directory to write converted files to
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Tool used for HEIC to JPG conversion
    #[arg(long, value_enum)]
    pub image_converter: Option<ImageConverter>,

    /// Treat video creation times as UTC or shift them to local time
    #[arg(long, value_enum)]
    pub video_time_zone: Option<VideoTimeZone>,
}

#[derive(Args, Debug, Default)]
pub struct RenameArgs {
    /// Directory whose JPG files are renamed
    #[arg(short, long)]
    pub source: Option<PathBuf>,
}

impl Cli {
    /// Short name of the subcommand, used for log naming
    pub fn command_name(&self) -> &'static str {
        match self.command {
            Command::Convert(_) => "Convert",
            Command::Rename(_) => "Rename",
            Command::InitConfig { .. } => "InitConfig",
        }
    }

    /// Batch the subcommand runs; `None` for commands that touch no media
    pub fn pipeline(&self) -> Option<Pipeline> {
        match self.command {
            Command::Convert(_) => Some(Pipeline::Convert),
            Command::Rename(_) => Some(Pipeline::Rename),
            Command::InitConfig { .. } => None,
        }
    }

    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        match &self.command {
            Command::Convert(args) => {
                if let Some(ref source) = args.source {
                    config.source_dir = source.clone();
                }
                if let Some(ref output) = args.output {
                    config.output_dir = output.clone();
                }
                if let Some(converter) = args.image_converter {
                    config.image_converter = converter;
                }
                if let Some(zone) = args.video_time_zone {
                    config.video_time_zone = zone;
                }
            }
            Command::Rename(args) => {
                if let Some(ref source) = args.source {
                    config.source_dir = source.clone();
                }
            }
            Command::InitConfig { .. } => {}
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(ref ffmpeg) = self.ffmpeg {
            config.ffmpeg = ffmpeg.clone();
        }
        if self.dry_run {
            config.dry_run = true;
        }
        if self.verbose {
            config.verbose = true;
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}
