//! Batch dispatcher with a Rayon worker pool
//!
//! Handles:
//! - Listing the top level of the source directory
//! - Resolving a timestamp key per file
//! - Converting, copying or renaming each file to `<key>.<ext>`
//!
//! Files are independent: a failure is logged and counted, never fatal to
//! the batch. Two files that resolve to the same key write the same
//! destination and the last one to finish wins.

use crate::config::Config;
use crate::convert::{Converter, ExternalConverter, perform_action};
use crate::error::{Error, Result};
use crate::media::{Action, MediaFile, MediaKind};
use crate::time::{ResolvedTime, resolve_time};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{Level, debug, error, info, span, warn};
use walkdir::WalkDir;

/// Result of processing a single file
#[derive(Debug, Clone)]
pub struct FileResult {
    /// Source file path
    pub source: PathBuf,
    /// Destination file path (once the key is known)
    pub destination: Option<PathBuf>,
    /// Resolved key and where it came from
    pub resolved: Option<ResolvedTime>,
    /// Action chosen for the file
    pub action: Action,
    /// Processing status
    pub status: ProcessingStatus,
    /// Error message (if failed)
    pub error: Option<String>,
}

/// Status of file processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStatus {
    /// File was converted, copied or renamed
    Success,
    /// File already carries its key name
    Skipped,
    /// Processing failed
    Failed,
    /// Dry run - would have processed
    DryRun,
}

/// Processing statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub total_files: AtomicUsize,
    pub processed: AtomicUsize,
    pub skipped: AtomicUsize,
    pub failed: AtomicUsize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> String {
        format!(
            "Total: {}, Processed: {}, Skipped: {}, Failed: {}",
            self.total_files.load(Ordering::Relaxed),
            self.processed.load(Ordering::Relaxed),
            self.skipped.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed)
        )
    }
}

/// Which batch a run performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    Convert,
    Rename,
}

/// Runs the convert and rename pipelines over one directory
pub struct Processor {
    config: Config,
    converter: Box<dyn Converter>,
    stats: ProcessingStats,
}

impl Processor {
    /// Create a processor that converts through the configured external tools
    pub fn new(config: Config) -> Self {
        let converter = Box::new(ExternalConverter::new(&config));
        Self::with_converter(config, converter)
    }

    /// Create a processor with a custom converter
    pub fn with_converter(config: Config, converter: Box<dyn Converter>) -> Self {
        Self {
            config,
            converter,
            stats: ProcessingStats::new(),
        }
    }

    pub fn run(&self, pipeline: Pipeline) -> Result<Vec<FileResult>> {
        match pipeline {
            Pipeline::Convert => self.run_convert(),
            Pipeline::Rename => self.run_rename(),
        }
    }

    /// Convert every file in `source_dir` into `output_dir`.
    ///
    /// Images become `<key>.jpg`, videos `<key>.mp4`, everything else is
    /// copied as `<key>.<original ext>`.
    pub fn run_convert(&self) -> Result<Vec<FileResult>> {
        let _span = span!(Level::INFO, "convert", source = ?self.config.source_dir).entered();

        let files = self.collect_files(|_| true)?;
        info!(count = files.len(), "Found files");

        if !self.config.dry_run {
            fs::create_dir_all(&self.config.output_dir)?;
        }

        self.dispatch(files, |file| Action::for_kind(file.kind))
    }

    /// Rename matching files in `source_dir` to `<key>.jpg` in place
    pub fn run_rename(&self) -> Result<Vec<FileResult>> {
        let _span = span!(Level::INFO, "rename", source = ?self.config.source_dir).entered();

        let mut files = self.collect_files(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| self.config.is_renameable(ext))
        })?;
        // Rename targets are JPEGs; read their EXIF whatever the convert lists say
        for file in &mut files {
            file.kind = MediaKind::Image;
        }
        info!(count = files.len(), "Found files to rename");

        self.dispatch(files, |_| Action::Rename)
    }

    /// Get processing statistics reference
    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    /// List regular files at the top level of `source_dir`
    fn collect_files<F>(&self, keep: F) -> Result<Vec<MediaFile>>
    where
        F: Fn(&Path) -> bool,
    {
        let source_dir = &self.config.source_dir;
        if !source_dir.is_dir() {
            return Err(Error::SourceDir(source_dir.clone()));
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(source_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = match entry {
                Ok(entry) => entry,
                // Depth 0 is the source directory itself
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => {
                    warn!(path = ?e.path(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            if entry.file_type().is_file() && keep(entry.path()) {
                paths.push(entry.into_path());
            } else {
                debug!(path = ?entry.path(), "Ignoring entry");
            }
        }
        paths.sort();

        Ok(paths
            .into_iter()
            .map(|path| MediaFile::new(path, &self.config))
            .collect())
    }

    /// Fire one task per file on a fixed-size pool and wait for all of them
    fn dispatch<A>(&self, files: Vec<MediaFile>, action_for: A) -> Result<Vec<FileResult>>
    where
        A: Fn(&MediaFile) -> Action + Sync,
    {
        self.stats.total_files.fetch_add(files.len(), Ordering::Relaxed);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .thread_name(|i| format!("restamp-worker-{i}"))
            .build()?;

        let results: Vec<FileResult> = pool.install(|| {
            files
                .into_par_iter()
                .map(|file| {
                    let action = action_for(&file);
                    self.process_file(file, action)
                })
                .collect()
        });

        info!("{}", self.stats.summary());
        Ok(results)
    }

    /// Resolve, then act on a single file
    fn process_file(&self, mut file: MediaFile, action: Action) -> FileResult {
        let _file_span = span!(Level::DEBUG, "process_file", path = ?file.path).entered();

        let resolved = match resolve_time(&file.path, file.kind, &self.config) {
            Ok(resolved) => resolved,
            Err(e) => {
                error!(path = ?file.path, error = %e, "Failed to resolve timestamp, skipping");
                return self.failed(file.path, None, None, action, e);
            }
        };
        file.key = Some(resolved.key.clone());

        let Some(dest) = file.destination(action, &self.config.output_dir) else {
            let e = Error::Config("no destination for resolved file".into());
            return self.failed(file.path, None, Some(resolved), action, e);
        };

        if action == Action::Rename && dest == file.path {
            debug!(path = ?file.path, "Already named after its timestamp");
            self.stats.skipped.fetch_add(1, Ordering::Relaxed);
            return FileResult {
                source: file.path,
                destination: Some(dest),
                resolved: Some(resolved),
                action,
                status: ProcessingStatus::Skipped,
                error: None,
            };
        }

        if self.config.dry_run {
            info!(
                source = ?file.path,
                destination = ?dest,
                ?action,
                time_source = ?resolved.source,
                "Would process file"
            );
            self.stats.processed.fetch_add(1, Ordering::Relaxed);
            return FileResult {
                source: file.path,
                destination: Some(dest),
                resolved: Some(resolved),
                action,
                status: ProcessingStatus::DryRun,
                error: None,
            };
        }

        if let Err(e) = perform_action(action, &file.path, &dest, self.converter.as_ref(), &self.config) {
            error!(source = ?file.path, destination = ?dest, ?action, error = %e, "Failed to process file");
            return self.failed(file.path, Some(dest), Some(resolved), action, e);
        }

        info!(
            source = ?file.path,
            destination = ?dest,
            ?action,
            time_source = ?resolved.source,
            key = %resolved.key,
            "Processed file"
        );
        self.stats.processed.fetch_add(1, Ordering::Relaxed);

        FileResult {
            source: file.path,
            destination: Some(dest),
            resolved: Some(resolved),
            action,
            status: ProcessingStatus::Success,
            error: None,
        }
    }

    fn failed(
        &self,
        source: PathBuf,
        destination: Option<PathBuf>,
        resolved: Option<ResolvedTime>,
        action: Action,
        error: Error,
    ) -> FileResult {
        self.stats.failed.fetch_add(1, Ordering::Relaxed);
        FileResult {
            source,
            destination,
            resolved,
            action,
            status: ProcessingStatus::Failed,
            error: Some(error.to_string()),
        }
    }
}
