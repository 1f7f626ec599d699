//! photo-restamp - convert and rename a photo archive by capture time
//!
//! Resolves a timestamp per file from EXIF, video metadata or the file
//! system, then converts, copies or renames the file to
//! `<YYYYMMDDHHMMSSxx>.<ext>`.

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use photo_restamp::process::{FileResult, ProcessingStatus};
use photo_restamp::{Cli, Command, Config, Processor};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use tracing::{Level, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// CLI Output Module
mod cli_output {
    //! Colored console output for the run summary

    use crossterm::{
        ExecutableCommand,
        style::{Color, Print, Stylize, style},
    };
    use std::io::stdout;

    /// CLI theme colors
    pub struct CliTheme;

    impl CliTheme {
        pub const SUCCESS: Color = Color::Green;
        pub const WARNING: Color = Color::Yellow;
        pub const ERROR: Color = Color::Red;
        pub const HINT: Color = Color::DarkGrey;
        pub const ACCENT: Color = Color::Cyan;
    }

    pub fn print_separator() {
        let _ = stdout().execute(Print(format!("{}\n", "─".repeat(60))));
    }

    pub fn print_title(title: &str) {
        let padding = 60usize.saturating_sub(title.len()) / 2;
        let _ = stdout().execute(Print(" ".repeat(padding)));
        let _ = stdout().execute(Print(style(title).bold()));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_warning(msg: &str) {
        let _ = stdout().execute(Print(style("⚠ ").with(CliTheme::WARNING).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_error(msg: &str) {
        let _ = stdout().execute(Print(style("✗ ").with(CliTheme::ERROR).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_hint(msg: &str) {
        let _ = stdout().execute(Print(style("→ ").with(CliTheme::HINT)));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_key_value(key: &str, value: &str, value_color: Color) {
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(style(key).with(CliTheme::HINT)));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(style(value).with(value_color).bold()));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_result(status_icon: &str, status_color: Color, source: &str, dest_or_msg: &str) {
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(style(status_icon).with(status_color).bold()));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(style(source).italic()));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(style(dest_or_msg).with(CliTheme::HINT)));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_blank() {
        let _ = stdout().execute(Print("\n"));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let Some(pipeline) = cli.pipeline() else {
        if let Command::InitConfig { path } = &cli.command {
            Config::write_sample(path)?;
            println!("Wrote sample configuration to {}", path.display());
        }
        return Ok(());
    };

    let log_path = match &cli.log_file {
        Some(path) => path.clone(),
        None => get_log_path(&get_executable_dir()?, &cli),
    };
    let _guard = setup_logging(&cli, &log_path)?;

    info!(version = env!("CARGO_PKG_VERSION"), command = cli.command_name(), "photo-restamp starting");

    let config = load_config(&cli)?;
    if config.verbose {
        info!(?config, "Configuration loaded");
    }
    info!(log_file = %log_path.display(), "Log file location");

    let processor = Processor::new(config.clone());
    match processor.run(pipeline) {
        Ok(results) => {
            print_summary(&processor, &results, &config, &log_path);
            info!(log_file = %log_path.display(), "Processing complete. Log saved to");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Processing failed");
            // Returning lets the log guard flush before the non-zero exit
            Err(e.into())
        }
    }
}

fn print_summary(processor: &Processor, results: &[FileResult], config: &Config, log_path: &Path) {
    use cli_output::*;

    let stats = processor.stats();
    print_separator();
    print_title("Processing complete");
    print_separator();
    print_blank();
    print_key_value("Processed", &stats.processed.load(Ordering::Relaxed).to_string(), CliTheme::SUCCESS);
    print_key_value("Skipped", &stats.skipped.load(Ordering::Relaxed).to_string(), CliTheme::WARNING);
    print_key_value("Failed", &stats.failed.load(Ordering::Relaxed).to_string(), CliTheme::ERROR);
    print_blank();

    if config.verbose {
        print_separator();
        print_hint("Details");
        print_blank();
        for result in results {
            let source = result.source.display().to_string();
            let dest = result
                .destination
                .as_ref()
                .map(|p| format!("→ {}", p.display()))
                .unwrap_or_default();
            match result.status {
                ProcessingStatus::Success => print_result("✓", CliTheme::SUCCESS, &source, &dest),
                ProcessingStatus::Skipped => print_result("⊘", CliTheme::WARNING, &source, "already named"),
                ProcessingStatus::DryRun => print_result("~", CliTheme::ACCENT, &source, &dest),
                ProcessingStatus::Failed => print_result(
                    "✗",
                    CliTheme::ERROR,
                    &source,
                    result.error.as_deref().unwrap_or("unknown error"),
                ),
            }
        }
    }

    let failed: Vec<_> = results
        .iter()
        .filter(|r| r.status == ProcessingStatus::Failed)
        .collect();
    if !failed.is_empty() {
        print_separator();
        print_error(&format!("{} files failed", failed.len()));
        print_blank();
        for result in failed {
            print_key_value(
                &result.source.display().to_string(),
                result.error.as_deref().unwrap_or("unknown error"),
                CliTheme::ERROR,
            );
        }
    }

    if config.dry_run {
        print_separator();
        print_warning("Dry run: no files were written");
    }

    print_separator();
    print_hint(&format!("Log file: {}", log_path.display()));
}

/// Get the directory where the executable is located
fn get_executable_dir() -> Result<PathBuf> {
    let exe_path = std::env::current_exe()?;
    Ok(exe_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// Log file path: Log/<Command>_<timestamp>.log beside the executable
fn get_log_path(exe_dir: &Path, cli: &Cli) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    exe_dir
        .join("Log")
        .join(format!("{}_{}.log", cli.command_name(), timestamp))
}

/// Load configuration from file or CLI arguments
fn load_config(cli: &Cli) -> Result<Config> {
    match cli.config {
        Some(ref config_path) => {
            info!(config_file = %config_path.display(), "Loading configuration from file");
            let file_config = Config::load_from_file(config_path)?;
            Ok(cli.merge_with_config(file_config))
        }
        None => Ok(cli.to_config()),
    }
}

/// Setup logging (file + console)
fn setup_logging(cli: &Cli, log_path: &Path) -> Result<WorkerGuard> {
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if let Some(parent) = log_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if cli.json_log {
        subscriber
            .with(fmt::layer().json().with_ansi(false).with_writer(non_blocking))
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(guard)
}
