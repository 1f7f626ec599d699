//! External tool invocation

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::{Mutex, OnceLock};
use tracing::debug;

/// Cached availability per executable
static AVAILABLE: OnceLock<Mutex<HashMap<PathBuf, bool>>> = OnceLock::new();

/// Check whether `program` can be spawned (cached per program)
pub fn is_available(program: &Path) -> bool {
    let cache = AVAILABLE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut cache = match cache.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    *cache.entry(program.to_path_buf()).or_insert_with(|| {
        let found = Command::new(program).arg("-version").output().is_ok();
        debug!(?program, found, "Probed external tool");
        found
    })
}

/// Fail with [`Error::ToolNotFound`] unless `program` can be spawned
pub fn require(program: &Path) -> Result<()> {
    if is_available(program) {
        Ok(())
    } else {
        Err(Error::ToolNotFound {
            tool: program.display().to_string(),
        })
    }
}

/// Run `program` with `args`, capturing output regardless of exit status
pub fn capture<I, S>(program: &Path, args: I, subject: &Path) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    require(program)?;
    Command::new(program)
        .args(args)
        .output()
        .map_err(|e| Error::ToolFailed {
            tool: program.display().to_string(),
            path: subject.to_path_buf(),
            message: format!("failed to execute: {e}"),
        })
}

/// Run `program` with `args` and fail unless it exits successfully
pub fn run<I, S>(program: &Path, args: I, subject: &Path) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = capture(program, args, subject)?;
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(Error::ToolFailed {
        tool: program.display().to_string(),
        path: subject.to_path_buf(),
        message: format!("{}: {}", output.status, stderr.trim()),
    })
}
