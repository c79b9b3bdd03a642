//! Package installation for downloadable plugins
//!
//! The installer is an external process (`pip` by default). Its standard
//! output and error are captured to one log file that outlives the install
//! attempt so it can be inspected afterwards.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use brix_config::Config;
use brix_logger as logger;

use crate::errors::PluginError;
use crate::identifier::{PluginRequest, Protocol, PYPI_PLUGIN_PROTOCOL, VCS_PLUGIN_PROTOCOL};

/// Lines of installer output kept in a [`PluginError::Missing`]
const LOG_EXCERPT_LINES: usize = 40;

/// Runs an external command
pub trait ProcessRunner {
    /// Run `command` in `cwd` with both output streams appended to
    /// `capture_to`, returning the exit code
    fn run(&self, command: &[String], cwd: &Path, capture_to: &Path) -> io::Result<i32>;
}

/// Runs commands as child processes of the host
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, command: &[String], cwd: &Path, capture_to: &Path) -> io::Result<i32> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;

        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(capture_to)?;

        let status = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log.try_clone()?))
            .stderr(Stdio::from(log))
            .status()?;

        // Killed by a signal
        Ok(status.code().unwrap_or(-1))
    }
}

/// Installs plugin packages with an external installer
#[derive(Clone)]
pub struct PackageInstaller {
    program: String,
    cwd: PathBuf,
    runner: Arc<dyn ProcessRunner>,
}

impl std::fmt::Debug for PackageInstaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageInstaller")
            .field("program", &self.program)
            .field("cwd", &self.cwd)
            .finish_non_exhaustive()
    }
}

impl PackageInstaller {
    pub fn new(program: impl Into<String>) -> Self {
        Self::with_runner(program, Arc::new(SystemProcessRunner))
    }

    pub fn with_runner(program: impl Into<String>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            program: program.into(),
            cwd: PathBuf::from("."),
            runner,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.get_installer_path())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Package reference handed to the installer
    ///
    /// `pypi:` references carry the requested version range, `vcs:`
    /// references are the bare remote location.
    pub fn package_reference(request: &PluginRequest) -> Result<String, PluginError> {
        match request.protocol() {
            Protocol::Pypi => Ok(match request.version() {
                Some(version) => format!("{}{}", request.bare_name(), version),
                None => request.bare_name().to_string(),
            }),
            Protocol::Vcs => Ok(request.bare_name().to_string()),
            Protocol::Builtin => Err(PluginError::missing(
                request.identifier(),
                format!(
                    "Only plugins starting with '{}' or '{}' are currently supported",
                    PYPI_PLUGIN_PROTOCOL, VCS_PLUGIN_PROTOCOL
                ),
            )),
        }
    }

    pub fn install_command(&self, package: &str) -> Vec<String> {
        vec![
            self.program.clone(),
            "install".to_string(),
            "--upgrade".to_string(),
            package.to_string(),
        ]
    }

    /// Install the package behind `request`, returning the installer log path
    ///
    /// Every failure, including a failure to start the installer, is reported
    /// as [`PluginError::Missing`].
    pub fn install(&self, request: &PluginRequest) -> Result<PathBuf, PluginError> {
        let package = Self::package_reference(request)?;
        let command = self.install_command(&package);
        let log_path = create_log_file().map_err(|e| {
            PluginError::missing(
                request.identifier(),
                format!("Failed to create installer log: {}", e),
            )
        })?;

        logger::debug(&format!(
            "Running: {} (log: {})",
            command.join(" "),
            log_path.display()
        ));

        let exit_code = self
            .runner
            .run(&command, &self.cwd, &log_path)
            .map_err(|e| {
                PluginError::missing(
                    request.identifier(),
                    format!("Failed to run installer '{}': {}", self.program, e),
                )
            })?;

        let transcript = fs::read(&log_path)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default();
        logger::capture_log(&command.join(" "), Some(exit_code), &transcript);

        if exit_code != 0 {
            logger::error(&format!(
                "The following installer error was encountered:\n{}",
                transcript
            ));
            return Err(PluginError::missing(
                request.identifier(),
                format!(
                    "Failed to install plugin from {} (exit code {}, log: {}):\n{}",
                    package,
                    exit_code,
                    log_path.display(),
                    excerpt(&transcript)
                ),
            ));
        }

        Ok(log_path)
    }
}

/// Create the installer log; the handle is closed on return, the file kept
fn create_log_file() -> io::Result<PathBuf> {
    let (file, path) = tempfile::Builder::new()
        .prefix("brix-install-")
        .suffix(".log")
        .tempfile()?
        .keep()
        .map_err(|e| e.error)?;
    drop(file);
    Ok(path)
}

fn excerpt(transcript: &str) -> String {
    let lines: Vec<&str> = transcript.lines().collect();
    let start = lines.len().saturating_sub(LOG_EXCERPT_LINES);
    lines[start..].join("\n")
}
