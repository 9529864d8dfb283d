//! Lean verification of generated code.
//!
//! [`LeanVerifier`] writes the code to a uniquely named temporary file inside
//! the Lean project directory, runs the checker against it under a wall-clock
//! limit and reports pass/fail. Every failure path (spawn error, timeout,
//! nonzero exit) collapses to `false` with a logged diagnostic.

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::VerifierConfig;

/// Checks generated code and reports whether it passed.
pub trait Verifier {
    fn verify(&self, code: &str) -> impl Future<Output = bool> + Send;
}

/// Reasons a checker invocation produced no verdict.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("no source to verify")]
    EmptySource,

    #[error("checker I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("checker did not finish within {secs}s")]
    Timeout { secs: u64 },
}

/// Captured result of one checker process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CheckerOutput {
    pub fn passed(&self) -> bool {
        self.exit_code == Some(0)
    }
}

pub struct LeanVerifier {
    program: String,
    args: Vec<String>,
    workdir: PathBuf,
    timeout: Duration,
    file_suffix: String,
}

impl LeanVerifier {
    pub fn new(config: VerifierConfig) -> Self {
        Self {
            program: config.program,
            args: config.args,
            workdir: config.workdir,
            timeout: Duration::from_secs(config.timeout_secs),
            file_suffix: config.file_suffix,
        }
    }

    /// Write `code` to a scoped temporary file and run the checker on it.
    /// The file is removed when this returns, whatever the outcome.
    pub async fn check(&self, code: &str) -> Result<CheckerOutput, VerifyError> {
        if code.is_empty() {
            return Err(VerifyError::EmptySource);
        }

        let source = self.write_source(&prepare_source(code))?;
        debug!(path = %source.path().display(), "running lean checker");
        self.run_checker(source.path()).await
    }

    /// Run the checker against an existing file.
    pub async fn run_checker(&self, path: &Path) -> Result<CheckerOutput, VerifyError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // Dropping the output future on timeout kills the child.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| VerifyError::Timeout {
                secs: self.timeout.as_secs(),
            })??;

        Ok(CheckerOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn write_source(&self, source: &str) -> Result<NamedTempFile, VerifyError> {
        let mut file = tempfile::Builder::new()
            .prefix("theoremica-")
            .suffix(&self.file_suffix)
            .tempfile_in(&self.workdir)?;
        file.write_all(source.as_bytes())?;
        file.flush()?;
        Ok(file)
    }
}

impl Verifier for LeanVerifier {
    async fn verify(&self, code: &str) -> bool {
        match self.check(code).await {
            Ok(output) => {
                info!(exit_code = ?output.exit_code, "lean checker finished");
                debug!(stdout = %output.stdout, stderr = %output.stderr, "lean checker output");
                output.passed()
            }
            Err(VerifyError::EmptySource) => false,
            Err(e) => {
                warn!(error = %e, "verification error");
                false
            }
        }
    }
}

/// Collapse trailing newlines so the source ends with exactly one.
pub fn prepare_source(code: &str) -> String {
    let mut source = code.trim_end_matches(['\n', '\r']).to_string();
    source.push('\n');
    source
}
