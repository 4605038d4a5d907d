//! External conversion from editable documents to fixed-layout pages.
//!
//! Rendering goes through LibreOffice in headless mode. The invocation is
//! bounded by a hard timeout; a hung process is killed and the run degrades
//! to structure-only analysis upstream.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Produces a fixed-layout rendering of an editable document.
///
/// Implementations must place the finished PDF at exactly the requested
/// output path. Tests substitute converters that write synthetic files.
pub trait LayoutConverter: Send + Sync {
    /// Convert `input` to a PDF at `output`.
    fn convert_to_pdf(&self, input: &Path, output: &Path) -> Result<()>;

    /// Whether the converter can run in this environment.
    fn is_available(&self) -> bool {
        true
    }
}

/// LibreOffice headless converter.
pub struct SofficeConverter {
    binary: PathBuf,
    timeout: Duration,
}

impl Default for SofficeConverter {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("soffice"),
            timeout: Duration::from_secs(30),
        }
    }
}

impl SofficeConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific LibreOffice binary.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Override the conversion timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Wait for the child with a deadline, killing it on timeout.
    fn wait_with_timeout(&self, child: &mut std::process::Child) -> Result<()> {
        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    if status.success() {
                        return Ok(());
                    }
                    return Err(Error::RenderUnavailable(format!(
                        "converter exited with {}",
                        status
                    )));
                }
                Ok(None) => {
                    if start.elapsed() > self.timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(Error::RenderUnavailable(format!(
                            "conversion timed out after {}s",
                            self.timeout.as_secs()
                        )));
                    }
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    return Err(Error::RenderUnavailable(format!(
                        "failed to wait for converter: {}",
                        e
                    )));
                }
            }
        }
    }
}

impl LayoutConverter for SofficeConverter {
    fn convert_to_pdf(&self, input: &Path, output: &Path) -> Result<()> {
        if !input.exists() {
            return Err(Error::NotFound(input.display().to_string()));
        }

        let out_dir = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        log::debug!(
            "converting {} to PDF in {}",
            input.display(),
            out_dir.display()
        );

        let mut child = Command::new(&self.binary)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(out_dir)
            .arg(input)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                Error::RenderUnavailable(format!(
                    "cannot start {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        self.wait_with_timeout(&mut child)?;

        // soffice names the output after the input stem
        let stem = input
            .file_stem()
            .ok_or_else(|| Error::RenderUnavailable("input has no file name".to_string()))?;
        let produced = out_dir.join(Path::new(stem).with_extension("pdf"));

        if !produced.exists() {
            return Err(Error::RenderUnavailable(format!(
                "converter produced no output at {}",
                produced.display()
            )));
        }

        if produced != output {
            std::fs::rename(&produced, output)?;
        }

        Ok(())
    }

    fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}
