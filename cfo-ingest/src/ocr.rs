//! OCR boundary: anything that turns receipt image bytes into text.

use anyhow::{Context, Result, bail};
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;

/// Converts an image into raw text
pub trait TextExtractor {
    fn extract_text(&self, image_bytes: &[u8]) -> Result<String>;
}

/// OCR by shelling out to the `tesseract` CLI.
///
/// The image is piped on stdin and the text read from stdout, so no temporary
/// files are involved.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    command: String,
    language: Option<String>,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl TesseractCli {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: None,
        }
    }

    /// Tesseract language code, e.g. "eng"
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec!["stdin".to_string(), "stdout".to_string()];
        if let Some(lang) = &self.language {
            args.push("-l".to_string());
            args.push(lang.clone());
        }
        args
    }
}

impl TextExtractor for TesseractCli {
    fn extract_text(&self, image_bytes: &[u8]) -> Result<String> {
        let bin = which::which(&self.command).with_context(|| {
            format!(
                "OCR engine '{}' not found on PATH (install tesseract or set [ocr].command)",
                self.command
            )
        })?;
        debug!(bin = %bin.display(), bytes = image_bytes.len(), "running OCR");

        let mut child = Command::new(&bin)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("running {}", bin.display()))?;

        // Dropping stdin closes the pipe so tesseract sees EOF.
        let written = {
            let mut stdin = child.stdin.take().context("tesseract stdin unavailable")?;
            stdin.write_all(image_bytes)
        };

        // Tesseract may exit before reading all input; its stderr explains why.
        let out = child.wait_with_output().context("wait for tesseract")?;
        if !out.status.success() {
            bail!(
                "tesseract failed: {} {}",
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            );
        }
        written.context("write image to tesseract")?;

        Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
    }
}
