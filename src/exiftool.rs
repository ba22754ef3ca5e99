//! exiftool backend: one external process per chunk.

use anyhow::{anyhow, bail, Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

use crate::chunking::Chunk;
use crate::error::ConfigError;
use crate::extractor::MetadataExtractor;
use crate::records::{parse_exiftool_json, PhotoRecord};

/// Numeric coordinates, JSON output, only files that carry a latitude.
/// File names follow through an argument file on stdin.
const EXIFTOOL_ARGS: &[&str] = &[
    "-n",
    "-json",
    "-q",
    "-charset",
    "UTF8",
    "-charset",
    "filename=UTF8",
    "-if",
    "$GPSLatitude",
    "-GPSLatitude",
    "-GPSLongitude",
    "-DateTimeOriginal",
    "-FileName",
    "-SourceFile",
    "-@",
    "-",
];

/// exiftool's exit status when every file failed the `-if` condition.
const EXIT_ALL_FILTERED: i32 = 2;

#[derive(Debug, Clone)]
pub struct ExifTool {
    program: PathBuf,
}

impl ExifTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Runs `exiftool -ver` and returns the reported version.
    pub fn check_available(&self) -> Result<String, ConfigError> {
        let missing = |reason: String| ConfigError::ToolMissing {
            program: self.program.display().to_string(),
            reason,
        };

        let output = Command::new(&self.program)
            .arg("-ver")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| missing(e.to_string()))?;

        if !output.status.success() {
            return Err(missing(format!("`-ver` exited with {}", output.status)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn run(&self, files: &[PathBuf]) -> Result<Vec<PhotoRecord>> {
        let mut child = Command::new(&self.program)
            .args(EXIFTOOL_ARGS)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start {}", self.program.display()))?;

        // Feed the argument file from a separate thread so a full stdout
        // pipe cannot stall us while exiftool is still reading arguments.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("exiftool stdin was not captured"))?;
        let arg_file = argument_file(files);
        let feeder = std::thread::spawn(move || stdin.write_all(&arg_file));

        let output = child
            .wait_with_output()
            .context("Failed to wait for exiftool")?;
        let fed = feeder
            .join()
            .map_err(|_| anyhow!("exiftool argument writer panicked"))?;

        let records = interpret_output(output.status.code(), &output.stdout, &output.stderr)?;
        fed.context("Failed to pass file list to exiftool")?;
        Ok(records)
    }
}

impl MetadataExtractor for ExifTool {
    fn name(&self) -> &str {
        "exiftool"
    }

    fn extract_chunk(&self, chunk: &Chunk) -> Result<Vec<PhotoRecord>> {
        if chunk.files.is_empty() {
            return Ok(Vec::new());
        }
        self.run(&chunk.files)
    }
}

/// One path per line, as exiftool's `-@` expects. Paths are passed as raw
/// bytes on unix so names that are not valid UTF-8 still resolve.
fn argument_file(files: &[PathBuf]) -> Vec<u8> {
    let mut out = Vec::new();
    for file in files {
        out.extend_from_slice(&path_bytes(file));
        out.push(b'\n');
    }
    out
}

#[cfg(unix)]
fn path_bytes(path: &Path) -> std::borrow::Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    std::borrow::Cow::Borrowed(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn path_bytes(path: &Path) -> std::borrow::Cow<'_, [u8]> {
    std::borrow::Cow::Owned(path.to_string_lossy().into_owned().into_bytes())
}

/// Maps an exiftool exit status and its output to records.
fn interpret_output(code: Option<i32>, stdout: &[u8], stderr: &[u8]) -> Result<Vec<PhotoRecord>> {
    match code {
        Some(0) => {}
        Some(EXIT_ALL_FILTERED) if stdout.iter().all(u8::is_ascii_whitespace) => {
            debug!("No file in chunk carries GPS data");
            return Ok(Vec::new());
        }
        Some(code) => bail!(
            "exiftool exited with status {}: {}",
            code,
            String::from_utf8_lossy(stderr).trim()
        ),
        None => bail!("exiftool was terminated by a signal"),
    }

    let parsed = parse_exiftool_json(stdout)?;
    Ok(parsed.records)
}
