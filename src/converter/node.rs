//! Process-backed converter.
//!
//! Spawns the configured program with the converter script as its argument,
//! writes `{"html": ..., "options": {...}}` to stdin and reads the PDF back
//! from stdout as base64 text.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use base64::{engine::general_purpose, Engine as _};
use log::{debug, error, info};
use serde::Serialize;

use super::{ConversionError, Converter, PdfOptions};
use crate::config::PdfConfig;

#[derive(Serialize)]
struct ConverterInput<'a> {
    html: &'a str,
    options: &'a PdfOptions,
}

/// Runs a Node (or any compatible) script that drives headless Chrome.
#[derive(Debug, Clone)]
pub struct NodeConverter {
    program: String,
    args: Vec<String>,
}

impl NodeConverter {
    pub fn new(node_binary: impl Into<String>, script: impl Into<PathBuf>) -> Self {
        let script: PathBuf = script.into();
        Self {
            program: node_binary.into(),
            args: vec![script.to_string_lossy().into_owned()],
        }
    }

    pub fn from_config(config: &PdfConfig) -> Self {
        Self::new(config.node_binary.clone(), config.converter_script.clone())
    }

    /// Use an arbitrary command line that speaks the same stdin/stdout protocol.
    pub fn with_command<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl Converter for NodeConverter {
    fn convert(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, ConversionError> {
        let input = serde_json::to_vec(&ConverterInput { html, options })
            .map_err(ConversionError::Encode)?;

        debug!(
            "Running converter '{}' ({} bytes of HTML, {} options)",
            self.program,
            html.len(),
            options.len()
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(ConversionError::Spawn)?;

        // Feed stdin from its own thread so stdout and stderr are drained
        // while the script is still reading. Dropping stdin sends EOF.
        let stdin = child.stdin.take();
        let writer = thread::spawn(move || -> io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&input)?;
            }
            Ok(())
        });

        let output = child.wait_with_output().map_err(ConversionError::Io)?;
        let written = writer
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("converter input writer panicked")));

        // A script that dies early breaks the pipe; its exit status is the real error.
        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("Converter exited with status {}: {}", code, stderr);
            return Err(ConversionError::Exit { code, stderr });
        }
        written.map_err(ConversionError::Io)?;

        let encoded: Vec<u8> = output
            .stdout
            .into_iter()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        if encoded.is_empty() {
            return Err(ConversionError::EmptyOutput);
        }

        let pdf = general_purpose::STANDARD
            .decode(&encoded)
            .map_err(ConversionError::Decode)?;

        info!("Converter produced {} bytes of PDF", pdf.len());
        Ok(pdf)
    }
}
