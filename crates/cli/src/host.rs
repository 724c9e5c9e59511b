//! The workflow host boundary: where the document comes from, where the
//! resolved document goes, and how failure is signalled.

use miette::{IntoDiagnostic, WrapErr};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Name of the output slot holding the canonical document.
pub const CONFIG_OUTPUT: &str = "config";

/// Where the configuration document is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// The input value is the document itself
    Inline(String),
    /// The input value names a file holding the document
    File(PathBuf),
}

impl ConfigSource {
    /// Anything containing `{` is treated as a JSON document; everything else
    /// is a path.
    #[must_use]
    pub fn from_input(input: &str) -> Self {
        if input.contains('{') {
            Self::Inline(input.to_string())
        } else {
            Self::File(PathBuf::from(input.trim()))
        }
    }

    /// Load the document text.
    pub fn read(&self) -> miette::Result<String> {
        match self {
            Self::Inline(text) => Ok(text.clone()),
            Self::File(path) => {
                debug!(path = %path.display(), "Reading configuration file");
                std::fs::read_to_string(path)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("Failed to read configuration from {}", path.display()))
            }
        }
    }
}

/// Publish an output slot.
///
/// Appends a heredoc entry to the output file when one is configured,
/// otherwise writes `name=value` to stdout.
pub fn set_output(name: &str, value: &str, output: Option<&Path>) -> miette::Result<()> {
    let Some(path) = output else {
        let mut stdout = io::stdout().lock();
        return writeln!(stdout, "{name}={value}").into_diagnostic();
    };

    let entry = output_entry(name, value, &Uuid::new_v4().to_string())?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to open output file {}", path.display()))?;
    file.write_all(entry.as_bytes()).into_diagnostic()?;
    debug!(name, path = %path.display(), "Output slot written");
    Ok(())
}

fn output_entry(name: &str, value: &str, id: &str) -> miette::Result<String> {
    let delimiter = format!("ghadelimiter_{id}");
    if name.contains(&delimiter) || value.contains(&delimiter) {
        return Err(miette::miette!(
            "Unexpected input: output value contains the delimiter {delimiter}"
        ));
    }
    Ok(format!("{name}<<{delimiter}\n{value}\n{delimiter}\n"))
}

/// Signal failure to the workflow host as an error annotation.
pub fn set_failed(message: &str) {
    let mut stdout = io::stdout().lock();
    // Best effort: stdout may already be closed.
    let _ = writeln!(stdout, "::error::{}", escape_data(message));
}

/// Escape a workflow command payload.
fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
