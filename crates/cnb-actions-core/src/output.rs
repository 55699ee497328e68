//! GitHub Actions step outputs

use crate::error::{Error, Result};
use camino::Utf8PathBuf;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

const DELIMITER_BASE: &str = "CNB_ACTIONS_EOF";

/// Where a step output is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutput {
    /// Append to the file named by `GITHUB_OUTPUT`
    File(Utf8PathBuf),
    /// Print a legacy `::set-output` workflow command
    Stdout,
}

impl ActionOutput {
    /// Pick the file target when a path is given, stdout otherwise
    pub fn from_path(path: Option<Utf8PathBuf>) -> Self {
        match path {
            Some(p) => Self::File(p),
            None => Self::Stdout,
        }
    }

    /// Write `value` as the step output `name`
    pub fn write(&self, name: &str, value: &str) -> Result<()> {
        match self {
            Self::File(path) => {
                debug!("Appending output {} to {}", name, path);
                let mut file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| Error::output(name, e))?;
                file.write_all(file_command(name, value).as_bytes())
                    .map_err(|e| Error::output(name, e))
            }
            Self::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(set_output_command(name, value).as_bytes())
                    .and_then(|_| stdout.flush())
                    .map_err(|e| Error::output(name, e))
            }
        }
    }
}

/// Render `name<<DELIM` heredoc syntax understood by the GitHub runner
pub fn file_command(name: &str, value: &str) -> String {
    let delimiter = delimiter_for(value);
    format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
}

/// Render a single-line `::set-output` command.
///
/// The runner does not accept multi-line values here, so the value is
/// trimmed and `%`, CR and LF are percent-encoded.
pub fn set_output_command(name: &str, value: &str) -> String {
    let escaped = value
        .trim()
        .replace('%', "%25")
        .replace('\n', "%0A")
        .replace('\r', "%0D");
    format!("::set-output name={name}::{escaped}")
}

fn delimiter_for(value: &str) -> String {
    let mut delimiter = DELIMITER_BASE.to_string();
    let mut n = 0;
    while value.contains(&delimiter) {
        n += 1;
        delimiter = format!("{DELIMITER_BASE}_{n}");
    }
    delimiter
}
