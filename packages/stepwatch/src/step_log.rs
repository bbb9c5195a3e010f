//! Per-timer log of every measured cycle.
//!
//! A log file is replaced when its registry first writes to it, so each run starts from a
//! fresh header. Later cycles of the same run are appended.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::debug;

use crate::Clock;
use crate::error::{Error, Result};

/// First line of every step log file.
pub(crate) const HEADER: &str = "#    Step,               Start            , Duration\n";

/// Format of the wall-clock start time column.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

const FILE_NAME_PREFIX: &str = "Timing_";

/// Returns the file stem used for a timer's step log.
///
/// The stem is `Timing_` followed by the timer name with every character outside
/// `[A-Za-z0-9_-]` replaced by `_`, so any timer name maps to a portable file name.
///
/// # Examples
///
/// ```
/// assert_eq!(stepwatch::strict_name("Total"), "Timing_Total");
/// assert_eq!(stepwatch::strict_name("fluid / pressure"), "Timing_fluid___pressure");
/// ```
#[must_use]
pub fn strict_name(timer_name: &str) -> String {
    let sanitized: String = timer_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!("{FILE_NAME_PREFIX}{sanitized}")
}

/// Renders one log line for a completed start/stop cycle.
pub(crate) fn format_line(step: u64, started_at: &str, duration: Clock) -> String {
    format!("{step:>8}, {started_at}, {duration}\n")
}

/// Lazily created log file of a single timer.
///
/// Any existing file at the path is truncated and given a new header on the first append. The
/// file then stays open and every later cycle is appended to it.
#[derive(Debug)]
pub(crate) struct StepLog {
    path: PathBuf,
    file: Option<File>,
}

impl StepLog {
    pub(crate) fn new(output_folder: &Path, timer_name: &str) -> Self {
        Self {
            path: output_folder.join(format!("{}.csv", strict_name(timer_name))),
            file: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Appends the record of one completed cycle.
    pub(crate) fn append(
        &mut self,
        step: u64,
        started_at: &DateTime<Local>,
        duration: Clock,
    ) -> Result<()> {
        let line = format_line(step, &started_at.format(TIMESTAMP_FORMAT).to_string(), duration);

        let file = match self.file {
            Some(ref mut file) => file,
            None => self.file.insert(Self::open(&self.path)?),
        };

        file.write_all(line.as_bytes())
            .map_err(|source| Error::WriteStepLog {
                path: self.path.clone(),
                source,
            })
    }

    fn open(path: &Path) -> Result<File> {
        let mut file = File::create(path).map_err(|source| Error::OpenStepLog {
            path: path.to_path_buf(),
            source,
        })?;

        file.write_all(HEADER.as_bytes())
            .map_err(|source| Error::WriteStepLog {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(path = %path.display(), "step log created");

        Ok(file)
    }
}
