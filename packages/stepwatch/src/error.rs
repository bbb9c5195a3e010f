use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur at the file system boundary of timing output.
///
/// Clock arithmetic never fails. Only the optional per-timer step log touches the outside
/// world, and only its operations produce these errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The configured output folder could not be created.
    #[error("cannot create timing output folder {}: {source}", path.display())]
    CreateOutputFolder {
        /// The folder that was requested.
        path: PathBuf,

        /// The underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// A step log file could not be created.
    #[error("cannot open step log {}: {source}", path.display())]
    OpenStepLog {
        /// The file that was requested.
        path: PathBuf,

        /// The underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// A line could not be appended to a step log file.
    #[error("cannot write to step log {}: {source}", path.display())]
    WriteStepLog {
        /// The file that was being written.
        path: PathBuf,

        /// The underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// A specialized `Result` type for timing output operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
