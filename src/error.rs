use std::{path::PathBuf, result::Result as StdResult};

use thiserror::Error;

pub type Result<T> = StdResult<T, Error>;

/// An enum for describing and handling various errors encountered while
/// querying history, loading configuration, or writing changelogs.
///
/// Malformed commit messages are never an error; they are simply dropped by
/// the classifier.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no version provided")]
    MissingVersion,

    #[error("failed to parse config file {0}: {1}")]
    ConfigParse(PathBuf, String),

    #[error("cannot get current directory")]
    CurrentDir,

    #[error("unrecognized link-style field: {0}")]
    LinkStyle(String),

    #[error("`git {cmd}` failed: {stderr}")]
    Git { cmd: String, stderr: String },

    #[error("fatal I/O error with changelog file")]
    Io(#[from] std::io::Error),

    #[error("failed to convert date/time to string format")]
    TimeStrFormat(#[from] time::error::Format),
}
