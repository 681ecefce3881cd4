//! XVF control error types

use std::process::ExitStatus;

use thiserror::Error;

use super::command::XvfCommand;

/// Errors from issuing a command to the XVF host tool
#[derive(Error, Debug)]
pub enum XvfError {
    #[error("{command} value {value} out of range ({min}-{max})")]
    Validation {
        command: XvfCommand,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Failed to run {path}: {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {status}")]
    ExitStatus {
        command: XvfCommand,
        status: ExitStatus,
    },
}
