//! Command execution backends

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::command::DeviceCommand;
use super::error::XvfError;

/// Something that can carry out a validated [`DeviceCommand`]
#[async_trait]
pub trait XvfBackend: Send + Sync {
    /// Execute one command, waiting until it is done.
    async fn execute(&self, command: &DeviceCommand) -> Result<(), XvfError>;
}

/// Runs `<xvf_path> <TAG> <value>` as a child process per command.
///
/// The child's stdin, stdout and stderr are all null. The child is killed if
/// the awaiting task is dropped.
#[derive(Debug, Clone)]
pub struct ProcessBackend {
    path: PathBuf,
}

impl ProcessBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl XvfBackend for ProcessBackend {
    async fn execute(&self, command: &DeviceCommand) -> Result<(), XvfError> {
        let status = Command::new(&self.path)
            .args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|source| XvfError::Spawn {
                path: self.path.display().to_string(),
                source,
            })?;

        if !status.success() {
            return Err(XvfError::ExitStatus {
                command: command.tag(),
                status,
            });
        }
        Ok(())
    }
}
