//! In-memory backend for exercising the LED logic without the host tool.
//!
//! Built for this crate's tests and, with the `test-util` feature, for
//! integration tests and downstream users.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use super::backend::XvfBackend;
use super::command::DeviceCommand;
use super::error::XvfError;

/// A command seen by [`RecordingBackend`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation {
    pub command: DeviceCommand,
    /// Tokio clock reading (follows paused time in tests)
    pub at: Instant,
}

/// Backend that records commands instead of running anything.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    log: Arc<Mutex<Vec<Invocation>>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.log.lock().clone()
    }

    pub fn commands(&self) -> Vec<DeviceCommand> {
        self.log.lock().iter().map(|i| i.command).collect()
    }

    pub fn clear(&self) {
        self.log.lock().clear();
    }
}

#[async_trait]
impl XvfBackend for RecordingBackend {
    async fn execute(&self, command: &DeviceCommand) -> Result<(), XvfError> {
        self.log.lock().push(Invocation {
            command: *command,
            at: Instant::now(),
        });
        Ok(())
    }
}
