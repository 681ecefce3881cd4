//! ReSpeaker XVF3800 LED control through the `xvf_host` executable.
//!
//! Every setter is one child process (`xvf_host LED_BRIGHTNESS 255`). Values
//! are range-checked before anything is launched. What the tool does with
//! the command is not observed: its output is discarded and a failed run
//! never fails the call. [`SubprocessErrors`] picks whether such failures are
//! logged.

mod backend;
mod command;
mod error;
#[cfg(any(test, feature = "test-util"))]
mod recording;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

pub use backend::{ProcessBackend, XvfBackend};
pub use command::{
    DeviceCommand, LedEffect, XvfCommand, BRIGHTNESS_RANGE, COLOR_RANGE, SPEED_RANGE,
};
pub use error::XvfError;
#[cfg(any(test, feature = "test-util"))]
pub use recording::{Invocation, RecordingBackend};

/// What to do when the host tool cannot be started or exits non-zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubprocessErrors {
    /// Drop the failure silently
    Suppress,
    /// Log the failure at debug level
    #[default]
    Log,
}

/// Handle to the LED controller
#[derive(Clone)]
pub struct Xvf {
    backend: Arc<dyn XvfBackend>,
    errors: SubprocessErrors,
}

impl Xvf {
    /// Control the device through the executable at `path`.
    pub fn new(path: impl Into<PathBuf>, errors: SubprocessErrors) -> Self {
        Self::with_backend(Arc::new(ProcessBackend::new(path)), errors)
    }

    pub fn with_backend(backend: Arc<dyn XvfBackend>, errors: SubprocessErrors) -> Self {
        Self { backend, errors }
    }

    /// Validate and execute one command.
    ///
    /// Only [`XvfError::Validation`] is ever returned.
    pub async fn send(&self, command: DeviceCommand) -> Result<(), XvfError> {
        command.validate()?;
        debug!("xvf {}", command);

        if let Err(e) = self.backend.execute(&command).await {
            match self.errors {
                SubprocessErrors::Suppress => {}
                SubprocessErrors::Log => debug!("xvf {} failed: {}", command.tag(), e),
            }
        }
        Ok(())
    }

    pub async fn set_effect(&self, effect: LedEffect) -> Result<(), XvfError> {
        self.send(DeviceCommand::Effect(effect)).await
    }

    pub async fn set_brightness(&self, brightness: i64) -> Result<(), XvfError> {
        self.send(DeviceCommand::Brightness(brightness)).await
    }

    pub async fn set_gammify(&self, enabled: bool) -> Result<(), XvfError> {
        self.send(DeviceCommand::Gammify(enabled)).await
    }

    pub async fn set_speed(&self, speed: i64) -> Result<(), XvfError> {
        self.send(DeviceCommand::Speed(speed)).await
    }

    pub async fn set_color(&self, color: i64) -> Result<(), XvfError> {
        self.send(DeviceCommand::Color(color)).await
    }
}

impl std::fmt::Debug for Xvf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Xvf").field("errors", &self.errors).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn recording() -> (Xvf, RecordingBackend) {
        let backend = RecordingBackend::new();
        let xvf = Xvf::with_backend(Arc::new(backend.clone()), SubprocessErrors::Log);
        (xvf, backend)
    }

    /// Backend whose every run fails like a missing executable.
    struct MissingTool {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl XvfBackend for MissingTool {
        async fn execute(&self, _command: &DeviceCommand) -> Result<(), XvfError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(XvfError::Spawn {
                path: "/nonexistent/xvf_host".to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }
    }

    #[tokio::test]
    async fn test_brightness_in_range_sends_once() {
        let (xvf, backend) = recording();
        for value in BRIGHTNESS_RANGE {
            backend.clear();
            xvf.set_brightness(value).await.unwrap();
            assert_eq!(backend.commands(), vec![DeviceCommand::Brightness(value)]);
            assert_eq!(backend.commands()[0].tag(), XvfCommand::LedBrightness);
        }
    }

    #[tokio::test]
    async fn test_out_of_range_sends_nothing() {
        let (xvf, backend) = recording();

        for value in [-1000, -1, 256, 1000, i64::MAX] {
            assert!(matches!(
                xvf.set_brightness(value).await,
                Err(XvfError::Validation {
                    command: XvfCommand::LedBrightness,
                    ..
                })
            ));
        }
        for value in [-1, 11, 255] {
            assert!(matches!(
                xvf.set_speed(value).await,
                Err(XvfError::Validation {
                    command: XvfCommand::LedSpeed,
                    ..
                })
            ));
        }
        for value in [-1, 0x1_0000_0000, i64::MIN] {
            assert!(matches!(
                xvf.set_color(value).await,
                Err(XvfError::Validation {
                    command: XvfCommand::LedColor,
                    ..
                })
            ));
        }

        assert!(backend.commands().is_empty());
    }

    #[tokio::test]
    async fn test_speed_and_color_in_range() {
        let (xvf, backend) = recording();
        for value in SPEED_RANGE {
            xvf.set_speed(value).await.unwrap();
        }
        for value in [0, 0x0080FF, 0xFF0000, 0xFFFF_FFFF] {
            xvf.set_color(value).await.unwrap();
        }

        let mut expected: Vec<_> = SPEED_RANGE.map(DeviceCommand::Speed).collect();
        expected.extend([0, 0x0080FF, 0xFF0000, 0xFFFF_FFFF].map(DeviceCommand::Color));
        assert_eq!(backend.commands(), expected);
    }

    #[tokio::test]
    async fn test_effect_and_gammify() {
        let (xvf, backend) = recording();
        xvf.set_effect(LedEffect::Rainbow).await.unwrap();
        xvf.set_gammify(true).await.unwrap();
        xvf.set_gammify(false).await.unwrap();

        let values: Vec<_> = backend
            .commands()
            .iter()
            .map(|c| (c.tag(), c.value()))
            .collect();
        assert_eq!(
            values,
            vec![
                (XvfCommand::LedEffect, 2),
                (XvfCommand::LedGammify, 1),
                (XvfCommand::LedGammify, 0),
            ]
        );
    }

    /// Log sink shared between a test and its subscriber
    #[derive(Clone, Default)]
    struct Captured(Arc<parking_lot::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    /// Run `set_effect(Off)` against a missing tool and return the log output.
    async fn log_of_failed_run(policy: SubprocessErrors) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let xvf = Xvf::with_backend(
            Arc::new(MissingTool {
                calls: AtomicUsize::new(0),
            }),
            policy,
        );
        xvf.set_effect(LedEffect::Off).await.unwrap();
        captured.text()
    }

    #[tokio::test]
    async fn test_log_policy_reports_tool_failures() {
        let output = log_of_failed_run(SubprocessErrors::Log).await;
        assert!(output.contains("xvf LED_EFFECT 0"), "{output}");
        assert!(output.contains("xvf LED_EFFECT failed"), "{output}");
        assert!(output.contains("/nonexistent/xvf_host"), "{output}");
    }

    #[tokio::test]
    async fn test_suppress_policy_hides_tool_failures() {
        let output = log_of_failed_run(SubprocessErrors::Suppress).await;
        assert!(output.contains("xvf LED_EFFECT 0"), "{output}");
        assert!(!output.contains("failed"), "{output}");
    }

    #[tokio::test]
    async fn test_tool_failures_never_fail_the_call() {
        for policy in [SubprocessErrors::Suppress, SubprocessErrors::Log] {
            let tool = Arc::new(MissingTool {
                calls: AtomicUsize::new(0),
            });
            let xvf = Xvf::with_backend(tool.clone(), policy);

            xvf.set_effect(LedEffect::Off).await.unwrap();
            xvf.set_color(0x00FF00).await.unwrap();
            assert_eq!(tool.calls.load(Ordering::SeqCst), 2);

            // Validation still wins over the backend
            assert!(xvf.set_speed(99).await.is_err());
            assert_eq!(tool.calls.load(Ordering::SeqCst), 2);
        }
    }
}
