//! Per-connection event handling

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

use tokio::io::{AsyncRead, BufReader};
use tracing::{debug, warn};
use wyoming_transport::{read_event, Event, EventKind};

use crate::dispatch;
use crate::xvf::Xvf;

/// One connected client and the LED handle it drives
pub struct Session {
    client_id: String,
    xvf: Xvf,
}

impl Session {
    pub fn new(xvf: Xvf) -> Self {
        let client_id = next_client_id().to_string();
        debug!("Client connected: {}", client_id);
        Self { client_id, xvf }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Run the LED sequence for one event.
    ///
    /// Returns whether the connection should keep being read, which is always
    /// the case.
    pub async fn handle_event(&self, event: &Event) -> bool {
        debug!(
            "[{}] {} {:?}",
            self.client_id, event.event_type, event.data
        );

        let kind = event.kind();
        if !matches!(kind, EventKind::Other(_)) {
            debug!("{:?}", kind);
        }
        dispatch::run_steps(&self.xvf, &dispatch::plan(&kind)).await;
        true
    }

    /// Read and handle events until the client goes away.
    pub async fn serve<S>(self, stream: S)
    where
        S: AsyncRead + Unpin,
    {
        let mut reader = BufReader::new(stream);
        loop {
            match read_event(&mut reader).await {
                Ok(Some(event)) => {
                    if !self.handle_event(&event).await {
                        break;
                    }
                }
                Ok(None) => {
                    debug!("Client disconnected: {}", self.client_id);
                    break;
                }
                Err(e) => {
                    warn!("Dropping client {}: {}", self.client_id, e);
                    break;
                }
            }
        }
    }
}

/// Nanoseconds on a monotonic clock, bumped if needed so no two sessions
/// share an id.
fn next_client_id() -> u64 {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    static LAST: AtomicU64 = AtomicU64::new(0);

    let now = EPOCH.get_or_init(Instant::now).elapsed().as_nanos() as u64;
    let prev = LAST
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or(now);
    now.max(prev + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xvf::{DeviceCommand, LedEffect, RecordingBackend, SubprocessErrors};
    use std::collections::HashSet;
    use std::sync::Arc;
    use wyoming_transport::{event_type, write_event};

    fn session() -> (Session, RecordingBackend) {
        let backend = RecordingBackend::new();
        let xvf = Xvf::with_backend(Arc::new(backend.clone()), SubprocessErrors::Suppress);
        (Session::new(xvf), backend)
    }

    #[test]
    fn test_client_ids_are_unique() {
        let ids: HashSet<_> = (0..1000).map(|_| next_client_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_event_is_handled_without_commands() {
        let (session, backend) = session();
        assert!(session.handle_event(&Event::new("describe")).await);
        assert!(session.handle_event(&Event::new(event_type::STREAMING_STARTED)).await);
        assert!(backend.commands().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_known_event_keeps_the_session() {
        let (session, _backend) = session();
        for name in [
            event_type::DETECTION,
            event_type::VOICE_STARTED,
            event_type::VOICE_STOPPED,
            event_type::STREAMING_STOPPED,
            event_type::SATELLITE_CONNECTED,
            event_type::SATELLITE_DISCONNECTED,
            event_type::PLAYED,
        ] {
            assert!(session.handle_event(&Event::new(name)).await, "{name}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_serve_handles_events_in_order_until_eof() {
        let (session, backend) = session();

        let mut wire = Vec::new();
        for name in [event_type::DETECTION, "run-pipeline", event_type::PLAYED] {
            write_event(&mut wire, &Event::new(name)).await.unwrap();
        }
        session.serve(&wire[..]).await;

        assert_eq!(
            backend.commands(),
            vec![
                DeviceCommand::Effect(LedEffect::Doa),
                DeviceCommand::Brightness(255),
                DeviceCommand::Effect(LedEffect::Off),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_serve_stops_on_malformed_input() {
        let (session, backend) = session();

        let mut wire = Vec::new();
        write_event(&mut wire, &Event::new(event_type::PLAYED))
            .await
            .unwrap();
        wire.extend_from_slice(b"{broken\n");
        write_event(&mut wire, &Event::new(event_type::DETECTION))
            .await
            .unwrap();
        session.serve(&wire[..]).await;

        assert_eq!(
            backend.commands(),
            vec![DeviceCommand::Effect(LedEffect::Off)]
        );
    }
}
