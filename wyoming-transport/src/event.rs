//! Event framing
//!
//! Every event starts with a single JSON header line:
//!
//! ```text
//! {"type": "voice-started", "data": {...}, "data_length": 17, "payload_length": 0}\n
//! ```
//!
//! followed by `data_length` bytes of JSON object (merged over the inline
//! `data`) and `payload_length` bytes of binary payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::TransportError;

/// Protocol version written into outgoing headers
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Longest accepted header line, newline included.
pub const MAX_HEADER_LEN: usize = 64 * 1024;
/// Largest accepted `data_length`.
pub const MAX_DATA_LEN: usize = 1024 * 1024;
/// Largest accepted `payload_length`.
pub const MAX_PAYLOAD_LEN: usize = 16 * 1024 * 1024;

/// Event type names used by satellites
pub mod event_type {
    pub const DETECTION: &str = "detection";
    pub const VOICE_STARTED: &str = "voice-started";
    pub const VOICE_STOPPED: &str = "voice-stopped";
    pub const STREAMING_STARTED: &str = "streaming-started";
    pub const STREAMING_STOPPED: &str = "streaming-stopped";
    pub const SATELLITE_CONNECTED: &str = "satellite-connected";
    pub const SATELLITE_DISCONNECTED: &str = "satellite-disconnected";
    pub const PLAYED: &str = "played";
}

/// Lifecycle events a satellite reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Wake word detected
    Detection,
    /// Voice activity began
    VoiceStarted,
    /// Voice activity ended
    VoiceStopped,
    /// Satellite started streaming audio
    StreamingStarted,
    /// Satellite stopped streaming audio
    StreamingStopped,
    /// Satellite connected to the server
    SatelliteConnected,
    /// Satellite lost its server connection
    SatelliteDisconnected,
    /// Audio playback finished
    Played,
    /// Any other event type
    Other(String),
}

impl EventKind {
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            event_type::DETECTION => Self::Detection,
            event_type::VOICE_STARTED => Self::VoiceStarted,
            event_type::VOICE_STOPPED => Self::VoiceStopped,
            event_type::STREAMING_STARTED => Self::StreamingStarted,
            event_type::STREAMING_STOPPED => Self::StreamingStopped,
            event_type::SATELLITE_CONNECTED => Self::SatelliteConnected,
            event_type::SATELLITE_DISCONNECTED => Self::SatelliteDisconnected,
            event_type::PLAYED => Self::Played,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Detection => event_type::DETECTION,
            Self::VoiceStarted => event_type::VOICE_STARTED,
            Self::VoiceStopped => event_type::VOICE_STOPPED,
            Self::StreamingStarted => event_type::STREAMING_STARTED,
            Self::StreamingStopped => event_type::STREAMING_STOPPED,
            Self::SatelliteConnected => event_type::SATELLITE_CONNECTED,
            Self::SatelliteDisconnected => event_type::SATELLITE_DISCONNECTED,
            Self::Played => event_type::PLAYED,
            Self::Other(name) => name,
        }
    }
}

/// A single decoded event
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Event {
    pub event_type: String,
    pub data: Map<String, Value>,
    pub payload: Option<Vec<u8>>,
}

impl Event {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            ..Default::default()
        }
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn kind(&self) -> EventKind {
        EventKind::from_type(&self.event_type)
    }
}

impl From<EventKind> for Event {
    fn from(kind: EventKind) -> Self {
        Event::new(kind.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

/// Read the next event from a stream.
///
/// Returns `Ok(None)` when the peer closed the connection before a new
/// header started.
pub async fn read_event<R>(reader: &mut R) -> Result<Option<Event>, TransportError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let read = (&mut *reader)
        .take(MAX_HEADER_LEN as u64)
        .read_line(&mut line)
        .await?;
    if read == 0 {
        return Ok(None);
    }
    if !line.ends_with('\n') {
        if read >= MAX_HEADER_LEN {
            return Err(TransportError::InvalidHeader(format!(
                "header line longer than {MAX_HEADER_LEN} bytes"
            )));
        }
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }

    let header: Header = serde_json::from_str(line.trim_end())?;
    if header.event_type.is_empty() {
        return Err(TransportError::InvalidHeader("empty event type".to_string()));
    }

    let data_length = checked_length("data_length", header.data_length, MAX_DATA_LEN)?;
    let payload_length =
        checked_length("payload_length", header.payload_length, MAX_PAYLOAD_LEN)?;

    let mut data = header.data.unwrap_or_default();
    if let Some(len) = data_length {
        let mut buf = vec![0u8; len];
        reader.read_exact(&mut buf).await?;
        let extra: Map<String, Value> = serde_json::from_slice(&buf)?;
        data.extend(extra);
    }

    let payload = match payload_length {
        Some(len) => {
            let mut buf = vec![0u8; len];
            reader.read_exact(&mut buf).await?;
            Some(buf)
        }
        None => None,
    };

    Ok(Some(Event {
        event_type: header.event_type,
        data,
        payload,
    }))
}

/// Non-zero length from a header, rejected above `max` before anything is
/// allocated for it.
fn checked_length(
    field: &str,
    length: Option<usize>,
    max: usize,
) -> Result<Option<usize>, TransportError> {
    match length {
        Some(len) if len > max => Err(TransportError::InvalidHeader(format!(
            "{field} {len} exceeds {max} bytes"
        ))),
        Some(len) if len > 0 => Ok(Some(len)),
        _ => Ok(None),
    }
}

/// Write one event, data and payload after the header line.
pub async fn write_event<W>(writer: &mut W, event: &Event) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    let data_bytes = if event.data.is_empty() {
        None
    } else {
        Some(serde_json::to_vec(&event.data)?)
    };
    let payload = event.payload.as_deref().filter(|p| !p.is_empty());

    let header = Header {
        event_type: event.event_type.clone(),
        data: None,
        data_length: data_bytes.as_ref().map(Vec::len),
        payload_length: payload.map(<[u8]>::len),
        version: Some(PROTOCOL_VERSION.to_string()),
    };

    let mut line = serde_json::to_vec(&header)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    if let Some(data) = &data_bytes {
        writer.write_all(data).await?;
    }
    if let Some(payload) = payload {
        writer.write_all(payload).await?;
    }
    writer.flush().await?;
    Ok(())
}
