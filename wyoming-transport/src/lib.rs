//! Wyoming protocol transport for voice satellites
//!
//! This crate covers the parts of the Wyoming protocol an event consumer
//! needs:
//!
//! - Server URIs (`unix://` and `tcp://`)
//! - Listeners that hand out one boxed stream per client connection
//! - Event framing: a JSON header line, optional extra data, optional payload

pub mod error;
pub mod event;
pub mod listener;
pub mod uri;

pub use error::TransportError;
pub use event::{event_type, read_event, write_event, Event, EventKind};
pub use listener::{Connection, Listener};
pub use uri::Uri;
