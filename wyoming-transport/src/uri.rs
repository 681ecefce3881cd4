//! Server addresses

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::TransportError;

/// Address a Wyoming server listens on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Uri {
    /// `tcp://HOST:PORT`
    Tcp { host: String, port: u16 },
    /// `unix://PATH`
    Unix(PathBuf),
}

impl FromStr for Uri {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(path) = s.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(TransportError::InvalidUri(s.to_string()));
            }
            return Ok(Uri::Unix(PathBuf::from(path)));
        }

        let addr = s
            .strip_prefix("tcp://")
            .ok_or_else(|| TransportError::InvalidUri(s.to_string()))?;
        let (host, port) = addr
            .rsplit_once(':')
            .ok_or_else(|| TransportError::InvalidUri(s.to_string()))?;

        // [::1]:10500
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(TransportError::InvalidUri(s.to_string()));
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| TransportError::InvalidUri(s.to_string()))?;

        Ok(Uri::Tcp {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Uri::Tcp { host, port } if host.contains(':') => write!(f, "tcp://[{host}]:{port}"),
            Uri::Tcp { host, port } => write!(f, "tcp://{host}:{port}"),
            Uri::Unix(path) => write!(f, "unix://{}", path.display()),
        }
    }
}
