//! TCP and Unix socket listeners

use std::net::SocketAddr;
#[cfg(unix)]
use std::path::PathBuf;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
#[cfg(unix)]
use tokio::net::UnixListener;
use tracing::debug;

use crate::error::TransportError;
use crate::uri::Uri;

/// Byte stream of one accepted client
pub trait Stream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> Stream for T {}

/// Accepted client connection
pub type Connection = Box<dyn Stream>;

/// Server socket bound to a [`Uri`]
pub enum Listener {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(UnixListener, PathBuf),
}

impl Listener {
    /// Bind a listener for `uri`.
    ///
    /// A leftover Unix socket at the target path is removed first; any other
    /// kind of file there is left alone and binding fails.
    pub async fn bind(uri: &Uri) -> Result<Self, TransportError> {
        match uri {
            Uri::Tcp { host, port } => {
                let listener = TcpListener::bind((host.as_str(), *port)).await?;
                debug!("Listening on {}", uri);
                Ok(Listener::Tcp(listener))
            }
            #[cfg(unix)]
            Uri::Unix(path) => {
                remove_stale_socket(path).await?;
                let listener = UnixListener::bind(path)?;
                debug!("Listening on {}", uri);
                Ok(Listener::Unix(listener, path.clone()))
            }
            #[cfg(not(unix))]
            Uri::Unix(_) => Err(TransportError::InvalidUri(uri.to_string())),
        }
    }

    /// Local TCP address, if this is a TCP listener.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match self {
            Listener::Tcp(listener) => listener.local_addr().ok(),
            #[cfg(unix)]
            Listener::Unix(..) => None,
        }
    }

    /// Wait for the next client. Returns the stream and a peer description
    /// for logging.
    pub async fn accept(&self) -> Result<(Connection, String), TransportError> {
        match self {
            Listener::Tcp(listener) => {
                let (stream, addr) = listener.accept().await?;
                stream.set_nodelay(true)?;
                Ok((Box::new(stream), addr.to_string()))
            }
            #[cfg(unix)]
            Listener::Unix(listener, path) => {
                let (stream, _) = listener.accept().await?;
                Ok((Box::new(stream), path.display().to_string()))
            }
        }
    }
}

impl From<TcpListener> for Listener {
    fn from(listener: TcpListener) -> Self {
        Listener::Tcp(listener)
    }
}

#[cfg(unix)]
impl Drop for Listener {
    fn drop(&mut self) {
        if let Listener::Unix(_, path) = self {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(unix)]
async fn remove_stale_socket(path: &std::path::Path) -> Result<(), TransportError> {
    use std::os::unix::fs::FileTypeExt;

    match tokio::fs::symlink_metadata(path).await {
        Ok(meta) if meta.file_type().is_socket() => {
            debug!("Removing stale socket {}", path.display());
            tokio::fs::remove_file(path).await?;
            Ok(())
        }
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
