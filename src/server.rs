//! Process-level lifecycle: LED warm-up, the accept loop and LED shutdown.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use wyoming_transport::{Listener, TransportError, Uri};

use crate::dispatch::{self, run_steps};
use crate::session::Session;
use crate::xvf::{SubprocessErrors, Xvf};

/// Pause after a failed accept (e.g. out of file descriptors).
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Runtime settings
#[derive(Debug, Clone)]
pub struct Config {
    /// Where to listen for satellite events
    pub uri: Uri,
    /// Path to the `xvf_host` executable
    pub xvf_path: PathBuf,
    pub subprocess_errors: SubprocessErrors,
}

/// Warm up the LEDs, then serve clients on `config.uri` until `shutdown`
/// resolves. The LEDs are switched off before returning, also when binding
/// fails.
pub async fn run<F>(config: &Config, shutdown: F) -> Result<(), TransportError>
where
    F: Future<Output = ()>,
{
    let make_xvf = || Xvf::new(config.xvf_path.clone(), config.subprocess_errors);

    run_steps(&make_xvf(), &dispatch::startup_steps()).await;

    let listener = match Listener::bind(&config.uri).await {
        Ok(listener) => listener,
        Err(e) => {
            run_steps(&make_xvf(), &dispatch::shutdown_steps()).await;
            return Err(e);
        }
    };
    info!("Listening on {}", config.uri);

    serve(listener, make_xvf, shutdown).await;
    Ok(())
}

/// Accept clients until `shutdown` resolves, one [`Session`] task per client.
///
/// Every session gets its own LED handle from `make_xvf`, and the final LED
/// off command goes through one more. On shutdown every session task is
/// aborted first, so that off command is the last one issued.
pub async fn serve<F, M>(listener: Listener, make_xvf: M, shutdown: F)
where
    F: Future<Output = ()>,
    M: Fn() -> Xvf,
{
    tokio::pin!(shutdown);
    let mut sessions = JoinSet::new();

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => match accepted {
                Ok((conn, peer)) => {
                    let session = Session::new(make_xvf());
                    debug!("Client {} from {}", session.client_id(), peer);
                    sessions.spawn(session.serve(conn));
                }
                Err(e) => {
                    warn!("Accept failed: {}", e);
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            },
            Some(_) = sessions.join_next(), if !sessions.is_empty() => {}
        }
    }

    sessions.shutdown().await;
    run_steps(&make_xvf(), &dispatch::shutdown_steps()).await;
}
