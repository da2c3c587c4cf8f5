use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::{signal, sync::watch};
use tracing::{error, info, warn};

/// Broadcasts a single shutdown request to the HTTP server and any
/// background listeners.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    requested: Arc<AtomicBool>,
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            requested: Arc::new(AtomicBool::new(false)),
            tx: Arc::new(tx),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.requested.load(Ordering::Relaxed)
    }

    /// Idempotent; only the first call notifies subscribers
    pub fn initiate_shutdown(&self) {
        if self
            .requested
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
            .is_ok()
        {
            info!("Initiating graceful shutdown");
            // send_replace never fails, even with no live receivers
            self.tx.send_replace(true);
        }
    }

    /// Resolves once shutdown has been requested
    pub async fn wait(&self) {
        let mut rx = self.subscribe();
        if rx.wait_for(|requested| *requested).await.is_err() {
            warn!("Shutdown channel closed");
        }
    }

    /// Wait for Ctrl+C or SIGTERM, then initiate shutdown. A handler that
    /// fails to install is logged and treated as never firing.
    pub async fn wait_for_shutdown_signal(&self) {
        let ctrl_c = async {
            match signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl+C signal"),
                Err(e) => {
                    error!("Failed to install Ctrl+C handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("Received terminate signal");
                }
                Err(e) => {
                    error!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
            _ = self.wait() => {},
        }

        self.initiate_shutdown();
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
