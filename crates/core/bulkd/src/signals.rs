use std::io;
use tracing::info;

/// Termination signal listener.
///
/// Registered up front so a registration failure surfaces at startup, not
/// on the first signal.
#[cfg(not(windows))]
pub struct ShutdownSignals {
    sigterm: tokio::signal::unix::Signal,
    sigint: tokio::signal::unix::Signal,
}

#[cfg(not(windows))]
impl ShutdownSignals {
    pub fn register() -> io::Result<ShutdownSignals> {
        use tokio::signal::unix::signal;
        use tokio::signal::unix::SignalKind;

        Ok(ShutdownSignals {
            sigterm: signal(SignalKind::terminate())?,
            sigint: signal(SignalKind::interrupt())?,
        })
    }

    /// Resolve once the process receives SIGTERM or SIGINT.
    pub async fn recv(mut self) {
        tokio::select! {
            _ = self.sigterm.recv() => info!("SIGTERM received, closing HTTP server"),
            _ = self.sigint.recv() => info!("SIGINT received, closing HTTP server"),
        }
    }
}

#[cfg(windows)]
pub struct ShutdownSignals;

#[cfg(windows)]
impl ShutdownSignals {
    pub fn register() -> io::Result<ShutdownSignals> {
        Ok(ShutdownSignals)
    }

    pub async fn recv(self) {
        let _ = tokio::signal::ctrl_c().await;
        info!("Interrupt received, closing HTTP server");
    }
}
