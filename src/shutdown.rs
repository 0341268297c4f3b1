// Graceful shutdown handling for signal trapping

use anyhow::Result;
use tokio_util::sync::CancellationToken;

/// Shared shutdown state across the application
#[derive(Clone)]
pub struct ShutdownState {
    /// Cancelled once shutdown has been requested
    token: CancellationToken,
}

impl ShutdownState {
    /// Create a new shutdown state
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Wrap an existing token, e.g. the notification service's
    pub fn with_token(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Request a shutdown
    pub fn request_shutdown(&self) {
        if !self.token.is_cancelled() {
            log::info!("Shutdown requested");
        }
        self.token.cancel();
    }

    /// Check if shutdown has been requested
    pub fn is_shutdown_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolve once shutdown has been requested
    pub async fn wait(&self) {
        self.token.cancelled().await
    }

    /// Token observed by background tasks
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Default for ShutdownState {
    fn default() -> Self {
        Self::new()
    }
}

/// Register signal handlers for graceful shutdown
/// This sets up handlers for SIGINT (Ctrl+C), SIGTERM, and SIGHUP
#[cfg(unix)]
pub fn register_signal_handlers(state: ShutdownState) -> Result<()> {
    use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;
    use std::thread;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])
        .map_err(|e| anyhow::anyhow!("Failed to register signal handlers: {}", e))?;

    thread::spawn(move || {
        for signal in signals.forever() {
            match signal {
                SIGINT => log::info!("Received SIGINT (Ctrl+C)"),
                SIGTERM => log::info!("Received SIGTERM"),
                SIGHUP => log::info!("Received SIGHUP"),
                _ => continue,
            }
            state.request_shutdown();
        }
    });

    log::info!("Signal handlers registered (SIGINT, SIGTERM, SIGHUP)");
    Ok(())
}

/// Register signal handlers for Windows
#[cfg(windows)]
pub fn register_signal_handlers(state: ShutdownState) -> Result<()> {
    ctrlc::set_handler(move || {
        log::info!("Received Ctrl+C");
        state.request_shutdown();
    })
    .map_err(|e| anyhow::anyhow!("Failed to register Ctrl+C handler: {}", e))?;

    log::info!("Signal handler registered (Ctrl+C)");
    Ok(())
}
