//! Process signals that stop the town server.
//!
//! `main` parks on [`wait_for_shutdown`] once every town loop and the accept
//! loop are running. The returned [`StopSignal`] is logged, then the server's
//! shutdown broadcast stops accepting sockets and ends each town's loop.
//! Clients still connected see their socket close.

use std::fmt;
use tokio::signal;

/// The signal that ended the serving phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for StopSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopSignal::Interrupt => f.write_str("interrupt"),
            StopSignal::Terminate => f.write_str("terminate"),
        }
    }
}

/// Resolves on the first SIGINT or SIGTERM. Windows only has Ctrl+C, which
/// counts as an interrupt.
#[cfg(unix)]
pub async fn wait_for_shutdown() -> std::io::Result<StopSignal> {
    use signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = interrupt.recv() => Ok(StopSignal::Interrupt),
        _ = terminate.recv() => Ok(StopSignal::Terminate),
    }
}

#[cfg(not(unix))]
pub async fn wait_for_shutdown() -> std::io::Result<StopSignal> {
    signal::ctrl_c().await?;
    Ok(StopSignal::Interrupt)
}
