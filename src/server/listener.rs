//! TCP accept loop with graceful shutdown.

use std::future::{poll_fn, Future};
use std::pin::Pin;
use std::sync::Arc;
use std::task::Poll;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

use crate::error::Result;
use crate::server::Handler;

/// Pause after a failed accept so a persistent error does not spin the loop.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

// == Admission Gate ==
/// Decides whether a spawned connection task may start its handler.
///
/// A handler future gets its first poll while the read lock is held, and
/// `shut` takes the write lock. So every handler has either started before
/// the gate shut or is dropped without ever running.
#[derive(Debug, Default)]
struct AdmissionGate {
    shut: RwLock<bool>,
}

impl AdmissionGate {
    // == Shut ==
    /// Refuses every handler that has not started yet.
    fn shut(&self) {
        *self.shut.write() = true;
    }

    // == Run ==
    /// Drives `fut` to completion if the gate is still open at its first poll.
    ///
    /// Returns false when the future was dropped unpolled.
    async fn run<F>(&self, mut fut: F) -> bool
    where
        F: Future<Output = ()> + Unpin,
    {
        let first = poll_fn(|cx| {
            let shut = self.shut.read();
            if *shut {
                return Poll::Ready(None);
            }
            Poll::Ready(Some(Pin::new(&mut fut).poll(cx).is_ready()))
        })
        .await;

        match first {
            None => false,
            Some(true) => true,
            Some(false) => {
                fut.await;
                true
            }
        }
    }
}

/// Accepts connections and hands each to `handler` on its own task.
///
/// When `shutdown` is cancelled the loop stops accepting, drops the listener,
/// calls [`Handler::close`], and then waits for every in-flight
/// [`Handler::handle`] call to return. No `handle` call starts after `close`
/// has been called: connections accepted but not yet started are dropped.
///
/// Each `handle` call receives `shutdown` as its context.
pub async fn listen_and_serve<H: Handler>(
    listener: TcpListener,
    handler: Arc<H>,
    shutdown: CancellationToken,
) -> Result<()> {
    let local_addr = listener.local_addr()?;
    info!("Server listening on {}", local_addr);

    let tracker = TaskTracker::new();
    let gate = Arc::new(AdmissionGate::default());

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((conn, peer)) => {
                    debug!(%peer, "Accepted connection");
                    let handler = Arc::clone(&handler);
                    let gate = Arc::clone(&gate);
                    let ctx = shutdown.clone();
                    tracker.spawn(async move {
                        if !gate.run(handler.handle(ctx, conn)).await {
                            debug!(%peer, "Shutdown in progress, dropping connection");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
    }

    drop(listener);
    gate.shut();
    info!(in_flight = tracker.len(), "Shutdown requested, closing handler");

    let closed = handler.close().await;
    tracker.close();
    tracker.wait().await;

    info!("All connections drained");
    closed
}
