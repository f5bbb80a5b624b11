//! Line echo handler
//!
//! Writes every newline-terminated line it receives back to the sender and
//! keeps track of live connections so that shutdown can cut them off.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::server::Handler;

// == Echo Handler ==
/// Handler that echoes lines until the peer disconnects or shutdown begins.
#[derive(Debug, Default)]
pub struct EchoHandler {
    /// Cancellation token of every connection currently being served
    active: Mutex<HashMap<u64, CancellationToken>>,
    next_id: AtomicU64,
    /// Set once `close` runs; later connections are dropped on arrival
    closing: AtomicBool,
}

impl EchoHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of connections currently being served.
    pub fn active_connections(&self) -> usize {
        self.active.lock().len()
    }

    pub fn is_closed(&self) -> bool {
        self.closing.load(Ordering::Acquire)
    }

    /// Registers a connection, or returns None if the handler is closed.
    ///
    /// The closed flag is checked under the same lock `close` drains, so a
    /// connection can never slip in after the drain.
    fn track(&self, token: CancellationToken) -> Option<u64> {
        let mut active = self.active.lock();
        if self.closing.load(Ordering::Acquire) {
            return None;
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        active.insert(id, token);
        Some(id)
    }

    fn untrack(&self, id: u64) {
        self.active.lock().remove(&id);
    }
}

#[async_trait]
impl Handler for EchoHandler {
    async fn handle(&self, ctx: CancellationToken, conn: TcpStream) {
        let peer = conn.peer_addr().ok();
        let token = ctx.child_token();

        let Some(id) = self.track(token.clone()) else {
            debug!(?peer, "handler closed, dropping connection");
            return;
        };

        let result = echo_lines(conn, &token).await;
        self.untrack(id);

        match result {
            Ok(()) => debug!(?peer, "connection closed"),
            Err(e) => warn!(?peer, error = %e, "connection failed"),
        }
    }

    async fn close(&self) -> Result<()> {
        let tokens: Vec<CancellationToken> = {
            let mut active = self.active.lock();
            self.closing.store(true, Ordering::Release);
            active.drain().map(|(_, token)| token).collect()
        };

        info!(connections = tokens.len(), "Closing active connections");
        for token in tokens {
            token.cancel();
        }
        Ok(())
    }
}

/// Echo loop for one connection. Returns Ok on EOF or cancellation.
///
/// A trailing fragment without a newline is dropped when the peer hangs up.
async fn echo_lines(conn: TcpStream, token: &CancellationToken) -> io::Result<()> {
    let (reader, mut writer) = conn.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();

    loop {
        line.clear();

        let read = tokio::select! {
            _ = token.cancelled() => return Ok(()),
            read = reader.read_until(b'\n', &mut line) => read?,
        };

        if read == 0 || line.last() != Some(&b'\n') {
            return Ok(());
        }

        writer.write_all(&line).await?;
    }
}
