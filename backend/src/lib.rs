//! Session coordinator for networked chess
//!
//! Pairs two connections into a game room, relays validated moves between
//! them, enforces turn order, and tears rooms down on disconnection. The
//! coordinator never re-validates chess legality: each endpoint runs its
//! own rule engine, and the server's job is matchmaking, turn order and
//! connectivity.
//!
//! One tokio task per connection blocks reading frames (the only blocking
//! point); room and matchmaker state is shared behind a mutex, and all
//! outbound traffic goes through per-connection queues so no lock is ever
//! held across socket I/O.

pub mod matchmaker;
pub mod room;
pub mod session;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::matchmaker::Matchmaker;

/// Accept connections forever, spawning one session task per client.
pub async fn serve(listener: TcpListener, matchmaker: Arc<Matchmaker>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                info!("[SERVER] new connection from {peer}");
                let matchmaker = matchmaker.clone();
                tokio::spawn(async move {
                    session::run_connection(stream, matchmaker).await;
                });
            }
            Err(err) => {
                warn!("[SERVER] failed to accept connection: {err}");
            }
        }
    }
}
