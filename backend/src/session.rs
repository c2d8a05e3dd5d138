//! Per-connection session handling
//!
//! Each accepted socket gets a [`ClientHandle`] plus two tasks: a reader
//! that blocks on frames and routes them, and a writer that drains the
//! outbound queue. Sends from room code are therefore just queue pushes;
//! socket errors surface in exactly one place per direction.
//!
//! A read error or EOF is an implicit disconnect and drives the same
//! teardown as an explicit DISCONNECT message. Unparseable frames get an
//! ERROR reply and the connection stays up.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use shared::protocol::{Message, MessageType, ProtocolError};
use shared::{read_frame, write_frame};

use crate::matchmaker::Matchmaker;

/// Server-side handle for one connected client.
///
/// Cheap to clone behind an `Arc`; rooms hold these in their seats. The
/// display name arrives later than the connection (with JOIN_GAME), so it
/// lives behind a lock.
pub struct ClientHandle {
    id: Uuid,
    name: Mutex<Option<String>>,
    outbound: Mutex<Option<mpsc::UnboundedSender<Message>>>,
    connected: AtomicBool,
}

impl ClientHandle {
    pub fn new(outbound: mpsc::UnboundedSender<Message>) -> ClientHandle {
        ClientHandle {
            id: Uuid::new_v4(),
            name: Mutex::new(None),
            outbound: Mutex::new(Some(outbound)),
            connected: AtomicBool::new(true),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Display name, with a fallback for clients that never joined.
    pub fn player_name(&self) -> String {
        self.name
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| "Unknown".to_string())
    }

    pub fn set_player_name(&self, name: &str) {
        *self.name.lock().unwrap() = Some(name.to_string());
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Queue a message for delivery. Returns `false` when the connection
    /// is already gone; callers treat that as a disconnect signal.
    pub fn send(&self, message: Message) -> bool {
        if !self.is_connected() {
            return false;
        }
        match self.outbound.lock().unwrap().as_ref() {
            Some(sender) => sender.send(message).is_ok(),
            None => false,
        }
    }

    /// Mark disconnected and release the outbound queue; the writer task
    /// drains what was already queued and exits.
    pub fn close(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.outbound.lock().unwrap().take();
    }
}

enum Flow {
    Continue,
    Stop,
}

/// Drive one client connection to completion.
pub async fn run_connection(stream: TcpStream, matchmaker: Arc<Matchmaker>) {
    let (mut read_half, write_half) = stream.into_split();
    let (sender, receiver) = mpsc::unbounded_channel();
    let client = Arc::new(ClientHandle::new(sender));

    matchmaker.register(client.clone());
    let writer = tokio::spawn(write_loop(write_half, receiver));

    read_loop(&mut read_half, &client, &matchmaker).await;

    matchmaker.handle_disconnect(&client);
    client.close();
    let _ = writer.await;
    info!("[SESSION] client {} session ended", client.id());
}

async fn read_loop(read_half: &mut OwnedReadHalf, client: &Arc<ClientHandle>, matchmaker: &Matchmaker) {
    loop {
        match read_frame(read_half).await {
            Ok(Some(message)) => {
                if let Flow::Stop = dispatch(&message, client, matchmaker) {
                    break;
                }
            }
            Ok(None) => {
                info!("[SESSION] client {} ({}) connection closed", client.id(), client.player_name());
                break;
            }
            Err(ProtocolError::Io(err)) => {
                warn!("[SESSION] client {} connection lost: {err}", client.id());
                break;
            }
            Err(err) => {
                // Malformed frame: report it and keep the connection
                warn!("[SESSION] client {} sent a bad message: {err}", client.id());
                client.send(Message::error(&format!("Unrecognized message: {err}")));
            }
        }
    }
}

async fn write_loop(mut write_half: OwnedWriteHalf, mut receiver: mpsc::UnboundedReceiver<Message>) {
    while let Some(message) = receiver.recv().await {
        if let Err(err) = write_frame(&mut write_half, &message).await {
            warn!("[SESSION] send failed: {err}");
            break;
        }
    }
}

fn dispatch(message: &Message, client: &Arc<ClientHandle>, matchmaker: &Matchmaker) -> Flow {
    match message.kind {
        MessageType::JoinGame => {
            client.set_player_name(&message.payload);
            info!("[SESSION] player {} wants to join a game", client.player_name());
            matchmaker.add_player_to_game(client);
            Flow::Continue
        }
        MessageType::Move => {
            matchmaker.handle_move(client, &message.payload);
            Flow::Continue
        }
        MessageType::GameOver => {
            matchmaker.handle_game_end(client, &message.payload);
            Flow::Continue
        }
        MessageType::Disconnect => {
            info!("[SESSION] player {} requested disconnect", client.player_name());
            Flow::Stop
        }
        _ => {
            warn!(
                "[SESSION] unexpected {} message from client {}",
                message.kind,
                client.id()
            );
            client.send(Message::error(&format!("Unexpected message: {}", message.kind)));
            Flow::Continue
        }
    }
}
