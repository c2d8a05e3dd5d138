//! Matchmaking across game rooms
//!
//! Owns the set of active rooms and the connected-client list. A joining
//! player lands in the first room that still needs someone, or a freshly
//! created room; a full room starts its game immediately, otherwise the
//! player is told to wait. Rooms whose seats have both emptied are pruned
//! after disconnect handling.
//!
//! All state lives behind one mutex. Connection tasks call in
//! concurrently, and serializing here is what prevents two moves landing
//! for the same side or one player being seated twice.

use std::sync::{Arc, Mutex};

use tracing::info;
use uuid::Uuid;

use shared::protocol::Message;

use crate::room::{GameRoom, RoomPhase};
use crate::session::ClientHandle;

#[derive(Default)]
struct MatchmakerState {
    clients: Vec<Arc<ClientHandle>>,
    rooms: Vec<GameRoom>,
}

#[derive(Default)]
pub struct Matchmaker {
    state: Mutex<MatchmakerState>,
}

impl Matchmaker {
    pub fn new() -> Matchmaker {
        Matchmaker::default()
    }

    /// Track a freshly accepted connection.
    pub fn register(&self, client: Arc<ClientHandle>) {
        let mut state = self.state.lock().unwrap();
        state.clients.push(client);
    }

    pub fn client_count(&self) -> usize {
        self.state.lock().unwrap().clients.len()
    }

    pub fn room_count(&self) -> usize {
        self.state.lock().unwrap().rooms.len()
    }

    /// Seat a player in the first room with space, creating one if every
    /// room is full, and start the game when the room fills up.
    pub fn add_player_to_game(&self, client: &Arc<ClientHandle>) {
        let mut state = self.state.lock().unwrap();

        if state
            .rooms
            .iter()
            .any(|room| room.has_player(client.id()) && room.phase() != RoomPhase::Ended)
        {
            client.send(Message::error("Already in a game"));
            return;
        }

        let index = match state.rooms.iter().position(GameRoom::needs_player) {
            Some(index) => index,
            None => {
                state.rooms.push(GameRoom::new());
                state.rooms.len() - 1
            }
        };

        let room = &mut state.rooms[index];
        room.add_player(client.clone());

        if room.is_full() {
            room.start_game();
        } else {
            client.send(Message::waiting());
        }
    }

    /// Route a move to the sender's room; the room enforces turn order.
    pub fn handle_move(&self, client: &Arc<ClientHandle>, move_data: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(room) = state.rooms.iter_mut().find(|room| room.has_player(client.id())) {
            room.handle_move(client, move_data);
        }
    }

    /// A client reported its game finished (checkmate or draw).
    pub fn handle_game_end(&self, client: &Arc<ClientHandle>, winner: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(room) = state.rooms.iter_mut().find(|room| room.has_player(client.id())) {
            room.end_game(winner);
        }
    }

    /// Tear down after a disconnect: let the room notify the opponent,
    /// forget the client, and prune rooms that are now empty.
    pub fn handle_disconnect(&self, client: &Arc<ClientHandle>) {
        let id = client.id();
        info!("[MATCHMAKER] handling disconnect for client {id}");

        let mut state = self.state.lock().unwrap();
        if let Some(room) = state.rooms.iter_mut().find(|room| room.has_player(id)) {
            room.remove_player(id);
        }

        state.clients.retain(|c| c.id() != id);
        state.rooms.retain(|room| !room.is_empty());
        info!(
            "[MATCHMAKER] client removed: {id}, remaining clients: {}",
            state.clients.len()
        );
    }

    /// Graceful shutdown: tell every connected client and release their
    /// outbound queues.
    pub fn shutdown(&self) {
        let state = self.state.lock().unwrap();
        for client in &state.clients {
            client.send(Message::disconnect("Server shutting down"));
            client.close();
        }
        info!("[MATCHMAKER] server shut down, {} clients notified", state.clients.len());
    }
}
