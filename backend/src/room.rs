//! Game rooms
//!
//! A room is two seats, a turn indicator and a lifecycle phase. Seat 1 is
//! always White, seat 2 always Black. The room relays MOVE payloads
//! verbatim between the seats and enforces turn order; chess legality is
//! each endpoint's own engine's responsibility.
//!
//! Phase runs `WaitingForPlayers -> Active -> Ended` and `Ended` is
//! terminal: an ended room accepts no players and relays nothing.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use shared::protocol::{Message, MessageType};

use crate::session::ClientHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomPhase {
    WaitingForPlayers,
    Active,
    Ended,
}

/// Which seat a player occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatColor {
    White,
    Black,
}

impl SeatColor {
    pub fn letter(self) -> &'static str {
        match self {
            SeatColor::White => "W",
            SeatColor::Black => "B",
        }
    }

    pub fn opposite(self) -> SeatColor {
        match self {
            SeatColor::White => SeatColor::Black,
            SeatColor::Black => SeatColor::White,
        }
    }
}

pub struct GameRoom {
    white: Option<Arc<ClientHandle>>,
    black: Option<Arc<ClientHandle>>,
    current_turn: SeatColor,
    phase: RoomPhase,
}

impl GameRoom {
    pub fn new() -> GameRoom {
        GameRoom {
            white: None,
            black: None,
            current_turn: SeatColor::White,
            phase: RoomPhase::WaitingForPlayers,
        }
    }

    pub fn phase(&self) -> RoomPhase {
        self.phase
    }

    /// Whether this room can take another player.
    pub fn needs_player(&self) -> bool {
        self.phase != RoomPhase::Ended && (self.white.is_none() || self.black.is_none())
    }

    pub fn is_full(&self) -> bool {
        self.white.is_some() && self.black.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.white.is_none() && self.black.is_none()
    }

    pub fn has_player(&self, id: Uuid) -> bool {
        self.seat_of(id).is_some()
    }

    fn seat_of(&self, id: Uuid) -> Option<SeatColor> {
        if self.white.as_ref().is_some_and(|c| c.id() == id) {
            Some(SeatColor::White)
        } else if self.black.as_ref().is_some_and(|c| c.id() == id) {
            Some(SeatColor::Black)
        } else {
            None
        }
    }

    fn seat(&self, color: SeatColor) -> Option<&Arc<ClientHandle>> {
        match color {
            SeatColor::White => self.white.as_ref(),
            SeatColor::Black => self.black.as_ref(),
        }
    }

    /// Fill the first free seat. The first player in gets White.
    pub fn add_player(&mut self, client: Arc<ClientHandle>) {
        if self.phase == RoomPhase::Ended {
            return;
        }

        if self.white.is_none() {
            info!("[ROOM] player 1 (White) seated: {}", client.player_name());
            self.white = Some(client);
        } else if self.black.is_none() {
            info!("[ROOM] player 2 (Black) seated: {}", client.player_name());
            self.black = Some(client);
        }
    }

    /// Start the game once both seats are filled: tell each player their
    /// color and the opponent's name, and give White the move.
    pub fn start_game(&mut self) {
        if !self.is_full() || self.phase == RoomPhase::Ended {
            return;
        }
        let (Some(white), Some(black)) = (self.white.clone(), self.black.clone()) else {
            return;
        };

        self.phase = RoomPhase::Active;
        self.current_turn = SeatColor::White;
        info!(
            "[ROOM] starting game between {} (White) and {} (Black)",
            white.player_name(),
            black.player_name()
        );

        if white.is_connected() {
            white.send(Message::game_start("W", &black.player_name()));
        }
        if black.is_connected() {
            black.send(Message::game_start("B", &white.player_name()));
        }
    }

    /// Relay a move to the opponent if the sender holds the turn.
    ///
    /// The payload is forwarded verbatim; the room checks room state and
    /// turn order, nothing else.
    pub fn handle_move(&mut self, from: &Arc<ClientHandle>, move_data: &str) {
        if self.phase != RoomPhase::Active {
            from.send(Message::error("Game is not active"));
            return;
        }

        let Some(mover_color) = self.seat_of(from.id()) else {
            return;
        };
        if mover_color != self.current_turn {
            from.send(Message::error("Not your turn!"));
            return;
        }

        let Some(opponent) = self.seat(mover_color.opposite()).cloned() else {
            return;
        };

        if opponent.is_connected() && opponent.send(Message::new(MessageType::Move, move_data)) {
            self.current_turn = self.current_turn.opposite();
            info!(
                "[ROOM] move from {} to {}: {}",
                from.player_name(),
                opponent.player_name(),
                move_data
            );
        } else {
            warn!("[ROOM] failed to forward move to {}", opponent.player_name());
            self.remove_player(opponent.id());
        }
    }

    /// Handle a seat leaving: the survivor, if any, is told about the
    /// disconnect and wins by default. The room ends and both seats are
    /// cleared.
    pub fn remove_player(&mut self, id: Uuid) {
        if self.phase == RoomPhase::Ended {
            return;
        }
        let Some(departed_color) = self.seat_of(id) else {
            return;
        };

        let departed_name = self
            .seat(departed_color)
            .map(|c| c.player_name())
            .unwrap_or_else(|| "Unknown".to_string());
        let survivor = self.seat(departed_color.opposite()).cloned();
        let winner = departed_color.opposite();

        if self.phase == RoomPhase::Active {
            if let Some(survivor) = survivor.filter(|s| s.is_connected()) {
                survivor.send(Message::disconnect(&format!(
                    "{departed_name} has disconnected"
                )));
                survivor.send(Message::game_over(winner.letter()));
                info!(
                    "[ROOM] notified {} that {} disconnected",
                    survivor.player_name(),
                    departed_name
                );
            }
        }

        self.phase = RoomPhase::Ended;
        self.white = None;
        self.black = None;
        info!("[ROOM] player removed from game room: {departed_name}");
    }

    /// Explicit termination, e.g. a checkmate reported by a client.
    /// `winner` is a color letter or "draw".
    pub fn end_game(&mut self, winner: &str) {
        if self.phase != RoomPhase::Active {
            return;
        }
        self.phase = RoomPhase::Ended;

        for seat in [&self.white, &self.black] {
            if let Some(client) = seat {
                if client.is_connected() {
                    client.send(Message::game_over(winner));
                }
            }
        }

        info!("[ROOM] game ended, winner: {winner}");
        self.white = None;
        self.black = None;
    }
}

impl Default for GameRoom {
    fn default() -> GameRoom {
        GameRoom::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn client(name: &str) -> (Arc<ClientHandle>, UnboundedReceiver<Message>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = Arc::new(ClientHandle::new(sender));
        handle.set_player_name(name);
        (handle, receiver)
    }

    fn drain(receiver: &mut UnboundedReceiver<Message>) -> Vec<Message> {
        let mut messages = Vec::new();
        while let Ok(message) = receiver.try_recv() {
            messages.push(message);
        }
        messages
    }

    fn full_room() -> (
        GameRoom,
        Arc<ClientHandle>,
        UnboundedReceiver<Message>,
        Arc<ClientHandle>,
        UnboundedReceiver<Message>,
    ) {
        let (alice, mut alice_rx) = client("alice");
        let (bob, mut bob_rx) = client("bob");
        let mut room = GameRoom::new();
        room.add_player(alice.clone());
        room.add_player(bob.clone());
        room.start_game();
        drain(&mut alice_rx);
        drain(&mut bob_rx);
        (room, alice, alice_rx, bob, bob_rx)
    }

    #[test]
    fn test_first_player_gets_white_and_waits() {
        let (alice, _alice_rx) = client("alice");
        let mut room = GameRoom::new();

        room.add_player(alice.clone());
        assert!(room.needs_player());
        assert!(!room.is_full());
        assert!(room.has_player(alice.id()));
        assert_eq!(room.phase(), RoomPhase::WaitingForPlayers);
    }

    #[test]
    fn test_start_game_names_colors_and_opponents() {
        let (alice, mut alice_rx) = client("alice");
        let (bob, mut bob_rx) = client("bob");
        let mut room = GameRoom::new();
        room.add_player(alice.clone());
        room.add_player(bob.clone());

        room.start_game();
        assert_eq!(room.phase(), RoomPhase::Active);

        let to_alice = drain(&mut alice_rx);
        assert_eq!(to_alice.len(), 1);
        assert_eq!(to_alice[0].kind, MessageType::GameStart);
        assert_eq!(to_alice[0].payload, "W,bob", "seat 1 plays White");

        let to_bob = drain(&mut bob_rx);
        assert_eq!(to_bob[0].payload, "B,alice", "seat 2 plays Black");
    }

    #[test]
    fn test_move_relayed_verbatim_and_turn_flips() {
        let (mut room, alice, mut alice_rx, bob, mut bob_rx) = full_room();

        room.handle_move(&alice, "e2,e4");
        let to_bob = drain(&mut bob_rx);
        assert_eq!(to_bob.len(), 1);
        assert_eq!(to_bob[0].kind, MessageType::Move);
        assert_eq!(to_bob[0].payload, "e2,e4", "payload is not interpreted");

        room.handle_move(&bob, "e7,e5");
        let to_alice = drain(&mut alice_rx);
        assert_eq!(to_alice[0].payload, "e7,e5", "turn passed to black and back");
    }

    #[test]
    fn test_out_of_turn_move_gets_error_and_no_relay() {
        //! Black moving first is refused with ERROR; the turn stays with
        //! White and nothing reaches the opponent
        let (mut room, alice, mut alice_rx, bob, mut bob_rx) = full_room();

        room.handle_move(&bob, "e7,e5");

        let to_bob = drain(&mut bob_rx);
        assert_eq!(to_bob.len(), 1);
        assert_eq!(to_bob[0].kind, MessageType::Error);
        assert_eq!(to_bob[0].payload, "Not your turn!");
        assert!(drain(&mut alice_rx).is_empty(), "no relay happened");

        // White still holds the move
        room.handle_move(&alice, "e2,e4");
        assert_eq!(drain(&mut bob_rx)[0].kind, MessageType::Move);
    }

    #[test]
    fn test_move_before_start_is_rejected() {
        let (alice, mut alice_rx) = client("alice");
        let mut room = GameRoom::new();
        room.add_player(alice.clone());

        room.handle_move(&alice, "e2,e4");
        let to_alice = drain(&mut alice_rx);
        assert_eq!(to_alice.len(), 1);
        assert_eq!(to_alice[0].kind, MessageType::Error);
    }

    #[test]
    fn test_disconnect_awards_win_to_survivor() {
        //! Survivor is told about the disconnect, then wins by default
        let (mut room, alice, _alice_rx, _bob, mut bob_rx) = full_room();

        room.remove_player(alice.id());

        let to_bob = drain(&mut bob_rx);
        assert_eq!(to_bob.len(), 2);
        assert_eq!(to_bob[0].kind, MessageType::Disconnect);
        assert!(to_bob[0].payload.contains("alice"));
        assert_eq!(to_bob[1].kind, MessageType::GameOver);
        assert_eq!(to_bob[1].payload, "B", "Black wins when White leaves");

        assert_eq!(room.phase(), RoomPhase::Ended);
        assert!(room.is_empty(), "both seats cleared");
    }

    #[test]
    fn test_disconnect_while_waiting_is_silent() {
        let (alice, _alice_rx) = client("alice");
        let mut room = GameRoom::new();
        room.add_player(alice.clone());

        room.remove_player(alice.id());
        assert_eq!(room.phase(), RoomPhase::Ended);
        assert!(room.is_empty());
    }

    #[test]
    fn test_ended_room_accepts_no_players_or_moves() {
        let (mut room, alice, mut alice_rx, bob, _bob_rx) = full_room();
        room.end_game("draw");

        let (carol, _carol_rx) = client("carol");
        room.add_player(carol.clone());
        assert!(!room.has_player(carol.id()), "ended room seats nobody");
        assert!(!room.needs_player());

        drain(&mut alice_rx);
        room.handle_move(&alice, "e2,e4");
        let to_alice = drain(&mut alice_rx);
        assert_eq!(to_alice.len(), 1);
        assert_eq!(to_alice[0].kind, MessageType::Error);
        let _ = bob;
    }

    #[test]
    fn test_end_game_notifies_both_players() {
        let (mut room, _alice, mut alice_rx, _bob, mut bob_rx) = full_room();

        room.end_game("W");

        let to_alice = drain(&mut alice_rx);
        let to_bob = drain(&mut bob_rx);
        assert_eq!(to_alice[0].kind, MessageType::GameOver);
        assert_eq!(to_alice[0].payload, "W");
        assert_eq!(to_bob[0].payload, "W");
        assert_eq!(room.phase(), RoomPhase::Ended);
        assert!(room.is_empty());
    }
}
