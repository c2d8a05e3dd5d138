//! The network game session
//!
//! One session per connection to the coordinator. The session owns a
//! local rule engine and keeps it in lockstep with the relayed game:
//!
//! - locally entered moves are accepted by the local engine first, then
//!   sent to the server as `MOVE#from,to`;
//! - relayed opponent moves are validated and applied by the same engine
//!   (the coordinator does not re-validate chess rules, so a move the
//!   local engine rejects is reported rather than applied);
//! - when the local engine detects checkmate or stalemate, the session
//!   reports `GAME_OVER` to the coordinator.
//!
//! Session state sits behind a `std` mutex; socket writes go through a
//! tokio mutex so a frame is never interleaved.

use std::sync::{Arc, Mutex};

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{info, warn};

use chess_engine::{Color, Game, GameObserver, GameStatus, Severity, Square};
use shared::protocol::{Message, MessageType, ProtocolError};
use shared::{read_frame, write_frame};

use crate::error::SessionError;

struct SessionState {
    game: Game,
    my_color: Option<Color>,
    opponent_name: Option<String>,
    finished: bool,
}

pub struct NetworkSession {
    name: String,
    observer: Arc<dyn GameObserver>,
    state: Mutex<SessionState>,
    reader: Mutex<Option<OwnedReadHalf>>,
    writer: tokio::sync::Mutex<OwnedWriteHalf>,
}

impl NetworkSession {
    /// Connect to the coordinator and request a seat under `name`.
    ///
    /// The observer is wired into the local engine, so board, turn and
    /// message callbacks fire as the game progresses. Observers must not
    /// call back into the session from those callbacks.
    pub async fn connect(
        addr: &str,
        name: &str,
        observer: Arc<dyn GameObserver>,
    ) -> Result<Arc<NetworkSession>, SessionError> {
        let stream = TcpStream::connect(addr).await?;
        info!("[CLIENT] connected to {addr} as {name}");
        let (read_half, write_half) = stream.into_split();

        let mut game = Game::new();
        game.set_observer(observer.clone());

        let session = Arc::new(NetworkSession {
            name: name.to_string(),
            observer,
            state: Mutex::new(SessionState {
                game,
                my_color: None,
                opponent_name: None,
                finished: false,
            }),
            reader: Mutex::new(Some(read_half)),
            writer: tokio::sync::Mutex::new(write_half),
        });

        session.send(Message::join_game(name)).await?;
        Ok(session)
    }

    /// Which color this endpoint plays, once a game has started.
    pub fn my_color(&self) -> Option<Color> {
        self.state.lock().unwrap().my_color
    }

    pub fn opponent_name(&self) -> Option<String> {
        self.state.lock().unwrap().opponent_name.clone()
    }

    pub fn status(&self) -> GameStatus {
        self.state.lock().unwrap().game.status()
    }

    pub fn current_turn(&self) -> Color {
        self.state.lock().unwrap().game.current_turn()
    }

    /// Number of plies applied to the local engine so far.
    pub fn ply_count(&self) -> usize {
        self.state.lock().unwrap().game.history().len()
    }

    /// Whether the session's game reached any terminal condition,
    /// including win-by-default and server loss.
    pub fn is_finished(&self) -> bool {
        self.state.lock().unwrap().finished
    }

    /// Legal destinations for the piece on `from` in the local game.
    pub fn valid_moves(&self, from: Square) -> Vec<Square> {
        self.state.lock().unwrap().game.valid_moves(from)
    }

    /// Read server frames until the connection ends. Call exactly once;
    /// later calls return immediately.
    pub async fn run(&self) -> Result<(), SessionError> {
        let Some(mut read_half) = self.reader.lock().unwrap().take() else {
            return Ok(());
        };

        loop {
            match read_frame(&mut read_half).await {
                Ok(Some(message)) => {
                    for outgoing in self.handle_message(&message) {
                        self.send(outgoing).await?;
                    }
                }
                Ok(None) => {
                    self.handle_server_loss();
                    return Ok(());
                }
                Err(ProtocolError::Io(err)) => {
                    self.handle_server_loss();
                    return Err(err.into());
                }
                Err(err) => {
                    warn!("[CLIENT] dropping bad server message: {err}");
                }
            }
        }
    }

    /// Play a local move and, when the engine accepts it, send it out.
    ///
    /// Returns `Ok(false)` for anything the local rules or turn state
    /// refuse; the observer has already been told why.
    pub async fn submit_move(&self, from: Square, to: Square) -> Result<bool, SessionError> {
        let outgoing = {
            let mut state = self.state.lock().unwrap();
            if state.finished {
                self.observer
                    .message("The game is over.", "Game Over", Severity::Warning);
                return Ok(false);
            }
            let Some(my_color) = state.my_color else {
                self.observer
                    .message("Waiting for a game to start.", "Wait", Severity::Warning);
                return Ok(false);
            };
            if state.game.current_turn() != my_color {
                self.observer
                    .message("It's not your turn!", "Wait", Severity::Warning);
                return Ok(false);
            }
            if !state.game.attempt_move(from, to) {
                return Ok(false);
            }

            let mut outgoing = vec![Message::chess_move(&from.to_string(), &to.to_string())];
            outgoing.extend(report_if_finished(&mut state));
            outgoing
        };

        for message in outgoing {
            self.send(message).await?;
        }
        Ok(true)
    }

    /// Tell the coordinator we are leaving.
    pub async fn disconnect(&self) {
        let _ = self.send(Message::disconnect(&self.name)).await;
        info!("[CLIENT] disconnect sent");
    }

    fn handle_message(&self, message: &Message) -> Vec<Message> {
        match message.kind {
            MessageType::GameStart => {
                let Ok((letter, opponent)) = message.parse_game_start() else {
                    warn!("[CLIENT] bad GAME_START payload {:?}", message.payload);
                    return Vec::new();
                };
                let Some(color) = Color::from_letter(letter) else {
                    warn!("[CLIENT] bad GAME_START color {letter:?}");
                    return Vec::new();
                };

                let opponent = opponent.to_string();
                {
                    let mut state = self.state.lock().unwrap();
                    let mut game = Game::new();
                    game.set_observer(self.observer.clone());
                    state.game = game;
                    state.my_color = Some(color);
                    state.opponent_name = Some(opponent.clone());
                    state.finished = false;
                }

                info!("[CLIENT] game started: playing {color} against {opponent}");
                self.observer.message(
                    &format!("Game started against {opponent}. You play {color}."),
                    "Game Start",
                    Severity::Info,
                );
                self.observer.board_changed();
                self.observer.turn_changed(Color::White);
                Vec::new()
            }

            MessageType::Move => {
                let parsed = message.parse_move().and_then(|(from, to)| {
                    let from: Square = from.parse().map_err(|_| ProtocolError::BadPayload {
                        kind: "MOVE",
                        payload: message.payload.clone(),
                    })?;
                    let to: Square = to.parse().map_err(|_| ProtocolError::BadPayload {
                        kind: "MOVE",
                        payload: message.payload.clone(),
                    })?;
                    Ok((from, to))
                });
                let Ok((from, to)) = parsed else {
                    warn!("[CLIENT] bad MOVE payload {:?}", message.payload);
                    return Vec::new();
                };

                let mut state = self.state.lock().unwrap();
                if !state.game.attempt_move(from, to) {
                    warn!("[CLIENT] failed to apply opponent's move: {from} to {to}");
                    self.observer.message(
                        &format!("Opponent move {from} to {to} was rejected by the local rules."),
                        "Protocol Error",
                        Severity::Error,
                    );
                    return Vec::new();
                }
                report_if_finished(&mut state)
            }

            MessageType::GameOver => {
                let text = {
                    let mut state = self.state.lock().unwrap();
                    state.finished = true;
                    if message.payload == "draw" {
                        "Game ended in a draw!".to_string()
                    } else if state.my_color.map(Color::as_letter) == Some(message.payload.as_str())
                    {
                        "You won!".to_string()
                    } else {
                        "You lost!".to_string()
                    }
                };
                self.observer.message(&text, "Game Over", Severity::Info);
                Vec::new()
            }

            MessageType::Waiting => {
                self.observer.message(
                    "Waiting for another player to join...",
                    "Waiting",
                    Severity::Info,
                );
                Vec::new()
            }

            MessageType::Disconnect | MessageType::OpponentDisconnected => {
                let first = {
                    let mut state = self.state.lock().unwrap();
                    let first = !state.finished;
                    state.finished = true;
                    first
                };
                if first {
                    self.observer.message(
                        "Your opponent has disconnected. You win by default!",
                        "Opponent Disconnected",
                        Severity::Info,
                    );
                }
                Vec::new()
            }

            MessageType::Error => {
                self.observer
                    .message(&message.payload, "Error", Severity::Error);
                Vec::new()
            }

            _ => {
                warn!("[CLIENT] unexpected message tag {}", message.kind);
                Vec::new()
            }
        }
    }

    fn handle_server_loss(&self) {
        let was_finished = {
            let mut state = self.state.lock().unwrap();
            let was = state.finished;
            state.finished = true;
            was
        };
        if !was_finished {
            self.observer.message(
                "Connection to server lost!",
                "Server Disconnected",
                Severity::Error,
            );
        }
    }

    async fn send(&self, message: Message) -> Result<(), SessionError> {
        let mut writer = self.writer.lock().await;
        write_frame(&mut *writer, &message).await?;
        Ok(())
    }
}

/// When the local engine just reached a terminal state, mark the session
/// finished and produce the `GAME_OVER` report for the coordinator.
fn report_if_finished(state: &mut SessionState) -> Vec<Message> {
    match state.game.status() {
        GameStatus::Won { winner } => {
            state.finished = true;
            vec![Message::game_over(winner.as_letter())]
        }
        GameStatus::Drawn => {
            state.finished = true;
            vec![Message::game_over("draw")]
        }
        GameStatus::InProgress => Vec::new(),
    }
}
