//! Game controller
//!
//! Owns one full game: the board, whose turn it is, the move history and
//! the terminal status. [`Game::attempt_move`] is the single entry point
//! for playing a ply; it validates, performs the castling/en passant/
//! promotion side effects, records the move, evaluates the opponent for
//! check/checkmate/stalemate and flips the turn. Illegal attempts return
//! `false` and leave every piece of state unchanged; nothing in here
//! panics on bad input.
//!
//! The move history is an explicit field owned by the controller. The
//! most recent entry is passed into the rules wherever "the last move"
//! matters (en passant); there is no process-wide history.

use std::sync::Arc;

use crate::board::Board;
use crate::move_gen;
use crate::moves::{CastlingRook, Move};
use crate::observer::{GameObserver, Severity};
use crate::types::{Color, GameStatus, Piece, PieceKind, Square};

pub struct Game {
    board: Board,
    current_turn: Color,
    history: Vec<Move>,
    status: GameStatus,
    observer: Option<Arc<dyn GameObserver>>,
}

impl Game {
    /// A fresh game from the standard starting position, White to move.
    pub fn new() -> Game {
        Game::from_position(Board::starting_position(), Color::White)
    }

    /// A game from an arbitrary position. Useful for fixtures and for
    /// resuming; the history starts empty, so en passant rights from
    /// before the position are not carried over.
    pub fn from_position(board: Board, turn: Color) -> Game {
        Game {
            board,
            current_turn: turn,
            history: Vec::new(),
            status: GameStatus::InProgress,
            observer: None,
        }
    }

    /// Register the view callback sink. Without one, messages go nowhere
    /// and promotions default to Queen.
    pub fn set_observer(&mut self, observer: Arc<dyn GameObserver>) {
        self.observer = Some(observer);
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_turn(&self) -> Color {
        self.current_turn
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.history.last()
    }

    /// Destinations the piece at `from` may legally move to, self-check
    /// filtered. Empty when the square is empty.
    pub fn valid_moves(&self, from: Square) -> Vec<Square> {
        self.board.legal_moves_from(from, self.history.last(), true)
    }

    /// Attempt to play a ply for the side to move.
    ///
    /// Returns `true` and advances the game when the move is legal;
    /// returns `false` with all state unchanged otherwise.
    pub fn attempt_move(&mut self, from: Square, to: Square) -> bool {
        if self.status != GameStatus::InProgress {
            return false;
        }

        let piece = match self.board.piece_at(from) {
            Some(piece) => piece.clone(),
            None => return false,
        };
        if piece.color != self.current_turn
            || !move_gen::piece_move_is_valid(&piece, from, to, &self.board, self.history.last())
        {
            return false;
        }

        if self.board.would_move_cause_check(from, to, self.current_turn) {
            self.notify_message("You cannot move into check!", "Illegal Move", Severity::Warning);
            return false;
        }

        // Castling: relocate the rook alongside the king
        let mut castling = None;
        if piece.kind == PieceKind::King && (to.file() - from.file()).abs() == 2 {
            let kingside = to.file() > from.file();
            let rook_from = Square::new(if kingside { 7 } else { 0 }, from.rank());
            let rook_to = Square::new(if kingside { 5 } else { 3 }, from.rank());
            if let (Some(rook_from), Some(rook_to)) = (rook_from, rook_to) {
                if let Some(mut rook) = self.board.remove(rook_from) {
                    rook.has_moved = true;
                    self.board.place(rook_to, rook);
                    castling = Some(CastlingRook {
                        from: rook_from,
                        to: rook_to,
                    });
                }
            }
        }

        // Capture: normally whatever stands on the destination; for en
        // passant the pawn on the adjacent square instead
        let mut captured = self.board.piece_at(to).map(|target| (to, target.clone()));
        let mut is_en_passant = false;
        if piece.kind == PieceKind::Pawn && from.file() != to.file() && captured.is_none() {
            if let Some(adjacent) = Square::new(to.file(), from.rank()) {
                let passed = self
                    .board
                    .piece_at(adjacent)
                    .filter(|other| other.kind == PieceKind::Pawn && other.color != piece.color)
                    .cloned();
                if let Some(passed) = passed {
                    self.board.remove(adjacent);
                    captured = Some((adjacent, passed));
                    is_en_passant = true;
                }
            }
        }

        // Promotion: the view picks the replacement, Queen by default
        let mut placed = piece.clone();
        let mut promotion = None;
        let last_rank: i8 = match piece.color {
            Color::White => 7,
            Color::Black => 0,
        };
        if piece.kind == PieceKind::Pawn && to.rank() == last_rank {
            let kind = self.choose_promotion(piece.color);
            placed = Piece::new(kind, Piece::promotion_id(piece.color, kind), piece.color);
            promotion = Some(kind);
        }

        self.history.push(Move {
            from,
            to,
            piece,
            captured,
            is_en_passant,
            castling,
            promotion,
        });

        self.board.remove(from);
        if matches!(placed.kind, PieceKind::King | PieceKind::Rook) {
            placed.has_moved = true;
        }
        self.board.place(to, placed);

        self.notify_board_changed();
        self.evaluate_opponent_state();
        self.switch_turns();
        true
    }

    /// Take back the most recent ply, restoring board, captured piece,
    /// castling rook, movement flags and turn. Returns `false` when there
    /// is nothing to undo.
    pub fn undo_last(&mut self) -> bool {
        let Some(mv) = self.history.pop() else {
            return false;
        };

        self.board.remove(mv.to);
        self.board.place(mv.from, mv.piece.clone());
        if let Some((square, piece)) = &mv.captured {
            self.board.place(*square, piece.clone());
        }
        if let Some(rook_move) = &mv.castling {
            if let Some(mut rook) = self.board.remove(rook_move.to) {
                rook.has_moved = false;
                self.board.place(rook_move.from, rook);
            }
        }

        self.current_turn = mv.piece.color;
        self.status = GameStatus::InProgress;
        self.notify_board_changed();
        self.notify_turn_changed();
        true
    }

    /// Back to the starting position, White to move, empty history.
    pub fn reset(&mut self) {
        self.board = Board::starting_position();
        self.history.clear();
        self.current_turn = Color::White;
        self.status = GameStatus::InProgress;
        self.notify_board_changed();
        self.notify_turn_changed();
    }

    /// After a move lands, look at the opponent: no legal replies means
    /// checkmate or stalemate depending on whether they stand in check;
    /// otherwise a bare check just gets announced.
    fn evaluate_opponent_state(&mut self) {
        let mover = self.current_turn;
        let opponent = mover.opponent();

        let in_check = self.board.is_king_in_check(opponent);
        let has_moves = self.board.has_any_legal_move(opponent, self.history.last());

        if !has_moves {
            if in_check {
                self.status = GameStatus::Won { winner: mover };
                self.notify_message(
                    &format!("Checkmate! {} wins!", mover),
                    "Game Over",
                    Severity::Info,
                );
            } else {
                self.status = GameStatus::Drawn;
                self.notify_message("Stalemate, draw!", "Game Over", Severity::Info);
            }
        } else if in_check {
            self.notify_message(
                &format!("{} is in check!", opponent),
                "Check",
                Severity::Warning,
            );
        }
    }

    fn switch_turns(&mut self) {
        self.current_turn = self.current_turn.opponent();
        self.notify_turn_changed();
    }

    fn choose_promotion(&self, color: Color) -> PieceKind {
        match &self.observer {
            Some(observer) => observer.choose_promotion(color),
            None => PieceKind::Queen,
        }
    }

    fn notify_board_changed(&self) {
        if let Some(observer) = &self.observer {
            observer.board_changed();
        }
    }

    fn notify_turn_changed(&self) {
        if let Some(observer) = &self.observer {
            observer.turn_changed(self.current_turn);
        }
    }

    fn notify_message(&self, text: &str, title: &str, severity: Severity) {
        if let Some(observer) = &self.observer {
            observer.message(text, title, severity);
        }
    }
}

impl Default for Game {
    fn default() -> Game {
        Game::new()
    }
}
