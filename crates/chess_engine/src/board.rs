//! Board state representation
//!
//! The board is a sparse `HashMap<Square, Piece>`: an absent square is an
//! empty square, and at most one piece occupies a square. The engine
//! assumes exactly one king per side; if that invariant is broken (for
//! example by a malformed promotion) behavior is undefined, though the
//! check queries degrade to "not in check" rather than panicking.
//!
//! All hypothetical questions ("would this move expose my king?") are
//! answered on cloned copies; nothing here mutates the real position
//! behind the caller's back.

use std::collections::HashMap;

use crate::move_gen::{self, attack};
use crate::moves::Move;
use crate::types::{Color, Piece, PieceKind, Square};

#[derive(Debug, Clone, Default)]
pub struct Board {
    squares: HashMap<Square, Piece>,
}

impl Board {
    /// An empty board.
    pub fn empty() -> Board {
        Board::default()
    }

    /// Standard starting position.
    ///
    /// Piece ids follow the scheme used for display and disambiguation:
    /// back-rank pieces are numbered from the queenside ("WR1" .. "WR2"),
    /// pawns carry their file letter ("WPa" .. "WPh").
    pub fn starting_position() -> Board {
        let mut board = Board::empty();

        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        for (color, home, pawn_rank) in [(Color::White, 0, 1), (Color::Black, 7, 6)] {
            let mut seen = HashMap::new();
            for (file, &kind) in back_rank.iter().enumerate() {
                let id = match kind {
                    PieceKind::Queen | PieceKind::King => {
                        format!("{}{}", color.as_letter(), kind.letter())
                    }
                    _ => {
                        let n = seen.entry(kind).or_insert(0u8);
                        *n += 1;
                        format!("{}{}{}", color.as_letter(), kind.letter(), n)
                    }
                };
                if let Some(square) = Square::new(file as i8, home) {
                    board.place(square, Piece::new(kind, id, color));
                }
            }
            for file in 0..8i8 {
                let id = format!("{}P{}", color.as_letter(), (b'a' + file as u8) as char);
                if let Some(square) = Square::new(file, pawn_rank) {
                    board.place(square, Piece::new(PieceKind::Pawn, id, color));
                }
            }
        }

        board
    }

    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        self.squares.get(&square)
    }

    /// Place a piece, returning whatever it displaced.
    pub fn place(&mut self, square: Square, piece: Piece) -> Option<Piece> {
        self.squares.insert(square, piece)
    }

    /// Remove and return the piece at a square.
    pub fn remove(&mut self, square: Square) -> Option<Piece> {
        self.squares.remove(&square)
    }

    /// Iterate every occupied square.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, &Piece)> {
        self.squares.iter().map(|(square, piece)| (*square, piece))
    }

    pub fn piece_count(&self) -> usize {
        self.squares.len()
    }

    /// Locate the king of the given color.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, piece)| piece.kind == PieceKind::King && piece.color == color)
            .map(|(square, _)| square)
    }

    /// Whether the king of `color` is attacked. A missing king reports
    /// "not in check".
    pub fn is_king_in_check(&self, color: Color) -> bool {
        match self.king_square(color) {
            Some(king) => attack::is_square_attacked(self, king, color.opponent()),
            None => false,
        }
    }

    /// Whether moving `from` to `to` would leave `color`'s own king
    /// attacked. The move is applied to a hypothetical copy (source
    /// cleared, destination overwritten) and the check test re-run there;
    /// the real board is untouched.
    pub fn would_move_cause_check(&self, from: Square, to: Square, color: Color) -> bool {
        let Some(piece) = self.piece_at(from) else {
            return false;
        };
        let piece = piece.clone();

        let mut hypothetical = self.clone();
        hypothetical.remove(from);
        hypothetical.place(to, piece);
        hypothetical.is_king_in_check(color)
    }

    /// All destinations the piece at `from` can legally reach.
    ///
    /// Enumerates the 64 squares through the piece's own legality rule;
    /// with `filter_self_check` set, destinations that would expose the
    /// mover's king are discarded as well. O(64) per piece, which is fine
    /// at this board size.
    pub fn legal_moves_from(
        &self,
        from: Square,
        last_move: Option<&Move>,
        filter_self_check: bool,
    ) -> Vec<Square> {
        let Some(piece) = self.piece_at(from) else {
            return Vec::new();
        };

        Square::all()
            .filter(|&to| move_gen::piece_move_is_valid(piece, from, to, self, last_move))
            .filter(|&to| !filter_self_check || !self.would_move_cause_check(from, to, piece.color))
            .collect()
    }

    /// Whether `color` has at least one legal move, self-check filtering
    /// included. This is what checkmate and stalemate detection reduce to.
    pub fn has_any_legal_move(&self, color: Color, last_move: Option<&Move>) -> bool {
        let own_squares: Vec<Square> = self
            .pieces()
            .filter(|(_, piece)| piece.color == color)
            .map(|(square, _)| square)
            .collect();

        own_squares
            .into_iter()
            .any(|from| !self.legal_moves_from(from, last_move, true).is_empty())
    }
}
