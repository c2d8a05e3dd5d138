//! Core types shared across the engine
//!
//! The board is a sparse mapping keyed by [`Square`], so the fundamental
//! types here are deliberately small value types: a square is two 0-7
//! indices, a piece is its kind plus identity, and everything is `Clone`
//! so hypothetical positions can be built by copying.
//!
//! ## Coordinate convention
//!
//! `file` runs 0-7 for a-h and `rank` runs 0-7 for ranks 1-8, so rank
//! index 0 is White's home rank and White pawns advance toward higher
//! rank indices. Algebraic notation ("e2") is the only external form;
//! [`Square`] implements `Display` and `FromStr` for it.

use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

/// The two sides of a chess game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Single-letter wire form ("W"/"B") used by the session protocol.
    pub fn as_letter(self) -> &'static str {
        match self {
            Color::White => "W",
            Color::Black => "B",
        }
    }

    pub fn from_letter(letter: &str) -> Option<Color> {
        match letter {
            "W" => Some(Color::White),
            "B" => Some(Color::Black),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

/// One square of the 8x8 board, identified by file (a-h) and rank (1-8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    file: i8,
    rank: i8,
}

impl Square {
    /// Build a square from 0-7 file/rank indices; `None` if off the board.
    pub fn new(file: i8, rank: i8) -> Option<Square> {
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Square { file, rank })
        } else {
            None
        }
    }

    pub fn file(self) -> i8 {
        self.file
    }

    pub fn rank(self) -> i8 {
        self.rank
    }

    /// The square offset by the given file/rank deltas, if still on the board.
    pub fn offset(self, file_delta: i8, rank_delta: i8) -> Option<Square> {
        Square::new(self.file + file_delta, self.rank + rank_delta)
    }

    /// Iterate all 64 squares, a1 first.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8).flat_map(|rank| (0..8).map(move |file| Square { file, rank }))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file as u8) as char, self.rank + 1)
    }
}

impl FromStr for Square {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Square, EngineError> {
        let mut chars = s.chars();
        let (file, rank, rest) = (chars.next(), chars.next(), chars.next());
        match (file, rank, rest) {
            (Some(file @ 'a'..='h'), Some(rank @ '1'..='8'), None) => Ok(Square {
                file: file as i8 - 'a' as i8,
                rank: rank as i8 - '1' as i8,
            }),
            _ => Err(EngineError::InvalidSquare {
                input: s.to_string(),
            }),
        }
    }
}

/// The six piece kinds. Movement rules are dispatched on this in
/// [`crate::move_gen`]; there is no per-kind state beyond what [`Piece`]
/// carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub fn name(self) -> &'static str {
        match self {
            PieceKind::Pawn => "pawn",
            PieceKind::Knight => "knight",
            PieceKind::Bishop => "bishop",
            PieceKind::Rook => "rook",
            PieceKind::Queen => "queen",
            PieceKind::King => "king",
        }
    }

    /// Letter used when building piece ids ("WQ", "BN", ...).
    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    /// Unicode glyph for display.
    pub fn glyph(self, color: Color) -> char {
        match (self, color) {
            (PieceKind::Pawn, Color::White) => '♙',
            (PieceKind::Knight, Color::White) => '♘',
            (PieceKind::Bishop, Color::White) => '♗',
            (PieceKind::Rook, Color::White) => '♖',
            (PieceKind::Queen, Color::White) => '♕',
            (PieceKind::King, Color::White) => '♔',
            (PieceKind::Pawn, Color::Black) => '♟',
            (PieceKind::Knight, Color::Black) => '♞',
            (PieceKind::Bishop, Color::Black) => '♝',
            (PieceKind::Rook, Color::Black) => '♜',
            (PieceKind::Queen, Color::Black) => '♛',
            (PieceKind::King, Color::Black) => '♚',
        }
    }
}

/// A piece on the board.
///
/// `id` is a stable identifier used for display and disambiguation
/// ("WR1", "BPa", ...). `has_moved` is set the first time a king or rook
/// is relocated and is consulted only by the castling rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub id: String,
    pub color: Color,
    pub has_moved: bool,
}

impl Piece {
    pub fn new(kind: PieceKind, id: impl Into<String>, color: Color) -> Piece {
        Piece {
            kind,
            id: id.into(),
            color,
            has_moved: false,
        }
    }

    /// Id given to a piece created by pawn promotion ("WQ", "BN", ...).
    pub fn promotion_id(color: Color, kind: PieceKind) -> String {
        format!("{}{}", color.as_letter(), kind.letter())
    }

    pub fn glyph(&self) -> char {
        self.kind.glyph(self.color)
    }
}

/// Terminal state of a game. Checkmate produces `Won`, stalemate `Drawn`;
/// the client session also reaches `Won` through opponent disconnection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Won { winner: Color },
    Drawn,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_algebraic_round_trip() {
        //! Every square prints as algebraic notation and parses back
        for square in Square::all() {
            let text = square.to_string();
            assert_eq!(
                text.parse::<Square>().unwrap(),
                square,
                "square {} should round-trip through notation",
                text
            );
        }
    }

    #[test]
    fn test_square_parse_rejects_garbage() {
        //! Off-board and malformed inputs must fail with a typed error
        for input in ["", "e", "e9", "i1", "e22", "22", "zz"] {
            assert!(
                input.parse::<Square>().is_err(),
                "input {:?} should not parse as a square",
                input
            );
        }
    }

    #[test]
    fn test_square_offset_stays_on_board() {
        let e2: Square = "e2".parse().unwrap();
        assert_eq!(e2.offset(0, 2), Some("e4".parse().unwrap()));
        let a1: Square = "a1".parse().unwrap();
        assert_eq!(a1.offset(-1, 0), None, "offset off the a-file is None");
        assert_eq!(a1.offset(0, -1), None, "offset below rank 1 is None");
    }

    #[test]
    fn test_color_letters() {
        assert_eq!(Color::White.as_letter(), "W");
        assert_eq!(Color::from_letter("B"), Some(Color::Black));
        assert_eq!(Color::from_letter("X"), None);
        assert_eq!(Color::White.opponent(), Color::Black);
    }

    #[test]
    fn test_promotion_ids_match_piece_ids() {
        assert_eq!(Piece::promotion_id(Color::White, PieceKind::Queen), "WQ");
        assert_eq!(Piece::promotion_id(Color::Black, PieceKind::Knight), "BN");
    }
}
