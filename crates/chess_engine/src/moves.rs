//! The move record
//!
//! A [`Move`] describes one completed ply. It is built exactly once, when
//! the game controller accepts a move, and appended to the move history;
//! nothing mutates it afterwards. The record carries enough to rebuild
//! the prior position (pre-move piece snapshot, captured piece with the
//! square it actually stood on, castling rook relocation, promotion), and
//! the most recent entry is what the pawn rules consult for en passant.

use std::fmt;

use crate::types::{Piece, Square};
use crate::PieceKind;

/// Rook relocation performed as part of a castling move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastlingRook {
    pub from: Square,
    pub to: Square,
}

/// Immutable description of one accepted ply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    /// The moved piece as it was before the move, `has_moved` included.
    pub piece: Piece,
    /// Captured piece and the square it was captured on. For en passant
    /// that square is not the move's destination.
    pub captured: Option<(Square, Piece)>,
    pub is_en_passant: bool,
    /// Set for castling moves; records where the rook went.
    pub castling: Option<CastlingRook>,
    /// Kind the pawn was promoted to, when the move reached the last rank.
    pub promotion: Option<PieceKind>,
}

impl Move {
    pub fn is_castling(&self) -> bool {
        self.castling.is_some()
    }

    /// True when this move was a pawn advancing two ranks, the only move
    /// that can be answered by en passant.
    pub fn is_double_pawn_advance(&self) -> bool {
        self.piece.kind == PieceKind::Pawn && (self.to.rank() - self.from.rank()).abs() == 2
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_castling() {
            return if self.to.file() > self.from.file() {
                write!(f, "O-O")
            } else {
                write!(f, "O-O-O")
            };
        }

        write!(f, "{} {} to {}", self.piece.id, self.from, self.to)?;
        if let Some((_, captured)) = &self.captured {
            write!(f, " (captured {})", captured.id)?;
        }
        Ok(())
    }
}
