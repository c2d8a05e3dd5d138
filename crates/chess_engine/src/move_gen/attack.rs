//! Attack detection
//!
//! Answers "can any piece of this color attack that square", which is
//! what check detection and castling validation are built on. Each kind
//! gets its own attack predicate rather than reusing the full move rules:
//! attack patterns never depend on move history, and pawns attack
//! diagonally forward only, never straight ahead, so the pawn predicate
//! is deliberately narrower than the pawn move rule.

use crate::board::Board;
use crate::move_gen::{knight, sliding};
use crate::types::{Color, Piece, PieceKind, Square};

/// Check whether `square` is attacked by any piece of `by_color`.
pub fn is_square_attacked(board: &Board, square: Square, by_color: Color) -> bool {
    board
        .pieces()
        .filter(|(_, piece)| piece.color == by_color)
        .any(|(from, piece)| piece_attacks(piece, from, square, board))
}

fn piece_attacks(piece: &Piece, from: Square, target: Square, board: &Board) -> bool {
    if from == target {
        return false;
    }
    match piece.kind {
        PieceKind::Pawn => pawn_attacks(piece.color, from, target),
        PieceKind::Knight => knight::is_valid_knight_move(from, target),
        PieceKind::Bishop => sliding::is_valid_bishop_move(from, target, board),
        PieceKind::Rook => sliding::is_valid_rook_move(from, target, board),
        PieceKind::Queen => sliding::is_valid_queen_move(from, target, board),
        PieceKind::King => {
            (target.file() - from.file()).abs() <= 1 && (target.rank() - from.rank()).abs() <= 1
        }
    }
}

fn pawn_attacks(color: Color, from: Square, target: Square) -> bool {
    let direction: i8 = match color {
        Color::White => 1,
        Color::Black => -1,
    };
    target.rank() - from.rank() == direction && (target.file() - from.file()).abs() == 1
}

/// Whether the king of `color` would be in check standing on `king_to`.
///
/// Relocates the king on a working copy of the board so pieces behind the
/// king's current square attack through it correctly. Used by castling to
/// test the transit and destination squares; never mutates the real board.
pub fn king_would_be_checked_at(
    board: &Board,
    color: Color,
    king_from: Square,
    king_to: Square,
) -> bool {
    let mut hypothetical = board.clone();
    if let Some(king) = hypothetical.remove(king_from) {
        hypothetical.place(king_to, king);
    }
    is_square_attacked(&hypothetical, king_to, color.opponent())
}
