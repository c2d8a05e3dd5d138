//! Pawn rules
//!
//! Pawns are the only piece whose legality depends on history: the en
//! passant capture is available exactly when the opposing pawn's
//! two-square advance was the immediately preceding move. The caller
//! passes that move in explicitly; there is no ambient history state.
//!
//! Forward direction is side-dependent: White advances toward higher rank
//! indices, Black toward lower.

use crate::board::Board;
use crate::moves::Move;
use crate::types::{Color, PieceKind, Square};

pub fn is_valid_pawn_move(
    color: Color,
    from: Square,
    to: Square,
    board: &Board,
    last_move: Option<&Move>,
) -> bool {
    let direction: i8 = match color {
        Color::White => 1,
        Color::Black => -1,
    };
    let start_rank: i8 = match color {
        Color::White => 1,
        Color::Black => 6,
    };

    let file_delta = to.file() - from.file();
    let rank_delta = to.rank() - from.rank();

    // Forward movement, same file
    if file_delta == 0 {
        // Single square onto an empty square
        if rank_delta == direction {
            return board.piece_at(to).is_none();
        }
        // Double square from the starting rank, both squares empty
        if from.rank() == start_rank && rank_delta == 2 * direction {
            return from
                .offset(0, direction)
                .is_some_and(|intermediate| board.piece_at(intermediate).is_none())
                && board.piece_at(to).is_none();
        }
        return false;
    }

    // Diagonal movement, one square forward
    if file_delta.abs() == 1 && rank_delta == direction {
        // Ordinary capture of an opposing piece
        if let Some(target) = board.piece_at(to) {
            return target.color != color;
        }
        // Destination empty: only legal as en passant
        return is_en_passant_capture(color, from, to, board, last_move);
    }

    false
}

/// En passant: the square next to the source on the destination's file
/// must hold an opposing pawn, and the last recorded move must be that
/// exact pawn advancing two ranks to reach it. The captured piece is that
/// adjacent pawn, not anything on the destination square.
pub fn is_en_passant_capture(
    color: Color,
    from: Square,
    to: Square,
    board: &Board,
    last_move: Option<&Move>,
) -> bool {
    let Some(adjacent) = Square::new(to.file(), from.rank()) else {
        return false;
    };
    let Some(passed) = board.piece_at(adjacent) else {
        return false;
    };
    if passed.kind != PieceKind::Pawn || passed.color == color {
        return false;
    }
    let Some(last) = last_move else {
        return false;
    };
    last.is_double_pawn_advance() && last.to == adjacent
}
