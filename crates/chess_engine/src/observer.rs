//! Observer seam between the rule engine and whatever presents the game
//!
//! The engine never depends on a concrete presentation technology; a view
//! (GUI, terminal, test fixture) registers a [`GameObserver`] and gets
//! told when the board or turn changes and when something needs to be
//! surfaced to the player. All methods have no-op defaults so an observer
//! implements only what it cares about.

use crate::types::{Color, PieceKind};

/// How important a message is to the player. Maps onto whatever the view
/// uses for dialog styling or log levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Callback interface the game controller notifies.
///
/// `choose_promotion` is synchronous and blocks the move pipeline until a
/// kind is returned; the contract is a choice among Queen, Rook, Bishop
/// and Knight. When no observer is registered the controller promotes to
/// Queen.
pub trait GameObserver: Send + Sync {
    /// Piece positions changed.
    fn board_changed(&self) {}

    /// The side to move changed.
    fn turn_changed(&self, _turn: Color) {}

    /// Something the player should see (check warnings, game over, ...).
    fn message(&self, _text: &str, _title: &str, _severity: Severity) {}

    /// A pawn reached the last rank; pick its replacement.
    fn choose_promotion(&self, _side: Color) -> PieceKind {
        PieceKind::Queen
    }
}
