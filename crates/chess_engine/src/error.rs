//! Error types for the chess engine
//!
//! Illegal moves are not errors: the game controller rejects them with a
//! plain `false` and leaves the position untouched. The error type here
//! covers genuinely malformed input, such as a square reference that is
//! not on the board.

use thiserror::Error;

/// Errors produced by engine entry points.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A square reference that is not valid algebraic notation.
    #[error("invalid square {input:?}: expected a file a-h followed by a rank 1-8")]
    InvalidSquare { input: String },
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
