//! Client session errors

use thiserror::Error;

use shared::protocol::ProtocolError;

/// Failures of the client's server connection. Rule violations are not
/// errors; the engine rejects those quietly.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
