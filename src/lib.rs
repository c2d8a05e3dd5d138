//! Client side of networked chess
//!
//! A [`networking::session::NetworkSession`] binds a local
//! [`chess_engine::Game`] to a coordinator connection: locally entered
//! moves are validated by the local engine before they go out, relayed
//! opponent moves are validated and applied on arrival, and everything a
//! player should see flows through the engine's
//! [`chess_engine::GameObserver`] seam. Each endpoint simulates the whole
//! game independently; the server only relays and enforces turn order.

pub mod error;
pub mod networking;

pub use error::SessionError;
pub use networking::session::NetworkSession;
