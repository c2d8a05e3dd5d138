//! Wire protocol shared by the chess client and the session coordinator
//!
//! Both ends of a connection speak the same two layers:
//!
//! - [`protocol`] - the message vocabulary: a closed set of tags plus one
//!   opaque payload string, encoded as UTF-8 `TAG#payload` text.
//! - [`framing`] - how messages travel over a byte stream: a big-endian
//!   u16 length prefix followed by exactly that many payload bytes.

pub mod framing;
pub mod protocol;

pub use framing::{read_frame, write_frame, MAX_FRAME_LEN};
pub use protocol::{Message, MessageType, ProtocolError};
