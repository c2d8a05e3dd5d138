//! Message vocabulary and text encoding
//!
//! A message is a tag from a fixed closed set plus a single opaque
//! payload string, joined by `#` (which is never valid inside a tag).
//! Payload shapes are tag-specific:
//!
//! | Tag | Payload | Direction |
//! |---|---|---|
//! | `JOIN_GAME` | display name | client to server |
//! | `GAME_START` | `color,opponentName` | server to client |
//! | `MOVE` | `fromSquare,toSquare` | both directions |
//! | `GAME_OVER` | winner color or `draw` | both directions |
//! | `WAITING` | empty | server to client |
//! | `ERROR` | human-readable text | server to client |
//! | `DISCONNECT` | display name or reason | either direction |
//!
//! Only the first `#` splits; payloads may contain further `#` bytes.

use std::fmt;

use thiserror::Error;

/// Errors for message decoding and frame I/O.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The text carries no tag/payload delimiter.
    #[error("malformed message {text:?}: missing '#' delimiter")]
    Malformed { text: String },

    /// The tag is not part of the protocol.
    #[error("unknown message tag {tag:?}")]
    UnknownTag { tag: String },

    /// A payload that should have the shape `a,b` does not.
    #[error("bad {kind} payload {payload:?}")]
    BadPayload { kind: &'static str, payload: String },

    /// An encoded message longer than the framing layer can carry.
    #[error("frame of {len} bytes exceeds the {max}-byte limit", max = crate::framing::MAX_FRAME_LEN)]
    FrameTooLarge { len: usize },

    /// A frame whose bytes are not valid UTF-8.
    #[error("frame payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),
}

/// The closed set of message tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    None,
    JoinGame,
    GameStart,
    Move,
    GameOver,
    Waiting,
    Error,
    Disconnect,
    ServerShutdown,
    OpponentDisconnected,
}

impl MessageType {
    pub const ALL: [MessageType; 10] = [
        MessageType::None,
        MessageType::JoinGame,
        MessageType::GameStart,
        MessageType::Move,
        MessageType::GameOver,
        MessageType::Waiting,
        MessageType::Error,
        MessageType::Disconnect,
        MessageType::ServerShutdown,
        MessageType::OpponentDisconnected,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            MessageType::None => "NONE",
            MessageType::JoinGame => "JOIN_GAME",
            MessageType::GameStart => "GAME_START",
            MessageType::Move => "MOVE",
            MessageType::GameOver => "GAME_OVER",
            MessageType::Waiting => "WAITING",
            MessageType::Error => "ERROR",
            MessageType::Disconnect => "DISCONNECT",
            MessageType::ServerShutdown => "SERVER_SHUTDOWN",
            MessageType::OpponentDisconnected => "OPPONENT_DISCONNECTED",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<MessageType> {
        MessageType::ALL
            .into_iter()
            .find(|tag| tag.wire_name() == name)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// One protocol message: a tag and its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageType,
    pub payload: String,
}

impl Message {
    pub fn new(kind: MessageType, payload: impl Into<String>) -> Message {
        Message {
            kind,
            payload: payload.into(),
        }
    }

    /// `JOIN_GAME#name`
    pub fn join_game(name: &str) -> Message {
        Message::new(MessageType::JoinGame, name)
    }

    /// `GAME_START#color,opponentName`
    pub fn game_start(color: &str, opponent: &str) -> Message {
        Message::new(MessageType::GameStart, format!("{color},{opponent}"))
    }

    /// `MOVE#from,to`
    pub fn chess_move(from: &str, to: &str) -> Message {
        Message::new(MessageType::Move, format!("{from},{to}"))
    }

    /// `GAME_OVER#winner` where winner is a color letter or `draw`.
    pub fn game_over(winner: &str) -> Message {
        Message::new(MessageType::GameOver, winner)
    }

    pub fn waiting() -> Message {
        Message::new(MessageType::Waiting, "")
    }

    pub fn error(text: &str) -> Message {
        Message::new(MessageType::Error, text)
    }

    pub fn disconnect(reason: &str) -> Message {
        Message::new(MessageType::Disconnect, reason)
    }

    /// Render as wire text, `TAG#payload`.
    pub fn encode(&self) -> String {
        format!("{}#{}", self.kind.wire_name(), self.payload)
    }

    /// Parse wire text back into a message.
    pub fn decode(text: &str) -> Result<Message, ProtocolError> {
        let Some((tag, payload)) = text.split_once('#') else {
            return Err(ProtocolError::Malformed {
                text: text.to_string(),
            });
        };
        let kind = MessageType::from_wire_name(tag).ok_or_else(|| ProtocolError::UnknownTag {
            tag: tag.to_string(),
        })?;
        Ok(Message::new(kind, payload))
    }

    /// Split a `GAME_START` payload into (color, opponent name).
    pub fn parse_game_start(&self) -> Result<(&str, &str), ProtocolError> {
        self.split_pair("GAME_START")
    }

    /// Split a `MOVE` payload into (from, to) square texts.
    pub fn parse_move(&self) -> Result<(&str, &str), ProtocolError> {
        self.split_pair("MOVE")
    }

    fn split_pair(&self, kind: &'static str) -> Result<(&str, &str), ProtocolError> {
        self.payload
            .split_once(',')
            .filter(|(a, b)| !a.is_empty() && !b.is_empty())
            .ok_or_else(|| ProtocolError::BadPayload {
                kind,
                payload: self.payload.clone(),
            })
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
