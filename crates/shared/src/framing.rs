//! Frame I/O over a byte stream
//!
//! Each frame is a big-endian u16 length prefix followed by exactly that
//! many bytes of UTF-8 message text, sent as one contiguous write. The
//! u16 prefix replaces an earlier single-byte design whose 255-byte cap
//! silently misbehaved on longer payloads; messages beyond [`MAX_FRAME_LEN`]
//! are rejected with a typed error instead of being truncated.
//!
//! Reading distinguishes a clean end of stream (`Ok(None)`) from a
//! failure mid-frame, so callers can treat EOF as a disconnect rather
//! than an error.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::protocol::{Message, ProtocolError};

/// Largest encoded message a frame can carry.
pub const MAX_FRAME_LEN: usize = u16::MAX as usize;

/// Write one message as a length-prefixed frame.
pub async fn write_frame<W>(writer: &mut W, message: &Message) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let payload = message.encode().into_bytes();
    if payload.len() > MAX_FRAME_LEN {
        return Err(ProtocolError::FrameTooLarge { len: payload.len() });
    }

    let mut frame = Vec::with_capacity(2 + payload.len());
    frame.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    frame.extend_from_slice(&payload);

    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one message frame. `Ok(None)` means the peer closed the stream
/// cleanly before a new frame began.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Message>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 2];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(err.into()),
    }

    let len = u16::from_be_bytes(len_buf) as usize;
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;

    let text = String::from_utf8(payload).map_err(|_| ProtocolError::InvalidUtf8)?;
    Ok(Some(Message::decode(&text)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::MessageType;

    #[tokio::test]
    async fn test_frame_round_trip() {
        let (mut client, mut server) = tokio::io::duplex(1024);

        let message = Message::chess_move("e2", "e4");
        write_frame(&mut client, &message).await.expect("write");

        let received = read_frame(&mut server).await.expect("read").expect("frame");
        assert_eq!(received, message);
    }

    #[tokio::test]
    async fn test_255_byte_payload_round_trips() {
        //! The old single-byte length boundary is now well inside range
        let (mut client, mut server) = tokio::io::duplex(4096);

        let filler = "x".repeat(255 - "ERROR#".len());
        let message = Message::error(&filler);
        assert_eq!(message.encode().len(), 255);

        write_frame(&mut client, &message).await.expect("write");
        let received = read_frame(&mut server).await.expect("read").expect("frame");
        assert_eq!(received.payload, filler);
    }

    #[tokio::test]
    async fn test_oversized_payload_rejected_not_truncated() {
        let (mut client, _server) = tokio::io::duplex(16);

        let message = Message::error(&"x".repeat(MAX_FRAME_LEN + 1));
        let err = write_frame(&mut client, &message).await.unwrap_err();
        assert!(matches!(err, ProtocolError::FrameTooLarge { .. }));
    }

    #[tokio::test]
    async fn test_clean_eof_reads_as_none() {
        let (client, mut server) = tokio::io::duplex(64);
        drop(client);

        let result = read_frame(&mut server).await.expect("clean eof is not an error");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_eof_inside_frame_is_an_error() {
        let (mut client, mut server) = tokio::io::duplex(64);

        // A header promising 10 bytes, followed by silence
        client.write_all(&10u16.to_be_bytes()).await.unwrap();
        client.write_all(b"abc").await.unwrap();
        drop(client);

        assert!(read_frame(&mut server).await.is_err());
    }

    #[tokio::test]
    async fn test_multiple_frames_in_sequence() {
        let (mut client, mut server) = tokio::io::duplex(1024);

        write_frame(&mut client, &Message::join_game("alice")).await.unwrap();
        write_frame(&mut client, &Message::waiting()).await.unwrap();

        let first = read_frame(&mut server).await.unwrap().unwrap();
        assert_eq!(first.kind, MessageType::JoinGame);
        assert_eq!(first.payload, "alice");

        let second = read_frame(&mut server).await.unwrap().unwrap();
        assert_eq!(second.kind, MessageType::Waiting);
    }
}
