use super::HandshakeStage;
use std::io;
use thiserror::Error;

/// An enumeration defining all the possible errors that could occur while performing the
/// server side of an RTMP handshake.  Every one of them is fatal for the connection.
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// The first byte sent by the client (packet 0) must be the RTMP version 3.  Encrypted and
    /// other handshake variants are not supported.
    #[error("First byte of the handshake was {version} but only version 3 is supported")]
    BadVersionId { version: u8 },

    /// The peer closed the stream before a complete handshake packet was received
    #[error("Stream ended during the handshake in stage {stage:?} with {buffered} bytes of an incomplete packet")]
    IncompletePacket { stage: HandshakeStage, buffered: usize },

    /// Bytes were passed in after the handshake had already been completed
    #[error("Handshake has already been completed")]
    HandshakeAlreadyCompleted,

    /// Bytes were passed in after the handshake had already failed
    #[error("Handshake previously failed and cannot be resumed")]
    HandshakeFailed,

    /// An I/O error occurred while reading or building a handshake packet
    #[error("{0}")]
    Io(#[from] io::Error),
}
