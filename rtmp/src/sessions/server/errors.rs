use crate::chunk_io::ChunkDeserializationError;
use crate::handshake::HandshakeError;
use crate::messages::MessageDeserializationError;
use thiserror::Error;

/// Represents the errors a server session can encounter.  Every one of them leaves the
/// connection in an unusable state, and the connection should be closed.
#[derive(Debug, Error)]
pub enum ServerSessionError {
    /// Encountered when the client does not perform the handshake correctly
    #[error("The RTMP handshake failed: {0}")]
    HandshakeError(#[from] HandshakeError),

    /// Encountered when an error occurs while deserializing the incoming byte data
    #[error("An error occurred deserializing incoming data: {0}")]
    ChunkDeserializationError(#[from] ChunkDeserializationError),

    /// Encountered when a protocol control message the session interprets could not be read
    #[error("An error occurred while reading a protocol control message: {0}")]
    MessageDeserializationError(#[from] MessageDeserializationError),
}
