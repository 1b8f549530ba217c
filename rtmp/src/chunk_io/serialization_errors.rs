use crate::messages::MessageSerializationError;
use std::io;
use thiserror::Error;

/// An enumeration defining all the possible errors that could occur while serializing
/// RTMP messages into RTMP chunks.
#[derive(Debug, Error)]
pub enum ChunkSerializationError {
    /// RTMP message lengths are encoded in 24 bits, so a message cannot be more than 16777215
    /// bytes, even when split across multiple RTMP chunks
    #[error("The current message has a length of {size} bytes, which is over the allowed size of 16777215 bytes")]
    MessageTooLong { size: usize },

    /// Only chunk stream ids between 2 and 65599 can be encoded in a basic header
    #[error("Chunk stream id {csid} cannot be encoded.  Chunk stream ids must be between 2 and 65599")]
    InvalidChunkStreamId { csid: u32 },

    /// Encountered when the chunk size is set to an invalid value
    #[error("Chunk size {attempted_chunk_size} is invalid.  Chunk size must be greater than 0 and less than 2147483648")]
    InvalidMaxChunkSize { attempted_chunk_size: u32 },

    /// Occurs when an error is returned when trying to create a set chunk size message
    #[error("Failed to create SetChunkSize message: {0}")]
    SetChunkSizeMessageCreationFailure(#[from] MessageSerializationError),

    /// An I/O error occurred while writing the output buffer
    #[error("{0}")]
    Io(#[from] io::Error),
}
