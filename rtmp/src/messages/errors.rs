use std::io;
use thiserror::Error;

/// Enumeration that represents the various errors that may occur while trying to
/// deserialize a RTMP message
#[derive(Debug, Error)]
pub enum MessageDeserializationError {
    /// A SetChunkSize message carried a size of zero or had its reserved top bit set
    #[error("Peer requested an invalid chunk size of {size}")]
    InvalidChunkSize { size: u32 },

    /// The bytes contained in the message were not what were expected, and thus the message
    /// could not be parsed.
    #[error("The message was not encoded in an expected format")]
    InvalidMessageFormat,

    /// Failed to read the values from the input buffer
    #[error("An IO error occurred while reading the input: {0}")]
    Io(#[from] io::Error),
}

/// Enumeration that represents the various errors that may occur while trying to
/// serialize a RTMP message into a raw RTMP payload.
#[derive(Debug, Error)]
pub enum MessageSerializationError {
    #[error("Cannot serialize a SetChunkSize message with a size of {size}, sizes must be between 1 and 2147483647")]
    InvalidChunkSize { size: u32 },

    /// Failed to write the values to the output buffer
    #[error("An IO error occurred while writing the output: {0}")]
    Io(#[from] io::Error),
}
