use super::ChunkHeaderFormat;
use std::io;
use thiserror::Error;

/// An enumeration defining all the possible errors that could occur while deserializing
/// RTMP chunks.  RTMP chunks cannot be resynchronized once parsing goes wrong, so every one
/// of these is fatal for the connection.
#[derive(Debug, Error)]
pub enum ChunkDeserializationError {
    /// Chunks that are not type 0 inherit header values from the previous chunk on the same
    /// chunk stream id.  This error occurs when such a chunk arrives on a chunk stream that has
    /// never received a type 0 chunk.
    #[error("Received a {format:?} chunk on csid {csid} prior to receiving a type 0 chunk")]
    OrphanContinuation { csid: u32, format: ChunkHeaderFormat },

    /// A chunk declared a message length that disagrees with the message still being
    /// reassembled on its chunk stream
    #[error("Chunk on csid {csid} declared a message length of {declared} while a message of length {in_progress} was in progress")]
    MessageLengthConflict {
        csid: u32,
        in_progress: u32,
        declared: u32,
    },

    /// Chunk stream id 2 is reserved for protocol control messages
    #[error("Message type {message_type_id} was sent on the reserved protocol control chunk stream")]
    ReservedStreamId { message_type_id: u8 },

    /// The peer opened more chunk streams than the deserializer was configured to track
    #[error("Peer exceeded the limit of {limit} chunk streams")]
    TooManyChunkStreams { limit: usize },

    /// The stream ended partway through a chunk header
    #[error("Stream ended with {buffered} bytes of an incomplete chunk header")]
    IncompleteHeader { buffered: usize },

    /// The stream ended partway through a chunk's payload
    #[error("Stream ended partway through a chunk payload on csid {csid}")]
    IncompletePayload { csid: u32 },

    /// The max chunk size must be between 1 and 2,147,483,647 (since it's encoded in only
    /// 31 bits of the SetChunkSize message)
    #[error("Requested an invalid max chunk size of {chunk_size}.  Chunk sizes must be between 1 and 2147483647")]
    InvalidMaxChunkSize { chunk_size: usize },

    /// An I/O error occurred while reading the input buffer
    #[error("{0}")]
    Io(#[from] io::Error),
}
