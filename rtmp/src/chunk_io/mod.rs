//! Conversion between raw RTMP chunk bytes and RTMP message payloads.
//!
//! `chunk_header` decodes the variable length header of a single chunk, `ChunkDeserializer`
//! reassembles chunks into complete messages and `ChunkSerializer` performs the reverse.

mod chunk_header;
mod deserialization_errors;
mod deserializer;
mod serialization_errors;
mod serializer;

pub use self::chunk_header::{ChunkHeader, ChunkHeaderFormat, MessageHeader};
pub use self::deserialization_errors::ChunkDeserializationError;
pub use self::deserializer::ChunkDeserializer;
pub use self::serialization_errors::ChunkSerializationError;
pub use self::serializer::ChunkSerializer;

/// Per the RTMP specification chunks carry at most 128 bytes of message data until a
/// SetChunkSize message changes it
pub const INITIAL_MAX_CHUNK_SIZE: usize = 128;

/// The largest chunk size a SetChunkSize message can carry (31 bits)
pub const MAX_CHUNK_SIZE_LIMIT: usize = 0x7FFF_FFFF;

/// The chunk stream id reserved for protocol control messages
pub const PROTOCOL_CONTROL_CSID: u32 = 2;

/// A 24 bit timestamp field with this value means a 4 byte extended timestamp follows
pub(crate) const EXTENDED_TIMESTAMP_SENTINEL: u32 = 0x00FF_FFFF;

/// The largest message length that fits in the 24 bit message length field
pub(crate) const MAX_MESSAGE_LENGTH: usize = 0x00FF_FFFF;
