use super::chunk_header::{ChunkHeaderFormat, MessageHeader};
use super::{
    ChunkSerializationError, EXTENDED_TIMESTAMP_SENTINEL, INITIAL_MAX_CHUNK_SIZE,
    MAX_CHUNK_SIZE_LIMIT, MAX_MESSAGE_LENGTH, PROTOCOL_CONTROL_CSID,
};
use crate::messages::{MessagePayload, SetChunkSize};
use crate::time::RtmpTimestamp;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use std::collections::HashMap;
use std::io::Write;

const MAX_CHUNK_STREAM_ID: u32 = 65599;

/// Allows serializing RTMP messages into RTMP chunks.
///
/// Due to the nature of the RTMP chunking protocol, the same serializer should be used
/// for all messages that need to be sent to the same peer.
pub struct ChunkSerializer {
    previous_headers: HashMap<u32, MessageHeader>,
    max_chunk_size: usize,
}

impl ChunkSerializer {
    /// Creates a new `ChunkSerializer`.
    ///
    /// By default (per the RTMP specification) the serializer will break any message into RTMP
    /// chunks with a max size of 128.  To change this amount a call to `set_max_chunk_size()` is
    /// required.
    pub fn new() -> ChunkSerializer {
        ChunkSerializer {
            max_chunk_size: INITIAL_MAX_CHUNK_SIZE,
            previous_headers: HashMap::new(),
        }
    }

    /// Changes the maximum amount of bytes from RTMP messages that can be in a single RTMP chunk.
    ///
    /// Changing the maximum chunk size requires notifying the receiver of the change, as it will
    /// affect every chunk you send out from here on out.  Therefore, when this method is called
    /// we automatically serialize a `SetChunkSize` RTMP message to be sent to the peer.  These
    /// bytes *must* be sent and cannot be ignored.
    pub fn set_max_chunk_size(
        &mut self,
        new_size: u32,
        time: RtmpTimestamp,
    ) -> Result<Vec<u8>, ChunkSerializationError> {
        if new_size == 0 || new_size as usize > MAX_CHUNK_SIZE_LIMIT {
            return Err(ChunkSerializationError::InvalidMaxChunkSize {
                attempted_chunk_size: new_size,
            });
        }

        let message = SetChunkSize { size: new_size };
        let payload = MessagePayload {
            timestamp: time,
            type_id: 1,
            message_stream_id: 0,
            chunk_stream_id: PROTOCOL_CONTROL_CSID,
            data: message.serialize()?,
        };

        let bytes = self.serialize(&payload, true)?;
        self.max_chunk_size = new_size as usize;
        Ok(bytes)
    }

    pub fn get_max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// Turns an RTMP message payload into binary data (representing RTMP chunks) that can be
    /// sent over the network.
    ///
    /// The RTMP chunk format has a basic form of header compression it utilizes.  If a chunk
    /// is sent with some header information, and the next chunk to be generated on the same
    /// chunk stream has a lot of similar header information, then the subsequent chunk can omit
    /// some information and flag itself as requiring information from the previous chunk.
    ///
    /// This compression can be bypassed by setting `force_uncompressed` to `true`.  Some
    /// encoders and players require the initial RTMP messages (after the handshake) to always
    /// be type 0 chunks.
    pub fn serialize(
        &mut self,
        message: &MessagePayload,
        force_uncompressed: bool,
    ) -> Result<Vec<u8>, ChunkSerializationError> {
        if message.data.len() > MAX_MESSAGE_LENGTH {
            return Err(ChunkSerializationError::MessageTooLong {
                size: message.data.len(),
            });
        }

        let csid = message.chunk_stream_id;
        if csid < PROTOCOL_CONTROL_CSID || csid > MAX_CHUNK_STREAM_ID {
            return Err(ChunkSerializationError::InvalidChunkStreamId { csid });
        }

        let previous = if force_uncompressed {
            None
        } else {
            self.previous_headers.get(&csid)
        };

        let (format, header) = next_header(message, previous);
        let extended_timestamp = if header.has_extended_timestamp {
            Some(match format {
                ChunkHeaderFormat::Full => header.timestamp.value,
                ChunkHeaderFormat::Empty if header.timestamp_delta == 0 => header.timestamp.value,
                _ => header.timestamp_delta,
            })
        } else {
            None
        };

        let mut bytes = Vec::with_capacity(message.data.len() + 18);
        let mut chunks = message.data.chunks(self.max_chunk_size);

        write_basic_header(&mut bytes, format, csid)?;
        write_message_header(&mut bytes, format, &header)?;
        if let Some(value) = extended_timestamp {
            bytes.write_u32::<BigEndian>(value)?;
        }

        if let Some(first) = chunks.next() {
            bytes.write_all(first)?;
        }

        // Continued chunks should always use type 3 headers
        for chunk in chunks {
            write_basic_header(&mut bytes, ChunkHeaderFormat::Empty, csid)?;
            if let Some(value) = extended_timestamp {
                bytes.write_u32::<BigEndian>(value)?;
            }

            bytes.write_all(chunk)?;
        }

        self.previous_headers.insert(csid, header);
        Ok(bytes)
    }
}

impl Default for ChunkSerializer {
    fn default() -> Self {
        ChunkSerializer::new()
    }
}

/// Picks the most compressed header format the peer can expand back into this message's
/// header, along with the header state the peer will be holding afterwards.
fn next_header(
    message: &MessagePayload,
    previous: Option<&MessageHeader>,
) -> (ChunkHeaderFormat, MessageHeader) {
    let mut header = MessageHeader {
        timestamp: message.timestamp,
        timestamp_delta: 0,
        has_extended_timestamp: message.timestamp.value >= EXTENDED_TIMESTAMP_SENTINEL,
        message_length: message.data.len() as u32,
        message_type_id: message.type_id,
        message_stream_id: message.message_stream_id,
    };

    let previous = match previous {
        Some(previous) => previous,
        None => return (ChunkHeaderFormat::Full, header),
    };

    // TODO: support rtmp time wrap-around instead of falling back to a full header
    if header.message_stream_id != previous.message_stream_id
        || header.timestamp.value < previous.timestamp.value
    {
        return (ChunkHeaderFormat::Full, header);
    }

    header.timestamp_delta = (header.timestamp - previous.timestamp).value;
    header.has_extended_timestamp = header.timestamp_delta >= EXTENDED_TIMESTAMP_SENTINEL;

    if header.message_type_id != previous.message_type_id
        || header.message_length != previous.message_length
    {
        return (ChunkHeaderFormat::TimeDeltaWithoutMessageStreamId, header);
    }

    if header.timestamp_delta != previous.timestamp_delta {
        return (ChunkHeaderFormat::TimeDeltaOnly, header);
    }

    header.has_extended_timestamp = previous.has_extended_timestamp;
    (ChunkHeaderFormat::Empty, header)
}

fn write_basic_header(
    bytes: &mut Vec<u8>,
    format: ChunkHeaderFormat,
    csid: u32,
) -> Result<(), ChunkSerializationError> {
    match csid {
        x if x <= 63 => bytes.write_u8(x as u8 | format.mask())?,
        x if x <= 319 => {
            bytes.write_u8(format.mask())?;
            bytes.write_u8((x - 64) as u8)?;
        }
        x => {
            bytes.write_u8(1 | format.mask())?;
            bytes.write_u16::<LittleEndian>((x - 64) as u16)?;
        }
    }

    Ok(())
}

fn write_message_header(
    bytes: &mut Vec<u8>,
    format: ChunkHeaderFormat,
    header: &MessageHeader,
) -> Result<(), ChunkSerializationError> {
    let timestamp_field = match format {
        ChunkHeaderFormat::Empty => return Ok(()),
        ChunkHeaderFormat::Full => header.timestamp.value,
        _ => header.timestamp_delta,
    };

    bytes.write_u24::<BigEndian>(timestamp_field.min(EXTENDED_TIMESTAMP_SENTINEL))?;

    if format == ChunkHeaderFormat::TimeDeltaOnly {
        return Ok(());
    }

    bytes.write_u24::<BigEndian>(header.message_length)?;
    bytes.write_u8(header.message_type_id)?;

    if format == ChunkHeaderFormat::Full {
        bytes.write_u32::<LittleEndian>(header.message_stream_id)?;
    }

    Ok(())
}
