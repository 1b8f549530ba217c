use super::{ChunkDeserializationError, EXTENDED_TIMESTAMP_SENTINEL, PROTOCOL_CONTROL_CSID};
use crate::time::RtmpTimestamp;
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io::Cursor;

const FORMAT_MASK: u8 = 0b1100_0000;
const CSID_MASK: u8 = 0b0011_1111;

/// The 2 bit selector at the top of a chunk's basic header, deciding which message header
/// fields are present in the chunk and which are inherited from the chunk stream
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ChunkHeaderFormat {
    Full,                            // Format 0
    TimeDeltaWithoutMessageStreamId, // Format 1
    TimeDeltaOnly,                   // Format 2
    Empty,                           // Format 3
}

impl ChunkHeaderFormat {
    pub fn from_basic_header_byte(byte: u8) -> ChunkHeaderFormat {
        match byte & FORMAT_MASK {
            0b0000_0000 => ChunkHeaderFormat::Full,
            0b0100_0000 => ChunkHeaderFormat::TimeDeltaWithoutMessageStreamId,
            0b1000_0000 => ChunkHeaderFormat::TimeDeltaOnly,
            _ => ChunkHeaderFormat::Empty,
        }
    }

    /// The bits this format occupies in the first byte of the basic header
    pub fn mask(self) -> u8 {
        match self {
            ChunkHeaderFormat::Full => 0b0000_0000,
            ChunkHeaderFormat::TimeDeltaWithoutMessageStreamId => 0b0100_0000,
            ChunkHeaderFormat::TimeDeltaOnly => 0b1000_0000,
            ChunkHeaderFormat::Empty => 0b1100_0000,
        }
    }

    /// Number of message header bytes that follow the basic header, not counting any
    /// extended timestamp
    pub fn message_header_length(self) -> usize {
        match self {
            ChunkHeaderFormat::Full => 11,
            ChunkHeaderFormat::TimeDeltaWithoutMessageStreamId => 7,
            ChunkHeaderFormat::TimeDeltaOnly => 3,
            ChunkHeaderFormat::Empty => 0,
        }
    }
}

/// The message header values in effect for a chunk stream.  Compressed chunk headers leave
/// fields out and mean "the same as the previous chunk on this chunk stream".
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct MessageHeader {
    pub timestamp: RtmpTimestamp,

    /// The delta a type 3 chunk starting a new message applies.  Zero after a type 0 header.
    pub timestamp_delta: u32,

    /// Whether the last timestamp field was the extended timestamp sentinel.  Type 3 chunks on
    /// the stream then carry a 4 byte extended timestamp as well.
    pub has_extended_timestamp: bool,
    pub message_length: u32,
    pub message_type_id: u8,
    pub message_stream_id: u32,
}

/// A fully decoded chunk header, with inherited fields already filled in
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct ChunkHeader {
    pub chunk_stream_id: u32,
    pub format: ChunkHeaderFormat,
    pub message_header: MessageHeader,
}

/// What the header decoder needs to know about a chunk stream that was seen before
pub(crate) struct PreviousChunk<'a> {
    pub header: &'a MessageHeader,
    pub message_in_progress: bool,
}

pub(crate) enum ParsedValue<T> {
    NotEnoughBytes,
    Value { val: T, next_index: usize },
}

/// Reads the basic header at the start of the buffer, returning the chunk's format and
/// chunk stream id.
///
/// A chunk stream id field of 0 means the id is 64 plus the next byte, and 1 means it is 64
/// plus the next two bytes read as a little endian value.
pub(crate) fn read_basic_header(buffer: &[u8]) -> ParsedValue<(ChunkHeaderFormat, u32)> {
    if buffer.is_empty() {
        return ParsedValue::NotEnoughBytes;
    }

    let format = ChunkHeaderFormat::from_basic_header_byte(buffer[0]);
    match buffer[0] & CSID_MASK {
        0 => {
            if buffer.len() < 2 {
                ParsedValue::NotEnoughBytes
            } else {
                ParsedValue::Value {
                    val: (format, buffer[1] as u32 + 64),
                    next_index: 2,
                }
            }
        }

        1 => {
            if buffer.len() < 3 {
                ParsedValue::NotEnoughBytes
            } else {
                ParsedValue::Value {
                    val: (format, (buffer[2] as u32 * 256) + buffer[1] as u32 + 64),
                    next_index: 3,
                }
            }
        }

        x => ParsedValue::Value {
            val: (format, x as u32),
            next_index: 1,
        },
    }
}

/// Decodes one complete chunk header (basic header, message header and any extended
/// timestamp) from the start of the buffer without consuming it.
///
/// `previous` is asked for the state of the chunk stream the header refers to.  Nothing is
/// returned until every byte of the header is present, so a partially received header can
/// simply be decoded again once more bytes arrive.
pub(crate) fn decode_chunk_header<'a, F>(
    buffer: &[u8],
    previous: F,
) -> Result<ParsedValue<ChunkHeader>, ChunkDeserializationError>
where
    F: FnOnce(u32) -> Option<PreviousChunk<'a>>,
{
    let (format, csid, mut index) = match read_basic_header(buffer) {
        ParsedValue::NotEnoughBytes => return Ok(ParsedValue::NotEnoughBytes),
        ParsedValue::Value {
            val: (format, csid),
            next_index,
        } => (format, csid, next_index),
    };

    let previous = previous(csid);
    if format != ChunkHeaderFormat::Full && previous.is_none() {
        return Err(ChunkDeserializationError::OrphanContinuation { csid, format });
    }

    let header_end = index + format.message_header_length();
    if buffer.len() < header_end {
        return Ok(ParsedValue::NotEnoughBytes);
    }

    let mut timestamp_field = None;
    let mut message_length = None;
    let mut message_type_id = None;
    let mut message_stream_id = None;
    {
        let mut cursor = Cursor::new(&buffer[index..header_end]);
        if format != ChunkHeaderFormat::Empty {
            timestamp_field = Some(cursor.read_u24::<BigEndian>()?);
        }

        if format == ChunkHeaderFormat::Full
            || format == ChunkHeaderFormat::TimeDeltaWithoutMessageStreamId
        {
            message_length = Some(cursor.read_u24::<BigEndian>()?);
            message_type_id = Some(cursor.read_u8()?);
        }

        if format == ChunkHeaderFormat::Full {
            message_stream_id = Some(cursor.read_u32::<LittleEndian>()?);
        }
    }

    index = header_end;

    let has_extended_timestamp = match (timestamp_field, &previous) {
        (Some(field), _) => field == EXTENDED_TIMESTAMP_SENTINEL,
        (None, Some(previous)) => previous.header.has_extended_timestamp,
        (None, None) => false,
    };

    let mut extended_timestamp = None;
    if has_extended_timestamp {
        if buffer.len() < index + 4 {
            return Ok(ParsedValue::NotEnoughBytes);
        }

        let mut cursor = Cursor::new(&buffer[index..index + 4]);
        extended_timestamp = Some(cursor.read_u32::<BigEndian>()?);
        index += 4;
    }

    let message_header = match previous {
        None => MessageHeader {
            timestamp: RtmpTimestamp::new(extended_timestamp.or(timestamp_field).unwrap_or(0)),
            timestamp_delta: 0,
            has_extended_timestamp,
            message_length: message_length.unwrap_or(0),
            message_type_id: message_type_id.unwrap_or(0),
            message_stream_id: message_stream_id.unwrap_or(0),
        },

        Some(previous) => {
            let last = previous.header;
            let (timestamp, timestamp_delta) = match format {
                ChunkHeaderFormat::Full => (
                    RtmpTimestamp::new(extended_timestamp.or(timestamp_field).unwrap_or(0)),
                    0,
                ),

                ChunkHeaderFormat::Empty if previous.message_in_progress => {
                    // Later chunks of a split message belong to a message whose timestamp
                    // was already worked out; their extended timestamp only repeats it.
                    (last.timestamp, last.timestamp_delta)
                }

                ChunkHeaderFormat::Empty => {
                    (last.timestamp + last.timestamp_delta, last.timestamp_delta)
                }

                _ => {
                    let delta = extended_timestamp.or(timestamp_field).unwrap_or(0);
                    (last.timestamp + delta, delta)
                }
            };

            MessageHeader {
                timestamp,
                timestamp_delta,
                has_extended_timestamp,
                message_length: message_length.unwrap_or(last.message_length),
                message_type_id: message_type_id.unwrap_or(last.message_type_id),
                message_stream_id: message_stream_id.unwrap_or(last.message_stream_id),
            }
        }
    };

    if csid == PROTOCOL_CONTROL_CSID && !(1..=6).contains(&message_header.message_type_id) {
        return Err(ChunkDeserializationError::ReservedStreamId {
            message_type_id: message_header.message_type_id,
        });
    }

    Ok(ParsedValue::Value {
        val: ChunkHeader {
            chunk_stream_id: csid,
            format,
            message_header,
        },
        next_index: index,
    })
}
