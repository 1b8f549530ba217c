use super::chunk_header::{decode_chunk_header, MessageHeader, ParsedValue, PreviousChunk};
use super::{ChunkDeserializationError, ChunkHeaderFormat, INITIAL_MAX_CHUNK_SIZE, MAX_CHUNK_SIZE_LIMIT};
use crate::messages::MessagePayload;
use crate::time::RtmpTimestamp;
use bytes::{Buf, BytesMut};
use std::cmp::min;
use std::collections::HashMap;

/// Allows deserializing bytes representing RTMP chunks into RTMP message payloads.
///
/// Due to the nature of the RTMP chunk protocol it is required that every byte going through the
/// wire is sent to the same `ChunkDeserializer` instance, as future chunks can rely on previous
/// chunks, so any chunks missing from the stream may cause deserialization errors.
///
/// Every chunk stream id keeps its own header state and its own partially reassembled message,
/// so chunks belonging to different chunk streams may be interleaved freely.
pub struct ChunkDeserializer {
    max_chunk_size: usize,
    max_chunk_streams: Option<usize>,
    buffer: BytesMut,
    chunk_streams: HashMap<u32, ChunkStreamState>,
}

struct ChunkStreamState {
    last_header: MessageHeader,
    in_progress: Option<PartialMessage>,
}

struct PartialMessage {
    timestamp: RtmpTimestamp,
    type_id: u8,
    message_stream_id: u32,
    length: u32,
    data: BytesMut,
}

enum ChunkReadResult {
    NotEnoughBytes,
    ChunkConsumed,
    MessageCompleted(MessagePayload),
}

impl ChunkDeserializer {
    /// Create a new `ChunkDeserializer` with its initial properties.
    ///
    /// Per the RTMP specification an initial `ChunkDeserializer` is expecting RTMP chunks with
    /// a max size of 128 bytes, and places no limit on the number of chunk streams.
    pub fn new() -> ChunkDeserializer {
        ChunkDeserializer {
            max_chunk_size: INITIAL_MAX_CHUNK_SIZE,
            max_chunk_streams: None,
            buffer: BytesMut::with_capacity(4096),
            chunk_streams: HashMap::new(),
        }
    }

    /// Attempts to read a complete RTMP message from the passed in bytes.
    ///
    /// It is normal that one set of bytes will not form a complete RTMP message (or even a
    /// complete RTMP chunk).  The deserializer stores all bytes passed into it, so the same bytes
    /// must not be passed in twice.
    ///
    /// If the bytes that were passed in formed multiple RTMP messages then only the first message
    /// is returned.  Consumers are expected to call `get_next_message()` with an empty slice in a
    /// loop until `None` is returned.  This gives the consumer a chance to act on a `SetChunkSize`
    /// message (by calling `set_max_chunk_size()`) before the next chunk is read.
    ///
    /// ## Examples
    ///
    /// ```
    /// use bytes::Bytes;
    /// use rml_rtmp_framing::chunk_io::{ChunkDeserializer, ChunkSerializer};
    /// use rml_rtmp_framing::messages::MessagePayload;
    /// use rml_rtmp_framing::time::RtmpTimestamp;
    ///
    /// let input1 = MessagePayload {
    ///     timestamp: RtmpTimestamp::new(55),
    ///     type_id: 9,
    ///     message_stream_id: 1,
    ///     chunk_stream_id: 6,
    ///     data: Bytes::from(vec![1, 2, 3, 4, 5, 6]),
    /// };
    ///
    /// let input2 = MessagePayload {
    ///     timestamp: RtmpTimestamp::new(65),
    ///     data: Bytes::from(vec![8, 9, 10]),
    ///     ..input1.clone()
    /// };
    ///
    /// let mut serializer = ChunkSerializer::new();
    /// let mut all_bytes = serializer.serialize(&input1, false).unwrap();
    /// all_bytes.extend(serializer.serialize(&input2, false).unwrap());
    ///
    /// let mut deserializer = ChunkDeserializer::new();
    /// assert_eq!(deserializer.get_next_message(&all_bytes).unwrap(), Some(input1));
    /// assert_eq!(deserializer.get_next_message(&[]).unwrap(), Some(input2));
    /// assert_eq!(deserializer.get_next_message(&[]).unwrap(), None);
    /// ```
    pub fn get_next_message(
        &mut self,
        bytes: &[u8],
    ) -> Result<Option<MessagePayload>, ChunkDeserializationError> {
        self.buffer.extend_from_slice(bytes);

        loop {
            match self.read_chunk()? {
                ChunkReadResult::NotEnoughBytes => return Ok(None),
                ChunkReadResult::ChunkConsumed => continue,
                ChunkReadResult::MessageCompleted(payload) => return Ok(Some(payload)),
            }
        }
    }

    /// Tells the deserializer that the peer will start sending RTMP chunks with a different
    /// max chunk size.
    ///
    /// The sender and the receiver must be exactly in tune as to what max chunk size they are
    /// utilizing, so this should only be called in reaction to a `SetChunkSize` message from
    /// the peer, and before any further chunk is read.
    pub fn set_max_chunk_size(&mut self, new_size: usize) -> Result<(), ChunkDeserializationError> {
        if new_size == 0 || new_size > MAX_CHUNK_SIZE_LIMIT {
            return Err(ChunkDeserializationError::InvalidMaxChunkSize {
                chunk_size: new_size,
            });
        }

        tracing::debug!(old = self.max_chunk_size, new = new_size, "Max inbound chunk size changed");
        self.max_chunk_size = new_size;
        Ok(())
    }

    /// Returns the maximum size of any RTMP chunks that should be received
    pub fn get_max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// Limits how many distinct chunk stream ids the peer may use.  `None` removes the limit.
    pub fn set_max_chunk_streams(&mut self, limit: Option<usize>) {
        self.max_chunk_streams = limit;
    }

    /// The number of chunk streams the peer has used so far
    pub fn chunk_stream_count(&self) -> usize {
        self.chunk_streams.len()
    }

    /// Checks that the peer did not stop partway through a chunk.
    ///
    /// Messages that were split over multiple chunks and never finished are simply dropped, as
    /// the connection is over anyway.
    pub fn end_of_stream(&self) -> Result<(), ChunkDeserializationError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        match self.decode_header()? {
            ParsedValue::NotEnoughBytes => Err(ChunkDeserializationError::IncompleteHeader {
                buffered: self.buffer.len(),
            }),

            ParsedValue::Value { val, .. } => Err(ChunkDeserializationError::IncompletePayload {
                csid: val.chunk_stream_id,
            }),
        }
    }

    fn decode_header(
        &self,
    ) -> Result<ParsedValue<super::ChunkHeader>, ChunkDeserializationError> {
        let chunk_streams = &self.chunk_streams;
        decode_chunk_header(&self.buffer[..], |csid| {
            chunk_streams.get(&csid).map(|state| PreviousChunk {
                header: &state.last_header,
                message_in_progress: state.in_progress.is_some(),
            })
        })
    }

    fn read_chunk(&mut self) -> Result<ChunkReadResult, ChunkDeserializationError> {
        let (header, header_length) = match self.decode_header()? {
            ParsedValue::NotEnoughBytes => return Ok(ChunkReadResult::NotEnoughBytes),
            ParsedValue::Value { val, next_index } => (val, next_index),
        };

        let csid = header.chunk_stream_id;
        let declared_length = header.message_header.message_length;
        let remaining = match self.chunk_streams.get(&csid) {
            None => {
                if let Some(limit) = self.max_chunk_streams {
                    if self.chunk_streams.len() >= limit {
                        return Err(ChunkDeserializationError::TooManyChunkStreams { limit });
                    }
                }

                declared_length
            }

            Some(ChunkStreamState {
                in_progress: Some(partial),
                ..
            }) => {
                if header.format != ChunkHeaderFormat::Empty && declared_length != partial.length {
                    return Err(ChunkDeserializationError::MessageLengthConflict {
                        csid,
                        in_progress: partial.length,
                        declared: declared_length,
                    });
                }

                partial.length - partial.data.len() as u32
            }

            Some(_) => declared_length,
        };

        let chunk_length = min(remaining as usize, self.max_chunk_size);
        if self.buffer.len() < header_length + chunk_length {
            return Ok(ChunkReadResult::NotEnoughBytes);
        }

        self.buffer.advance(header_length);
        let chunk_data = self.buffer.split_to(chunk_length);

        let message_header = header.message_header;
        let state = self.chunk_streams.entry(csid).or_insert_with(|| {
            tracing::trace!(csid, "New chunk stream");
            ChunkStreamState {
                last_header: message_header.clone(),
                in_progress: None,
            }
        });

        let mut partial = match state.in_progress.take() {
            Some(partial) => partial,
            None => PartialMessage {
                timestamp: message_header.timestamp,
                type_id: message_header.message_type_id,
                message_stream_id: message_header.message_stream_id,
                length: message_header.message_length,
                data: BytesMut::with_capacity(message_header.message_length as usize),
            },
        };

        state.last_header = message_header;
        partial.data.extend_from_slice(&chunk_data[..]);

        if partial.data.len() < partial.length as usize {
            state.in_progress = Some(partial);
            return Ok(ChunkReadResult::ChunkConsumed);
        }

        Ok(ChunkReadResult::MessageCompleted(MessagePayload {
            timestamp: partial.timestamp,
            type_id: partial.type_id,
            message_stream_id: partial.message_stream_id,
            chunk_stream_id: csid,
            data: partial.data.freeze(),
        }))
    }
}

impl Default for ChunkDeserializer {
    fn default() -> Self {
        ChunkDeserializer::new()
    }
}
