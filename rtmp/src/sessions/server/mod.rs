mod config;
mod errors;
mod events;
mod result;


use crate::chunk_io::ChunkDeserializer;
use crate::handshake::{Handshake, HandshakeProcessResult, HandshakeStage};
use crate::messages::{MessagePayload, MessageType, SetChunkSize};

pub use self::config::ServerSessionConfig;
pub use self::errors::ServerSessionError;
pub use self::events::ServerSessionEvent;
pub use self::result::ServerSessionResult;

/// A session that represents the server side of a single RTMP connection.
///
/// The `ServerSession` performs the RTMP handshake with the client, then parses the RTMP chunks
/// coming in from the client into complete RTMP messages.  `SetChunkSize` messages are applied
/// to the chunk stream immediately.  Every other message is raised as an event for the
/// application to route to whatever decodes that message type.
///
/// The `ServerSession` does not care how bytes come in or get sent out, but leaves that up to
/// the application utilizing the `ServerSession`.
///
/// Due to the header compression properties of the RTMP chunking protocol it is required that
/// every byte received from the client is passed into the `ServerSession` exactly once and in
/// order.  Any error returned is fatal for the connection, as the position of the next chunk
/// boundary can no longer be known.
pub struct ServerSession {
    handshake: Handshake,
    deserializer: ChunkDeserializer,
}

impl ServerSession {
    /// Creates a new server session waiting for the client to start the handshake
    pub fn new(config: ServerSessionConfig) -> ServerSession {
        let mut deserializer = ChunkDeserializer::new();
        deserializer.set_max_chunk_streams(config.max_chunk_streams);

        ServerSession {
            handshake: Handshake::new(config.handshake_mode),
            deserializer,
        }
    }

    /// Takes in bytes received from the client and returns any responses that must be sent
    /// back, along with any events raised by the bytes that were read.
    pub fn handle_input(
        &mut self,
        bytes: &[u8],
    ) -> Result<Vec<ServerSessionResult>, ServerSessionError> {
        let mut results = Vec::new();

        if self.handshake.is_completed() {
            self.read_messages(bytes, &mut results)?;
            return Ok(results);
        }

        match self.handshake.process_bytes(bytes)? {
            HandshakeProcessResult::InProgress { response_bytes } => {
                if !response_bytes.is_empty() {
                    results.push(ServerSessionResult::OutboundResponse(response_bytes));
                }
            }

            HandshakeProcessResult::Completed {
                response_bytes,
                remaining_bytes,
            } => {
                if !response_bytes.is_empty() {
                    results.push(ServerSessionResult::OutboundResponse(response_bytes));
                }

                results.push(ServerSessionResult::RaisedEvent(
                    ServerSessionEvent::HandshakeCompleted,
                ));

                self.read_messages(&remaining_bytes, &mut results)?;
            }
        }

        Ok(results)
    }

    /// Notifies the session that the client closed the connection.  Returns an error if the
    /// client stopped partway through the handshake or partway through a chunk.
    pub fn end_of_stream(&mut self) -> Result<(), ServerSessionError> {
        if !self.handshake.is_completed() {
            self.handshake.end_of_stream()?;
        }

        self.deserializer.end_of_stream()?;
        Ok(())
    }

    pub fn is_handshake_completed(&self) -> bool {
        self.handshake.is_completed()
    }

    pub fn handshake_stage(&self) -> HandshakeStage {
        self.handshake.stage()
    }

    /// The maximum chunk size the client has told us it will be sending
    pub fn get_max_chunk_size(&self) -> usize {
        self.deserializer.get_max_chunk_size()
    }

    fn read_messages(
        &mut self,
        bytes: &[u8],
        results: &mut Vec<ServerSessionResult>,
    ) -> Result<(), ServerSessionError> {
        let mut bytes_to_process = bytes;

        // A SetChunkSize message must be applied before the next chunk is read, so the
        // deserializer hands back one message at a time.
        while let Some(payload) = self.deserializer.get_next_message(bytes_to_process)? {
            bytes_to_process = &[];

            let event = self.dispatch(payload)?;
            results.push(ServerSessionResult::RaisedEvent(event));
        }

        Ok(())
    }

    fn dispatch(&mut self, payload: MessagePayload) -> Result<ServerSessionEvent, ServerSessionError> {
        let message_type = payload.message_type();
        match message_type {
            MessageType::SetChunkSize => {
                let message = SetChunkSize::deserialize(&payload.data[..])?;
                self.deserializer.set_max_chunk_size(message.size as usize)?;

                Ok(ServerSessionEvent::ClientChunkSizeChanged {
                    new_chunk_size: message.size,
                })
            }

            _ => {
                tracing::trace!(
                    type_id = payload.type_id,
                    csid = payload.chunk_stream_id,
                    length = payload.data.len(),
                    "Message received"
                );

                Ok(ServerSessionEvent::MessageReceived {
                    message_type,
                    payload,
                })
            }
        }
    }
}
