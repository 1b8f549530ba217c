use crate::messages::{MessagePayload, MessageType};

/// An event that a server session can raise
#[derive(Debug, PartialEq, Clone)]
pub enum ServerSessionEvent {
    /// The handshake finished and the client may now send RTMP chunks
    HandshakeCompleted,

    /// The client is changing the maximum size of the RTMP chunks they will be sending
    ClientChunkSizeChanged { new_chunk_size: u32 },

    /// A complete message arrived that the session does not interpret itself.  It is up to the
    /// application to decode the payload based on its message type.
    MessageReceived {
        message_type: MessageType,
        payload: MessagePayload,
    },
}
