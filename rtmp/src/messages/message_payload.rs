use super::MessageType;
use crate::time::RtmpTimestamp;
use bytes::Bytes;

/// Represents a complete, reassembled RTMP message
#[derive(PartialEq, Debug, Clone)]
pub struct MessagePayload {
    pub timestamp: RtmpTimestamp,
    pub type_id: u8,
    pub message_stream_id: u32,

    /// The chunk stream the message arrived on (or should be sent out on)
    pub chunk_stream_id: u32,
    pub data: Bytes,
}

impl MessagePayload {
    pub fn message_type(&self) -> MessageType {
        MessageType::from(self.type_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_type_follows_type_id() {
        let payload = MessagePayload {
            timestamp: RtmpTimestamp::new(0),
            type_id: 20,
            message_stream_id: 0,
            chunk_stream_id: 3,
            data: Bytes::new(),
        };

        assert_eq!(payload.message_type(), MessageType::Amf0Command);
    }
}
