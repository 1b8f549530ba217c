use rml_rtmp_framing::messages::{MessagePayload, MessageType};
use std::collections::HashMap;
use tracing::debug;

/// Where reassembled messages end up.  Decoding command, media and control bodies happens in
/// higher layers, so for now each message is counted by type and logged.
pub struct MessageDispatcher {
    connection_id: u64,
    counts: HashMap<MessageType, u64>,
}

impl MessageDispatcher {
    pub fn new(connection_id: u64) -> Self {
        MessageDispatcher {
            connection_id,
            counts: HashMap::new(),
        }
    }

    pub fn dispatch(&mut self, message_type: MessageType, payload: MessagePayload) {
        *self.counts.entry(message_type).or_insert(0) += 1;

        debug!(
            connection_id = self.connection_id,
            message_type = ?message_type,
            csid = payload.chunk_stream_id,
            message_stream_id = payload.message_stream_id,
            timestamp = payload.timestamp.value,
            length = payload.data.len(),
            "Message received"
        );
    }

    pub fn count(&self, message_type: MessageType) -> u64 {
        self.counts.get(&message_type).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Message counts ordered by type id, for the summary logged when the connection closes
    pub fn summary(&self) -> Vec<(MessageType, u64)> {
        let mut counts: Vec<(MessageType, u64)> =
            self.counts.iter().map(|(kind, count)| (*kind, *count)).collect();

        counts.sort_by_key(|(kind, _)| kind.type_id());
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use rml_rtmp_framing::time::RtmpTimestamp;

    fn payload(type_id: u8) -> MessagePayload {
        MessagePayload {
            timestamp: RtmpTimestamp::new(0),
            type_id,
            message_stream_id: 1,
            chunk_stream_id: 4,
            data: Bytes::from_static(&[1, 2, 3]),
        }
    }

    #[test]
    fn counts_messages_per_type() {
        let mut dispatcher = MessageDispatcher::new(7);
        for type_id in [9_u8, 8, 9, 20, 9].iter() {
            let payload = payload(*type_id);
            dispatcher.dispatch(payload.message_type(), payload);
        }

        assert_eq!(dispatcher.count(MessageType::Video), 3);
        assert_eq!(dispatcher.count(MessageType::Audio), 1);
        assert_eq!(dispatcher.count(MessageType::Amf0Data), 0);
        assert_eq!(dispatcher.total(), 5);
        assert_eq!(
            dispatcher.summary(),
            vec![
                (MessageType::Audio, 1),
                (MessageType::Video, 3),
                (MessageType::Amf0Command, 1),
            ]
        );
    }
}
