/*!
This module contains the RTMP message types the framing layer knows about.

`MessagePayload`s are complete, reassembled RTMP messages along with auxiliary data about them,
such as what message stream they are meant for, their timestamp and what type of message they
are.  Apart from `SetChunkSize`, message bodies are left for higher layers to decode.
*/

mod errors;
mod message_payload;
mod set_chunk_size;

pub use self::errors::{MessageDeserializationError, MessageSerializationError};
pub use self::message_payload::MessagePayload;
pub use self::set_chunk_size::SetChunkSize;

/// The kinds of RTMP messages, keyed by their message type id
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum MessageType {
    SetChunkSize,
    Abort,
    Acknowledgement,
    UserControl,
    WindowAcknowledgementSize,
    SetPeerBandwidth,
    Audio,
    Video,
    Amf3Data,
    Amf3SharedObject,
    Amf3Command,
    Amf0Data,
    Amf0SharedObject,
    Amf0Command,
    Aggregate,

    /// A type id that RTMP does not define
    Unknown(u8),
}

impl MessageType {
    pub fn type_id(self) -> u8 {
        match self {
            MessageType::SetChunkSize => 1,
            MessageType::Abort => 2,
            MessageType::Acknowledgement => 3,
            MessageType::UserControl => 4,
            MessageType::WindowAcknowledgementSize => 5,
            MessageType::SetPeerBandwidth => 6,
            MessageType::Audio => 8,
            MessageType::Video => 9,
            MessageType::Amf3Data => 15,
            MessageType::Amf3SharedObject => 16,
            MessageType::Amf3Command => 17,
            MessageType::Amf0Data => 18,
            MessageType::Amf0SharedObject => 19,
            MessageType::Amf0Command => 20,
            MessageType::Aggregate => 22,
            MessageType::Unknown(type_id) => type_id,
        }
    }

    /// Protocol control messages (type ids 1 through 6) manage the chunk stream itself and are
    /// the only messages allowed on chunk stream 2
    pub fn is_protocol_control(self) -> bool {
        (1..=6).contains(&self.type_id())
    }
}

impl From<u8> for MessageType {
    fn from(type_id: u8) -> Self {
        match type_id {
            1 => MessageType::SetChunkSize,
            2 => MessageType::Abort,
            3 => MessageType::Acknowledgement,
            4 => MessageType::UserControl,
            5 => MessageType::WindowAcknowledgementSize,
            6 => MessageType::SetPeerBandwidth,
            8 => MessageType::Audio,
            9 => MessageType::Video,
            15 => MessageType::Amf3Data,
            16 => MessageType::Amf3SharedObject,
            17 => MessageType::Amf3Command,
            18 => MessageType::Amf0Data,
            19 => MessageType::Amf0SharedObject,
            20 => MessageType::Amf0Command,
            22 => MessageType::Aggregate,
            x => MessageType::Unknown(x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_type_id_maps_back_to_itself() {
        for type_id in 0..=255_u8 {
            assert_eq!(MessageType::from(type_id).type_id(), type_id);
        }
    }

    #[test]
    fn unassigned_type_ids_are_unknown() {
        for type_id in [0_u8, 7, 10, 14, 21, 23, 255].iter() {
            assert_eq!(MessageType::from(*type_id), MessageType::Unknown(*type_id));
        }
    }

    #[test]
    fn only_types_1_through_6_are_protocol_control() {
        let control: Vec<u8> = (0..=255_u8)
            .filter(|x| MessageType::from(*x).is_protocol_control())
            .collect();

        assert_eq!(control, vec![1, 2, 3, 4, 5, 6]);
        assert!(!MessageType::Video.is_protocol_control());
    }
}
