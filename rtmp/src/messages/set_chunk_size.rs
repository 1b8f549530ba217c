use super::{MessageDeserializationError, MessageSerializationError};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use std::io::Cursor;

const MAX_SIZE: u32 = 0x8000_0000 - 1;

/// Tells the peer that the maximum chunk size for RTMP chunks it will be receiving is changing
/// to the specified size.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct SetChunkSize {
    pub size: u32,
}

impl SetChunkSize {
    pub fn serialize(&self) -> Result<Bytes, MessageSerializationError> {
        if self.size == 0 || self.size > MAX_SIZE {
            return Err(MessageSerializationError::InvalidChunkSize { size: self.size });
        }

        let mut cursor = Cursor::new(Vec::with_capacity(4));
        cursor.write_u32::<BigEndian>(self.size)?;

        Ok(Bytes::from(cursor.into_inner()))
    }

    /// Reads the first 4 bytes of the payload as the new chunk size.  The top bit is reserved
    /// and must be zero.
    pub fn deserialize(data: &[u8]) -> Result<SetChunkSize, MessageDeserializationError> {
        let mut cursor = Cursor::new(data);
        let size = cursor.read_u32::<BigEndian>()?;

        if size == 0 || size > MAX_SIZE {
            return Err(MessageDeserializationError::InvalidChunkSize { size });
        }

        Ok(SetChunkSize { size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_serialize_message() {
        let size = 523;

        let mut cursor = Cursor::new(Vec::new());
        cursor.write_u32::<BigEndian>(size).unwrap();
        let expected = cursor.into_inner();

        let raw_message = SetChunkSize { size }.serialize().unwrap();

        assert_eq!(&raw_message[..], &expected[..]);
    }

    #[test]
    fn can_deserialize_message() {
        let size = 532;
        let mut cursor = Cursor::new(Vec::new());
        cursor.write_u32::<BigEndian>(size).unwrap();

        let result = SetChunkSize::deserialize(&cursor.into_inner()).unwrap();
        assert_eq!(result, SetChunkSize { size });
    }

    #[test]
    fn zero_and_top_bit_sizes_are_rejected() {
        for data in [[0_u8, 0, 0, 0], [0x80, 0, 0, 0], [0xff, 0xff, 0xff, 0xff]].iter() {
            match SetChunkSize::deserialize(&data[..]) {
                Err(MessageDeserializationError::InvalidChunkSize { .. }) => (),
                x => panic!("Expected InvalidChunkSize, instead received {:?}", x),
            }
        }
    }

    #[test]
    fn short_payload_is_an_io_error() {
        match SetChunkSize::deserialize(&[0, 0, 1]) {
            Err(MessageDeserializationError::Io(_)) => (),
            x => panic!("Expected Io error, instead received {:?}", x),
        }
    }

    #[test]
    fn cannot_serialize_size_over_31_bits() {
        match (SetChunkSize { size: 0x8000_0000 }).serialize() {
            Err(MessageSerializationError::InvalidChunkSize { size: 0x8000_0000 }) => (),
            x => panic!("Expected InvalidChunkSize, instead received {:?}", x),
        }
    }
}
