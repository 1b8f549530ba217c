//! The plain (version 3) RTMP handshake, as performed by the server.
//!
//! The handshake does not perform any I/O itself.  Bytes read from the client are passed into
//! `process_bytes()`, and every response it returns must be written to the client in order.
//!
//! ```
//! use rml_rtmp_framing::handshake::{Handshake, HandshakeProcessResult, HandshakeResponseMode};
//!
//! let mut handshake = Handshake::new(HandshakeResponseMode::Echo);
//! let mut c0_and_c1 = vec![3_u8];
//! c0_and_c1.extend_from_slice(&[0_u8; 1536]);
//!
//! let s0_and_s1 = match handshake.process_bytes(&c0_and_c1).unwrap() {
//!     HandshakeProcessResult::InProgress { response_bytes } => response_bytes,
//!     x => panic!("Unexpected result: {:?}", x),
//! };
//!
//! assert_eq!(s0_and_s1.len(), 1537);
//! assert_eq!(s0_and_s1[0], 3);
//!
//! match handshake.process_bytes(&[0_u8; 1536]).unwrap() {
//!     HandshakeProcessResult::Completed { response_bytes, remaining_bytes } => {
//!         assert_eq!(response_bytes.len(), 1536);
//!         assert!(remaining_bytes.is_empty());
//!     },
//!     x => panic!("Unexpected result: {:?}", x),
//! }
//!
//! assert!(handshake.is_completed());
//! ```

mod errors;

pub use self::errors::HandshakeError;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use rand::RngCore;
use std::io::{Cursor, Read, Write};
use std::time::Instant;

/// The only RTMP version this handshake accepts (and responds with)
pub const RTMP_VERSION: u8 = 3;

/// The size of the C1, C2, S1 and S2 packets
pub const PACKET_SIZE: usize = 1536;

const RANDOM_DATA_SIZE: usize = PACKET_SIZE - 8;

/// Controls how the S1 and S2 packets are formed
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum HandshakeResponseMode {
    /// S1 is a verbatim copy of C1 and S2 is a verbatim copy of C2
    Echo,

    /// S1 carries our own timestamp and random payload, and S2 echoes C1 back with the time
    /// C1 was read, as laid out by the RTMP specification.
    Generate,
}

impl Default for HandshakeResponseMode {
    fn default() -> Self {
        HandshakeResponseMode::Echo
    }
}

/// The stages a server handshake moves through
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum HandshakeStage {
    AwaitingC0,
    AwaitingC1,

    /// S0 and S1 have been produced and no part of C2 has arrived yet
    SentS0S1,

    /// Part of C2 has arrived
    AwaitingC2,
    Established,
    Failed,
}

/// The result of passing bytes into the handshake
#[derive(PartialEq, Eq, Debug)]
pub enum HandshakeProcessResult {
    /// The handshake needs more bytes.  Any response bytes must be sent to the peer.
    InProgress { response_bytes: Vec<u8> },

    /// The handshake finished.  Response bytes must be sent to the peer, and any remaining bytes
    /// are the start of the chunk stream and must be handed to the chunk deserializer.
    Completed {
        response_bytes: Vec<u8>,
        remaining_bytes: Vec<u8>,
    },
}

/// Performs the server side of the plain RTMP handshake
pub struct Handshake {
    mode: HandshakeResponseMode,
    stage: HandshakeStage,
    started_at: Instant,
    buffer: Vec<u8>,
    c1: Option<ReceivedC1>,
}

struct ReceivedC1 {
    packet: Vec<u8>,
    read_at: u32,
}

impl Handshake {
    /// Creates a new handshake waiting for the client's packet 0
    pub fn new(mode: HandshakeResponseMode) -> Handshake {
        Handshake {
            mode,
            stage: HandshakeStage::AwaitingC0,
            started_at: Instant::now(),
            buffer: Vec::new(),
            c1: None,
        }
    }

    /// The stage the handshake is currently in
    pub fn stage(&self) -> HandshakeStage {
        self.stage
    }

    pub fn is_completed(&self) -> bool {
        self.stage == HandshakeStage::Established
    }

    /// Consumes bytes received from the client, returning any bytes that must be sent back.
    ///
    /// Any error moves the handshake into the `Failed` stage, from which it cannot recover.
    pub fn process_bytes(&mut self, data: &[u8]) -> Result<HandshakeProcessResult, HandshakeError> {
        match self.stage {
            HandshakeStage::Established => return Err(HandshakeError::HandshakeAlreadyCompleted),
            HandshakeStage::Failed => return Err(HandshakeError::HandshakeFailed),
            _ => (),
        }

        self.buffer.extend_from_slice(data);
        match self.advance() {
            Ok(result) => Ok(result),
            Err(error) => {
                self.stage = HandshakeStage::Failed;
                self.buffer.clear();
                Err(error)
            }
        }
    }

    /// Notifies the handshake that the client closed the stream.  Errors if that happened
    /// before the handshake was established.
    pub fn end_of_stream(&mut self) -> Result<(), HandshakeError> {
        match self.stage {
            HandshakeStage::Established => Ok(()),
            HandshakeStage::Failed => Err(HandshakeError::HandshakeFailed),
            stage => {
                let buffered = self.buffer.len();
                self.stage = HandshakeStage::Failed;
                Err(HandshakeError::IncompletePacket { stage, buffered })
            }
        }
    }

    fn advance(&mut self) -> Result<HandshakeProcessResult, HandshakeError> {
        let mut response_bytes = Vec::new();

        loop {
            let starting_stage = self.stage;
            match self.stage {
                HandshakeStage::AwaitingC0 => self.parse_c0()?,
                HandshakeStage::AwaitingC1 => self.parse_c1(&mut response_bytes)?,
                HandshakeStage::SentS0S1 | HandshakeStage::AwaitingC2 => {
                    self.parse_c2(&mut response_bytes)?
                }

                HandshakeStage::Established => {
                    let remaining_bytes = self.buffer.split_off(0);
                    return Ok(HandshakeProcessResult::Completed {
                        response_bytes,
                        remaining_bytes,
                    });
                }

                HandshakeStage::Failed => return Err(HandshakeError::HandshakeFailed),
            }

            if starting_stage == self.stage {
                // Not enough bytes to finish the current packet
                break;
            }
        }

        Ok(HandshakeProcessResult::InProgress { response_bytes })
    }

    fn parse_c0(&mut self) -> Result<(), HandshakeError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        match self.buffer.remove(0) {
            RTMP_VERSION => {
                self.stage = HandshakeStage::AwaitingC1;
                Ok(())
            }

            version => Err(HandshakeError::BadVersionId { version }),
        }
    }

    fn parse_c1(&mut self, response: &mut Vec<u8>) -> Result<(), HandshakeError> {
        if self.buffer.len() < PACKET_SIZE {
            return Ok(());
        }

        let c1: Vec<u8> = self.buffer.drain(..PACKET_SIZE).collect();
        let read_at = self.epoch();

        response.push(RTMP_VERSION);
        match self.mode {
            HandshakeResponseMode::Echo => response.extend_from_slice(&c1),
            HandshakeResponseMode::Generate => {
                response.extend(create_packet(self.epoch(), 0, &create_random_data())?)
            }
        }

        self.c1 = Some(ReceivedC1 { packet: c1, read_at });
        self.stage = HandshakeStage::SentS0S1;
        Ok(())
    }

    fn parse_c2(&mut self, response: &mut Vec<u8>) -> Result<(), HandshakeError> {
        if self.buffer.len() < PACKET_SIZE {
            if !self.buffer.is_empty() {
                self.stage = HandshakeStage::AwaitingC2;
            }

            return Ok(());
        }

        let c2: Vec<u8> = self.buffer.drain(..PACKET_SIZE).collect();
        match (self.mode, self.c1.take()) {
            (HandshakeResponseMode::Generate, Some(c1)) => {
                let mut cursor = Cursor::new(c1.packet);
                let their_time = cursor.read_u32::<BigEndian>()?;
                let _ = cursor.read_u32::<BigEndian>()?;
                let mut random = [0_u8; RANDOM_DATA_SIZE];
                cursor.read_exact(&mut random)?;

                response.extend(create_packet(their_time, c1.read_at, &random)?);
            }

            _ => response.extend(c2),
        }

        tracing::debug!("RTMP handshake established");
        self.stage = HandshakeStage::Established;
        Ok(())
    }

    fn epoch(&self) -> u32 {
        self.started_at.elapsed().as_millis() as u32
    }
}

fn create_packet(time1: u32, time2: u32, random: &[u8]) -> Result<Vec<u8>, HandshakeError> {
    let mut bytes = Cursor::new(Vec::with_capacity(PACKET_SIZE));
    bytes.write_u32::<BigEndian>(time1)?;
    bytes.write_u32::<BigEndian>(time2)?;
    bytes.write_all(random)?;

    Ok(bytes.into_inner())
}

fn create_random_data() -> [u8; RANDOM_DATA_SIZE] {
    let mut random_data = [0_u8; RANDOM_DATA_SIZE];
    rand::thread_rng().fill_bytes(&mut random_data);
    random_data
}
