//! Sans-I/O building blocks for the server side of an RTMP connection.
//!
//! Nothing in this crate touches a socket.  Bytes read from the peer are handed to a
//! [`sessions::ServerSession`], which performs the RTMP handshake, reassembles RTMP chunks into
//! complete messages and reports what the owning application needs to write back or act on.

pub mod chunk_io;
pub mod handshake;
pub mod messages;
pub mod sessions;
pub mod time;
