use crate::handshake::HandshakeResponseMode;

/// The configuration options that govern how a RTMP server session should operate
#[derive(Clone, Debug)]
pub struct ServerSessionConfig {
    pub handshake_mode: HandshakeResponseMode,

    /// The most chunk stream ids a client may use on one connection.  `None` means unbounded.
    pub max_chunk_streams: Option<usize>,
}

impl ServerSessionConfig {
    /// Creates a new server session config with overridable defaults
    pub fn new() -> ServerSessionConfig {
        ServerSessionConfig {
            handshake_mode: HandshakeResponseMode::Echo,
            max_chunk_streams: None,
        }
    }
}

impl Default for ServerSessionConfig {
    fn default() -> Self {
        ServerSessionConfig::new()
    }
}
