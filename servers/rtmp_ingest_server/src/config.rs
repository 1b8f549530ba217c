use clap::{Parser, ValueEnum};
use rml_rtmp_framing::handshake::HandshakeResponseMode;
use rml_rtmp_framing::sessions::ServerSessionConfig;
use std::net::SocketAddr;
use std::time::Duration;

/// Accepts RTMP connections, performs the handshake and reassembles RTMP messages
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Address to listen for RTMP connections on
    #[arg(long, default_value = "0.0.0.0:1935")]
    pub listen: SocketAddr,

    /// How S1 and S2 are formed during the handshake
    #[arg(long, value_enum, default_value_t = HandshakeMode::Echo)]
    pub handshake_mode: HandshakeMode,

    /// Maximum number of chunk streams a single client may open
    #[arg(long)]
    pub max_chunk_streams: Option<usize>,

    /// Disconnect clients that send nothing for this many seconds
    #[arg(long)]
    pub idle_timeout_secs: Option<u64>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HandshakeMode {
    Echo,
    Generate,
}

impl From<HandshakeMode> for HandshakeResponseMode {
    fn from(mode: HandshakeMode) -> Self {
        match mode {
            HandshakeMode::Echo => HandshakeResponseMode::Echo,
            HandshakeMode::Generate => HandshakeResponseMode::Generate,
        }
    }
}

/// Everything a connection task needs to know, shared by every accepted connection
#[derive(Debug, Clone, Default)]
pub struct ConnectionSettings {
    pub session: ServerSessionConfig,
    pub idle_timeout: Option<Duration>,
}

impl From<&Args> for ConnectionSettings {
    fn from(args: &Args) -> Self {
        let mut session = ServerSessionConfig::new();
        session.handshake_mode = args.handshake_mode.into();
        session.max_chunk_streams = args.max_chunk_streams;

        ConnectionSettings {
            session,
            idle_timeout: args.idle_timeout_secs.map(Duration::from_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_plain_rtmp_server() {
        let args = Args::try_parse_from(["rtmp_ingest_server"]).unwrap();
        assert_eq!(args.listen, "0.0.0.0:1935".parse().unwrap());
        assert_eq!(args.handshake_mode, HandshakeMode::Echo);
        assert_eq!(args.log_level, "info");

        let settings = ConnectionSettings::from(&args);
        assert_eq!(settings.session.handshake_mode, HandshakeResponseMode::Echo);
        assert_eq!(settings.session.max_chunk_streams, None);
        assert_eq!(settings.idle_timeout, None);
    }

    #[test]
    fn hardening_options_flow_into_connection_settings() {
        let args = Args::try_parse_from([
            "rtmp_ingest_server",
            "--listen",
            "127.0.0.1:19350",
            "--handshake-mode",
            "generate",
            "--max-chunk-streams",
            "64",
            "--idle-timeout-secs",
            "30",
        ])
        .unwrap();

        let settings = ConnectionSettings::from(&args);
        assert_eq!(args.listen.port(), 19350);
        assert_eq!(settings.session.handshake_mode, HandshakeResponseMode::Generate);
        assert_eq!(settings.session.max_chunk_streams, Some(64));
        assert_eq!(settings.idle_timeout, Some(Duration::from_secs(30)));
    }
}
