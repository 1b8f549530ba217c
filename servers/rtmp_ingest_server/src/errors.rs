use rml_rtmp_framing::sessions::ServerSessionError;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Reasons a single client connection is torn down.  None of them affect other connections.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("socket error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Session(#[from] ServerSessionError),

    #[error("no bytes received for {}s", .0.as_secs())]
    IdleTimeout(Duration),
}
