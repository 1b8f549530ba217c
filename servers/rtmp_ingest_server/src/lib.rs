//! A tokio based RTMP ingest endpoint.
//!
//! Every accepted TCP connection is driven by its own task, which feeds the bytes it reads into
//! an `rml_rtmp_framing` server session and writes back whatever the session asks for.

pub mod config;
pub mod connection;
pub mod dispatch;
pub mod errors;

use crate::config::ConnectionSettings;
use crate::connection::Connection;
use std::fmt::Display;
use std::future::Future;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Accepts connections forever, spawning a task for each one.  A failed accept is logged and
/// does not stop the listener.
pub async fn serve(listener: TcpListener, settings: ConnectionSettings) {
    if let Ok(address) = listener.local_addr() {
        info!(%address, "Listening for RTMP connections");
    }

    let mut current_id: u64 = 0;
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(error) => {
                error!(%error, "Failed to accept connection");
                continue;
            }
        };

        info!(connection_id = current_id, %peer, "Connection received");

        let connection = Connection::new(current_id, peer, &settings);
        spawn(current_id, connection.run(stream));
        current_id += 1;
    }
}

fn spawn<F, E>(connection_id: u64, future: F)
where
    F: Future<Output = Result<(), E>> + Send + 'static,
    E: Display,
{
    tokio::task::spawn(async move {
        match future.await {
            Ok(()) => info!(connection_id, "Client disconnected"),
            Err(error) => warn!(connection_id, %error, "Connection closed"),
        }
    });
}
