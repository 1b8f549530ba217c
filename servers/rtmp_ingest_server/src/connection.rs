use crate::config::ConnectionSettings;
use crate::dispatch::MessageDispatcher;
use crate::errors::ConnectionError;
use rml_rtmp_framing::sessions::{
    ServerSession, ServerSessionEvent, ServerSessionResult,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

const READ_BUFFER_SIZE: usize = 4096;

/// One client connection.  Owns its session, so nothing is shared with other connections.
pub struct Connection {
    id: u64,
    peer: SocketAddr,
    session: ServerSession,
    dispatcher: MessageDispatcher,
    idle_timeout: Option<Duration>,
}

impl Connection {
    pub fn new(id: u64, peer: SocketAddr, settings: &ConnectionSettings) -> Self {
        Connection {
            id,
            peer,
            session: ServerSession::new(settings.session.clone()),
            dispatcher: MessageDispatcher::new(id),
            idle_timeout: settings.idle_timeout,
        }
    }

    /// Reads from the client until it disconnects or an error occurs.  Any error is fatal for
    /// this connection only.
    pub async fn run<S>(mut self, mut stream: S) -> Result<(), ConnectionError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let result = self.process(&mut stream).await;

        info!(
            connection_id = self.id,
            peer = %self.peer,
            messages = self.dispatcher.total(),
            "Connection finished"
        );

        for (message_type, count) in self.dispatcher.summary() {
            debug!(connection_id = self.id, message_type = ?message_type, count, "Message count");
        }

        result
    }

    async fn process<S>(&mut self, stream: &mut S) -> Result<(), ConnectionError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut buffer = [0_u8; READ_BUFFER_SIZE];

        loop {
            let bytes_read = self.read(stream, &mut buffer).await?;
            if bytes_read == 0 {
                self.session.end_of_stream()?;
                return Ok(());
            }

            let results = self.session.handle_input(&buffer[..bytes_read])?;
            for result in results {
                match result {
                    ServerSessionResult::OutboundResponse(bytes) => {
                        stream.write_all(&bytes).await?;
                    }

                    ServerSessionResult::RaisedEvent(event) => self.handle_raised_event(event),
                }
            }
        }
    }

    async fn read<S>(&self, stream: &mut S, buffer: &mut [u8]) -> Result<usize, ConnectionError>
    where
        S: AsyncRead + Unpin,
    {
        match self.idle_timeout {
            None => Ok(stream.read(buffer).await?),
            Some(duration) => match tokio::time::timeout(duration, stream.read(buffer)).await {
                Ok(result) => Ok(result?),
                Err(_) => Err(ConnectionError::IdleTimeout(duration)),
            },
        }
    }

    fn handle_raised_event(&mut self, event: ServerSessionEvent) {
        match event {
            ServerSessionEvent::HandshakeCompleted => {
                info!(connection_id = self.id, peer = %self.peer, "Handshake completed");
            }

            ServerSessionEvent::ClientChunkSizeChanged { new_chunk_size } => {
                debug!(connection_id = self.id, new_chunk_size, "Client changed chunk size");
            }

            ServerSessionEvent::MessageReceived {
                message_type,
                payload,
            } => self.dispatcher.dispatch(message_type, payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rml_rtmp_framing::handshake::PACKET_SIZE;
    use rml_rtmp_framing::sessions::ServerSessionError;
    use tokio::io::duplex;

    fn peer() -> SocketAddr {
        "127.0.0.1:5000".parse().unwrap()
    }

    #[tokio::test]
    async fn clean_disconnect_after_handshake_is_ok() {
        let connection = Connection::new(1, peer(), &ConnectionSettings::default());
        let (mut client, server) = duplex(16 * 1024);
        let task = tokio::spawn(connection.run(server));

        let mut c0_c1 = vec![3_u8];
        c0_c1.extend_from_slice(&[0_u8; PACKET_SIZE]);
        client.write_all(&c0_c1).await.unwrap();

        let mut s0_s1 = vec![0_u8; 1 + PACKET_SIZE];
        client.read_exact(&mut s0_s1).await.unwrap();
        assert_eq!(s0_s1[0], 3);

        client.write_all(&[0_u8; PACKET_SIZE]).await.unwrap();
        let mut s2 = vec![0_u8; PACKET_SIZE];
        client.read_exact(&mut s2).await.unwrap();

        drop(client);
        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn disconnect_mid_handshake_is_an_error() {
        let connection = Connection::new(2, peer(), &ConnectionSettings::default());
        let (mut client, server) = duplex(16 * 1024);
        let task = tokio::spawn(connection.run(server));

        client.write_all(&[3_u8, 1, 2, 3]).await.unwrap();
        drop(client);

        match task.await.unwrap() {
            Err(ConnectionError::Session(ServerSessionError::HandshakeError(_))) => (),
            x => panic!("Expected handshake error, instead received {:?}", x),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn silent_client_hits_idle_timeout() {
        let settings = ConnectionSettings {
            idle_timeout: Some(Duration::from_secs(5)),
            ..ConnectionSettings::default()
        };

        let connection = Connection::new(3, peer(), &settings);
        let (_client, server) = duplex(1024);

        match connection.run(server).await {
            Err(ConnectionError::IdleTimeout(duration)) => {
                assert_eq!(duration, Duration::from_secs(5))
            }
            x => panic!("Expected idle timeout, instead received {:?}", x),
        }
    }
}
