use super::events::ServerSessionEvent;

/// A single result that is returned when a server session processes some bytes
#[derive(PartialEq, Debug)]
pub enum ServerSessionResult {
    /// Bytes that are slated to be sent to the peer.  These must *ALWAYS* be sent in the order
    /// they were returned, otherwise the peer will fail the handshake.
    OutboundResponse(Vec<u8>),

    /// An event the server session is raising so consuming applications can perform custom logic
    RaisedEvent(ServerSessionEvent),
}
