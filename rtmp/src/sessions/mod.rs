/// This module contains implemented session abstractions.
///
/// A session is an abstraction that reacts to incoming bytes (the RTMP handshake followed by
/// RTMP chunks) with bytes to be sent as a response, as well as raising events that
/// applications can perform custom logic on.
mod server;

pub use self::server::ServerSession;
pub use self::server::ServerSessionConfig;
pub use self::server::ServerSessionError;
pub use self::server::ServerSessionEvent;
pub use self::server::ServerSessionResult;
