/// Real-time layer for the chat subsystem: a server actor that keeps the
/// channel rooms, one session actor per WebSocket connection, the tagged
/// client/server message protocol, and the ephemeral typing signal.
pub mod events;
pub mod handler;
pub mod message;
pub mod server;
pub mod session;
pub mod typing;
