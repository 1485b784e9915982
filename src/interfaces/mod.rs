//! Inbound interfaces: the REST API and the notification WebSocket

pub mod http;
pub mod ws;
