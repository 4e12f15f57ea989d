//! HTTP API: server, response types, and the SSE log channel.

pub mod logs;
pub mod server;
pub mod types;
