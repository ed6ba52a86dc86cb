//! LexRelay daemon library - exposes modules for testing.

pub mod config;
pub mod dispatch;
pub mod extract;
pub mod middleware;
pub mod personas;
pub mod prompt;
pub mod quality;
pub mod routes;
pub mod server;
