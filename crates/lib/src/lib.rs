//! Parley core library — config, relay server, upstream agent client,
//! and the chat session used by the CLI.

pub mod chat;
pub mod client;
pub mod config;
pub mod init;
pub mod relay;
pub mod reply;
pub mod upstream;
