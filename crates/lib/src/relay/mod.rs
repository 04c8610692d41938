//! Relay server and wire protocol.

pub mod protocol;
mod server;

pub use server::{router, run_relay, RelayState};
