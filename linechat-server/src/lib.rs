//! Broadcast chat server.
//!
//! [`Server`] accepts TCP connections and spawns one handler task per
//! connection; handlers share a registry of live peers and relay
//! every chat frame to all of them. Exposed as a library so the
//! integration tests can run a real listener on an ephemeral port.

mod connection;
mod registry;
mod server;

pub use server::Server;
