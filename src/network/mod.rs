//! A network abstraction layer for embedded systems
//!
//! This module provides the transport traits the application protocols are
//! written against. A transport is a blocking byte stream whose every
//! operation is bounded by a caller-supplied timeout in milliseconds:
//!
//! - [`Connect`] opens a connection to `host:port` (name resolution included).
//! - [`Read::receive`] blocks until at least `min_len` bytes arrived or the
//!   timeout expired, then takes whatever else is already available without
//!   blocking further.
//! - [`Write::send_all`] returns only after every byte was accepted; a peer
//!   that closed the stream is reported as `Ok(0)`.
//! - [`Close`] tracks and tears down the connection state.
//!

#![allow(missing_docs)]
#![deny(unsafe_code)]

/// Common error types for network operations
pub mod error;

/// Application layer protocols
pub mod application;

/// Blocking TCP transport over `std::net`
#[cfg(feature = "std")]
pub mod tcp;

/// Re-exports of common traits
pub mod prelude {
    pub use super::{Close, Connect, Connection, Read, Write};
}

/// Default timeout applied to every socket operation, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u32 = 15_000;

pub trait Read {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Receive between `min_len` and `buf.len()` bytes.
    ///
    /// Blocks up to `timeout_ms` until `min_len` bytes are read, then reads
    /// opportunistically without blocking. `Ok(0)` means the peer closed the
    /// stream.
    fn receive(&mut self, buf: &mut [u8], min_len: usize, timeout_ms: u32)
    -> Result<usize, Self::Error>;
}

pub trait Write {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Send every byte of `buf`, returning the number written.
    ///
    /// `Ok(0)` for a non-empty buffer means the peer closed the stream.
    fn send_all(&mut self, buf: &[u8], timeout_ms: u32) -> Result<usize, Self::Error>;
}

pub trait Close {
    /// Whether the connection is still open on both ends as far as we know
    fn is_connected(&self) -> bool;
    /// Close the connection. Closing twice is a no-op.
    fn close(&mut self);
}

/// A synchronous connection
pub trait Connection: Read + Write + Close {}

/// A synchronous connector (client)
pub trait Connect {
    /// Associated connection type
    type Connection: Connection;
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Resolve `host` and open a connection to `host:port`
    fn connect(&mut self, host: &str, port: u16) -> Result<Self::Connection, Self::Error>;
}

/// An open connection that is closed when dropped.
///
/// Protocol clients keep their connection inside a `Session` so that every
/// exit path, early returns through `?` included, tears the socket down.
#[derive(Debug)]
pub struct Session<C: Connection> {
    connection: C,
}

impl<C: Connection> Session<C> {
    /// Take ownership of an open connection
    pub fn new(connection: C) -> Self {
        Self { connection }
    }

    /// Access the underlying connection
    pub fn connection(&mut self) -> &mut C {
        &mut self.connection
    }
}

impl<C: Connection> Drop for Session<C> {
    fn drop(&mut self) {
        self.connection.close();
    }
}
