//! HTTP/1.1 protocol implementation for embedded systems.
//!
//! This module provides a lightweight HTTP client designed for embedded
//! systems and `no_std` environments. It focuses on predictable memory usage:
//! a whole transaction runs through one fixed-capacity working buffer and
//! body bytes are streamed to and from [`data`] sinks and sources instead of
//! being collected.
//!
//! # Features
//!
//! - Synchronous request/response model, one connection per transaction
//! - `Content-Length` and chunked bodies in both directions
//! - Basic authentication and custom headers
//! - Redirect following with a bounded budget
//!
//! # Transaction flow
//!
//! ```text
//! parse URL -> connect -> write request -> read status line -> read headers
//!     | Location seen and budget left: close, retry with the new URL
//!     | otherwise: decode body into the sink, close
//! ```
//!
//! # Usage
//!
//! The main entry point is the [`Client`] which works with any connector type
//! implementing the [`crate::network::Connect`] trait.
//!
//! ```rust,no_run
//! use iot_http::network::application::http::{Client, Error, data::{MapSource, TextSink}};
//! # use iot_http::network::{Close, Connect, Connection, Read, Write};
//! # struct MockConnection;
//! # impl Read for MockConnection {
//! #     type Error = ();
//! #     fn receive(&mut self, _buf: &mut [u8], _min: usize, _timeout_ms: u32) -> Result<usize, ()> { Ok(0) }
//! # }
//! # impl Write for MockConnection {
//! #     type Error = ();
//! #     fn send_all(&mut self, buf: &[u8], _timeout_ms: u32) -> Result<usize, ()> { Ok(buf.len()) }
//! # }
//! # impl Close for MockConnection {
//! #     fn is_connected(&self) -> bool { true }
//! #     fn close(&mut self) {}
//! # }
//! # impl Connection for MockConnection {}
//! # struct MockNetwork;
//! # impl Connect for MockNetwork {
//! #     type Connection = MockConnection;
//! #     type Error = ();
//! #     fn connect(&mut self, _host: &str, _port: u16) -> Result<MockConnection, ()> { Ok(MockConnection) }
//! # }
//! # fn main() -> Result<(), Error> {
//! let mut client: Client<_> = Client::new(MockNetwork);
//! client.basic_auth("device", "secret")?;
//!
//! let pairs = [("temperature", "21.5"), ("unit", "C")];
//! let mut form = MapSource::new(&pairs);
//! let mut reply = [0u8; 64];
//! let mut sink = TextSink::new(&mut reply);
//!
//! client.post("http://example.com/readings", &mut form, &mut sink, 5_000)?;
//! # Ok(())
//! # }
//! ```

/// Base64 encoding and basic authentication credentials
pub mod auth;

/// The working buffer shared by request assembly and response parsing
mod buffer;

/// Response body decoding (length-delimited and chunked)
mod body;

/// The HTTP client and its redirect controller
pub mod client;

/// Pluggable body sinks and sources
pub mod data;

/// HTTP error kinds
pub mod error;

/// Request line, headers and request body
mod request;

/// Status line and header parsing
mod response;

/// Absolute URL parsing
pub mod url;

pub use client::{Client, Header, Method};
pub use data::{DataIn, DataOut};
pub use error::Error;
pub use url::Url;
