//! # iot-http - bounded HTTP/1.1 client for IoT devices
//!
//! A synchronous HTTP/1.1 client engine that runs a full request/response
//! transaction over any byte-stream transport using a single fixed-capacity
//! working buffer. Response bodies are decoded (length-delimited or chunked)
//! and streamed into pluggable data sinks; request bodies are pulled from
//! pluggable data sources. A firmware update agent built on top of the client
//! covers the common "check version, download image, verify, reboot" flow.
//!
//! This library is designed for embedded systems and supports `no_std`
//! environments without an allocator.
//!
//! ## Features
//!
//! ### HTTP Client
//! - GET, POST, PUT and DELETE
//! - `Content-Length` and `Transfer-Encoding: chunked` bodies, both directions
//! - Basic authentication and custom request headers
//! - Bounded redirect following through `Location`
//!
//! ### Data Sinks and Sources
//! - Text buffers, form-encoded maps, JSON values, generic streams
//! - Persistent files ([`storage::FileSystem`]) and raw flash regions
//!
//! ### Firmware Update
//! - Version manifest (`version,checksum,filesize`) check
//! - Image download, integrity check and activation hand-off
//!
//! ## Usage
//!
//! ```rust,no_run
//! use iot_http::network::application::http::{Client, data::TextSink};
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
//!
//! # fn main() -> Result<(), iot_http::network::application::http::Error> {
//! let mut client: Client<_> = Client::new(MockNetwork);
//! let mut body = [0u8; 128];
//! let mut sink = TextSink::new(&mut body);
//!
//! client.get("http://example.com/status", &mut sink, 5_000)?;
//! if let Some(text) = sink.as_str() {
//!     println!("{} -> {}", client.status(), text);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library adapters (TCP connector, file system)
//! - `defmt`: Route logging and error formatting through defmt

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

#[macro_use]
mod fmt;

/// Network abstraction layer: transport traits and application protocols.
///
/// The HTTP client lives under [`network::application::http`].
pub mod network;

/// Storage abstraction layer for block devices and named files.
///
/// Provides the persistence traits used by the file sinks and the firmware
/// update agent.
pub mod storage;

/// Firmware update agent built on the HTTP client and the storage layer.
pub mod ota;
