//! # Application Layer Network Protocols
//!
//! This module contains implementations of application layer (OSI Layer 7)
//! network protocols. Each protocol is written against the core transport
//! traits in [`crate::network`] and provides a consistent API for embedded
//! systems.
//!
//! ## Available Protocols
//!
//! - **[`http`]**: HTTP/1.1 client with chunked transfer coding, basic
//!   authentication and redirect following
//!
//! ## Design Principles
//!
//! - **Connection Agnostic**: Work with any [`Connect`](crate::network::Connect) implementation
//! - **No-std Compatible**: Designed for embedded systems without heap allocation
//! - **Resource Conscious**: Use fixed-size buffers and minimal memory
//! - **Error Handling**: Specific error kinds, never partial successes

/// HTTP client implementation.
///
/// Provides a bounded-memory HTTP/1.1 client suitable for embedded systems,
/// supporting GET, POST, PUT and DELETE with streamed request and response
/// bodies.
pub mod http;
