//! Body sinks and sources.
//!
//! A [`DataIn`] sink consumes a decoded response body, a [`DataOut`] source
//! produces a request body. The client only talks to these two traits, so
//! any storage or stream can be plugged in.
//!
//! | Variant | Sink | Source |
//! |---------|------|--------|
//! | Text buffer | [`TextSink`] | [`TextSource`] |
//! | Persistent file | [`FileSink`], [`RegionSink`] | |
//! | Form-encoded map | [`MapSink`] | [`MapSource`] |
//! | JSON value | [`JsonSink`] | [`JsonSource`] |
//! | Generic stream | [`StreamSink`] | [`StreamSource`] |

mod file;
mod json;
mod map;
mod stream;
mod text;

pub use file::{FileSink, RegionSink};
pub use json::{JsonSink, JsonSource};
pub use map::{MapSink, MapSource};
pub use stream::{StreamSink, StreamSource};
pub use text::{TextSink, TextSource};

/// Maximum length of a content type kept by a sink
pub const CONTENT_TYPE_CAPACITY: usize = 64;

/// Consumer of a response body.
pub trait DataIn {
    /// Prepare for a new transaction. Called once at the start of every request.
    fn reset(&mut self);

    /// Accept a slice of the decoded body.
    ///
    /// Returns how many bytes were kept. A sink may stop accepting at any
    /// time, e.g. once it is full or complete; that is not an error.
    ///
    /// The terminating chunk of a chunked body is delivered as an empty
    /// slice, so a sink can tell a complete body from a cut one.
    fn write(&mut self, buf: &[u8]) -> usize;

    /// The response declared a `Content-Length`.
    fn set_len(&mut self, len: usize);

    /// The response uses chunked transfer coding.
    fn set_chunked(&mut self, chunked: bool);

    /// The response declared a `Content-Type`.
    fn set_content_type(&mut self, content_type: &str);
}

/// Producer of a request body.
pub trait DataOut {
    /// Rewind to the start of the body. Called at the start of every attempt.
    fn reset(&mut self);

    /// Total body length; only meaningful when not chunked.
    fn len(&self) -> usize;

    /// Whether the body has no bytes
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the body is sent with chunked transfer coding
    fn is_chunked(&self) -> bool;

    /// The `Content-Type` to declare, if any
    fn content_type(&self) -> Option<&str>;

    /// Produce the next slice of the body into `buf`.
    ///
    /// Returns the number of bytes written; `0` marks the end of the body.
    fn read(&mut self, buf: &mut [u8]) -> usize;
}

impl<T: DataIn + ?Sized> DataIn for &mut T {
    fn reset(&mut self) {
        (**self).reset()
    }

    fn write(&mut self, buf: &[u8]) -> usize {
        (**self).write(buf)
    }

    fn set_len(&mut self, len: usize) {
        (**self).set_len(len)
    }

    fn set_chunked(&mut self, chunked: bool) {
        (**self).set_chunked(chunked)
    }

    fn set_content_type(&mut self, content_type: &str) {
        (**self).set_content_type(content_type)
    }
}

impl<T: DataOut + ?Sized> DataOut for &mut T {
    fn reset(&mut self) {
        (**self).reset()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn is_chunked(&self) -> bool {
        (**self).is_chunked()
    }

    fn content_type(&self) -> Option<&str> {
        (**self).content_type()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        (**self).read(buf)
    }
}

/// Copy a content type into bounded storage, leaving it empty when it does not fit.
///
/// Returns whether the value was kept.
pub(crate) fn store_content_type(
    slot: &mut heapless::String<CONTENT_TYPE_CAPACITY>,
    content_type: &str,
) -> bool {
    slot.clear();
    if slot.push_str(content_type).is_err() {
        warn!("content type longer than {} bytes dropped", CONTENT_TYPE_CAPACITY);
        slot.clear();
        return false;
    }
    true
}
