use super::{CONTENT_TYPE_CAPACITY, DataIn, DataOut, store_content_type};
use heapless::String;

/// Hands every decoded body slice to a callback.
///
/// The callback returns how many bytes it consumed.
pub struct StreamSink<F: FnMut(&[u8]) -> usize> {
    on_data: F,
    len: Option<usize>,
    chunked: bool,
    received: usize,
    content_type: String<CONTENT_TYPE_CAPACITY>,
}

impl<F: FnMut(&[u8]) -> usize> StreamSink<F> {
    /// Forward the body to `on_data`
    pub fn new(on_data: F) -> Self {
        Self {
            on_data,
            len: None,
            chunked: false,
            received: 0,
            content_type: String::new(),
        }
    }

    /// The declared `Content-Length`, if the response had one
    pub fn declared_len(&self) -> Option<usize> {
        self.len
    }

    /// Whether the response was chunked
    pub fn is_chunked(&self) -> bool {
        self.chunked
    }

    /// Bytes consumed by the callback
    pub fn received(&self) -> usize {
        self.received
    }

    /// The response's content type, empty when none was declared
    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

impl<F: FnMut(&[u8]) -> usize> core::fmt::Debug for StreamSink<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StreamSink")
            .field("len", &self.len)
            .field("chunked", &self.chunked)
            .field("received", &self.received)
            .finish_non_exhaustive()
    }
}

impl<F: FnMut(&[u8]) -> usize> DataIn for StreamSink<F> {
    fn reset(&mut self) {
        self.len = None;
        self.chunked = false;
        self.received = 0;
        self.content_type.clear();
    }

    fn write(&mut self, buf: &[u8]) -> usize {
        if buf.is_empty() {
            return 0;
        }
        let n = (self.on_data)(buf).min(buf.len());
        self.received += n;
        n
    }

    fn set_len(&mut self, len: usize) {
        self.len = Some(len);
    }

    fn set_chunked(&mut self, chunked: bool) {
        self.chunked = chunked;
    }

    fn set_content_type(&mut self, content_type: &str) {
        store_content_type(&mut self.content_type, content_type);
    }
}

/// Pulls a request body from a callback.
///
/// Without a known length the body is sent chunked. A stream cannot be
/// rewound, so [`DataOut::reset`] does nothing: after a redirect the
/// callback simply keeps producing from where it stopped.
pub struct StreamSource<'a, F: FnMut(&mut [u8]) -> usize> {
    next: F,
    len: Option<usize>,
    content_type: Option<&'a str>,
}

impl<'a, F: FnMut(&mut [u8]) -> usize> StreamSource<'a, F> {
    /// A chunked body produced by `next`; a return of `0` ends it
    pub fn chunked(next: F) -> Self {
        Self {
            next,
            len: None,
            content_type: None,
        }
    }

    /// A body of exactly `len` bytes produced by `next`
    pub fn with_len(len: usize, next: F) -> Self {
        Self {
            next,
            len: Some(len),
            content_type: None,
        }
    }

    /// Declare a `Content-Type`
    pub fn with_content_type(mut self, content_type: &'a str) -> Self {
        self.content_type = Some(content_type);
        self
    }
}

impl<F: FnMut(&mut [u8]) -> usize> core::fmt::Debug for StreamSource<'_, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StreamSource")
            .field("len", &self.len)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

impl<F: FnMut(&mut [u8]) -> usize> DataOut for StreamSource<'_, F> {
    fn reset(&mut self) {}

    fn len(&self) -> usize {
        self.len.unwrap_or(0)
    }

    fn is_chunked(&self) -> bool {
        self.len.is_none()
    }

    fn content_type(&self) -> Option<&str> {
        self.content_type
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        (self.next)(buf).min(buf.len())
    }
}
