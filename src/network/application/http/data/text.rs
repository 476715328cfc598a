use super::{CONTENT_TYPE_CAPACITY, DataIn, DataOut, store_content_type};
use heapless::String;

/// Collects a response body into a caller-provided buffer.
///
/// Bytes beyond the buffer's capacity are dropped.
#[derive(Debug)]
pub struct TextSink<'a> {
    buf: &'a mut [u8],
    len: usize,
    content_type: String<CONTENT_TYPE_CAPACITY>,
}

impl<'a> TextSink<'a> {
    /// Collect into `buf`
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buf,
            len: 0,
            content_type: String::new(),
        }
    }

    /// The bytes received so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// The bytes received so far, if they are valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(self.as_bytes()).ok()
    }

    /// Number of bytes received
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing was received
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the buffer has no room left
    pub fn is_full(&self) -> bool {
        self.len == self.buf.len()
    }

    /// The response's content type, empty when none was declared
    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

impl DataIn for TextSink<'_> {
    fn reset(&mut self) {
        self.len = 0;
        self.content_type.clear();
    }

    fn write(&mut self, buf: &[u8]) -> usize {
        let n = buf.len().min(self.buf.len() - self.len);
        self.buf[self.len..self.len + n].copy_from_slice(&buf[..n]);
        self.len += n;
        n
    }

    fn set_len(&mut self, _len: usize) {}

    fn set_chunked(&mut self, _chunked: bool) {}

    fn set_content_type(&mut self, content_type: &str) {
        store_content_type(&mut self.content_type, content_type);
    }
}

/// Sends a borrowed text (or byte) body as `text/plain`.
#[derive(Debug, Clone)]
pub struct TextSource<'a> {
    text: &'a [u8],
    pos: usize,
}

impl<'a> TextSource<'a> {
    /// Send `text`
    pub fn new(text: &'a str) -> Self {
        Self::from_bytes(text.as_bytes())
    }

    /// Send raw bytes with the `text/plain` content type
    pub fn from_bytes(text: &'a [u8]) -> Self {
        Self { text, pos: 0 }
    }
}

impl DataOut for TextSource<'_> {
    fn reset(&mut self) {
        self.pos = 0;
    }

    fn len(&self) -> usize {
        self.text.len()
    }

    fn is_chunked(&self) -> bool {
        false
    }

    fn content_type(&self) -> Option<&str> {
        Some("text/plain")
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let rest = &self.text[self.pos..];
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        n
    }
}
