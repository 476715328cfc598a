use super::{CONTENT_TYPE_CAPACITY, DataIn, DataOut, store_content_type};
use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Sends a value serialized as JSON, held in an `N`-byte buffer.
#[derive(Debug, Clone)]
pub struct JsonSource<const N: usize = 256> {
    bytes: [u8; N],
    len: usize,
    pos: usize,
}

impl<const N: usize> JsonSource<N> {
    /// Serialize `value`; fails when the JSON text does not fit in `N` bytes.
    pub fn new<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json_core::ser::Error> {
        let mut bytes = [0u8; N];
        let len = serde_json_core::to_slice(value, &mut bytes)?;
        Ok(Self { bytes, len, pos: 0 })
    }

    /// The serialized JSON text
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl<const N: usize> DataOut for JsonSource<N> {
    fn reset(&mut self) {
        self.pos = 0;
    }

    fn len(&self) -> usize {
        self.len
    }

    fn is_chunked(&self) -> bool {
        false
    }

    fn content_type(&self) -> Option<&str> {
        Some(JSON_CONTENT_TYPE)
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let rest = &self.bytes[self.pos..self.len];
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        n
    }
}

/// Buffers up to `N` bytes of a JSON response for later deserialization.
#[derive(Debug)]
pub struct JsonSink<const N: usize = 512> {
    body: Vec<u8, N>,
    truncated: bool,
    content_type: String<CONTENT_TYPE_CAPACITY>,
}

impl<const N: usize> JsonSink<N> {
    /// An empty sink
    pub const fn new() -> Self {
        Self {
            body: Vec::new(),
            truncated: false,
            content_type: String::new(),
        }
    }

    /// The raw body received so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.body
    }

    /// Whether the body was longer than `N` bytes
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// The response's content type, empty when none was declared
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Deserialize the buffered body.
    ///
    /// Strings in `T` may borrow from the sink.
    pub fn parse<'de, T: Deserialize<'de>>(&'de self) -> Result<T, serde_json_core::de::Error> {
        if self.truncated {
            return Err(serde_json_core::de::Error::EofWhileParsingValue);
        }
        serde_json_core::from_slice(&self.body).map(|(value, _)| value)
    }
}

impl<const N: usize> Default for JsonSink<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> DataIn for JsonSink<N> {
    fn reset(&mut self) {
        self.body.clear();
        self.truncated = false;
        self.content_type.clear();
    }

    fn write(&mut self, buf: &[u8]) -> usize {
        let n = buf.len().min(N - self.body.len());
        if n < buf.len() {
            self.truncated = true;
        }
        // cannot fail, `n` fits the remaining capacity
        let _ = self.body.extend_from_slice(&buf[..n]);
        n
    }

    fn set_len(&mut self, _len: usize) {}

    fn set_chunked(&mut self, _chunked: bool) {}

    fn set_content_type(&mut self, content_type: &str) {
        store_content_type(&mut self.content_type, content_type);
    }
}
