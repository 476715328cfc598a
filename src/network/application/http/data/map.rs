use super::{DataIn, DataOut};
use heapless::{String, Vec};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode, percent_encode, percent_encode_byte};

/// Maximum decoded key length kept by a [`MapSink`]
pub const MAP_KEY_CAPACITY: usize = 64;
/// Maximum decoded value length kept by a [`MapSink`]
pub const MAP_VALUE_CAPACITY: usize = 128;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Everything but the unreserved bytes is escaped.
const FORM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// The `%XX` form of `b`, `None` when it is sent verbatim.
fn escaped(b: u8) -> Option<&'static str> {
    let byte = [b];
    let encoded = percent_encode(&byte, FORM).next()?;
    (encoded.len() > 1).then(|| percent_encode_byte(b))
}

fn encoded_len(text: &str) -> usize {
    text.bytes()
        .map(|b| match b {
            b' ' => 1,
            _ => escaped(b).map_or(1, str::len),
        })
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Separator,
    Key,
    Equals,
    Value,
}

/// Sends key/value pairs as an `application/x-www-form-urlencoded` body.
///
/// The encoding is produced on the fly, so the pairs are never copied.
#[derive(Debug, Clone)]
pub struct MapSource<'a> {
    pairs: &'a [(&'a str, &'a str)],
    len: usize,
    pair: usize,
    part: Part,
    offset: usize,
    escape: [u8; 2],
    escaped: usize,
}

impl<'a> MapSource<'a> {
    /// Encode `pairs` in order
    pub fn new(pairs: &'a [(&'a str, &'a str)]) -> Self {
        let len = pairs
            .iter()
            .map(|(k, v)| encoded_len(k) + 1 + encoded_len(v))
            .sum::<usize>()
            + pairs.len().saturating_sub(1);
        Self {
            pairs,
            len,
            pair: 0,
            part: Part::Separator,
            offset: 0,
            escape: [0; 2],
            escaped: 2,
        }
    }

    fn encode(&mut self, b: u8) -> u8 {
        if b == b' ' {
            return b'+';
        }
        match escaped(b).map(str::as_bytes) {
            Some(&[percent, high, low]) => {
                self.escape = [high, low];
                self.escaped = 0;
                percent
            }
            _ => b,
        }
    }

    fn next_byte(&mut self) -> Option<u8> {
        if self.escaped < self.escape.len() {
            self.escaped += 1;
            return Some(self.escape[self.escaped - 1]);
        }
        loop {
            let (key, value) = *self.pairs.get(self.pair)?;
            match self.part {
                Part::Separator => {
                    self.part = Part::Key;
                    if self.pair > 0 {
                        return Some(b'&');
                    }
                }
                Part::Key => match key.as_bytes().get(self.offset) {
                    Some(&b) => {
                        self.offset += 1;
                        return Some(self.encode(b));
                    }
                    None => {
                        self.offset = 0;
                        self.part = Part::Equals;
                    }
                },
                Part::Equals => {
                    self.part = Part::Value;
                    return Some(b'=');
                }
                Part::Value => match value.as_bytes().get(self.offset) {
                    Some(&b) => {
                        self.offset += 1;
                        return Some(self.encode(b));
                    }
                    None => {
                        self.offset = 0;
                        self.part = Part::Separator;
                        self.pair += 1;
                    }
                },
            }
        }
    }
}

impl DataOut for MapSource<'_> {
    fn reset(&mut self) {
        self.pair = 0;
        self.part = Part::Separator;
        self.offset = 0;
        self.escaped = self.escape.len();
    }

    fn len(&self) -> usize {
        self.len
    }

    fn is_chunked(&self) -> bool {
        false
    }

    fn content_type(&self) -> Option<&str> {
        Some(FORM_CONTENT_TYPE)
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let mut n = 0;
        while n < buf.len() {
            match self.next_byte() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        n
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escape {
    None,
    Percent,
    High(u8),
}

/// Decodes an `application/x-www-form-urlencoded` body into at most `N`
/// key/value pairs.
///
/// Pairs that do not fit, keys or values longer than their capacity and
/// pairs that are not valid UTF-8 after decoding are dropped and reported
/// through [`MapSink::overflowed`].
#[derive(Debug)]
pub struct MapSink<const N: usize = 8> {
    pairs: Vec<(String<MAP_KEY_CAPACITY>, String<MAP_VALUE_CAPACITY>), N>,
    key: Vec<u8, MAP_KEY_CAPACITY>,
    value: Vec<u8, MAP_VALUE_CAPACITY>,
    in_value: bool,
    escape: Escape,
    len: usize,
    chunked: bool,
    received: usize,
    overflowed: bool,
}

impl<const N: usize> MapSink<N> {
    /// An empty sink
    pub const fn new() -> Self {
        Self {
            pairs: Vec::new(),
            key: Vec::new(),
            value: Vec::new(),
            in_value: false,
            escape: Escape::None,
            len: 0,
            chunked: false,
            received: 0,
            overflowed: false,
        }
    }

    /// Decoded pairs, in body order
    pub fn pairs(&self) -> &[(String<MAP_KEY_CAPACITY>, String<MAP_VALUE_CAPACITY>)] {
        &self.pairs
    }

    /// Value of the first pair named `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether anything in the body had to be dropped
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Store the pair being decoded. Called automatically once the declared
    /// length or the terminating chunk has been received.
    pub fn finish(&mut self) {
        self.flush_escape();
        if !self.key.is_empty() || !self.value.is_empty() {
            let pair = core::str::from_utf8(&self.key)
                .ok()
                .zip(core::str::from_utf8(&self.value).ok())
                .and_then(|(k, v)| Some((String::try_from(k).ok()?, String::try_from(v).ok()?)));
            match pair {
                Some(pair) => {
                    if self.pairs.push(pair).is_err() {
                        self.overflowed = true;
                    }
                }
                None => self.overflowed = true,
            }
        }
        self.key.clear();
        self.value.clear();
        self.in_value = false;
    }

    fn push(&mut self, b: u8) {
        let full = if self.in_value {
            self.value.push(b).is_err()
        } else {
            self.key.push(b).is_err()
        };
        if full {
            self.overflowed = true;
        }
    }

    // a dangling `%` or `%X` is kept literally
    fn flush_escape(&mut self) {
        match self.escape {
            Escape::None => {}
            Escape::Percent => self.push(b'%'),
            Escape::High(h) => {
                self.push(b'%');
                self.push(h);
            }
        }
        self.escape = Escape::None;
    }

    fn decode(&mut self, b: u8) {
        match self.escape {
            Escape::Percent if b.is_ascii_hexdigit() => {
                self.escape = Escape::High(b);
                return;
            }
            Escape::High(h) if b.is_ascii_hexdigit() => {
                self.escape = Escape::None;
                if let Some(byte) = percent_decode(&[b'%', h, b]).next() {
                    self.push(byte);
                }
                return;
            }
            Escape::None => {}
            _ => self.flush_escape(),
        }

        match b {
            b'%' => self.escape = Escape::Percent,
            b'+' => self.push(b' '),
            b'&' => self.finish(),
            b'=' if !self.in_value => self.in_value = true,
            _ => self.push(b),
        }
    }
}

impl<const N: usize> Default for MapSink<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> DataIn for MapSink<N> {
    fn reset(&mut self) {
        *self = Self::new();
    }

    fn write(&mut self, buf: &[u8]) -> usize {
        if buf.is_empty() {
            if self.chunked {
                self.finish();
            }
            return 0;
        }
        for &b in buf {
            self.decode(b);
        }
        self.received += buf.len();
        if !self.chunked && self.received >= self.len {
            self.finish();
        }
        buf.len()
    }

    fn set_len(&mut self, len: usize) {
        self.len = len;
    }

    fn set_chunked(&mut self, chunked: bool) {
        self.chunked = chunked;
    }

    fn set_content_type(&mut self, _content_type: &str) {}
}
