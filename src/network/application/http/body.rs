//! Response body decoding.

use super::Error;
use super::buffer::Buffer;
use super::data::DataIn;
use crate::network::{Close, Read};

/// How the response body is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Framing {
    /// Exactly this many bytes follow the headers
    Length(usize),
    /// `Transfer-Encoding: chunked`
    Chunked,
}

/// Deliver the body to `sink`, starting with what is already buffered.
pub(crate) fn decode<C, I, const N: usize>(
    conn: &mut C,
    buf: &mut Buffer<N>,
    sink: &mut I,
    framing: Framing,
    timeout_ms: u32,
) -> Result<(), Error>
where
    C: Read + Close,
    I: DataIn + ?Sized,
{
    match framing {
        Framing::Length(len) => {
            debug!("reading {} body bytes", len);
            copy(conn, buf, sink, len, timeout_ms)
        }
        Framing::Chunked => loop {
            let size = read_chunk_size(conn, buf, timeout_ms)?;
            if size == 0 {
                debug!("last chunk received");
                sink.write(&[]);
                return Ok(());
            }
            trace!("chunk of {} bytes", size);
            copy(conn, buf, sink, size, timeout_ms)?;

            buf.fill_to(conn, 2, timeout_ms)?;
            if &buf.pending()[..2] != b"\r\n" {
                error!("chunk data not followed by CRLF");
                return Err(Error::Protocol);
            }
            buf.consume(2);
        },
    }
}

fn copy<C, I, const N: usize>(
    conn: &mut C,
    buf: &mut Buffer<N>,
    sink: &mut I,
    len: usize,
    timeout_ms: u32,
) -> Result<(), Error>
where
    C: Read + Close,
    I: DataIn + ?Sized,
{
    let mut remaining = len;
    while remaining > 0 {
        if buf.pending().is_empty() {
            buf.fill(conn, timeout_ms)?;
        }
        let n = buf.pending().len().min(remaining);
        // a sink that stops accepting is not an error
        sink.write(&buf.pending()[..n]);
        buf.consume(n);
        remaining -= n;
    }
    Ok(())
}

/// Parse the hexadecimal size at the start of a chunk-size line.
///
/// Chunk extensions after `;` are ignored.
pub(crate) fn parse_chunk_size(line: &[u8]) -> Result<usize, Error> {
    let digits = line
        .iter()
        .position(|b| !b.is_ascii_hexdigit())
        .unwrap_or(line.len());
    if digits == 0 {
        return Err(Error::Protocol);
    }
    if let Some(&next) = line.get(digits) {
        if !matches!(next, b';' | b' ' | b'\t') {
            return Err(Error::Protocol);
        }
    }
    line[..digits].iter().try_fold(0usize, |size, &b| {
        let digit = (b as char).to_digit(16).ok_or(Error::Protocol)? as usize;
        size.checked_mul(16)
            .and_then(|size| size.checked_add(digit))
            .ok_or(Error::Protocol)
    })
}

fn read_chunk_size<C, const N: usize>(
    conn: &mut C,
    buf: &mut Buffer<N>,
    timeout_ms: u32,
) -> Result<usize, Error>
where
    C: Read + Close,
{
    let end = buf.read_line(conn, timeout_ms)?;
    let size = parse_chunk_size(&buf.pending()[..end]).inspect_err(|_| {
        error!("invalid chunk size line");
    })?;
    buf.consume(end + 2);
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::application::http::data::TextSink;
    use std::collections::VecDeque;

    struct Script {
        reads: VecDeque<&'static [u8]>,
    }

    impl Script {
        fn new(reads: &[&'static [u8]]) -> Self {
            Self {
                reads: reads.iter().copied().collect(),
            }
        }
    }

    impl Read for Script {
        type Error = ();

        fn receive(&mut self, buf: &mut [u8], _min_len: usize, _timeout_ms: u32) -> Result<usize, ()> {
            let Some(next) = self.reads.pop_front() else {
                return Ok(0);
            };
            let n = next.len().min(buf.len());
            buf[..n].copy_from_slice(&next[..n]);
            if n < next.len() {
                self.reads.push_front(&next[n..]);
            }
            Ok(n)
        }
    }

    impl Close for Script {
        fn is_connected(&self) -> bool {
            true
        }

        fn close(&mut self) {}
    }

    fn run<const N: usize>(reads: &[&'static [u8]], framing: Framing) -> Result<std::vec::Vec<u8>, Error> {
        let mut conn = Script::new(reads);
        let mut buf = Buffer::<N>::new();
        let mut out = [0u8; 128];
        let mut sink = TextSink::new(&mut out);
        decode(&mut conn, &mut buf, &mut sink, framing, 1000)?;
        Ok(sink.as_bytes().to_vec())
    }

    #[test]
    fn length_delimited_across_reads() {
        let body = run::<16>(&[b"he", b"llo", b"ignored"], Framing::Length(5)).unwrap();
        assert_eq!(body, b"hello");
    }

    #[test]
    fn zero_length_reads_nothing() {
        assert_eq!(run::<16>(&[], Framing::Length(0)).unwrap(), b"");
    }

    #[test]
    fn chunked_wikipedia() {
        let body = run::<16>(&[b"4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n"], Framing::Chunked).unwrap();
        assert_eq!(body, b"Wikipedia");
    }

    #[test]
    fn chunked_with_extension_and_tiny_buffer() {
        let body = run::<8>(
            &[b"A;x\r\n", b"0123456789", b"\r\n0\r\n\r\n"],
            Framing::Chunked,
        )
        .unwrap();
        assert_eq!(body, b"0123456789");
    }

    #[test]
    fn chunk_without_trailing_crlf_is_rejected() {
        assert_eq!(
            run::<16>(&[b"4\r\nWikiXX5\r\npedia\r\n0\r\n\r\n"], Framing::Chunked),
            Err(Error::Protocol)
        );
    }

    #[test]
    fn truncated_body_reports_closed() {
        assert_eq!(run::<16>(&[b"hel"], Framing::Length(5)), Err(Error::Closed));
    }

    #[test]
    fn chunk_sizes() {
        assert_eq!(parse_chunk_size(b"0"), Ok(0));
        assert_eq!(parse_chunk_size(b"1aF"), Ok(0x1AF));
        assert_eq!(parse_chunk_size(b"10 ; ext"), Ok(16));
        assert_eq!(parse_chunk_size(b""), Err(Error::Protocol));
        assert_eq!(parse_chunk_size(b"xyz"), Err(Error::Protocol));
        assert_eq!(parse_chunk_size(b"12g"), Err(Error::Protocol));
        assert_eq!(
            parse_chunk_size(b"FFFFFFFFFFFFFFFFFFFF"),
            Err(Error::Protocol)
        );
    }
}
