//! Status line and header parsing.

use super::Error;
use super::body::Framing;
use super::buffer::Buffer;
use super::data::{CONTENT_TYPE_CAPACITY, DataIn, store_content_type};
use super::url::URL_CAPACITY;
use crate::network::{Close, Read};
use heapless::String;

/// What the header block asked the client to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Next {
    /// Follow the stored `Location`
    Redirect,
    /// Decode the body with this framing
    Body(Framing),
}

/// Parse `HTTP/<major>.<minor> <code>[ <reason>]`.
pub(crate) fn parse_status_line(line: &[u8]) -> Result<u16, Error> {
    let line = core::str::from_utf8(line).map_err(|_| Error::Protocol)?;
    let rest = line.strip_prefix("HTTP/").ok_or(Error::Protocol)?;
    let (version, rest) = rest.split_once(' ').ok_or(Error::Protocol)?;
    let (major, minor) = version.split_once('.').ok_or(Error::Protocol)?;
    if !is_digits(major) || !is_digits(minor) {
        return Err(Error::Protocol);
    }

    let rest = rest.trim_start_matches(' ');
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 || !(rest[end..].is_empty() || rest[end..].starts_with(' ')) {
        return Err(Error::Protocol);
    }
    rest[..end].parse().map_err(|_| Error::Protocol)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Split a header line at its first colon.
pub(crate) fn parse_header(line: &[u8]) -> Result<(&str, &str), Error> {
    let line = core::str::from_utf8(line).map_err(|_| Error::Protocol)?;
    let (key, value) = line.split_once(':').ok_or(Error::Protocol)?;
    if key.is_empty() {
        return Err(Error::Protocol);
    }
    Ok((key, value.trim_start_matches([' ', '\t'])))
}

/// Read the status line and return the code.
pub(crate) fn read_status<C, const N: usize>(
    conn: &mut C,
    buf: &mut Buffer<N>,
    timeout_ms: u32,
) -> Result<u16, Error>
where
    C: Read + Close,
{
    let end = buf.read_line(conn, timeout_ms)?;
    let status = parse_status_line(&buf.pending()[..end]).inspect_err(|_| {
        error!("malformed status line");
    })?;
    buf.consume(end + 2);
    Ok(status)
}

/// Read headers up to the blank line.
///
/// A `Location` header is stored in `location`. When `follow` is set it ends
/// the header block at once; otherwise parsing carries on and the response's
/// framing and metadata are handed to the sink. Redirecting responses never
/// touch the sink.
pub(crate) fn read_headers<C, I, const N: usize>(
    conn: &mut C,
    buf: &mut Buffer<N>,
    sink: &mut I,
    location: &mut Option<String<URL_CAPACITY>>,
    follow: bool,
    timeout_ms: u32,
) -> Result<Next, Error>
where
    C: Read + Close,
    I: DataIn + ?Sized,
{
    let mut content_length = None;
    let mut chunked = false;
    let mut content_type: Option<String<CONTENT_TYPE_CAPACITY>> = None;
    let mut redirect = false;

    loop {
        let end = buf.read_line(conn, timeout_ms)?;
        if end == 0 {
            buf.consume(2);
            break;
        }

        let (key, value) = parse_header(&buf.pending()[..end]).inspect_err(|_| {
            error!("malformed header line");
        })?;
        trace!("header {}: {}", key, value);
        match key {
            "Content-Length" => {
                let len = value.trim_end().parse::<usize>().map_err(|_| {
                    error!("invalid content length");
                    Error::Protocol
                })?;
                content_length = Some(len);
            }
            "Transfer-Encoding" => {
                if value == "chunked" || value == "Chunked" {
                    chunked = true;
                }
            }
            "Content-Type" => {
                let mut slot = String::new();
                content_type = store_content_type(&mut slot, value).then_some(slot);
            }
            "Location" => {
                let target = String::try_from(value).map_err(|_| {
                    error!("redirect location longer than {} bytes", URL_CAPACITY);
                    Error::Protocol
                })?;
                *location = Some(target);
                redirect = follow;
            }
            _ => {}
        }
        buf.consume(end + 2);
        if redirect {
            return Ok(Next::Redirect);
        }
    }

    let framing = if chunked {
        sink.set_chunked(true);
        Framing::Chunked
    } else {
        let len = content_length.unwrap_or(0);
        sink.set_len(len);
        Framing::Length(len)
    };
    if let Some(content_type) = content_type {
        sink.set_content_type(&content_type);
    }
    Ok(Next::Body(framing))
}
