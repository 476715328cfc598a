//! Request serialization.
//!
//! The head is formatted straight into the working buffer, which is flushed
//! to the transport whenever it fills up. The body is then pulled from the
//! source one buffer at a time.

use super::Error;
use super::client::{Header, Method};
use super::data::DataOut;
use crate::network::Write;
use core::fmt::{self, Write as _};
use heapless::String;

/// Everything that goes before the blank line.
pub(crate) struct Head<'a> {
    pub(crate) method: Method,
    pub(crate) host: &'a str,
    pub(crate) port: u16,
    pub(crate) path: &'a str,
    pub(crate) authorization: Option<&'a str>,
    pub(crate) headers: &'a [Header],
}

/// Send every byte of `bytes`, treating a short write as a closed peer.
pub(crate) fn send<C: Write>(conn: &mut C, bytes: &[u8], timeout_ms: u32) -> Result<(), Error> {
    let sent = conn.send_all(bytes, timeout_ms).map_err(|_| {
        error!("send failed");
        Error::Connection
    })?;
    if sent < bytes.len() {
        warn!("connection closed while sending");
        return Err(Error::Closed);
    }
    Ok(())
}

struct Sender<'a, C: Write> {
    buf: &'a mut [u8],
    len: usize,
    conn: &'a mut C,
    timeout_ms: u32,
    error: Option<Error>,
}

impl<C: Write> Sender<'_, C> {
    fn flush(&mut self) -> Result<(), Error> {
        if self.len > 0 {
            send(self.conn, &self.buf[..self.len], self.timeout_ms)?;
            self.len = 0;
        }
        Ok(())
    }
}

impl<C: Write> fmt::Write for Sender<'_, C> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut bytes = s.as_bytes();
        while !bytes.is_empty() {
            if self.len == self.buf.len() {
                if let Err(e) = self.flush() {
                    self.error = Some(e);
                    return Err(fmt::Error);
                }
            }
            let n = bytes.len().min(self.buf.len() - self.len);
            self.buf[self.len..self.len + n].copy_from_slice(&bytes[..n]);
            self.len += n;
            bytes = &bytes[n..];
        }
        Ok(())
    }
}

fn write_head<W: fmt::Write, D: DataOut + ?Sized>(
    out: &mut W,
    head: &Head<'_>,
    body: Option<&D>,
) -> fmt::Result {
    write!(out, "{} {} HTTP/1.1\r\n", head.method.as_str(), head.path)?;
    write!(out, "Host: {}:{}\r\n", head.host, head.port)?;
    out.write_str("Connection: keep-alive\r\n")?;
    if let Some(token) = head.authorization {
        write!(out, "Authorization: Basic {}\r\n", token)?;
    }
    for header in head.headers {
        write!(out, "{}: {}\r\n", header.name, header.value)?;
    }
    if let Some(body) = body {
        if body.is_chunked() {
            out.write_str("Transfer-Encoding: chunked\r\n")?;
        } else {
            write!(out, "Content-Length: {}\r\n", body.len())?;
        }
        if let Some(content_type) = body.content_type() {
            write!(out, "Content-Type: {}\r\n", content_type)?;
        }
    }
    out.write_str("\r\n")
}

fn write_body<C: Write, D: DataOut + ?Sized>(
    conn: &mut C,
    buf: &mut [u8],
    body: &mut D,
    timeout_ms: u32,
) -> Result<(), Error> {
    if body.is_chunked() {
        loop {
            let n = body.read(buf).min(buf.len());
            // at most 16 hex digits plus CRLF
            let mut size_line: String<20> = String::new();
            let _ = write!(size_line, "{:X}\r\n", n);
            send(conn, size_line.as_bytes(), timeout_ms)?;
            if n == 0 {
                return send(conn, b"\r\n", timeout_ms);
            }
            send(conn, &buf[..n], timeout_ms)?;
            send(conn, b"\r\n", timeout_ms)?;
        }
    }

    let mut remaining = body.len();
    while remaining > 0 {
        let want = remaining.min(buf.len());
        let n = body.read(&mut buf[..want]).min(want);
        if n == 0 {
            warn!("request body ended {} bytes short of its declared length", remaining);
            break;
        }
        send(conn, &buf[..n], timeout_ms)?;
        remaining -= n;
    }
    Ok(())
}

/// Write a complete request using `buf` as scratch space.
pub(crate) fn write<C: Write, D: DataOut + ?Sized>(
    conn: &mut C,
    buf: &mut [u8],
    head: &Head<'_>,
    mut body: Option<&mut D>,
    timeout_ms: u32,
) -> Result<(), Error> {
    {
        let mut out = Sender {
            buf: &mut *buf,
            len: 0,
            conn: &mut *conn,
            timeout_ms,
            error: None,
        };
        if write_head(&mut out, head, body.as_deref()).is_err() {
            return Err(out.error.unwrap_or(Error::Connection));
        }
        out.flush()?;
    }
    debug!("request head sent");

    match body.as_deref_mut() {
        Some(body) => write_body(conn, buf, body, timeout_ms),
        None => Ok(()),
    }
}
