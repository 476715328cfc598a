//! Blocking TCP transport built on `std::net`.
//!
//! Host names are resolved with [`ToSocketAddrs`], every resolved address is
//! tried in turn with a bounded connect timeout.

use super::error::Error;
use super::{Close, Connect, Connection, Read, Write};
use std::io::{ErrorKind, Read as StdRead, Write as StdWrite};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

fn duration(timeout_ms: u32) -> Duration {
    // std rejects zero timeouts
    Duration::from_millis(u64::from(timeout_ms.max(1)))
}

/// Opens [`TcpConnection`]s.
#[derive(Debug, Clone, Copy)]
pub struct TcpConnector {
    connect_timeout_ms: u32,
}

impl TcpConnector {
    /// Create a connector whose connection attempts give up after `connect_timeout_ms`.
    pub fn new(connect_timeout_ms: u32) -> Self {
        Self { connect_timeout_ms }
    }
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::new(super::DEFAULT_TIMEOUT_MS)
    }
}

impl Connect for TcpConnector {
    type Connection = TcpConnection;
    type Error = Error;

    fn connect(&mut self, host: &str, port: u16) -> Result<Self::Connection, Self::Error> {
        let addrs = (host, port)
            .to_socket_addrs()
            .map_err(|_| Error::InvalidAddress)?;

        let mut last = Error::InvalidAddress;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, duration(self.connect_timeout_ms)) {
                Ok(stream) => {
                    let _ = stream.set_nodelay(true);
                    return Ok(TcpConnection {
                        stream,
                        connected: true,
                    });
                }
                Err(e) if e.kind() == ErrorKind::TimedOut => last = Error::Timeout,
                Err(_) => last = Error::ConnectionRefused,
            }
        }
        Err(last)
    }
}

/// A TCP stream implementing the crate's transport traits.
#[derive(Debug)]
pub struct TcpConnection {
    stream: TcpStream,
    connected: bool,
}

impl TcpConnection {
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        self.stream
            .set_nonblocking(true)
            .map_err(|_| Error::ReadError)?;

        let mut read = 0;
        let result = loop {
            if read == buf.len() {
                break Ok(read);
            }
            match self.stream.read(&mut buf[read..]) {
                Ok(0) => {
                    self.connected = false;
                    break Ok(read);
                }
                Ok(n) => read += n,
                Err(e) if e.kind() == ErrorKind::WouldBlock => break Ok(read),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(_) => break Err(Error::ReadError),
            }
        };

        self.stream
            .set_nonblocking(false)
            .map_err(|_| Error::ReadError)?;
        result
    }
}

impl Read for TcpConnection {
    type Error = Error;

    fn receive(
        &mut self,
        buf: &mut [u8],
        min_len: usize,
        timeout_ms: u32,
    ) -> Result<usize, Self::Error> {
        if !self.connected {
            return Err(Error::NotOpen);
        }
        self.stream
            .set_read_timeout(Some(duration(timeout_ms)))
            .map_err(|_| Error::ReadError)?;

        let min_len = min_len.min(buf.len());
        let mut read = 0;
        while read < min_len {
            match self.stream.read(&mut buf[read..]) {
                Ok(0) => {
                    self.connected = false;
                    return Ok(read);
                }
                Ok(n) => read += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Err(Error::Timeout);
                }
                Err(_) => return Err(Error::ReadError),
            }
        }

        if read < buf.len() && self.connected {
            read += self.read_available(&mut buf[read..])?;
        }
        Ok(read)
    }
}

impl Write for TcpConnection {
    type Error = Error;

    fn send_all(&mut self, buf: &[u8], timeout_ms: u32) -> Result<usize, Self::Error> {
        if !self.connected {
            return Err(Error::NotOpen);
        }
        self.stream
            .set_write_timeout(Some(duration(timeout_ms)))
            .map_err(|_| Error::WriteError)?;

        match self.stream.write_all(buf) {
            Ok(()) => Ok(buf.len()),
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::WriteZero
                ) =>
            {
                self.connected = false;
                Ok(0)
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                Err(Error::Timeout)
            }
            Err(_) => Err(Error::WriteError),
        }
    }
}

impl Close for TcpConnection {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn close(&mut self) {
        if self.connected {
            let _ = self.stream.shutdown(Shutdown::Both);
            self.connected = false;
        }
    }
}

impl Connection for TcpConnection {}
