//! The working buffer.
//!
//! One fixed-capacity byte array with a `consumed..filled` window of pending
//! bytes. Invariant: `consumed <= filled <= N`. Pending bytes are moved to
//! the front by [`Buffer::compact`] before every refill.

use super::Error;
use crate::network::{Close, Read};

#[derive(Debug)]
pub(crate) struct Buffer<const N: usize> {
    bytes: [u8; N],
    consumed: usize,
    filled: usize,
}

impl<const N: usize> Buffer<N> {
    pub(crate) const fn new() -> Self {
        Self {
            bytes: [0; N],
            consumed: 0,
            filled: 0,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.consumed = 0;
        self.filled = 0;
    }

    /// Bytes read from the transport but not yet consumed
    pub(crate) fn pending(&self) -> &[u8] {
        &self.bytes[self.consumed..self.filled]
    }

    pub(crate) fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.filled - self.consumed);
        self.consumed = (self.consumed + n).min(self.filled);
        if self.consumed == self.filled {
            self.clear();
        }
    }

    /// Whether no further byte fits, even after compacting
    pub(crate) fn is_full(&self) -> bool {
        self.filled - self.consumed == N
    }

    pub(crate) fn compact(&mut self) {
        if self.consumed > 0 {
            self.bytes.copy_within(self.consumed..self.filled, 0);
            self.filled -= self.consumed;
            self.consumed = 0;
        }
    }

    /// Position of the first CRLF among the pending bytes
    pub(crate) fn find_crlf(&self) -> Option<usize> {
        self.pending().windows(2).position(|w| w == b"\r\n")
    }

    /// Append to the pending bytes; returns how many fit.
    pub(crate) fn extend(&mut self, data: &[u8]) -> usize {
        self.compact();
        let n = data.len().min(N - self.filled);
        self.bytes[self.filled..self.filled + n].copy_from_slice(&data[..n]);
        self.filled += n;
        n
    }

    /// The whole array as scratch space, discarding pending bytes.
    pub(crate) fn scratch(&mut self) -> &mut [u8; N] {
        self.clear();
        &mut self.bytes
    }

    /// Refill until at least `want` bytes are pending (capped at `N`).
    ///
    /// Each receive blocks for the missing bytes and opportunistically takes
    /// whatever else fits.
    pub(crate) fn fill_to<T>(&mut self, conn: &mut T, want: usize, timeout_ms: u32) -> Result<(), Error>
    where
        T: Read + Close,
    {
        let want = want.min(N);
        while self.filled - self.consumed < want {
            if !conn.is_connected() {
                warn!("connection closed by server");
                return Err(Error::Closed);
            }
            self.compact();
            let missing = want - self.filled;
            let read = conn
                .receive(&mut self.bytes[self.filled..], missing, timeout_ms)
                .map_err(|_| {
                    error!("receive failed");
                    Error::Connection
                })?;
            if read == 0 {
                warn!("connection closed by server");
                return Err(Error::Closed);
            }
            trace!("received {} bytes", read);
            self.filled += read;
        }
        Ok(())
    }

    /// Refill with at least one more byte.
    pub(crate) fn fill<T>(&mut self, conn: &mut T, timeout_ms: u32) -> Result<(), Error>
    where
        T: Read + Close,
    {
        let want = self.filled - self.consumed + 1;
        self.fill_to(conn, want, timeout_ms)
    }

    /// Length of the next CRLF-terminated line, reading more as needed.
    ///
    /// A buffer that fills up without a CRLF is a protocol error.
    pub(crate) fn read_line<T>(&mut self, conn: &mut T, timeout_ms: u32) -> Result<usize, Error>
    where
        T: Read + Close,
    {
        loop {
            if let Some(pos) = self.find_crlf() {
                return Ok(pos);
            }
            if self.is_full() {
                error!("no line terminator within {} bytes", N);
                return Err(Error::Protocol);
            }
            self.fill(conn, timeout_ms)?;
        }
    }
}
