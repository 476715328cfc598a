//! HTTP client error kinds

/// The reason an HTTP transaction failed.
///
/// Every failure aborts the transaction and closes the connection. Only
/// redirects are retried internally.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// The URL could not be parsed or a component exceeds its capacity.
    Parse,
    /// The host could not be resolved or connected to.
    Dns,
    /// The server sent a malformed status line, header or chunk framing.
    Protocol,
    /// The transport failed to send or receive, timeouts included.
    Connection,
    /// The peer closed the connection before the transaction completed.
    Closed,
    /// The status code was outside `200..400`.
    Status(u16),
    /// A configured value does not fit its bounded storage.
    Overflow,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Parse => f.write_str("url parse error"),
            Error::Dns => f.write_str("could not connect to host"),
            Error::Protocol => f.write_str("protocol error"),
            Error::Connection => f.write_str("connection error"),
            Error::Closed => f.write_str("connection closed by peer"),
            Error::Status(code) => write!(f, "http status {}", code),
            Error::Overflow => f.write_str("value exceeds capacity"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Parse => defmt::write!(f, "Parse"),
            Error::Dns => defmt::write!(f, "Dns"),
            Error::Protocol => defmt::write!(f, "Protocol"),
            Error::Connection => defmt::write!(f, "Connection"),
            Error::Closed => defmt::write!(f, "Closed"),
            Error::Status(code) => defmt::write!(f, "Status({})", code),
            Error::Overflow => defmt::write!(f, "Overflow"),
        }
    }
}
