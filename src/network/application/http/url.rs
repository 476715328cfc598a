//! Absolute URL parsing into bounded components.
//!
//! `scheme://host[:port][/path][?query][#fragment]`
//!
//! Each component is copied into fixed-capacity storage. A component that
//! does not fit is a parse error, never a truncation.

use super::Error;
use core::fmt;
use core::str::FromStr;
use heapless::String;

/// Maximum scheme length in bytes
pub const SCHEME_CAPACITY: usize = 8;
/// Maximum host length in bytes
pub const HOST_CAPACITY: usize = 64;
/// Maximum path (query included) length in bytes
pub const PATH_CAPACITY: usize = 256;
/// Maximum length of a whole URL kept by the client (redirect locations)
pub const URL_CAPACITY: usize = 256;
/// Port used when the URL does not name one
pub const DEFAULT_PORT: u16 = 80;

/// A parsed absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    scheme: String<SCHEME_CAPACITY>,
    host: String<HOST_CAPACITY>,
    port: u16,
    path: String<PATH_CAPACITY>,
}

impl Url {
    /// Parse an absolute URL.
    ///
    /// The fragment is dropped, the query stays part of the path. A missing
    /// path becomes `/`, a missing (or zero) port becomes [`DEFAULT_PORT`].
    pub fn parse(url: &str) -> Result<Self, Error> {
        let (scheme, rest) = url.split_once("://").ok_or(Error::Parse)?;

        let rest = match rest.find('#') {
            Some(pos) => &rest[..pos],
            None => rest,
        };

        let authority_end = rest.find(['/', '?']).unwrap_or(rest.len());
        let (authority, path) = rest.split_at(authority_end);

        let (host, port) = match authority.split_once(':') {
            Some((host, port)) => (host, parse_port(port)?),
            None => (authority, DEFAULT_PORT),
        };
        if host.is_empty() {
            return Err(Error::Parse);
        }

        let mut url = Url {
            scheme: String::try_from(scheme).map_err(|_| Error::Parse)?,
            host: String::try_from(host).map_err(|_| Error::Parse)?,
            port,
            path: String::new(),
        };

        if !path.starts_with('/') {
            url.path.push('/').map_err(|_| Error::Parse)?;
        }
        url.path.push_str(path).map_err(|_| Error::Parse)?;
        Ok(url)
    }

    /// The scheme, e.g. `http`
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The host name or address literal
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The port, [`DEFAULT_PORT`] unless the URL named one
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The request target: path and query
    pub fn path(&self) -> &str {
        &self.path
    }
}

fn parse_port(port: &str) -> Result<u16, Error> {
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Parse);
    }
    match port.parse::<u16>() {
        Ok(0) => Ok(DEFAULT_PORT),
        Ok(port) => Ok(port),
        Err(_) => Err(Error::Parse),
    }
}

impl FromStr for Url {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Url::parse(s)
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)?;
        if self.port != DEFAULT_PORT {
            write!(f, ":{}", self.port)?;
        }
        f.write_str(&self.path)
    }
}
