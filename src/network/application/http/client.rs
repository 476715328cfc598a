//! The HTTP client and its redirect controller.

use super::auth::{self, TOKEN_CAPACITY};
use super::body;
use super::buffer::Buffer;
use super::data::{DataIn, DataOut, TextSink, TextSource};
use super::error::Error;
use super::request::{self, Head};
use super::response::{self, Next};
use super::url::{URL_CAPACITY, Url};
use crate::network::{Connect, Session};
use heapless::{String, Vec};

/// Maximum number of custom request headers
pub const MAX_HEADERS: usize = 8;
/// Maximum custom header name length in bytes
pub const HEADER_NAME_CAPACITY: usize = 64;
/// Maximum custom header value length in bytes
pub const HEADER_VALUE_CAPACITY: usize = 128;
/// Working buffer size used when none is given
pub const DEFAULT_BUFFER_SIZE: usize = 256;
/// Attempts allowed per transaction unless configured otherwise
pub const DEFAULT_MAX_REDIRECTIONS: u32 = 1;

/// Request method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
}

impl Method {
    /// The method as it appears on the request line
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
        }
    }
}

/// A custom request header, sent verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String<HEADER_NAME_CAPACITY>,
    pub value: String<HEADER_VALUE_CAPACITY>,
}

impl Header {
    /// Copy `name` and `value` into bounded storage.
    pub fn new(name: &str, value: &str) -> Result<Self, Error> {
        Ok(Self {
            name: String::try_from(name).map_err(|_| Error::Overflow)?,
            value: String::try_from(value).map_err(|_| Error::Overflow)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Attempt,
    Redirecting,
    Done,
    Failed(Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Redirect,
    Complete,
}

/// A blocking HTTP/1.1 client.
///
/// Every transaction opens its own connection through the connector `N`
/// and closes it before returning, whatever the outcome. All request and
/// response bytes pass through one working buffer of `B` bytes.
///
/// The client remembers the last status code and the last `Location`
/// header between transactions; credentials, custom headers and the
/// redirect budget stay configured until changed.
#[derive(Debug)]
pub struct Client<N: Connect, const B: usize = DEFAULT_BUFFER_SIZE> {
    connector: N,
    buffer: Buffer<B>,
    authorization: Option<String<TOKEN_CAPACITY>>,
    headers: Vec<Header, MAX_HEADERS>,
    max_redirects: u32,
    status: u16,
    location: Option<String<URL_CAPACITY>>,
}

impl<N: Connect, const B: usize> Client<N, B> {
    /// A client opening its connections through `connector`
    pub fn new(connector: N) -> Self {
        Self {
            connector,
            buffer: Buffer::new(),
            authorization: None,
            headers: Vec::new(),
            max_redirects: DEFAULT_MAX_REDIRECTIONS,
            status: 0,
            location: None,
        }
    }

    /// Send `Authorization: Basic` with these credentials on every request.
    pub fn basic_auth(&mut self, user: &str, password: &str) -> Result<(), Error> {
        self.authorization = Some(auth::basic_token(user, password)?);
        Ok(())
    }

    /// Stop sending credentials
    pub fn clear_basic_auth(&mut self) {
        self.authorization = None;
    }

    /// Replace the custom headers sent with every request.
    ///
    /// On error the previous headers are kept.
    pub fn custom_headers(&mut self, headers: &[(&str, &str)]) -> Result<(), Error> {
        let mut list = Vec::new();
        for (name, value) in headers {
            list.push(Header::new(name, value)?)
                .map_err(|_| Error::Overflow)?;
        }
        self.headers = list;
        Ok(())
    }

    /// Stop sending custom headers
    pub fn clear_custom_headers(&mut self) {
        self.headers.clear();
    }

    /// Set how many attempts one transaction may make. Values below 1 are
    /// raised to 1, which never follows a redirect.
    pub fn max_redirections(&mut self, attempts: u32) {
        self.max_redirects = attempts.max(1);
    }

    /// Status code of the last response, `0` before any was received
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The last `Location` header received
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// The connector used to open connections
    pub fn connector(&mut self) -> &mut N {
        &mut self.connector
    }

    /// `GET` a resource into `sink`.
    pub fn get<I>(&mut self, url: &str, sink: &mut I, timeout_ms: u32) -> Result<(), Error>
    where
        I: DataIn + ?Sized,
    {
        self.execute::<TextSource<'_>, I>(Method::Get, url, None, sink, timeout_ms)
    }

    /// `GET` a resource into `buf`, keeping at most `max_len` bytes.
    ///
    /// Returns the number of bytes stored.
    pub fn get_text(
        &mut self,
        url: &str,
        buf: &mut [u8],
        max_len: usize,
        timeout_ms: u32,
    ) -> Result<usize, Error> {
        let max_len = max_len.min(buf.len());
        let mut sink = TextSink::new(&mut buf[..max_len]);
        self.get(url, &mut sink, timeout_ms)?;
        Ok(sink.len())
    }

    /// `POST` the body produced by `source`, response into `sink`.
    pub fn post<D, I>(
        &mut self,
        url: &str,
        source: &mut D,
        sink: &mut I,
        timeout_ms: u32,
    ) -> Result<(), Error>
    where
        D: DataOut + ?Sized,
        I: DataIn + ?Sized,
    {
        self.execute(Method::Post, url, Some(source), sink, timeout_ms)
    }

    /// `PUT` the body produced by `source`, response into `sink`.
    pub fn put<D, I>(
        &mut self,
        url: &str,
        source: &mut D,
        sink: &mut I,
        timeout_ms: u32,
    ) -> Result<(), Error>
    where
        D: DataOut + ?Sized,
        I: DataIn + ?Sized,
    {
        self.execute(Method::Put, url, Some(source), sink, timeout_ms)
    }

    /// `DELETE` a resource, response into `sink`.
    pub fn delete<I>(&mut self, url: &str, sink: &mut I, timeout_ms: u32) -> Result<(), Error>
    where
        I: DataIn + ?Sized,
    {
        self.execute::<TextSource<'_>, I>(Method::Delete, url, None, sink, timeout_ms)
    }

    fn execute<D, I>(
        &mut self,
        method: Method,
        url: &str,
        mut source: Option<&mut D>,
        sink: &mut I,
        timeout_ms: u32,
    ) -> Result<(), Error>
    where
        D: DataOut + ?Sized,
        I: DataIn + ?Sized,
    {
        self.status = 0;
        sink.reset();

        let mut budget = self.max_redirects;
        let mut redirected: Option<String<URL_CAPACITY>> = None;
        let mut state = State::Attempt;
        loop {
            state = match state {
                State::Attempt => {
                    budget -= 1;
                    let target = redirected.as_deref().unwrap_or(url);
                    let follow = budget > 0;
                    match self.attempt(method, target, source.as_deref_mut(), sink, follow, timeout_ms)
                    {
                        Ok(Step::Redirect) => State::Redirecting,
                        Ok(Step::Complete) => State::Done,
                        Err(e) => State::Failed(e),
                    }
                }
                State::Redirecting => match &self.location {
                    Some(location) => {
                        info!("following redirect to {}", location.as_str());
                        redirected = Some(location.clone());
                        State::Attempt
                    }
                    None => State::Failed(Error::Protocol),
                },
                State::Done => {
                    debug!("transaction complete, status {}", self.status);
                    return Ok(());
                }
                State::Failed(e) => {
                    error!("transaction failed: {}", e);
                    return Err(e);
                }
            };
        }
    }

    /// One request/response exchange on a fresh connection.
    fn attempt<D, I>(
        &mut self,
        method: Method,
        url: &str,
        mut source: Option<&mut D>,
        sink: &mut I,
        follow: bool,
        timeout_ms: u32,
    ) -> Result<Step, Error>
    where
        D: DataOut + ?Sized,
        I: DataIn + ?Sized,
    {
        let url = Url::parse(url)?;
        if !url.scheme().eq_ignore_ascii_case("http") {
            warn!("unsupported scheme {}", url.scheme());
            return Err(Error::Parse);
        }

        debug!("connecting to {}:{}", url.host(), url.port());
        let connection = self
            .connector
            .connect(url.host(), url.port())
            .map_err(|_| {
                warn!("could not connect to {}", url.host());
                Error::Dns
            })?;
        let mut session = Session::new(connection);
        let conn = session.connection();

        if let Some(source) = source.as_deref_mut() {
            source.reset();
        }
        let head = Head {
            method,
            host: url.host(),
            port: url.port(),
            path: url.path(),
            authorization: self.authorization.as_deref(),
            headers: &self.headers,
        };
        request::write(conn, self.buffer.scratch(), &head, source, timeout_ms)?;

        self.buffer.clear();
        let status = response::read_status(conn, &mut self.buffer, timeout_ms)?;
        self.status = status;
        if !(200..400).contains(&status) {
            return Err(Error::Status(status));
        }

        match response::read_headers(
            conn,
            &mut self.buffer,
            sink,
            &mut self.location,
            follow,
            timeout_ms,
        )? {
            Next::Redirect => Ok(Step::Redirect),
            Next::Body(framing) => {
                body::decode(conn, &mut self.buffer, sink, framing, timeout_ms)?;
                Ok(Step::Complete)
            }
        }
    }
}
