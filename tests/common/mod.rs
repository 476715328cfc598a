#![allow(dead_code)]

use iot_http::network::application::http::DataIn;
use iot_http::network::{Close, Connect, Connection, Read, Write};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Everything the mock network saw, shared between the connector and its
/// connections.
#[derive(Debug, Default)]
pub struct Log {
    pub connects: Vec<(String, u16)>,
    pub requests: Vec<Vec<u8>>,
    pub closed: usize,
}

impl Log {
    pub fn request(&self, index: usize) -> String {
        String::from_utf8(self.requests[index].clone()).unwrap()
    }

    pub fn request_line(&self, index: usize) -> String {
        self.request(index).lines().next().unwrap_or_default().to_string()
    }
}

/// One scripted connection: each receive hands out (at most) the next piece.
#[derive(Debug)]
pub struct MockConnection {
    reads: VecDeque<Vec<u8>>,
    index: usize,
    open: bool,
    log: Rc<RefCell<Log>>,
}

impl Read for MockConnection {
    type Error = ();

    fn receive(&mut self, buf: &mut [u8], _min_len: usize, _timeout_ms: u32) -> Result<usize, ()> {
        let Some(mut piece) = self.reads.pop_front() else {
            self.open = false;
            return Ok(0);
        };
        let n = piece.len().min(buf.len());
        buf[..n].copy_from_slice(&piece[..n]);
        if n < piece.len() {
            self.reads.push_front(piece.split_off(n));
        }
        Ok(n)
    }
}

impl Write for MockConnection {
    type Error = ();

    fn send_all(&mut self, buf: &[u8], _timeout_ms: u32) -> Result<usize, ()> {
        if !self.open {
            return Ok(0);
        }
        self.log.borrow_mut().requests[self.index].extend_from_slice(buf);
        Ok(buf.len())
    }
}

impl Close for MockConnection {
    fn is_connected(&self) -> bool {
        self.open || !self.reads.is_empty()
    }

    fn close(&mut self) {
        self.open = false;
        self.reads.clear();
        self.log.borrow_mut().closed += 1;
    }
}

impl Connection for MockConnection {}

/// Hands out one scripted connection per connect, in order. Connecting once
/// the script is exhausted fails.
#[derive(Debug)]
pub struct MockNetwork {
    script: VecDeque<Vec<Vec<u8>>>,
    pub log: Rc<RefCell<Log>>,
}

impl MockNetwork {
    /// Each entry is the list of reads one connection will deliver.
    pub fn new(script: Vec<Vec<Vec<u8>>>) -> Self {
        Self {
            script: script.into(),
            log: Rc::default(),
        }
    }

    /// One connection per response, each delivered in a single read.
    pub fn responses(responses: &[&[u8]]) -> Self {
        Self::new(responses.iter().map(|r| vec![r.to_vec()]).collect())
    }
}

impl Connect for MockNetwork {
    type Connection = MockConnection;
    type Error = ();

    fn connect(&mut self, host: &str, port: u16) -> Result<MockConnection, ()> {
        let reads = self.script.pop_front().ok_or(())?;
        let mut log = self.log.borrow_mut();
        log.connects.push((host.to_string(), port));
        log.requests.push(Vec::new());
        Ok(MockConnection {
            reads: reads.into(),
            index: log.requests.len() - 1,
            open: true,
            log: Rc::clone(&self.log),
        })
    }
}

/// A sink remembering every notification it received.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub body: Vec<u8>,
    pub len: Option<usize>,
    pub chunked: bool,
    pub content_type: Option<String>,
    pub resets: usize,
    pub end_marks: usize,
}

impl DataIn for RecordingSink {
    fn reset(&mut self) {
        *self = Self {
            resets: self.resets + 1,
            ..Self::default()
        };
    }

    fn write(&mut self, buf: &[u8]) -> usize {
        if buf.is_empty() {
            self.end_marks += 1;
        }
        self.body.extend_from_slice(buf);
        buf.len()
    }

    fn set_len(&mut self, len: usize) {
        self.len = Some(len);
    }

    fn set_chunked(&mut self, chunked: bool) {
        self.chunked = chunked;
    }

    fn set_content_type(&mut self, content_type: &str) {
        self.content_type = Some(content_type.to_string());
    }
}

/// Frame `body` with a `Content-Length` header.
pub fn ok_response(body: &[u8]) -> Vec<u8> {
    let mut response = format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n", body.len()).into_bytes();
    response.extend_from_slice(body);
    response
}

/// Encode `body` as chunks of the given sizes (the rest goes in a last chunk).
pub fn chunked(body: &[u8], sizes: &[usize]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut rest = body;
    for &size in sizes {
        let size = size.min(rest.len());
        if size == 0 {
            continue;
        }
        out.extend_from_slice(format!("{:x}\r\n", size).as_bytes());
        out.extend_from_slice(&rest[..size]);
        out.extend_from_slice(b"\r\n");
        rest = &rest[size..];
    }
    if !rest.is_empty() {
        out.extend_from_slice(format!("{:X}\r\n", rest.len()).as_bytes());
        out.extend_from_slice(rest);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"0\r\n\r\n");
    out
}
