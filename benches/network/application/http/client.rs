use criterion::{Criterion, Throughput};
use iot_http::network::application::http::Client;
use iot_http::network::application::http::data::{MapSource, StreamSink, TextSink};
use iot_http::network::{Close, Connect, Connection, Read, Write};
use std::hint::black_box;

const BODY_LEN: usize = 16 * 1024;
const TIMEOUT_MS: u32 = 1_000;

/// Serves the same canned response on every connection.
struct Canned {
    response: Vec<u8>,
}

struct CannedConnection {
    response: Vec<u8>,
    pos: usize,
}

impl Read for CannedConnection {
    type Error = ();

    fn receive(&mut self, buf: &mut [u8], _min_len: usize, _timeout_ms: u32) -> Result<usize, ()> {
        let rest = &self.response[self.pos..];
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        Ok(n)
    }
}

impl Write for CannedConnection {
    type Error = ();

    fn send_all(&mut self, buf: &[u8], _timeout_ms: u32) -> Result<usize, ()> {
        black_box(buf);
        Ok(buf.len())
    }
}

impl Close for CannedConnection {
    fn is_connected(&self) -> bool {
        self.pos < self.response.len()
    }

    fn close(&mut self) {
        self.pos = self.response.len();
    }
}

impl Connection for CannedConnection {}

impl Connect for Canned {
    type Connection = CannedConnection;
    type Error = ();

    fn connect(&mut self, _host: &str, _port: u16) -> Result<CannedConnection, ()> {
        Ok(CannedConnection {
            response: self.response.clone(),
            pos: 0,
        })
    }
}

fn body() -> Vec<u8> {
    (0..BODY_LEN).map(|i| (i % 251) as u8).collect()
}

fn length_response() -> Vec<u8> {
    let body = body();
    let mut response = format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n", body.len()).into_bytes();
    response.extend_from_slice(&body);
    response
}

fn chunked_response(chunk: usize) -> Vec<u8> {
    let mut response = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n".to_vec();
    for piece in body().chunks(chunk) {
        response.extend_from_slice(format!("{:X}\r\n", piece.len()).as_bytes());
        response.extend_from_slice(piece);
        response.extend_from_slice(b"\r\n");
    }
    response.extend_from_slice(b"0\r\n\r\n");
    response
}

pub fn bench_length_download(c: &mut Criterion) {
    let mut group = c.benchmark_group("length_download");
    group.throughput(Throughput::Bytes(BODY_LEN as u64));

    let mut small: Client<_, 256> = Client::new(Canned {
        response: length_response(),
    });
    group.bench_function("buffer_256", |b| {
        b.iter(|| {
            let mut total = 0;
            let mut sink = StreamSink::new(|data: &[u8]| {
                total += data.len();
                data.len()
            });
            small
                .get("http://bench.local/blob", &mut sink, TIMEOUT_MS)
                .expect("download failed");
            drop(sink);
            black_box(total)
        })
    });

    let mut large: Client<_, 2048> = Client::new(Canned {
        response: length_response(),
    });
    group.bench_function("buffer_2048", |b| {
        b.iter(|| {
            let mut total = 0;
            let mut sink = StreamSink::new(|data: &[u8]| {
                total += data.len();
                data.len()
            });
            large
                .get("http://bench.local/blob", &mut sink, TIMEOUT_MS)
                .expect("download failed");
            drop(sink);
            black_box(total)
        })
    });
    group.finish();
}

pub fn bench_chunked_download(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunked_download");
    group.throughput(Throughput::Bytes(BODY_LEN as u64));

    for chunk in [64, 1024] {
        let mut client: Client<_> = Client::new(Canned {
            response: chunked_response(chunk),
        });
        group.bench_function(format!("chunks_of_{}", chunk), |b| {
            b.iter(|| {
                let mut out = vec![0u8; BODY_LEN];
                let mut sink = TextSink::new(&mut out);
                client
                    .get("http://bench.local/blob", &mut sink, TIMEOUT_MS)
                    .expect("download failed");
                black_box(sink.len())
            })
        });
    }
    group.finish();
}

pub fn bench_form_upload(c: &mut Criterion) {
    let mut group = c.benchmark_group("form_upload");
    let pairs = [
        ("device", "sensor-01"),
        ("temperature", "21.5"),
        ("humidity", "48 %"),
        ("note", "all systems nominal"),
    ];
    let mut client: Client<_> = Client::new(Canned {
        response: b"HTTP/1.1 201 Created\r\nContent-Length: 0\r\n\r\n".to_vec(),
    });
    group.bench_function("post_form", |b| {
        b.iter(|| {
            let mut form = MapSource::new(&pairs);
            let mut reply = [0u8; 16];
            let mut sink = TextSink::new(&mut reply);
            client
                .post("http://bench.local/readings", &mut form, &mut sink, TIMEOUT_MS)
                .expect("upload failed");
        })
    });
    group.finish();
}
