use criterion::{criterion_group, criterion_main};

mod network;

criterion_group!(
    benches,
    network::application::http::client::bench_length_download,
    network::application::http::client::bench_chunked_download,
    network::application::http::client::bench_form_upload
);
criterion_main!(benches);
