// Copyright (c) 2026 Bountyy Oy. All rights reserved.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gma_client::HeaderSource;
use reqwest::header::{HeaderMap, HeaderValue};

fn raw_header_benchmark(c: &mut Criterion) {
    let block = "HTTP/1.1 302 Found\r\n\
        Date: Mon, 12 Jan 2026 10:00:00 GMT\r\n\
        Location: https://thekey.me/cas/login?service=https%3A%2F%2Fgma.example.org%2Findex.php%3Fq%3Den\r\n\
        Set-Cookie: SESSpre=abcdef0123456789; path=/; HttpOnly\r\n\
        Content-Length: 0\r\n\
        \r\n";
    let chain = block.repeat(4);

    c.bench_function("raw_location", |b| {
        b.iter(|| black_box(chain.as_str()).location())
    });

    c.bench_function("raw_session_cookie", |b| {
        b.iter(|| black_box(chain.as_str()).session_cookie())
    });
}

fn header_map_benchmark(c: &mut Criterion) {
    let mut headers = HeaderMap::new();
    for i in 0..4 {
        headers.append(
            "set-cookie",
            HeaderValue::from_str(&format!("SESS{}=value{}; path=/; HttpOnly", i, i)).unwrap(),
        );
    }
    headers.insert("location", HeaderValue::from_static("https://gma.example.org/index.php?q=en/node"));

    c.bench_function("map_session_cookie", |b| {
        b.iter(|| black_box(&headers).session_cookie())
    });
}

criterion_group!(benches, raw_header_benchmark, header_map_benchmark);
criterion_main!(benches);
