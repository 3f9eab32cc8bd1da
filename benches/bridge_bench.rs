use criterion::{black_box, criterion_group, criterion_main, Criterion};
use webshell_bridge::dispatch::{build_callback_snippet, ResponsePayload};
use webshell_bridge::escape::escape_js_string;
use webshell_bridge::request::decode_request;

fn bench_escape(c: &mut Criterion) {
    let input = "line with \"quotes\" and \\slashes\\\n".repeat(64);
    c.bench_function("escape_js_string", |b| {
        b.iter(|| escape_js_string(black_box(&input)))
    });
}

fn bench_decode(c: &mut Criterion) {
    let message = serde_json::json!({
        "correlationId": "bench-1",
        "command": ["git", "status", "--porcelain", "-z"]
    });
    c.bench_function("decode_request", |b| {
        b.iter(|| decode_request(black_box(&message)))
    });
}

fn bench_snippet(c: &mut Criterion) {
    let payload = ResponsePayload {
        correlation_id: "bench-2".into(),
        stdout: escape_js_string(&"output line\n".repeat(128)),
        stderr: String::new(),
        exit_code: 0,
        error: None,
    };
    c.bench_function("build_callback_snippet", |b| {
        b.iter(|| {
            build_callback_snippet(
                black_box("window.__webshell_callbacks"),
                black_box(&payload),
            )
        })
    });
}

criterion_group!(benches, bench_escape, bench_decode, bench_snippet);
criterion_main!(benches);
