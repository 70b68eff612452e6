//! Benchmarks for exec-gatekeeper
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use exec_gatekeeper::{
    validate, ArgumentRule, ByteOrder, FrameCodec, HostLogger, Request, Rule, RuleSet,
};
use std::io::Cursor;

fn ruleset() -> RuleSet {
    let mut rules: Vec<Rule> = (0..50)
        .map(|i| Rule::new(format!("tool{}", i), vec![ArgumentRule::exact("--help")]))
        .collect();
    rules.push(Rule::new(
        "firefox",
        vec![ArgumentRule {
            trim_left: vec!["ext+firefox:".to_string()],
            insert_before: vec!["--new-tab".to_string()],
            ..ArgumentRule::url()
        }],
    ));
    RuleSet::new(rules)
}

/// Benchmark loading the allowlist from YAML
fn bench_rules_parsing(c: &mut Criterion) {
    let yaml = r#"
- cmd: notepad
  arguments:
    - type: list
      values: ["a.txt", "b.txt"]
- cmd: firefox
  arguments:
    - type: url
      trimLeft: ["ext+firefox:"]
"#;

    c.bench_function("rules_parsing", |b| {
        b.iter(|| black_box(serde_yaml::from_str::<RuleSet>(black_box(yaml)).unwrap()))
    });
}

/// Benchmark decoding a request payload
fn bench_request_decoding(c: &mut Criterion) {
    let json = br#"{"cmd":"exec","command":"firefox","arguments":["https://example.com"]}"#;

    c.bench_function("request_decoding", |b| {
        b.iter(|| black_box(Request::decode(black_box(json))))
    });
}

/// Benchmark a request accepted by the last rule
fn bench_validate_accepted(c: &mut Criterion) {
    let rules = ruleset();
    let args = vec!["ext+firefox:https://example.com/page".to_string()];
    let mut log = HostLogger::default();

    c.bench_function("validate_accepted", |b| {
        b.iter(|| black_box(validate("firefox", black_box(&args), &rules, &mut log)))
    });
}

/// Benchmark a request no rule names
fn bench_validate_rejected(c: &mut Criterion) {
    let rules = ruleset();
    let args = vec!["-c".to_string(), "id".to_string()];
    let mut log = HostLogger::default();

    c.bench_function("validate_rejected", |b| {
        b.iter(|| black_box(validate("/bin/sh", black_box(&args), &rules, &mut log)))
    });
}

/// Benchmark reading one frame
fn bench_frame_read(c: &mut Criterion) {
    let codec = FrameCodec::new(ByteOrder::Native, 8192, false);
    let bytes = codec
        .encode_frame(br#"{"cmd":"exec","command":"notepad","arguments":["a.txt"]}"#)
        .unwrap();

    c.bench_function("frame_read", |b| {
        b.iter(|| black_box(codec.read_frame(&mut Cursor::new(black_box(&bytes))).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_rules_parsing,
    bench_request_decoding,
    bench_validate_accepted,
    bench_validate_rejected,
    bench_frame_read,
);
criterion_main!(benches);
