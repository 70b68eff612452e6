//! End-to-end tests for the message loop over in-memory streams

use std::cell::RefCell;
use std::io::{self, Cursor, Write};

use exec_gatekeeper::{
    ArgumentRule, ByteOrder, ExecOutcome, Executor, FrameCodec, Host, HostLogger, Rule, RuleSet,
};
use serde_json::{json, Value};

#[derive(Default)]
struct Recorder {
    calls: RefCell<Vec<Vec<String>>>,
}

impl Executor for Recorder {
    fn run(&self, program: &str, args: &[String]) -> ExecOutcome {
        let mut argv = vec![program.to_string()];
        argv.extend(args.iter().cloned());
        self.calls.borrow_mut().push(argv);
        ExecOutcome {
            success: true,
            exit_code: Some(0),
            stdout: "opened".to_string(),
            stderr: String::new(),
        }
    }
}

/// Writer whose every write fails
struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn codec() -> FrameCodec {
    FrameCodec::new(ByteOrder::Native, 8192, false)
}

fn notepad_rules() -> RuleSet {
    RuleSet::new(vec![Rule::new(
        "notepad",
        vec![ArgumentRule::list(["a.txt", "b.txt"])],
    )])
}

fn host() -> Host<Recorder> {
    Host::new(notepad_rules(), codec(), Recorder::default(), HostLogger::default())
}

fn frames(messages: &[Value]) -> Vec<u8> {
    let mut out = Vec::new();
    for message in messages {
        out.extend(codec().encode_frame(message.to_string().as_bytes()).unwrap());
    }
    out
}

fn responses(output: Vec<u8>) -> Vec<Value> {
    let mut cursor = Cursor::new(output);
    let mut out = Vec::new();
    while let Some(frame) = codec().read_frame(&mut cursor).unwrap() {
        out.push(serde_json::from_slice(&frame.payload).unwrap());
    }
    out
}

fn session(host: &mut Host<Recorder>, input: Vec<u8>) -> Vec<Value> {
    let mut reader = Cursor::new(input);
    let mut writer = Vec::new();
    host.run(&mut reader, &mut writer);
    responses(writer)
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_scenario_a_allowed_exec() {
    let mut host = host();
    let replies = session(
        &mut host,
        frames(&[json!({"cmd": "exec", "command": "notepad", "arguments": ["a.txt"]})]),
    );

    assert_eq!(replies, vec![json!({"code": 0, "stdout": "opened", "stderr": ""})]);
    assert_eq!(*host.executor().calls.borrow(), vec![vec!["notepad", "a.txt"]]);
}

#[test]
fn test_scenario_b_rejected_exec() {
    let mut host = host();
    let replies = session(
        &mut host,
        frames(&[json!({"cmd": "exec", "command": "notepad", "arguments": ["c.txt"]})]),
    );

    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["code"], 1000);
    assert!(replies[0]["error"].is_string());
    assert!(host.executor().calls.borrow().is_empty());
}

#[test]
fn test_scenario_c_version() {
    let mut host = Host::new(
        RuleSet::default(),
        codec(),
        Recorder::default(),
        HostLogger::default(),
    );
    let replies = session(&mut host, frames(&[json!({"cmd": "version"})]));
    assert_eq!(replies, vec![json!({"version": "1.0.1"})]);
}

#[test]
fn test_scenario_d_short_stream() {
    let mut host = host();
    let mut input = 9000u32.to_ne_bytes().to_vec();
    input.extend_from_slice(b"0123456789");

    let replies = session(&mut host, input);
    assert!(replies.is_empty());
    assert_eq!(host.frames(), 0);
    assert!(host.executor().calls.borrow().is_empty());
}

// ============================================================================
// Session behavior
// ============================================================================

#[test]
fn test_one_response_per_request() {
    let mut host = host();
    let replies = session(
        &mut host,
        frames(&[
            json!({"cmd": "version"}),
            json!({"cmd": "exec", "command": 12}),
            json!({"cmd": "echo"}),
            json!({"cmd": "format-disk"}),
            json!({"cmd": "env"}),
            json!({"cmd": "exec", "command": "notepad", "arguments": ["b.txt"]}),
        ]),
    );

    assert_eq!(replies.len(), 6);
    assert_eq!(replies[0]["version"], "1.0.1");
    assert_eq!(replies[1]["code"], 1000);
    assert_eq!(replies[2]["cmd"], "echo");
    assert_eq!(replies[3], json!({"error": "cmd is unknown", "cmd": "format-disk", "code": 1000}));
    assert!(replies[4]["env"].is_object());
    assert_eq!(replies[5]["code"], 0);
    assert_eq!(host.frames(), 6);
}

#[test]
fn test_malformed_payload_gets_rejection() {
    let mut host = host();
    let mut input = codec().encode_frame(b"{not json").unwrap();
    input.extend(frames(&[json!({"cmd": "version"})]));

    let replies = session(&mut host, input);
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0]["code"], 1000);
    assert_eq!(replies[1]["version"], "1.0.1");
}

#[test]
fn test_empty_argument_decode_failure_never_executes() {
    let rules = RuleSet::new(vec![Rule::new(
        "notepad",
        vec![ArgumentRule::list(["", "a.txt"])],
    )]);
    let mut host = Host::new(rules, codec(), Recorder::default(), HostLogger::default());
    let replies = session(
        &mut host,
        frames(&[json!({"cmd": "exec", "command": "notepad", "arguments": [1]})]),
    );
    assert_eq!(replies[0]["code"], 1000);
    assert!(host.executor().calls.borrow().is_empty());
}

#[test]
fn test_oversized_frame_is_truncated_and_session_continues() {
    let small = FrameCodec::new(ByteOrder::Native, 16, false);
    let mut host = Host::new(notepad_rules(), small, Recorder::default(), HostLogger::default());

    let big = json!({"cmd": "exec", "command": "notepad", "arguments": ["a.txt"]});
    let mut input = small.encode_frame(big.to_string().as_bytes()).unwrap();
    input.extend(small.encode_frame(br#"{"cmd":"env"}"#).unwrap());

    let mut writer = Vec::new();
    host.run(&mut Cursor::new(input), &mut writer);
    let replies = responses(writer);

    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0]["code"], 1000);
    assert!(replies[1]["env"].is_object());
    assert!(host.executor().calls.borrow().is_empty());
}

#[test]
fn test_strict_oversized_frame_ends_session() {
    let strict = FrameCodec::new(ByteOrder::Native, 16, true);
    let mut host = Host::new(notepad_rules(), strict, Recorder::default(), HostLogger::default());

    let mut input = strict.encode_frame(&[b' '; 32]).unwrap();
    input.extend(strict.encode_frame(br#"{"cmd":"env"}"#).unwrap());

    let mut writer = Vec::new();
    host.run(&mut Cursor::new(input), &mut writer);
    let replies = responses(writer);

    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["code"], 1000);
}

#[test]
fn test_write_failure_does_not_stop_loop() {
    let mut host = host();
    let input = frames(&[
        json!({"cmd": "exec", "command": "notepad", "arguments": ["a.txt"]}),
        json!({"cmd": "exec", "command": "notepad", "arguments": ["b.txt"]}),
    ]);
    host.run(&mut Cursor::new(input), &mut BrokenPipe);

    assert_eq!(host.frames(), 2);
    assert_eq!(host.executor().calls.borrow().len(), 2);
}

#[test]
fn test_session_is_logged() {
    let log_file = tempfile::NamedTempFile::new().unwrap();
    let mut host = Host::new(
        notepad_rules(),
        codec(),
        Recorder::default(),
        HostLogger::new(Some(log_file.path())),
    );
    session(
        &mut host,
        frames(&[json!({"cmd": "exec", "command": "notepad", "arguments": ["c.txt"]})]),
    );

    let log = std::fs::read_to_string(log_file.path()).unwrap();
    assert!(log.contains("not in list"));
    assert!(log.contains("shutdown"));
    for line in log.lines() {
        let entry: Value = serde_json::from_str(line).unwrap();
        assert!(entry["timestamp"].is_string());
    }
}

// ============================================================================
// Framing
// ============================================================================

#[test]
fn test_framing_round_trip() {
    let payloads: [&[u8]; 4] = [b"", b"x", br#"{"cmd":"version"}"#, &[0u8; 8192]];
    for payload in payloads {
        let bytes = codec().encode_frame(payload).unwrap();
        let frame = codec()
            .read_frame(&mut Cursor::new(bytes))
            .unwrap()
            .unwrap();
        assert_eq!(frame.payload, payload);
    }
}
