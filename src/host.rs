//! The message loop
//!
//! Reads one frame, answers it completely (including running any allowed
//! program), then reads the next. It stops when the peer closes the stream
//! or the stream can no longer be framed.

use std::io::{Read, Write};

use crate::audit::HostLogger;
use crate::engine::{self, MatchResult};
use crate::exec::Executor;
use crate::frame::{FrameCodec, FrameError};
use crate::handlers;
use crate::input::{ExecCommand, IncomingRequest, Request};
use crate::output::Response;
use crate::rules::RuleSet;

/// Loop state after handling one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Shutdown,
}

/// A single-peer native messaging session
pub struct Host<E: Executor> {
    rules: RuleSet,
    codec: FrameCodec,
    executor: E,
    log: HostLogger,
    frames: u64,
}

impl<E: Executor> Host<E> {
    pub fn new(rules: RuleSet, codec: FrameCodec, executor: E, log: HostLogger) -> Self {
        Self {
            rules,
            codec,
            executor,
            log,
            frames: 0,
        }
    }

    /// Serve until the stream ends
    pub fn run<R: Read, W: Write>(&mut self, reader: &mut R, writer: &mut W) {
        while self.step(reader, writer) == LoopState::Running {}
        self.log
            .trace("shutdown", format!("stdin closed after {} frames", self.frames));
    }

    /// Read and answer one frame
    pub fn step<R: Read, W: Write>(&mut self, reader: &mut R, writer: &mut W) -> LoopState {
        let frame = match self.codec.read_frame(reader) {
            Ok(Some(frame)) => frame,
            Ok(None) => return LoopState::Shutdown,
            Err(FrameError::Oversized { declared, max }) => {
                self.log.error(
                    "frame",
                    format!("message size of {} exceeds limit of {}, refusing", declared, max),
                );
                self.send(writer, &Response::oversized_request(max));
                return LoopState::Shutdown;
            }
            Err(e) => {
                self.log.error("frame", e.to_string());
                return LoopState::Shutdown;
            }
        };

        self.frames += 1;
        self.log.trace(
            "frame",
            format!("frame {}: {} bytes", self.frames, frame.declared),
        );
        if frame.is_truncated() {
            self.log.error(
                "frame",
                format!(
                    "message size of {} exceeds limit of {}, truncated",
                    frame.declared,
                    self.codec.max_payload()
                ),
            );
        }

        let response = self.handle_payload(&frame.payload);
        self.send(writer, &response);
        LoopState::Running
    }

    /// Decode a payload and produce its response
    pub fn handle_payload(&mut self, payload: &[u8]) -> Response {
        match Request::decode(payload) {
            Request::Parsed(request) => {
                self.log.trace("request", request.summary());
                self.handle(request)
            }
            Request::Malformed(reason) => {
                self.log
                    .error("request", format!("unable to decode message: {}", reason));
                Response::malformed_request()
            }
        }
    }

    fn handle(&mut self, request: IncomingRequest) -> Response {
        match request.kind.as_str() {
            "exec" => self.handle_exec(&request),
            "version" => handlers::version(),
            "env" => handlers::env(),
            "spec" => handlers::spec(),
            kind if handlers::is_unsupported(kind) => Response::unsupported_command(kind),
            kind => Response::unknown_command(kind),
        }
    }

    fn handle_exec(&mut self, request: &IncomingRequest) -> Response {
        let command = match &request.command {
            ExecCommand::Named(name) => name,
            ExecCommand::Missing | ExecCommand::NonString => {
                self.log.trace("exec", "command is missing or not a string");
                return Response::unsafe_exec();
            }
        };

        let argv = match engine::validate(command, &request.arguments, &self.rules, &mut self.log) {
            MatchResult::Accepted { argv, .. } => argv,
            MatchResult::Rejected => {
                self.log.trace("exec", format!("no rule allows {}", command));
                return Response::unsafe_exec();
            }
        };

        let Some((program, args)) = argv.split_first() else {
            return Response::unsafe_exec();
        };

        self.log.trace("exec", format!("executing {:?}", argv));
        let outcome = self.executor.run(program, args);
        if let Some(code) = outcome.exit_code {
            self.log.trace("exec", format!("exit code {}", code));
        }

        if outcome.success {
            Response::exec_ok(outcome.stdout)
        } else {
            Response::exec_failed(outcome.stdout, outcome.stderr)
        }
    }

    fn send<W: Write>(&mut self, writer: &mut W, response: &Response) {
        let payload = response.to_json();
        self.log.trace(
            "response",
            String::from_utf8_lossy(&payload).into_owned(),
        );
        if let Err(e) = self.codec.write_frame(writer, &payload) {
            self.log
                .error("response", format!("unable to write response: {}", e));
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Frames read so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
