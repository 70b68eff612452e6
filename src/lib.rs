//! exec-gatekeeper - Allowlist-gated native messaging host
//!
//! A browser extension talks to this host over stdin/stdout using
//! length-prefixed JSON frames. Exec requests only run when an operator rule
//! matches them exactly, and the program that runs is always the rule's own.
//!
//! # Features
//!
//! - **Frame codec**: u32 length prefix in a configured byte order, bounded reads
//! - **Allowlist validation**: first-match-wins, fail-closed argument checks
//! - **Argument transforms**: trimming, inserted tokens, space splitting
//! - **No shell**: accepted argv is passed straight to the OS
//! - **JSONL log**: every decision written to a log file, never to stdout
//!
//! # Example
//!
//! ```
//! use exec_gatekeeper::{validate, ArgumentRule, HostLogger, MatchResult, Rule, RuleSet};
//!
//! let rules = RuleSet::new(vec![Rule::new(
//!     "notepad",
//!     vec![ArgumentRule::list(["a.txt", "b.txt"])],
//! )]);
//! let mut log = HostLogger::default();
//!
//! let result = validate("notepad", &["a.txt".to_string()], &rules, &mut log);
//! assert_eq!(result.argv(), Some(&["notepad".to_string(), "a.txt".to_string()][..]));
//!
//! let result = validate("notepad", &["c.txt".to_string()], &rules, &mut log);
//! assert_eq!(result, MatchResult::Rejected);
//! ```

pub mod audit;
pub mod config;
pub mod engine;
pub mod exec;
pub mod frame;
pub mod handlers;
pub mod host;
pub mod input;
pub mod output;
pub mod rules;

// Re-exports for convenience
pub use audit::HostLogger;
pub use config::{Config, ConfigError};
pub use engine::{validate, MatchResult};
pub use exec::{ExecOutcome, Executor, SystemExecutor};
pub use frame::{ByteOrder, FrameCodec, FrameError};
pub use host::{Host, LoopState};
pub use input::{ExecCommand, IncomingRequest, Request};
pub use output::Response;
pub use rules::{ArgumentKind, ArgumentRule, Rule, RuleSet};
