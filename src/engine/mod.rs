//! Allowlist validation for exec requests
//!
//! Turns a requested program name and its arguments into either a rejection
//! or the exact argv to run. The program is always taken from the matched
//! rule, never from the request.

pub mod common;

use crate::audit::HostLogger;
use crate::rules::{ArgumentKind, ArgumentRule, RuleSet};

use common::UrlRejection;

/// Outcome of validating one exec request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// No rule allows this invocation
    Rejected,

    /// Rule number `rule` matched; `argv[0]` is that rule's command
    Accepted { rule: usize, argv: Vec<String> },
}

impl MatchResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, MatchResult::Accepted { .. })
    }

    /// The argv of an accepted request
    pub fn argv(&self) -> Option<&[String]> {
        match self {
            MatchResult::Rejected => None,
            MatchResult::Accepted { argv, .. } => Some(argv),
        }
    }
}

/// Why one argument did not satisfy its rule
#[derive(Debug, Clone, PartialEq, Eq)]
enum Mismatch {
    NotAllowed,
    NotInList,
    Url(UrlRejection),
    UnknownKind(String),
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mismatch::NotAllowed => write!(f, "value not allowed"),
            Mismatch::NotInList => write!(f, "value not in list"),
            Mismatch::Url(UrlRejection::Unclean) => {
                write!(f, "url has surrounding whitespace or control characters")
            }
            Mismatch::Url(UrlRejection::Unparsable(e)) => write!(f, "url could not be parsed: {}", e),
            Mismatch::Url(UrlRejection::Scheme(s)) => write!(f, "url scheme '{}' is not http/https", s),
            Mismatch::UnknownKind(tag) => write!(f, "unknown argument type '{}'", tag),
        }
    }
}

/// Check `(command, arguments)` against `rules`, first match wins.
///
/// Rejection details are written to `log` only; they never change the result.
pub fn validate(
    command: &str,
    arguments: &[String],
    rules: &RuleSet,
    log: &mut HostLogger,
) -> MatchResult {
    'rules: for (rule_idx, rule) in rules.iter().enumerate() {
        if rule.command != command || rule.arguments.len() != arguments.len() {
            continue;
        }

        let mut argv = vec![rule.command.clone()];

        for (arg_idx, (spec, raw)) in rule.arguments.iter().zip(arguments).enumerate() {
            let value = common::trim_left(raw, &spec.trim_left);
            let value = common::trim_right(value, &spec.trim_right);

            if let Err(mismatch) = check_argument(spec, value) {
                log.trace(
                    "rule",
                    format!("{}-{} '{}': {}", rule_idx, arg_idx, value, mismatch),
                );
                continue 'rules;
            }

            argv.extend(spec.insert_before.iter().cloned());
            argv.extend(common::split_value(value, spec.split_space));
            argv.extend(spec.insert_after.iter().cloned());
        }

        log.trace("rule", format!("{} call matched", rule_idx));
        return MatchResult::Accepted {
            rule: rule_idx,
            argv,
        };
    }

    MatchResult::Rejected
}

/// Type-check an already trimmed value
fn check_argument(spec: &ArgumentRule, value: &str) -> Result<(), Mismatch> {
    match &spec.kind {
        ArgumentKind::Exact => {
            if spec.value.is_empty() || value != spec.value {
                return Err(Mismatch::NotAllowed);
            }
        }
        ArgumentKind::List => {
            if !spec.values.iter().any(|v| v == value) {
                return Err(Mismatch::NotInList);
            }
        }
        ArgumentKind::Url => common::check_web_url(value).map_err(Mismatch::Url)?,
        ArgumentKind::Unknown(tag) => return Err(Mismatch::UnknownKind(tag.clone())),
    }
    Ok(())
}

/// Commands that at least one rule names
pub fn known_commands(rules: &RuleSet) -> Vec<&str> {
    let mut names: Vec<&str> = rules.iter().map(|r| r.command.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    names
}
