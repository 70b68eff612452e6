//! Allowlist rule model
//!
//! Plain data loaded once at startup. Matching lives in [`crate::engine`].

use serde::{Deserialize, Deserializer};

/// How a single positional argument is checked
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ArgumentKind {
    /// Value must equal `ArgumentRule::value`
    Exact,

    /// Value must be one of `ArgumentRule::values`
    List,

    /// Value must be an http or https URL
    Url,

    /// Anything else found in the config. Never matches.
    Unknown(String),
}

impl From<String> for ArgumentKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "string" => ArgumentKind::Exact,
            "list" => ArgumentKind::List,
            "url" => ArgumentKind::Url,
            _ => ArgumentKind::Unknown(tag),
        }
    }
}

impl Default for ArgumentKind {
    fn default() -> Self {
        ArgumentKind::Unknown(String::new())
    }
}

impl ArgumentKind {
    /// Config tag for this kind
    pub fn tag(&self) -> &str {
        match self {
            ArgumentKind::Exact => "string",
            ArgumentKind::List => "list",
            ArgumentKind::Url => "url",
            ArgumentKind::Unknown(tag) => tag,
        }
    }
}

/// Constraint and transform for one positional argument
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArgumentRule {
    #[serde(rename = "type")]
    pub kind: ArgumentKind,

    /// Expected value for `string` arguments
    pub value: String,

    /// Accepted values for `list` arguments
    #[serde(deserialize_with = "nullable_list")]
    pub values: Vec<String>,

    /// Prefixes stripped from the incoming value, each at most once, in order
    #[serde(deserialize_with = "nullable_list")]
    pub trim_left: Vec<String>,

    /// Suffixes stripped from the incoming value, each at most once, in order
    #[serde(deserialize_with = "nullable_list")]
    pub trim_right: Vec<String>,

    /// Literal tokens emitted before the value
    #[serde(deserialize_with = "nullable_list")]
    pub insert_before: Vec<String>,

    /// Literal tokens emitted after the value
    #[serde(deserialize_with = "nullable_list")]
    pub insert_after: Vec<String>,

    /// Emit the value as several tokens split on ' '
    pub split_space: bool,
}

impl ArgumentRule {
    pub fn exact(value: impl Into<String>) -> Self {
        Self {
            kind: ArgumentKind::Exact,
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: ArgumentKind::List,
            values: values.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn url() -> Self {
        Self {
            kind: ArgumentKind::Url,
            ..Self::default()
        }
    }
}

/// One permitted invocation shape: a program and a fixed arity
#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    /// Program to run. Always `argv[0]` of an accepted invocation.
    #[serde(rename = "cmd")]
    pub command: String,

    #[serde(default, deserialize_with = "nullable_list")]
    pub arguments: Vec<ArgumentRule>,
}

/// A list that may be written as null, which reads as empty
pub(crate) fn nullable_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Rule {
    pub fn new(command: impl Into<String>, arguments: Vec<ArgumentRule>) -> Self {
        Self {
            command: command.into(),
            arguments,
        }
    }

    /// One-line description used by `--check` and the log
    pub fn summary(&self) -> String {
        let kinds: Vec<&str> = self.arguments.iter().map(|a| a.kind.tag()).collect();
        format!("{} [{}]", self.command, kinds.join(", "))
    }
}

/// Ordered allowlist. The first matching rule wins.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
