//! Value transforms shared by the argument checks

use url::Url;

/// Strip each prefix in `cuts` once, in order.
///
/// A prefix that reappears after stripping is left in place.
pub fn trim_left<'a>(value: &'a str, cuts: &[String]) -> &'a str {
    cuts.iter()
        .fold(value, |v, cut| v.strip_prefix(cut.as_str()).unwrap_or(v))
}

/// Strip each suffix in `cuts` once, in order.
pub fn trim_right<'a>(value: &'a str, cuts: &[String]) -> &'a str {
    cuts.iter()
        .fold(value, |v, cut| v.strip_suffix(cut.as_str()).unwrap_or(v))
}

/// Tokens emitted for an accepted value
pub fn split_value(value: &str, split_space: bool) -> Vec<String> {
    if split_space {
        value.split(' ').map(String::from).collect()
    } else {
        vec![value.to_string()]
    }
}

/// Why a value failed the URL check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlRejection {
    /// Surrounding whitespace or a control character the parser would drop
    Unclean,
    Unparsable(String),
    Scheme(String),
}

/// Accept only absolute http(s) URLs.
///
/// The value is passed on byte for byte, so it must already be in the form
/// the parser checked: no surrounding whitespace and no control characters.
pub fn check_web_url(value: &str) -> Result<(), UrlRejection> {
    if value != value.trim() || value.chars().any(char::is_control) {
        return Err(UrlRejection::Unclean);
    }
    let url = Url::parse(value).map_err(|e| UrlRejection::Unparsable(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(UrlRejection::Scheme(other.to_string())),
    }
}
