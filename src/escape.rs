//! HTML entity handling for the four characters the renderer must never emit raw.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ENTITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"&(amp|lt|gt|quot);").unwrap());

/// Escapes `&`, `<`, `>` and `"`.
pub fn escape_html(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(text).into_owned()
}

/// Reverses [`escape_html`]. Runs in a single pass, so `&amp;lt;` comes back as `&lt;`.
pub fn unescape_html(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| match &caps[1] {
            "amp" => "&",
            "lt" => "<",
            "gt" => ">",
            _ => "\"",
        })
        .into_owned()
}
