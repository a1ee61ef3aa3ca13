//! Inline styling within a single token's text: emphasis, underline, notes and escapes.

use crate::escape::escape_html;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// A `\`-escape, or a placeholder opener already present in the text, which is protected
/// the same way so it cannot be mistaken for one of ours on restore.
static ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(&(?:amp|lt|gt|quot);|[\\*_@#!~=.^\[\]/])|(\x{E000})").unwrap()
});

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x{E000}(\d+)\x{E001}").unwrap());

static LEADING_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^( +)").unwrap());

static NOTE_INLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[((?s:.+?))\]\]").unwrap());

/// Most specific combination first, so `***_x_***` is not taken apart by the simpler passes.
static STYLES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (
            r"(?:_\*{3}|\*{3}_)(.+?)(?:\*{3}_|_\*{3})",
            r#"<span class="bold italic underline">${1}</span>"#,
        ),
        (
            r"(?:_\*{2}|\*{2}_)(.+?)(?:\*{2}_|_\*{2})",
            r#"<span class="bold underline">${1}</span>"#,
        ),
        (
            r"(?:_\*|\*_)(.+?)(?:\*_|_\*)",
            r#"<span class="italic underline">${1}</span>"#,
        ),
        (
            r"\*{3}(.+?)\*{3}",
            r#"<span class="bold italic">${1}</span>"#,
        ),
        (r"\*{2}(.+?)\*{2}", r#"<span class="bold">${1}</span>"#),
        (r"\*(.+?)\*", r#"<span class="italic">${1}</span>"#),
        (r"_(.+?)_", r#"<span class="underline">${1}</span>"#),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

/// Turns raw token text into an HTML-safe fragment.
///
/// `escape_spaces` keeps the leading indentation of each line by converting it to
/// `&nbsp;`; it is meant for action text.
pub fn reconstruct(line: &str, escape_spaces: bool) -> String {
    let mut escaped: Vec<String> = Vec::new();
    let html = escape_html(line);
    let mut text = ESCAPE
        .replace_all(&html, |caps: &Captures| {
            let protected = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            escaped.push(protected.to_string());
            format!("\u{E000}{}\u{E001}", escaped.len() - 1)
        })
        .into_owned();

    if escape_spaces {
        text = LEADING_SPACES
            .replace_all(&text, |caps: &Captures| "&nbsp;".repeat(caps[1].len()))
            .into_owned();
    }

    for (pattern, replacement) in STYLES.iter() {
        if pattern.is_match(&text) {
            text = pattern.replace_all(&text, *replacement).into_owned();
        }
    }

    let text = NOTE_INLINE.replace_all(&text, "<!-- ${1} -->");
    let text = text.replace('\n', "<br />");
    let text = PLACEHOLDER.replace_all(&text, |caps: &Captures| {
        caps[1]
            .parse::<usize>()
            .ok()
            .and_then(|i| escaped.get(i))
            .cloned()
            .unwrap_or_else(|| caps[0].to_string())
    });

    text.trim_end().to_string()
}
