use crate::escape::unescape_html;
use crate::inline::reconstruct;
use crate::types::Token;
use once_cell::sync::Lazy;
use regex::Regex;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<.*?>").unwrap());

/// Renders one token. Sections, synopses, spaces and unknown title-page keys render to
/// nothing.
pub fn to_html(token: &Token) -> String {
    let lexed = match token {
        Token::Action { text } => reconstruct(text, true),
        _ => token
            .text()
            .filter(|text| !text.is_empty())
            .map(|text| reconstruct(text, false))
            .unwrap_or_default(),
    };

    match token {
        Token::TitlePage { key, .. } => title_page_html(key, &lexed),
        Token::SceneHeading {
            scene_number: Some(number),
            ..
        } => format!("<h3 id=\"{}\">{}</h3>", number, lexed),
        Token::SceneHeading { .. } => format!("<h3>{}</h3>", lexed),
        Token::Transition { .. } => format!("<h2>{}</h2>", lexed),
        Token::DualDialogueBegin => "<div class=\"dual-dialogue\">".to_string(),
        Token::DialogueBegin { dual: Some(side) } => {
            format!("<div class=\"dialogue {}\">", side.as_str())
        }
        Token::DialogueBegin { dual: None } => "<div class=\"dialogue\">".to_string(),
        Token::Character { .. } => format!("<h4>{}</h4>", lexed),
        Token::Parenthetical { .. } => format!("<p class=\"parenthetical\">{}</p>", lexed),
        Token::Dialogue { .. } => format!("<p>{}</p>", lexed),
        Token::DialogueEnd | Token::DualDialogueEnd => "</div>".to_string(),
        Token::Section { .. } | Token::Synopsis { .. } | Token::Spaces => String::new(),
        Token::Note { .. } => format!("<!-- {} -->", lexed),
        Token::Action { .. } => format!("<p>{}</p>", lexed),
        Token::Centered { .. } => format!("<p class=\"centered\">{}</p>", lexed),
        Token::Lyrics { .. } => format!("<p class=\"lyrics\">{}</p>", lexed),
        Token::PageBreak => "<hr />".to_string(),
    }
}

fn title_page_html(key: &str, lexed: &str) -> String {
    match key {
        "title" => format!("<h1>{}</h1>", lexed),
        "author" | "authors" => format!("<p class=\"authors\">{}</p>", lexed),
        "contact" | "copyright" | "credit" | "date" | "draft_date" | "notes" | "revision"
        | "source" => format!("<p class=\"{}\">{}</p>", key.replace('_', "-"), lexed),
        _ => String::new(),
    }
}

/// Plain-text form of a title-page value: styled, then stripped of every tag and
/// unescaped. Line breaks become spaces and the ends are trimmed.
pub fn plain_text(text: &str) -> String {
    let html = reconstruct(text, false).replace("<br />", " ");
    unescape_html(TAG.replace_all(&html, "").trim())
}

/// Renders tokens in order and concatenates the fragments.
pub fn render(tokens: &[Token]) -> String {
    tokens.iter().map(to_html).collect()
}
