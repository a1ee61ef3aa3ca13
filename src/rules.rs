//! Block-matching rules, one per token kind, in classification precedence.
//!
//! Every pattern is anchored to the whole block it is given. Blocks never contain blank
//! lines, so a rule cannot reach into a neighbouring block.

use crate::ast::{Block, DialogueBlock};
use crate::types::Token;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub(crate) static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*$").unwrap());

pub(crate) static SCENE_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^[^\S\n]*(?:\.([\w(][^\n]*)|((?:int\.?/ext|i\.?/e|int|ext|est)[. ][^\n]*))$",
    )
    .unwrap()
});

pub(crate) static SCENE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\S\n]*#([\w.\-]+)#[^\S\n]*$").unwrap());

pub(crate) static CENTERED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\S\n]*>[^\n]*<[^\S\n]*(?:\n[^\S\n]*>[^\n]*<[^\S\n]*)*$").unwrap()
});

pub(crate) static TRANSITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[^\S\n]*(?:(\p{Lu}[^\p{Ll}\n]* TO:|FADE (?:TO BLACK|OUT)\.|CUT TO BLACK\.)[^\S\n]*|>[^\S\n]*([^\n]*\S[^\n]*))$",
    )
    .unwrap()
});

pub(crate) static DIALOGUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[^\S\n]*(@[^\n^]+|[\p{Lu}\d ._\-'*]*\p{Lu}[\p{Lu}\d ._\-'*]*(?:\([^\n)]*\))?)[^\S\n]*(\^)?[^\S\n]*\n((?s:.+))$",
    )
    .unwrap()
});

pub(crate) static SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\S\n]*(#+)[^\S\n]*([^\n]*)$").unwrap());

pub(crate) static SYNOPSIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\S\n]*=([^=\n][^\n]*)?$").unwrap());

pub(crate) static NOTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\S\n]*\[\[((?:[^\]]|\][^\]])*)\]\][^\S\n]*$").unwrap()
});

pub(crate) static LYRICS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)^[^\S\n]*~.*$").unwrap());

/// A `~` followed by a space is literal and stays in the text.
static LYRIC_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[^\S\n]*~( ?)").unwrap());

pub(crate) static PAGE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\S\n]*={3,}[^\S\n]*$").unwrap());

static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\(.+\)$").unwrap());

/// Same rule as lyrics: `! ` is literal.
static FORCED_ACTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^([^\S\n]*)!( ?)").unwrap());

static LEADING_TABS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^( *)(\t+)").unwrap());

/// A predicate (the pattern) paired with the extractor that builds the block's tokens.
pub struct Rule {
    pub kind: &'static str,
    pattern: &'static Lazy<Regex>,
    extract: fn(&Captures) -> Block,
}

impl Rule {
    pub fn apply(&self, block: &str) -> Option<Block> {
        self.pattern.captures(block).map(|caps| (self.extract)(&caps))
    }
}

/// Classification order. The first matching rule wins; [`action`] is the fallback.
pub static RULES: [Rule; 10] = [
    Rule {
        kind: "spaces",
        pattern: &SPACES,
        extract: extract_spaces,
    },
    Rule {
        kind: "scene_heading",
        pattern: &SCENE_HEADING,
        extract: extract_scene_heading,
    },
    Rule {
        kind: "centered",
        pattern: &CENTERED,
        extract: extract_centered,
    },
    Rule {
        kind: "transition",
        pattern: &TRANSITION,
        extract: extract_transition,
    },
    Rule {
        kind: "dialogue",
        pattern: &DIALOGUE,
        extract: extract_dialogue,
    },
    Rule {
        kind: "section",
        pattern: &SECTION,
        extract: extract_section,
    },
    Rule {
        kind: "synopsis",
        pattern: &SYNOPSIS,
        extract: extract_synopsis,
    },
    Rule {
        kind: "note",
        pattern: &NOTE,
        extract: extract_note,
    },
    Rule {
        kind: "lyrics",
        pattern: &LYRICS,
        extract: extract_lyrics,
    },
    Rule {
        kind: "page_break",
        pattern: &PAGE_BREAK,
        extract: extract_page_break,
    },
];

fn group<'t>(caps: &Captures<'t>, index: usize) -> &'t str {
    caps.get(index).map_or("", |m| m.as_str())
}

fn extract_spaces(_: &Captures) -> Block {
    Block::Token(Token::Spaces)
}

fn extract_scene_heading(caps: &Captures) -> Block {
    let heading = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
    let heading = heading.trim();
    let scene_number = SCENE_NUMBER
        .captures(heading)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());
    let text = SCENE_NUMBER.replace(heading, "").trim().to_string();
    Block::Token(Token::SceneHeading { text, scene_number })
}

fn extract_centered(caps: &Captures) -> Block {
    let text = group(caps, 0)
        .lines()
        .map(|line| {
            let line = line.trim();
            let line = line.strip_prefix('>').unwrap_or(line);
            let line = line.strip_suffix('<').unwrap_or(line);
            line.trim()
        })
        .collect::<Vec<_>>()
        .join("\n");
    Block::Token(Token::Centered { text })
}

fn extract_transition(caps: &Captures) -> Block {
    let text = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
    Block::Token(Token::Transition {
        text: text.trim().to_string(),
    })
}

fn extract_dialogue(caps: &Captures) -> Block {
    let cue = group(caps, 1).trim();
    let character = cue.strip_prefix('@').unwrap_or(cue).trim().to_string();
    Block::Dialogue(DialogueBlock {
        character,
        dual: caps.get(2).is_some(),
        lines: dialogue_lines(group(caps, 3)),
    })
}

/// Body lines of a dialogue block, after the cue.
///
/// Consecutive dialogue lines merge into one token, as do consecutive `~` lyrics lines.
/// Parentheticals always stand alone, and a forced line break ends the current run.
fn dialogue_lines(body: &str) -> Vec<Token> {
    let mut lines: Vec<Token> = Vec::new();
    let mut run_broken = false;

    for raw in body.split('\n') {
        if raw == "  " {
            run_broken = true;
            continue;
        }
        let text = raw.trim();
        if text.is_empty() {
            continue;
        }

        if PARENTHETICAL.is_match(text) {
            lines.push(Token::Parenthetical {
                text: text.to_string(),
            });
            run_broken = false;
            continue;
        }

        let (is_lyric, text) = match text.strip_prefix('~') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, text),
        };
        let continues_run = !run_broken
            && matches!(
                (lines.last(), is_lyric),
                (Some(Token::Lyrics { .. }), true) | (Some(Token::Dialogue { .. }), false)
            );

        match lines.last_mut().and_then(Token::text_mut) {
            Some(previous) if continues_run => {
                previous.push('\n');
                previous.push_str(text);
            }
            _ => {
                let text = text.to_string();
                lines.push(if is_lyric {
                    Token::Lyrics { text }
                } else {
                    Token::Dialogue { text }
                });
            }
        }
        run_broken = false;
    }

    lines
}

fn extract_section(caps: &Captures) -> Block {
    Block::Token(Token::Section {
        text: group(caps, 2).trim_end().to_string(),
        depth: group(caps, 1).len(),
    })
}

fn extract_synopsis(caps: &Captures) -> Block {
    Block::Token(Token::Synopsis {
        text: group(caps, 1).trim().to_string(),
    })
}

fn extract_note(caps: &Captures) -> Block {
    Block::Token(Token::Note {
        text: group(caps, 1).trim().to_string(),
    })
}

fn extract_lyrics(caps: &Captures) -> Block {
    let text = LYRIC_MARKER.replace_all(group(caps, 0), |marker: &Captures| {
        if marker[1].is_empty() {
            String::new()
        } else {
            marker[0].to_string()
        }
    });
    Block::Token(Token::Lyrics {
        text: text.into_owned(),
    })
}

fn extract_page_break(_: &Captures) -> Block {
    Block::Token(Token::PageBreak)
}

/// Fallback for blocks no rule claims. Strips forced-action `!` markers and expands
/// leading tabs to four spaces each.
pub fn action(block: &str) -> Token {
    let text = FORCED_ACTION.replace_all(block, |caps: &Captures| {
        if caps[2].is_empty() {
            caps[1].to_string()
        } else {
            caps[0].to_string()
        }
    });
    let text = LEADING_TABS.replace_all(&text, |caps: &Captures| {
        format!("{}{}", &caps[1], "    ".repeat(caps[2].len()))
    });
    Token::Action {
        text: text.into_owned(),
    }
}
