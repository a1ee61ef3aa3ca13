use crate::ast::Block;
use crate::rules::{action, RULES};
use crate::title_page;
use crate::types::{DualSide, Token};
use once_cell::sync::Lazy;
use regex::Regex;

static BONEYARD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

/// Lexes a whole script into `(title_page_tokens, script_tokens)`.
pub fn tokenize(script: &str) -> (Vec<Token>, Vec<Token>) {
    let script = script.trim_start_matches('\u{feff}');
    let source = strip_boneyard(&normalize_newlines(script));

    let title_page = title_page::extract(&source);
    log::debug!(
        target: "fountain.lexer",
        "title page: {} fields, body starts at byte {}",
        title_page.tokens.len(),
        title_page.scan_index
    );

    let body = &source[title_page.scan_index..];
    (title_page.tokens, tokenize_script(body))
}

/// Lexes a script body that has no title page.
pub fn tokenize_script(body: &str) -> Vec<Token> {
    let blocks = split_blocks(body);
    log::debug!(target: "fountain.lexer", "script body: {} blocks", blocks.len());

    let mut tokens = Vec::new();
    let mut blocks = blocks.into_iter().map(classify).peekable();

    while let Some(block) = blocks.next() {
        let dialogue = match block {
            Block::Token(token) => {
                tokens.push(token);
                continue;
            }
            Block::Dialogue(dialogue) => dialogue,
        };

        match blocks
            .next_if(Block::is_dual_dialogue)
            .and_then(Block::into_dialogue)
        {
            Some(right) => {
                tokens.push(Token::DualDialogueBegin);
                dialogue.push_tokens(Some(DualSide::Left), &mut tokens);
                right.push_tokens(Some(DualSide::Right), &mut tokens);
                tokens.push(Token::DualDialogueEnd);
            }
            None => {
                if dialogue.dual {
                    log::debug!(
                        target: "fountain.lexer",
                        "dual dialogue marker on {:?} has no preceding turn, rendering as single dialogue",
                        dialogue.character
                    );
                }
                dialogue.push_tokens(None, &mut tokens);
            }
        }
    }

    tokens
}

/// Runs the block through [`RULES`] in order, falling back to action.
pub fn classify(block: &str) -> Block {
    for rule in RULES.iter() {
        if let Some(classified) = rule.apply(block) {
            log::trace!(target: "fountain.lexer", "{} <- {:?}", rule.kind, block);
            return classified;
        }
    }
    log::trace!(target: "fountain.lexer", "action <- {:?}", block);
    Block::Token(action(block))
}

/// Splits on blank lines. A line of exactly two spaces is a forced line break, not a
/// separator, and stays inside its block.
pub fn split_blocks(body: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut start: Option<usize> = None;
    let mut end = 0;
    let mut offset = 0;

    for line in body.split('\n') {
        if is_blank_line(line) {
            if let Some(s) = start.take() {
                blocks.push(&body[s..end]);
            }
        } else {
            start.get_or_insert(offset);
            end = offset + line.len();
        }
        offset += line.len() + 1;
    }
    if let Some(s) = start {
        blocks.push(&body[s..end]);
    }

    blocks
}

fn is_blank_line(line: &str) -> bool {
    line != "  " && line.trim().is_empty()
}

fn normalize_newlines(script: &str) -> String {
    script.replace("\r\n", "\n").replace('\r', "\n")
}

/// Removes `/* ... */` regions. A region that both opens and closes at the start of a
/// line leaves two newlines behind so the blocks around it stay separate.
fn strip_boneyard(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut last = 0;

    for m in BONEYARD.find_iter(source) {
        out.push_str(&source[last..m.start()]);
        if opens_at_line_start(source, m.start()) && closes_at_line_start(m.as_str()) {
            out.push_str("\n\n");
        }
        last = m.end();
    }
    out.push_str(&source[last..]);

    out
}

fn opens_at_line_start(source: &str, start: usize) -> bool {
    let before = &source[..start];
    let line = match before.rfind('\n') {
        Some(i) => &before[i + 1..],
        None => before,
    };
    line.trim().is_empty()
}

fn closes_at_line_start(region: &str) -> bool {
    let before_close = &region[..region.len() - 2];
    match before_close.rfind('\n') {
        Some(i) => before_close[i + 1..].trim().is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dialogue(text: &str) -> Token {
        Token::Dialogue {
            text: text.to_string(),
        }
    }

    fn character(text: &str) -> Token {
        Token::Character {
            text: text.to_string(),
        }
    }

    fn action_token(text: &str) -> Token {
        Token::Action {
            text: text.to_string(),
        }
    }

    #[test]
    fn splits_on_blank_lines_only() {
        assert_eq!(
            split_blocks("\nA\nB\n\n\n \t\nC\n  \nD\n"),
            vec!["A\nB", "C\n  \nD"]
        );
    }

    #[test]
    fn lone_forced_break_is_its_own_block() {
        assert_eq!(split_blocks("A\n\n  \n\nB"), vec!["A", "  ", "B"]);
        assert_eq!(tokenize_script("  "), vec![Token::Spaces]);
    }

    #[test]
    fn scene_and_action_in_document_order() {
        assert_eq!(
            tokenize_script("INT. HOUSE - DAY\n\nJohn enters."),
            vec![
                Token::SceneHeading {
                    text: "INT. HOUSE - DAY".to_string(),
                    scene_number: None,
                },
                action_token("John enters."),
            ]
        );
    }

    #[test]
    fn dialogue_lines_merge_and_parentheticals_split() {
        let tokens = tokenize_script("STEEL (O.S.)\n(whispering)\nThey're here.\nRun.\n(beat)\nNow!");
        assert_eq!(
            tokens,
            vec![
                Token::DialogueBegin { dual: None },
                character("STEEL (O.S.)"),
                Token::Parenthetical {
                    text: "(whispering)".to_string()
                },
                dialogue("They're here.\nRun."),
                Token::Parenthetical {
                    text: "(beat)".to_string()
                },
                dialogue("Now!"),
                Token::DialogueEnd,
            ]
        );
    }

    #[test]
    fn dual_dialogue_pairs_with_previous_turn() {
        let tokens = tokenize_script("BRICK\nScrew retirement.\n\nSTEEL ^\nScrew retirement.");
        assert_eq!(
            tokens,
            vec![
                Token::DualDialogueBegin,
                Token::DialogueBegin {
                    dual: Some(DualSide::Left)
                },
                character("BRICK"),
                dialogue("Screw retirement."),
                Token::DialogueEnd,
                Token::DialogueBegin {
                    dual: Some(DualSide::Right)
                },
                character("STEEL"),
                dialogue("Screw retirement."),
                Token::DialogueEnd,
                Token::DualDialogueEnd,
            ]
        );
    }

    #[test]
    fn dual_dialogue_keeps_surrounding_order() {
        let tokens = tokenize_script(
            "INT. GARAGE - DAY\n\nBRICK\nReady?\n\nSTEEL ^\nReady.\n\nThey roll out.",
        );
        let kinds: Vec<&str> = tokens.iter().map(Token::kind).collect();
        assert_eq!(
            kinds,
            vec![
                "scene_heading",
                "dual_dialogue_begin",
                "dialogue_begin",
                "character",
                "dialogue",
                "dialogue_end",
                "dialogue_begin",
                "character",
                "dialogue",
                "dialogue_end",
                "dual_dialogue_end",
                "action",
            ]
        );
    }

    #[test]
    fn unmatched_dual_marker_is_plain_dialogue() {
        let tokens = tokenize_script("The room is empty.\n\nSTEEL ^\nHello?");
        assert_eq!(
            tokens,
            vec![
                action_token("The room is empty."),
                Token::DialogueBegin { dual: None },
                character("STEEL"),
                dialogue("Hello?"),
                Token::DialogueEnd,
            ]
        );
    }

    #[test]
    fn a_turn_is_never_in_two_pairs() {
        let tokens = tokenize_script("A\none\n\nB ^\ntwo\n\nC ^\nthree");
        let begins = tokens
            .iter()
            .filter(|t| matches!(t, Token::DualDialogueBegin))
            .count();
        assert_eq!(begins, 1);
        assert_eq!(tokens.last(), Some(&Token::DialogueEnd));
        assert!(tokens.contains(&Token::DialogueBegin { dual: None }));
    }

    #[test]
    fn boneyard_at_line_starts_leaves_a_gap() {
        assert_eq!(
            strip_boneyard("Before.\n/*\nCut scene.\n*/\nAfter."),
            "Before.\n\n\n\nAfter."
        );
        assert_eq!(
            tokenize("Before.\n/*\nCut scene.\n*/\nAfter.").1,
            vec![action_token("Before."), action_token("After.")]
        );
    }

    #[test]
    fn inline_boneyard_is_removed() {
        assert_eq!(strip_boneyard("He /* quietly */ leaves."), "He  leaves.");
        assert_eq!(strip_boneyard("Open /* never closed"), "Open /* never closed");
    }

    #[test]
    fn carriage_returns_are_normalized() {
        let (_, tokens) = tokenize("INT. HOUSE - DAY\r\n\r\nJohn enters.\rHe sits.");
        assert_eq!(tokens[1], action_token("John enters.\nHe sits."));
    }

    #[test]
    fn title_page_is_split_from_body() {
        let (title, body) = tokenize("Title: My Play\nAuthor: Me\n\nFADE IN:\n\nEXT. BRIDGE - NIGHT");
        assert_eq!(title.len(), 2);
        assert_eq!(
            body,
            vec![
                action_token("FADE IN:"),
                Token::SceneHeading {
                    text: "EXT. BRIDGE - NIGHT".to_string(),
                    scene_number: None,
                },
            ]
        );
    }

    #[test]
    fn byte_order_mark_does_not_hide_the_title_page() {
        let (title, body) = tokenize("\u{feff}Title: Marked\n\nBody.");
        assert_eq!(
            title,
            vec![Token::TitlePage {
                key: "title".to_string(),
                text: "Marked".to_string(),
            }]
        );
        assert_eq!(body, vec![action_token("Body.")]);
    }

    #[test]
    fn top_level_lyrics_keep_their_text() {
        assert_eq!(
            tokenize_script("~Willy Wonka! Willy Wonka!\n~The amazing chocolatier!"),
            vec![Token::Lyrics {
                text: "Willy Wonka! Willy Wonka!\nThe amazing chocolatier!".to_string()
            }]
        );
    }

    #[test]
    fn tokenizing_twice_gives_identical_results() {
        let script = "BRICK\nGo.\n\nSTEEL ^\nGo.\n\nCUT TO:";
        assert_eq!(tokenize(script), tokenize(script));
    }
}
