//! Leading `key: value` metadata block.
//!
//! Pairs are consumed one at a time; the first line that is neither a new key nor an
//! indented continuation ends the title page, and whatever was consumed up to that point
//! stays valid.

use crate::types::Token;
use winnow::ascii::{space0, till_line_ending};
use winnow::combinator::{alt, eof, fail, not, opt, preceded, repeat, terminated};
use winnow::token::take_while;
use winnow::{ModalResult, Parser};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TitlePage {
    pub tokens: Vec<Token>,
    /// Byte offset where the script body starts. Zero when there is no title page.
    pub scan_index: usize,
}

pub fn extract(source: &str) -> TitlePage {
    let mut page = TitlePage::default();
    let mut remaining = source.trim_start();

    while !remaining.is_empty() {
        let mut cursor = remaining;
        match title_field.parse_next(&mut cursor) {
            Ok(token) => {
                page.tokens.push(token);
                remaining = cursor;
                page.scan_index = source.len() - remaining.len();
            }
            Err(_) => break,
        }
    }

    page
}

fn title_field(input: &mut &str) -> ModalResult<Token> {
    let key = key_prefix.parse_next(input)?;
    space0.parse_next(input)?;
    let first = opt(value_text).parse_next(input)?;
    let rest: Vec<&str> = repeat(0.., continuation_line).parse_next(input)?;
    if first.is_none() && rest.is_empty() {
        return fail.parse_next(input);
    }
    alt(("\n", eof)).parse_next(input)?;

    let text = first
        .into_iter()
        .chain(rest)
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");

    Ok(Token::TitlePage {
        key: key.trim().to_lowercase().replace(' ', "_"),
        text,
    })
}

fn key_prefix<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    terminated(
        take_while(1.., is_key_char).verify(|k: &str| !k.trim().is_empty()),
        ':',
    )
    .parse_next(input)
}

fn continuation_line<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    preceded(
        ("\n", not(key_prefix), alt(("   ", "\t")), space0),
        value_text,
    )
    .parse_next(input)
}

fn value_text<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    till_line_ending
        .verify(|s: &str| !s.trim().is_empty())
        .parse_next(input)
}

fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == ' '
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn field(key: &str, text: &str) -> Token {
        Token::TitlePage {
            key: key.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn no_title_page_consumes_nothing() {
        let page = extract("INT. HOUSE - DAY\n\nJohn enters.");
        assert!(page.tokens.is_empty());
        assert_eq!(page.scan_index, 0);
    }

    #[test]
    fn single_pair_stops_before_blank_line() {
        let source = "Title: My Play\n\nINT. HOUSE - DAY";
        let page = extract(source);
        assert_eq!(page.tokens, vec![field("title", "My Play")]);
        assert_eq!(&source[page.scan_index..], "\nINT. HOUSE - DAY");
    }

    #[test]
    fn keys_are_normalized() {
        let page = extract("Draft Date: 1/1/2024\nAuthor:  Jane Doe  \n");
        assert_eq!(
            page.tokens,
            vec![field("draft_date", "1/1/2024"), field("author", "Jane Doe")]
        );
    }

    #[test]
    fn indented_lines_continue_the_value() {
        let source = "Title:\n    _**BRICK & STEEL**_\n    _**FULL RETIRED**_\nCredit: Written by\n\nbody";
        let page = extract(source);
        assert_eq!(
            page.tokens,
            vec![
                field("title", "_**BRICK & STEEL**_\n_**FULL RETIRED**_"),
                field("credit", "Written by"),
            ]
        );
        assert_eq!(&source[page.scan_index..], "\nbody");
    }

    #[test]
    fn tab_indented_continuation() {
        let page = extract("Contact:\n\tNext Level Productions\n\t1588 Mission Dr.");
        assert_eq!(
            page.tokens,
            vec![field("contact", "Next Level Productions\n1588 Mission Dr.")]
        );
    }

    #[test]
    fn indented_key_starts_a_new_pair() {
        let page = extract("Contact: Jane\n   Phone: 555\n");
        assert_eq!(
            page.tokens,
            vec![field("contact", "Jane"), field("phone", "555")]
        );
    }

    #[test]
    fn key_without_value_ends_the_title_page() {
        let source = "Title: Play\nNotes:\nFADE IN:";
        let page = extract(source);
        assert_eq!(page.tokens, vec![field("title", "Play")]);
        assert_eq!(&source[page.scan_index..], "Notes:\nFADE IN:");
    }

    #[test]
    fn transition_at_start_is_not_a_title_page() {
        let page = extract("FADE IN:\n\nEXT. BRIDGE - NIGHT");
        assert!(page.tokens.is_empty());
        assert_eq!(page.scan_index, 0);
    }

    #[test]
    fn leading_whitespace_is_skipped() {
        let source = "\n\n  Title: Spaced\n\nAction.";
        let page = extract(source);
        assert_eq!(page.tokens, vec![field("title", "Spaced")]);
        assert!(page.scan_index <= source.len());
        assert_eq!(&source[page.scan_index..], "\nAction.");
    }

    #[test]
    fn title_page_at_end_of_input() {
        let source = "Title: Only";
        let page = extract(source);
        assert_eq!(page.tokens, vec![field("title", "Only")]);
        assert_eq!(page.scan_index, source.len());
    }
}
