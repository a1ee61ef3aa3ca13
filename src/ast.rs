use crate::types::{DualSide, Token};

/// A classified block of the script body, before dual-dialogue pairing.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Token(Token),
    Dialogue(DialogueBlock),
}

/// One speaker turn: the cue plus its dialogue, parenthetical and lyrics lines in order.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueBlock {
    pub character: String,
    /// The cue ended in `^`, asking to sit on the right of the previous turn.
    pub dual: bool,
    pub lines: Vec<Token>,
}

impl Block {
    pub fn is_dual_dialogue(&self) -> bool {
        matches!(self, Block::Dialogue(d) if d.dual)
    }

    pub fn into_dialogue(self) -> Option<DialogueBlock> {
        match self {
            Block::Dialogue(d) => Some(d),
            Block::Token(_) => None,
        }
    }
}

impl DialogueBlock {
    pub fn push_tokens(self, side: Option<DualSide>, tokens: &mut Vec<Token>) {
        tokens.push(Token::DialogueBegin { dual: side });
        tokens.push(Token::Character {
            text: self.character,
        });
        tokens.extend(self.lines);
        tokens.push(Token::DialogueEnd);
    }
}
