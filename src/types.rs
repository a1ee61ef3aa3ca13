use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ParseOutput {
    pub title: String,
    pub html: ScriptHtml,
    pub tokens: Vec<Token>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct ScriptHtml {
    pub title_page: String,
    pub script: String,
}

#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Keep the lexed tokens in [`ParseOutput::tokens`]; otherwise the list is left empty.
    pub keep_tokens: bool,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DualSide {
    Left,
    Right,
}

impl DualSide {
    pub fn as_str(self) -> &'static str {
        match self {
            DualSide::Left => "left",
            DualSide::Right => "right",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `key: value` pair from the title page; `key` is lower-cased with spaces as underscores.
    TitlePage { key: String, text: String },
    SceneHeading {
        text: String,
        scene_number: Option<String>,
    },
    Transition { text: String },
    DualDialogueBegin,
    DialogueBegin { dual: Option<DualSide> },
    Character { text: String },
    Parenthetical { text: String },
    Dialogue { text: String },
    DialogueEnd,
    DualDialogueEnd,
    Action { text: String },
    Centered { text: String },
    Lyrics { text: String },
    Section { text: String, depth: usize },
    Synopsis { text: String },
    Note { text: String },
    PageBreak,
    Spaces,
}

impl Token {
    pub fn kind(&self) -> &str {
        match self {
            Token::TitlePage { key, .. } => key,
            Token::SceneHeading { .. } => "scene_heading",
            Token::Transition { .. } => "transition",
            Token::DualDialogueBegin => "dual_dialogue_begin",
            Token::DialogueBegin { .. } => "dialogue_begin",
            Token::Character { .. } => "character",
            Token::Parenthetical { .. } => "parenthetical",
            Token::Dialogue { .. } => "dialogue",
            Token::DialogueEnd => "dialogue_end",
            Token::DualDialogueEnd => "dual_dialogue_end",
            Token::Action { .. } => "action",
            Token::Centered { .. } => "centered",
            Token::Lyrics { .. } => "lyrics",
            Token::Section { .. } => "section",
            Token::Synopsis { .. } => "synopsis",
            Token::Note { .. } => "note",
            Token::PageBreak => "page_break",
            Token::Spaces => "spaces",
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Token::TitlePage { text, .. }
            | Token::SceneHeading { text, .. }
            | Token::Transition { text }
            | Token::Character { text }
            | Token::Parenthetical { text }
            | Token::Dialogue { text }
            | Token::Action { text }
            | Token::Centered { text }
            | Token::Lyrics { text }
            | Token::Section { text, .. }
            | Token::Synopsis { text }
            | Token::Note { text } => Some(text),
            Token::DualDialogueBegin
            | Token::DialogueBegin { .. }
            | Token::DialogueEnd
            | Token::DualDialogueEnd
            | Token::PageBreak
            | Token::Spaces => None,
        }
    }

    pub(crate) fn text_mut(&mut self) -> Option<&mut String> {
        match self {
            Token::Dialogue { text } | Token::Lyrics { text } => Some(text),
            _ => None,
        }
    }
}

impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.kind())?;
        if let Some(text) = self.text() {
            map.serialize_entry("text", text)?;
        }
        match self {
            Token::SceneHeading {
                scene_number: Some(number),
                ..
            } => map.serialize_entry("scene_number", number)?,
            Token::Section { depth, .. } => map.serialize_entry("depth", depth)?,
            Token::DialogueBegin { dual: Some(side) } => map.serialize_entry("dual", side)?,
            _ => {}
        }
        map.end()
    }
}
